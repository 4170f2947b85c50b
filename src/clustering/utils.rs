use crate::core::float::KFloat;
use ndarray::{Array1, ArrayView2, Axis};

/// Component-wise mean of the rows at `indices`, or `None` when `indices` is
/// empty. Rows are summed in the order given, so callers pass ascending
/// indices to get reproducible sums.
pub fn compute_mean<F: KFloat>(data: &ArrayView2<F>, indices: &[usize]) -> Option<Array1<F>> {
    if indices.is_empty() {
        return None;
    }
    let mut sum = Array1::<F>::zeros(data.ncols());
    for &idx in indices {
        sum += &data.index_axis(Axis(0), idx);
    }
    let count = F::from_usize(indices.len())?;
    Some(sum.mapv_into(|v| v / count))
}
