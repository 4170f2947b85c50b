use crate::core::error::{KClusterError, KClusterResult};
use crate::core::float::KFloat;
use ndarray::ArrayView1;
use num_traits::Float;
use std::cmp::Ordering;

/// Median of `values`: the middle value of the sorted sequence, or the mean of
/// the two middle values when the length is even. `None` for an empty slice.
pub fn median<F: KFloat>(values: &[F]) -> Option<F> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let n = sorted.len();
    if n % 2 == 1 {
        Some(sorted[n / 2])
    } else {
        let two = F::one() + F::one();
        Some((sorted[n / 2 - 1] + sorted[n / 2]) / two)
    }
}

/// Mean of `|x - center|` over `values`. `None` for an empty slice.
pub fn mean_absolute_deviation<F: KFloat>(values: &[F], center: F) -> Option<F> {
    if values.is_empty() {
        return None;
    }
    let total: F = values.iter().map(|&x| Float::abs(x - center)).sum();
    F::from_usize(values.len()).map(|n| total / n)
}

/// Median and mean absolute deviation of one raw feature column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnStats<F> {
    pub median: F,
    pub mad: F,
}

impl<F: KFloat> ColumnStats<F> {
    /// Derives the statistics of the column at `column` index.
    ///
    /// Fails with [`KClusterError::DegenerateColumn`] when every value is
    /// identical, since dividing by a zero deviation is undefined.
    pub fn from_column(column: usize, values: &ArrayView1<F>) -> KClusterResult<Self> {
        let values = values.to_vec();
        let median = median(&values).ok_or_else(|| {
            KClusterError::MalformedInput(format!("column {} has no values", column))
        })?;
        let mad = mean_absolute_deviation(&values, median).ok_or_else(|| {
            KClusterError::MalformedInput(format!("column {} has no values", column))
        })?;

        if mad <= F::zero() {
            return Err(KClusterError::DegenerateColumn { column });
        }
        Ok(Self { median, mad })
    }

    #[inline]
    pub fn normalize(&self, x: F) -> F {
        (x - self.median) / self.mad
    }

    #[inline]
    pub fn denormalize(&self, z: F) -> F {
        z * self.mad + self.median
    }
}

/// Normalizes a single column, returning the rescaled values.
pub fn normalize_column<F: KFloat>(values: &[F]) -> KClusterResult<Vec<F>> {
    let stats = ColumnStats::from_column(0, &ArrayView1::from(values))?;
    Ok(values.iter().map(|&x| stats.normalize(x)).collect())
}
