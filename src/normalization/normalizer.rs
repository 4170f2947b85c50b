use crate::core::error::KClusterResult;
use crate::core::float::KFloat;
use crate::normalization::column::ColumnStats;
use log::debug;
use ndarray::{Array2, ArrayView2};

/// Column statistics fitted on a raw feature matrix (rows are records).
#[derive(Debug, Clone, PartialEq)]
pub struct Normalizer<F> {
    stats: Vec<ColumnStats<F>>,
}

impl<F: KFloat> Normalizer<F> {
    /// Derives one [`ColumnStats`] per column. Fails on the first degenerate column.
    pub fn fit(raw: &ArrayView2<F>) -> KClusterResult<Self> {
        let stats = raw
            .columns()
            .into_iter()
            .enumerate()
            .map(|(idx, column)| ColumnStats::from_column(idx, &column))
            .collect::<KClusterResult<Vec<_>>>()?;

        for (idx, s) in stats.iter().enumerate() {
            debug!("Column {}: median {}, mad {}", idx, s.median, s.mad);
        }
        Ok(Self { stats })
    }

    pub fn stats(&self) -> &[ColumnStats<F>] {
        &self.stats
    }

    pub fn dim(&self) -> usize {
        self.stats.len()
    }

    /// Maps raw values into normalized space.
    pub fn transform(&self, raw: &ArrayView2<F>) -> Array2<F> {
        assert_eq!(raw.ncols(), self.dim(), "column count must match the fitted normalizer");
        Array2::from_shape_fn(raw.dim(), |(i, j)| self.stats[j].normalize(raw[[i, j]]))
    }

    /// Maps normalized values (records or centroids) back into raw space.
    pub fn inverse_transform(&self, normalized: &ArrayView2<F>) -> Array2<F> {
        assert_eq!(
            normalized.ncols(),
            self.dim(),
            "column count must match the fitted normalizer"
        );
        Array2::from_shape_fn(normalized.dim(), |(i, j)| {
            self.stats[j].denormalize(normalized[[i, j]])
        })
    }
}
