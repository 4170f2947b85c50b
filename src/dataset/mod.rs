//! Records, the normalized dataset, and the delimited-text loader that feeds it.

pub mod loader;
pub mod record;

pub use loader::{load_delimited, load_delimited_path, LoadOptions};
pub use record::Record;

use crate::core::error::{KClusterError, KClusterResult};
use crate::core::float::KFloat;
use crate::normalization::Normalizer;
use log::info;
use ndarray::{Array2, ArrayView1, ArrayView2};
use std::path::Path;

/// An ordered set of records sharing one dimensionality, together with the
/// normalized feature matrix derived from them.
///
/// The dataset is immutable once built; clustering runs borrow it read-only.
#[derive(Debug, Clone)]
pub struct Dataset<F: KFloat> {
    labels: Vec<Option<String>>,
    raw: Array2<F>,
    normalized: Array2<F>,
    normalizer: Normalizer<F>,
}

impl<F: KFloat> Dataset<F> {
    /// Builds a dataset from records, rejecting empty input, inconsistent
    /// dimensionality and non-finite values before normalizing each column.
    pub fn from_records(records: Vec<Record<F>>) -> KClusterResult<Self> {
        let first = records
            .first()
            .ok_or_else(|| KClusterError::MalformedInput("dataset has no records".to_string()))?;
        let dim = first.dim();

        let mut labels = Vec::with_capacity(records.len());
        let mut values = Vec::with_capacity(records.len() * dim);
        for (idx, record) in records.into_iter().enumerate() {
            if record.dim() != dim {
                return Err(KClusterError::MalformedInput(format!(
                    "record {} has {} features, expected {}",
                    idx,
                    record.dim(),
                    dim
                )));
            }
            labels.push(record.label);
            values.extend(record.features);
        }

        let raw = Array2::from_shape_vec((labels.len(), dim), values)
            .map_err(|e| KClusterError::MalformedInput(e.to_string()))?;
        Self::build(raw, labels)
    }

    /// Builds a dataset from a raw feature matrix (rows are records).
    /// `labels`, when given, must have one entry per row.
    pub fn from_array(raw: Array2<F>, labels: Option<Vec<String>>) -> KClusterResult<Self> {
        let labels = match labels {
            Some(labels) if labels.len() != raw.nrows() => {
                return Err(KClusterError::MalformedInput(format!(
                    "{} labels for {} records",
                    labels.len(),
                    raw.nrows()
                )))
            }
            Some(labels) => labels.into_iter().map(Some).collect(),
            None => vec![None; raw.nrows()],
        };
        Self::build(raw, labels)
    }

    /// Loads and normalizes a delimited text file.
    pub fn from_path<P: AsRef<Path>>(path: P, options: &LoadOptions) -> KClusterResult<Self> {
        let path = path.as_ref();
        let records = load_delimited_path(path, options)?;
        let dataset = Self::from_records(records)?;
        info!(
            "Loaded {} records with {} features from {}",
            dataset.len(),
            dataset.dim(),
            path.display()
        );
        Ok(dataset)
    }

    fn build(raw: Array2<F>, labels: Vec<Option<String>>) -> KClusterResult<Self> {
        if raw.nrows() == 0 {
            return Err(KClusterError::MalformedInput("dataset has no records".to_string()));
        }
        if raw.ncols() == 0 {
            return Err(KClusterError::MalformedInput(
                "records have no numeric features".to_string(),
            ));
        }
        if let Some(((row, col), _)) = raw.indexed_iter().find(|(_, v)| !v.is_finite()) {
            return Err(KClusterError::MalformedInput(format!(
                "record {} feature {} is not a finite number",
                row, col
            )));
        }

        let normalizer = Normalizer::fit(&raw.view())?;
        let normalized = normalizer.transform(&raw.view());
        Ok(Self {
            labels,
            raw,
            normalized,
            normalizer,
        })
    }

    pub fn len(&self) -> usize {
        self.raw.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.nrows() == 0
    }

    /// Number of numeric features per record.
    pub fn dim(&self) -> usize {
        self.raw.ncols()
    }

    pub fn raw(&self) -> ArrayView2<'_, F> {
        self.raw.view()
    }

    pub fn normalized(&self) -> ArrayView2<'_, F> {
        self.normalized.view()
    }

    pub fn normalized_row(&self, idx: usize) -> ArrayView1<'_, F> {
        self.normalized.row(idx)
    }

    pub fn normalizer(&self) -> &Normalizer<F> {
        &self.normalizer
    }

    pub fn label(&self, idx: usize) -> Option<&str> {
        self.labels.get(idx).and_then(|l| l.as_deref())
    }

    /// The record's label, or its index when it has none.
    pub fn display_label(&self, idx: usize) -> String {
        self.label(idx)
            .map(str::to_string)
            .unwrap_or_else(|| idx.to_string())
    }
}
