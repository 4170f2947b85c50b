//! Error types shared by every stage of a clustering run.

use thiserror::Error;

/// Result type alias used throughout the crate.
pub type KClusterResult<T> = std::result::Result<T, KClusterError>;

/// Errors that can occur while loading, normalizing or clustering a dataset.
///
/// A run that hits its iteration cap is not an error; see
/// [`NonConvergenceWarning`](crate::clustering::NonConvergenceWarning).
#[derive(Error, Debug)]
pub enum KClusterError {
    /// A row had the wrong arity, a cell was not numeric, or the records
    /// do not share one dimensionality.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// A feature column has zero mean absolute deviation.
    #[error("degenerate column {column}: all values are identical, normalization is undefined")]
    DegenerateColumn { column: usize },

    /// Requested cluster count is zero or exceeds the number of records.
    #[error("invalid cluster count k = {k} for {records} records")]
    InvalidK { k: usize, records: usize },

    /// A centroid lost all of its members and the run is configured to fail.
    #[error("cluster {cluster} has no members at iteration {iteration}")]
    EmptyCluster { cluster: usize, iteration: usize },

    /// Invalid configuration value.
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_are_descriptive() {
        let err = KClusterError::DegenerateColumn { column: 2 };
        assert_eq!(
            err.to_string(),
            "degenerate column 2: all values are identical, normalization is undefined"
        );

        let err = KClusterError::InvalidK { k: 7, records: 6 };
        assert_eq!(err.to_string(), "invalid cluster count k = 7 for 6 records");

        let err = KClusterError::EmptyCluster {
            cluster: 1,
            iteration: 3,
        };
        assert_eq!(err.to_string(), "cluster 1 has no members at iteration 3");

        let err = KClusterError::MalformedInput("line 4: expected 3 fields, got 2".to_string());
        assert_eq!(
            err.to_string(),
            "malformed input: line 4: expected 3 fields, got 2"
        );
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.csv");
        let err: KClusterError = io.into();
        assert!(matches!(err, KClusterError::Io(_)));
    }
}
