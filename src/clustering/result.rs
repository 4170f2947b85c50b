use crate::core::float::KFloat;
use crate::dataset::Dataset;
use ndarray::Array2;
use std::fmt;

/// Why a clustering run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The configured convergence criterion was met.
    Converged,
    /// `max_iterations` was reached first.
    MaxIterations,
    /// The run-level timeout expired between two iterations.
    TimedOut,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::Converged => write!(f, "converged"),
            Termination::MaxIterations => write!(f, "iteration limit reached"),
            Termination::TimedOut => write!(f, "timed out"),
        }
    }
}

/// Returned alongside a result that stopped before converging. The result is
/// still the last fully completed state, but it may be unstable.
#[derive(Debug, Clone, PartialEq)]
pub struct NonConvergenceWarning {
    pub termination: Termination,
    pub iterations: usize,
    pub points_changed: usize,
    pub records: usize,
}

impl fmt::Display for NonConvergenceWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "clustering stopped without converging ({}) after {} iterations; \
             {} of {} points changed cluster in the last pass",
            self.termination, self.iterations, self.points_changed, self.records
        )
    }
}

/// Final state of a clustering run.
#[derive(Debug, Clone)]
pub struct ClusteringResult<F> {
    /// Cluster index in `[0, k)` for each record, in record order.
    pub membership: Vec<usize>,
    /// One row per cluster, in normalized feature space.
    pub centroids: Array2<F>,
    /// Sum of squared distances from each record to its centroid.
    pub sse: F,
    /// Number of update/assign iterations performed.
    pub iterations: usize,
    pub termination: Termination,
    pub warning: Option<NonConvergenceWarning>,
}

impl<F: KFloat> ClusteringResult<F> {
    pub fn k(&self) -> usize {
        self.centroids.nrows()
    }

    pub fn converged(&self) -> bool {
        self.termination == Termination::Converged
    }

    /// Indices of the records assigned to `cluster`, ascending.
    pub fn cluster_members(&self, cluster: usize) -> Vec<usize> {
        self.membership
            .iter()
            .enumerate()
            .filter(|(_, &c)| c == cluster)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.k()];
        for &c in &self.membership {
            sizes[c] += 1;
        }
        sizes
    }

    /// For each cluster, the labels of its members in record order. Records
    /// without a label are listed by index.
    pub fn groups(&self, dataset: &Dataset<F>) -> Vec<Vec<String>> {
        (0..self.k())
            .map(|c| {
                self.cluster_members(c)
                    .into_iter()
                    .map(|idx| dataset.display_label(idx))
                    .collect()
            })
            .collect()
    }

    /// Centroids mapped back into the dataset's raw feature space.
    pub fn raw_centroids(&self, dataset: &Dataset<F>) -> Array2<F> {
        dataset.normalizer().inverse_transform(&self.centroids.view())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn sample_result() -> ClusteringResult<f64> {
        ClusteringResult {
            membership: vec![1, 0, 1, 1],
            centroids: array![[0.0, 0.0], [1.0, 1.0]],
            sse: 0.5,
            iterations: 3,
            termination: Termination::Converged,
            warning: None,
        }
    }

    #[test]
    fn members_and_sizes() {
        let result = sample_result();
        assert_eq!(result.k(), 2);
        assert_eq!(result.cluster_members(1), vec![0, 2, 3]);
        assert_eq!(result.cluster_sizes(), vec![1, 3]);
        assert!(result.converged());
    }

    #[test]
    fn warning_message_names_the_reason() {
        let warning = NonConvergenceWarning {
            termination: Termination::MaxIterations,
            iterations: 5,
            points_changed: 2,
            records: 40,
        };
        let msg = warning.to_string();
        assert!(msg.contains("iteration limit reached"));
        assert!(msg.contains("2 of 40 points"));
    }
}
