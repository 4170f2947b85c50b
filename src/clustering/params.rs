use crate::core::error::{KClusterError, KClusterResult};
use std::fmt;
use std::time::Duration;

/// How the k initial centroids are chosen among the records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InitializationMethod {
    /// The first k records, in order.
    FirstK,
    /// k distinct records sampled without replacement.
    #[default]
    Random,
}

/// What to do when a centroid ends an assignment pass with no members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmptyClusterPolicy {
    /// Stop the run with [`KClusterError::EmptyCluster`].
    #[default]
    Fail,
    /// Move the centroid onto the record furthest from its own centroid.
    Reseed,
}

/// When the assign/update loop stops.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConvergencePolicy {
    /// Stop once the fraction of records that changed cluster in the last
    /// pass is below `threshold`.
    MembershipDelta { threshold: f64 },
    /// Stop once the largest relative change (in percent) of any centroid
    /// coordinate during the last update is below `tolerance`.
    CentroidShift { tolerance: f64 },
}

impl ConvergencePolicy {
    pub const DEFAULT_MEMBERSHIP_THRESHOLD: f64 = 0.01;
    pub const DEFAULT_SHIFT_TOLERANCE: f64 = 0.0001;

    pub fn membership_delta() -> Self {
        ConvergencePolicy::MembershipDelta {
            threshold: Self::DEFAULT_MEMBERSHIP_THRESHOLD,
        }
    }

    pub fn centroid_shift() -> Self {
        ConvergencePolicy::CentroidShift {
            tolerance: Self::DEFAULT_SHIFT_TOLERANCE,
        }
    }
}

impl Default for ConvergencePolicy {
    fn default() -> Self {
        Self::membership_delta()
    }
}

impl fmt::Display for ConvergencePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvergencePolicy::MembershipDelta { threshold } => {
                write!(f, "membership_delta (threshold {})", threshold)
            }
            ConvergencePolicy::CentroidShift { tolerance } => {
                write!(f, "centroid_shift (tolerance {})", tolerance)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClusteringParams {
    pub k: usize,
    pub initialization_method: InitializationMethod,
    pub rng_seed: Option<u64>,
    pub convergence: ConvergencePolicy,
    /// Hard cap on update/assign iterations.
    pub max_iterations: usize,
    pub empty_cluster_policy: EmptyClusterPolicy,
    /// Checked between iterations only.
    pub timeout: Option<Duration>,
}

impl Default for ClusteringParams {
    fn default() -> Self {
        Self {
            k: 2,
            initialization_method: InitializationMethod::default(),
            rng_seed: None,
            convergence: ConvergencePolicy::default(),
            max_iterations: 100,
            empty_cluster_policy: EmptyClusterPolicy::default(),
            timeout: None,
        }
    }
}

impl ClusteringParams {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            ..Default::default()
        }
    }

    pub fn with_initialization(mut self, method: InitializationMethod) -> Self {
        self.initialization_method = method;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    pub fn with_convergence(mut self, convergence: ConvergencePolicy) -> Self {
        self.convergence = convergence;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_empty_cluster_policy(mut self, policy: EmptyClusterPolicy) -> Self {
        self.empty_cluster_policy = policy;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Checks the values that do not depend on the dataset.
    pub fn validate(&self) -> KClusterResult<()> {
        if self.max_iterations == 0 {
            return Err(KClusterError::Config(
                "max_iterations must be greater than 0".to_string(),
            ));
        }
        let bound = match self.convergence {
            ConvergencePolicy::MembershipDelta { threshold } => threshold,
            ConvergencePolicy::CentroidShift { tolerance } => tolerance,
        };
        if !(bound.is_finite() && bound > 0.0) {
            return Err(KClusterError::Config(format!(
                "convergence threshold must be a positive number, got {}",
                bound
            )));
        }
        Ok(())
    }
}
