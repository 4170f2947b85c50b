pub mod config;
pub mod kmeans;
pub mod params;
pub mod result;
pub mod utils;

pub use config::Config;
pub use kmeans::{sse_by_k, AssignmentStats, ClusterState, KMeansClustering};
pub use params::{ClusteringParams, ConvergencePolicy, EmptyClusterPolicy, InitializationMethod};
pub use result::{ClusteringResult, NonConvergenceWarning, Termination};
