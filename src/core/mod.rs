pub mod error;
pub mod float;

pub use error::{KClusterError, KClusterResult};
pub use float::KFloat;
