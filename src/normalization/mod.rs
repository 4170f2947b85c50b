//! Per-column rescaling with the Modified Standard Score.
//!
//! Every feature column is centered on its median and divided by its mean
//! absolute deviation from that median, so that features with very different
//! magnitudes contribute comparably to Euclidean distances.

pub mod column;
pub mod normalizer;

pub use column::{mean_absolute_deviation, median, normalize_column, ColumnStats};
pub use normalizer::Normalizer;
