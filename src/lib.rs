//! kcluster: k-means clustering of low-dimensional numeric records in Rust
//!
//! Features are rescaled per column with the Modified Standard Score (median
//! and mean absolute deviation) before records are grouped by Lloyd-style
//! k-means.
//!
//! # Modules
//! - `normalization`: per-column median / mean-absolute-deviation scaling.
//! - `dataset`: records, the normalized dataset and the delimited-text loader.
//! - `clustering`: the k-means state machine, its parameters and YAML config.
//! - `distances`: distance metrics over ndarray views.
//! - `report`: human-readable cluster listings.
pub mod clustering;
pub mod core;
pub mod dataset;
pub mod distances;
pub mod normalization;
pub mod report;

pub use crate::core::{KClusterError, KClusterResult, KFloat};
