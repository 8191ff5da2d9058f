//! # System Module
//!
//! Read-only reporting over a loaded metamodel.

mod metrics;

pub use metrics::ModelMetrics;
