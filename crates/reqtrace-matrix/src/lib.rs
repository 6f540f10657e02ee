//! reqtrace-matrix
//!
//! Requirement × test-case traceability. Links come from explicit
//! `requirement_id` fields and a coarse shared-word rule, kept apart from
//! the scored mapper so coverage stays explainable.

pub mod builder;
pub mod matrix;
pub mod stats;

pub use builder::MatrixBuilder;
pub use matrix::{generate, MatrixConfig};
pub use stats::{coverage_stats, CoverageStats, OverallCoverage};
