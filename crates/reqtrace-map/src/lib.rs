//! reqtrace-map
//!
//! Scored links from test cases to requirements. The primary path goes
//! through a [`reqtrace_core::traits::ChunkRetriever`]; when retrieval is not
//! possible, requirements are compared to the test case directly.

pub mod mapper;
pub mod report;

pub use mapper::{MapperConfig, RequirementMapper};
pub use report::{coverage_report, CoverageReport, MappingSummary};
