//! reqtrace-engine
//!
//! Session object tying chunking, extraction, retrieval, mapping and the
//! traceability matrix together over one in-memory working set.

pub mod engine;
pub mod generator;
pub mod validation;

pub use engine::{Engine, IngestSummary, MappingOutcome, TraceabilityOutcome, UploadSummary, ValidationOutcome};
