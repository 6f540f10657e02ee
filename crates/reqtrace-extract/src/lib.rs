//! reqtrace-extract
//!
//! Turns normalized text chunks into typed, deduplicated requirement records.
//! Explicit markers ("FR-12", "the system shall", "as a ... I want ... so
//! that") are tried first; chunks without any marker fall back to one
//! general requirement per long sentence.

pub mod classify;
pub mod context;
pub mod extractor;
pub mod patterns;

pub use extractor::{fingerprint, ExtractorConfig, RequirementExtractor};
