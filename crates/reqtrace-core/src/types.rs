//! Domain types shared by the extractor, mapper and matrix builder.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub type RequirementId = String;
pub type TestCaseId = String;

/// Kind of requirement recognised by the extractor.
///
/// `General` is only produced by the sentence fallback when no explicit
/// requirement marker was found in a chunk.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum RequirementType {
    Functional,
    NonFunctional,
    UserStory,
    General,
}

impl RequirementType {
    /// Types tried by the extractor, in order.
    pub const PATTERN_ORDER: [RequirementType; 3] = [
        RequirementType::Functional,
        RequirementType::NonFunctional,
        RequirementType::UserStory,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RequirementType::Functional => "functional",
            RequirementType::NonFunctional => "non_functional",
            RequirementType::UserStory => "user_story",
            RequirementType::General => "general",
        }
    }

    /// Prefix used for generated requirement ids (`FUNCTIONAL_12`).
    pub fn id_prefix(&self) -> String {
        self.as_str().to_uppercase()
    }
}

impl fmt::Display for RequirementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Authentication,
    Validation,
    Interface,
    Data,
    Security,
    Performance,
    Integration,
    General,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Authentication => "authentication",
            Category::Validation => "validation",
            Category::Interface => "interface",
            Category::Data => "data",
            Category::Security => "security",
            Category::Performance => "performance",
            Category::Integration => "integration",
            Category::General => "general",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Written only by the validation collaborator.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    #[default]
    Pending,
    Valid,
    Invalid,
}

impl ValidationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationStatus::Pending => "pending",
            ValidationStatus::Valid => "valid",
            ValidationStatus::Invalid => "invalid",
        }
    }
}

/// A typed, deduplicated unit of specification text.
///
/// - `id`: unique within one extraction call
/// - `source_chunk_index`: position of the chunk the requirement came from
/// - `content`: never changes after extraction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Requirement {
    pub id: RequirementId,
    #[serde(rename = "type")]
    pub req_type: RequirementType,
    pub content: String,
    pub source_chunk_index: usize,
    pub priority: Priority,
    pub category: Category,
    #[serde(default)]
    pub validation_status: ValidationStatus,
}

/// A well-formed test case record. Malformed input never becomes a
/// `TestCase`; see [`crate::ingest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    pub id: TestCaseId,
    pub title: String,
    pub description: String,
    pub steps: Vec<String>,
    pub expected: String,
    pub priority: String,
    #[serde(rename = "type")]
    pub case_type: String,
    pub requirement_id: Option<RequirementId>,
    pub status: String,
    /// Free-text query the test case was generated from, if any.
    pub query: Option<String>,
    pub chunk_source: Option<String>,
    pub quality_score: Option<u8>,
}

impl TestCase {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            steps: Vec::new(),
            expected: String::new(),
            priority: "Medium".to_string(),
            case_type: "Functional".to_string(),
            requirement_id: None,
            status: "Generated".to_string(),
            query: None,
            chunk_source: None,
            quality_score: None,
        }
    }

    /// Text used for matching: title, description, steps and query joined
    /// with single spaces.
    pub fn composite_text(&self) -> String {
        let steps = self.steps.join(" ");
        let parts = [
            self.title.as_str(),
            self.description.as_str(),
            steps.as_str(),
            self.query.as_deref().unwrap_or(""),
        ];
        parts.join(" ").trim().to_string()
    }
}

/// One chunk scored against a query by the lexical index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub chunk: String,
    pub similarity: f64,
    pub index: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MappingMethod {
    Retrieval,
    KeywordFallback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementMatch {
    pub requirement_id: RequirementId,
    pub similarity: f64,
    pub content_excerpt: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingResult {
    pub test_case_id: TestCaseId,
    pub test_case_title: String,
    pub matches: Vec<RequirementMatch>,
    pub confidence: f64,
    pub method: MappingMethod,
    pub timestamp: DateTime<Utc>,
}

/// `{total, covered, percentage}` for one slice of the requirement set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoverageBucket {
    pub total: usize,
    pub covered: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UncoveredRequirement {
    pub id: RequirementId,
    pub content_excerpt: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementEntry {
    pub id: RequirementId,
    #[serde(rename = "type")]
    pub req_type: RequirementType,
    pub priority: Priority,
    pub category: Category,
    pub content_excerpt: String,
    pub covered: bool,
    pub test_case_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCaseEntry {
    pub id: TestCaseId,
    pub title: String,
    #[serde(rename = "type")]
    pub case_type: String,
    pub priority: String,
    pub status: String,
    pub requirement_mappings: Vec<RequirementId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixMetadata {
    pub generated_at: DateTime<Utc>,
    pub total_requirements: usize,
    pub total_test_cases: usize,
}

/// Requirement × test-case association structure.
///
/// `mappings` is keyed by requirement id and only ever contains ids present
/// in `requirements`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceabilityMatrix {
    pub requirements: Vec<RequirementEntry>,
    pub test_cases: Vec<TestCaseEntry>,
    pub mappings: BTreeMap<RequirementId, Vec<TestCaseId>>,
    pub metadata: MatrixMetadata,
}
