use chrono::Utc;
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;

use reqtrace_core::config::{Config, EngineSettings};
use reqtrace_core::data_processor::{split_into_chunks, DataProcessor};
use reqtrace_core::error::{Error, Result};
use reqtrace_core::ingest::{merge_test_cases, parse_test_cases};
use reqtrace_core::types::{MappingResult, Requirement, TestCase, TraceabilityMatrix, ValidationStatus};
use reqtrace_extract::{ExtractorConfig, RequirementExtractor};
use reqtrace_map::{coverage_report, CoverageReport, MapperConfig, MappingSummary, RequirementMapper};
use reqtrace_matrix::{CoverageStats, MatrixBuilder, MatrixConfig};
use reqtrace_text::LexicalIndex;

use crate::generator::generate_test_cases;
use crate::validation::{summarize, validate_test_cases, ValidationReport, ValidationSummary};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestSummary {
    pub chunks: usize,
    pub requirements: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadSummary {
    pub added: usize,
    pub rejected: usize,
    pub total_test_cases: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct MappingOutcome {
    pub results: Vec<MappingResult>,
    pub summary: MappingSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct TraceabilityOutcome {
    pub matrix: TraceabilityMatrix,
    pub coverage_stats: CoverageStats,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationOutcome {
    pub results: Vec<ValidationReport>,
    pub summary: ValidationSummary,
}

/// One working session: the current document's chunks and requirements,
/// plus every test case generated or uploaded since.
///
/// All mutation goes through `&mut self`; share across threads behind a
/// `Mutex`.
pub struct Engine {
    settings: EngineSettings,
    extractor: RequirementExtractor,
    mapper: RequirementMapper,
    matrix: MatrixBuilder,
    index: LexicalIndex,
    requirements: Vec<Requirement>,
    test_cases: Vec<TestCase>,
    generated: usize,
}

impl Engine {
    pub fn new(settings: EngineSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            extractor: RequirementExtractor::new(ExtractorConfig::from(&settings)),
            mapper: RequirementMapper::new(MapperConfig::from(&settings)),
            matrix: MatrixBuilder::new(MatrixConfig::from(&settings)),
            settings,
            index: LexicalIndex::new(),
            requirements: Vec::new(),
            test_cases: Vec::new(),
            generated: 0,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.engine()?)
    }

    pub fn settings(&self) -> &EngineSettings { &self.settings }

    pub fn chunks(&self) -> &[String] { self.index.chunks() }

    pub fn requirements(&self) -> &[Requirement] { &self.requirements }

    pub fn test_cases(&self) -> &[TestCase] { &self.test_cases }

    /// Replace the current document with `chunks`: rebuild the index and
    /// re-extract requirements. Empty input is rejected and changes nothing.
    pub fn ingest_chunks(&mut self, chunks: Vec<String>) -> Result<IngestSummary> {
        self.index.build(chunks)?;
        self.requirements = self.extractor.extract(self.index.chunks());
        self.matrix.invalidate();
        let summary = IngestSummary { chunks: self.index.len(), requirements: self.requirements.len() };
        tracing::info!(chunks = summary.chunks, requirements = summary.requirements, "document ingested");
        Ok(summary)
    }

    pub fn ingest_text(&mut self, text: &str) -> Result<IngestSummary> {
        self.ingest_chunks(split_into_chunks(text, self.settings.chunk_size))
    }

    /// Chunk every `.txt` file under `dir` (sorted by path) as one document.
    pub fn ingest_directory(&mut self, dir: &Path) -> Result<IngestSummary> {
        let processor = DataProcessor::with_chunk_size(self.settings.chunk_size);
        let chunks = processor.process_directory(dir)?.into_iter().map(|c| c.content).collect();
        self.ingest_chunks(chunks)
    }

    /// Retrieve the chunks closest to `query` and turn each into a test case.
    pub fn query(&mut self, query: &str) -> Result<Vec<TestCase>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(Error::EmptyQuery);
        }
        let chunks = self.index.search(query, self.settings.query_top_k)?;
        let cases = generate_test_cases(query, &chunks, self.generated + 1, Utc::now());
        self.generated += cases.len();
        self.test_cases.extend(cases.iter().cloned());
        tracing::info!(query, generated = cases.len(), total = self.test_cases.len(), "generated test cases");
        Ok(cases)
    }

    /// Merge a JSON array of test cases; records whose id is already known
    /// are ignored, malformed entries are counted and dropped.
    pub fn upload_test_cases(&mut self, json: &str) -> Result<UploadSummary> {
        let report = parse_test_cases(json)?;
        let added = self.add_test_cases(report.accepted);
        Ok(UploadSummary { added, rejected: report.rejected.len(), total_test_cases: self.test_cases.len() })
    }

    pub fn add_test_cases(&mut self, test_cases: Vec<TestCase>) -> usize {
        let added = merge_test_cases(&mut self.test_cases, test_cases);
        tracing::debug!(added, total = self.test_cases.len(), "merged test cases");
        added
    }

    pub fn map(&self) -> MappingOutcome {
        let results = self.mapper.map(&self.test_cases, &self.requirements, &self.index);
        let summary = MappingSummary::new(&self.requirements, &results);
        MappingOutcome { results, summary }
    }

    pub fn coverage_report(&self) -> CoverageReport {
        let results = self.mapper.map(&self.test_cases, &self.requirements, &self.index);
        coverage_report(&self.requirements, &results, self.settings.uncovered_report_limit)
    }

    /// Rebuild the traceability matrix and its statistics.
    pub fn traceability(&mut self) -> TraceabilityOutcome {
        let matrix = self.matrix.generate(&self.requirements, &self.test_cases).clone();
        let coverage_stats = self.matrix.stats_for(&self.requirements, &self.test_cases);
        TraceabilityOutcome { matrix, coverage_stats }
    }

    /// Coverage statistics, reusing the last matrix if nothing changed since.
    pub fn stats(&mut self) -> CoverageStats {
        self.matrix.stats_for(&self.requirements, &self.test_cases)
    }

    /// Run the quality rules over every test case, store each score on its
    /// test case and mark requirements referenced by a valid one as valid.
    pub fn validate(&mut self) -> ValidationOutcome {
        let results = validate_test_cases(&self.test_cases, &self.requirements);
        let mut confirmed: HashSet<String> = HashSet::new();
        for (tc, report) in self.test_cases.iter_mut().zip(&results) {
            tc.quality_score = Some(report.score);
            if report.is_valid {
                confirmed.extend(tc.requirement_id.clone());
            }
        }
        for req in &mut self.requirements {
            if confirmed.contains(req.id.as_str()) {
                req.validation_status = ValidationStatus::Valid;
            }
        }
        let summary = summarize(&results);
        tracing::info!(total = summary.total_test_cases, valid = summary.valid_test_cases, "validated test cases");
        ValidationOutcome { results, summary }
    }
}
