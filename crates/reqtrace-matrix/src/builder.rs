use reqtrace_core::types::{Requirement, TestCase, TraceabilityMatrix};

use crate::matrix::{generate, MatrixConfig};
use crate::stats::{coverage_stats, CoverageStats};

/// blake3 digest of every field of a `(requirements, test_cases)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputDigest([u8; 32]);

impl InputDigest {
    pub fn of(requirements: &[Requirement], test_cases: &[TestCase]) -> Self {
        let mut hasher = Digester(blake3::Hasher::new());
        hasher.num(requirements.len());
        for r in requirements {
            hasher.text(&r.id);
            hasher.text(r.req_type.as_str());
            hasher.text(&r.content);
            hasher.num(r.source_chunk_index);
            hasher.text(r.priority.as_str());
            hasher.text(r.category.as_str());
            hasher.text(r.validation_status.as_str());
        }
        hasher.num(test_cases.len());
        for tc in test_cases {
            hasher.text(&tc.id);
            hasher.text(&tc.title);
            hasher.text(&tc.description);
            hasher.num(tc.steps.len());
            for step in &tc.steps {
                hasher.text(step);
            }
            hasher.text(&tc.expected);
            hasher.text(&tc.priority);
            hasher.text(&tc.case_type);
            hasher.opt(tc.requirement_id.as_deref());
            hasher.text(&tc.status);
            hasher.opt(tc.query.as_deref());
            hasher.opt(tc.chunk_source.as_deref());
        }
        Self(*hasher.0.finalize().as_bytes())
    }
}

/// Length-prefixed field writer so adjacent fields cannot run together.
struct Digester(blake3::Hasher);

impl Digester {
    fn num(&mut self, n: usize) {
        self.0.update(&(n as u64).to_le_bytes());
    }

    fn text(&mut self, s: &str) {
        self.num(s.len());
        self.0.update(s.as_bytes());
    }

    fn opt(&mut self, s: Option<&str>) {
        match s {
            Some(s) => {
                self.0.update(&[1]);
                self.text(s);
            }
            None => {
                self.0.update(&[0]);
            }
        }
    }
}

/// Matrix generator that remembers the last matrix it built, keyed on the
/// exact inputs.
#[derive(Debug, Default)]
pub struct MatrixBuilder {
    config: MatrixConfig,
    last: Option<(InputDigest, TraceabilityMatrix)>,
}

impl MatrixBuilder {
    pub fn new(config: MatrixConfig) -> Self { Self { config, last: None } }

    /// Always rebuilds and replaces the remembered matrix.
    pub fn generate(&mut self, requirements: &[Requirement], test_cases: &[TestCase]) -> &TraceabilityMatrix {
        let digest = InputDigest::of(requirements, test_cases);
        let matrix = generate(requirements, test_cases, &self.config);
        &self.last.insert((digest, matrix)).1
    }

    /// Statistics for these inputs, reusing the remembered matrix only when
    /// the inputs are identical to the ones it was built from.
    pub fn stats_for(&mut self, requirements: &[Requirement], test_cases: &[TestCase]) -> CoverageStats {
        let limit = self.config.uncovered_limit;
        if let Some((digest, matrix)) = &self.last {
            if *digest == InputDigest::of(requirements, test_cases) {
                tracing::debug!("reusing cached traceability matrix");
                return coverage_stats(matrix, limit);
            }
        }
        let matrix = self.generate(requirements, test_cases);
        coverage_stats(matrix, limit)
    }

    pub fn is_cached(&self, requirements: &[Requirement], test_cases: &[TestCase]) -> bool {
        matches!(&self.last, Some((digest, _)) if *digest == InputDigest::of(requirements, test_cases))
    }

    pub fn last_matrix(&self) -> Option<&TraceabilityMatrix> {
        self.last.as_ref().map(|(_, m)| m)
    }

    pub fn invalidate(&mut self) {
        self.last = None;
    }
}
