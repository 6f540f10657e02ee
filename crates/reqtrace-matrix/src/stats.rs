use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use reqtrace_core::types::{CoverageBucket, Priority, RequirementType, TraceabilityMatrix, UncoveredRequirement};
use reqtrace_core::util::{excerpt, percentage};

const UNCOVERED_EXCERPT_CHARS: usize = 100;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverallCoverage {
    pub total_requirements: usize,
    pub covered_requirements: usize,
    pub uncovered_requirements: usize,
    pub coverage_percentage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoverageStats {
    pub overall: OverallCoverage,
    pub coverage_by_type: BTreeMap<RequirementType, CoverageBucket>,
    pub coverage_by_priority: BTreeMap<Priority, CoverageBucket>,
    /// Test cases per free-text type.
    pub test_case_distribution: BTreeMap<String, usize>,
    pub uncovered_requirements: Vec<UncoveredRequirement>,
}

fn tally<K: Ord>(buckets: &mut BTreeMap<K, CoverageBucket>, key: K, covered: bool) {
    let bucket = buckets.entry(key).or_default();
    bucket.total += 1;
    if covered {
        bucket.covered += 1;
    }
}

fn finish<K>(buckets: &mut BTreeMap<K, CoverageBucket>) {
    for bucket in buckets.values_mut() {
        bucket.percentage = percentage(bucket.covered, bucket.total);
    }
}

/// Derived coverage figures; lists at most `uncovered_limit` uncovered
/// requirements in matrix order.
pub fn coverage_stats(matrix: &TraceabilityMatrix, uncovered_limit: usize) -> CoverageStats {
    let mut stats = CoverageStats::default();
    for entry in &matrix.requirements {
        tally(&mut stats.coverage_by_type, entry.req_type, entry.covered);
        tally(&mut stats.coverage_by_priority, entry.priority, entry.covered);
    }
    finish(&mut stats.coverage_by_type);
    finish(&mut stats.coverage_by_priority);

    for tc in &matrix.test_cases {
        *stats.test_case_distribution.entry(tc.case_type.clone()).or_insert(0) += 1;
    }

    let total = matrix.requirements.len();
    let covered = matrix.requirements.iter().filter(|r| r.covered).count();
    stats.overall = OverallCoverage {
        total_requirements: total,
        covered_requirements: covered,
        uncovered_requirements: total - covered,
        coverage_percentage: percentage(covered, total),
    };
    stats.uncovered_requirements = matrix
        .requirements
        .iter()
        .filter(|r| !r.covered)
        .take(uncovered_limit)
        .map(|r| UncoveredRequirement { id: r.id.clone(), content_excerpt: excerpt(&r.content_excerpt, UNCOVERED_EXCERPT_CHARS) })
        .collect();
    stats
}
