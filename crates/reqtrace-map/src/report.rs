use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use reqtrace_core::types::{Category, CoverageBucket, MappingResult, Requirement, UncoveredRequirement};
use reqtrace_core::util::{excerpt, percentage};

const UNCOVERED_EXCERPT_CHARS: usize = 100;

/// Requirement coverage as seen through scored mapping results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageReport {
    pub total_requirements: usize,
    pub covered_requirements: usize,
    pub uncovered_requirements: usize,
    pub coverage_percentage: f64,
    pub uncovered_list: Vec<UncoveredRequirement>,
    pub coverage_by_category: BTreeMap<Category, CoverageBucket>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MappingSummary {
    pub total_test_cases: usize,
    pub mapped_test_cases: usize,
    pub total_requirements: usize,
    pub covered_requirements: usize,
}

impl MappingSummary {
    pub fn new(requirements: &[Requirement], results: &[MappingResult]) -> Self {
        let covered = covered_ids(results);
        Self {
            total_test_cases: results.len(),
            mapped_test_cases: results.iter().filter(|r| !r.matches.is_empty()).count(),
            total_requirements: requirements.len(),
            covered_requirements: requirements.iter().filter(|r| covered.contains(r.id.as_str())).count(),
        }
    }
}

fn covered_ids(results: &[MappingResult]) -> HashSet<&str> {
    results
        .iter()
        .flat_map(|r| r.matches.iter().map(|m| m.requirement_id.as_str()))
        .collect()
}

/// Coverage of `requirements` by `results`, listing at most `uncovered_limit`
/// uncovered requirements in input order.
pub fn coverage_report(requirements: &[Requirement], results: &[MappingResult], uncovered_limit: usize) -> CoverageReport {
    let covered = covered_ids(results);
    let mut by_category: BTreeMap<Category, CoverageBucket> = BTreeMap::new();
    let mut uncovered = Vec::new();

    for req in requirements {
        let is_covered = covered.contains(req.id.as_str());
        let bucket = by_category.entry(req.category).or_default();
        bucket.total += 1;
        if is_covered {
            bucket.covered += 1;
        } else {
            uncovered.push(req);
        }
    }
    for bucket in by_category.values_mut() {
        bucket.percentage = percentage(bucket.covered, bucket.total);
    }

    let covered_count = requirements.len() - uncovered.len();
    CoverageReport {
        total_requirements: requirements.len(),
        covered_requirements: covered_count,
        uncovered_requirements: uncovered.len(),
        coverage_percentage: percentage(covered_count, requirements.len()),
        uncovered_list: uncovered
            .iter()
            .take(uncovered_limit)
            .map(|r| UncoveredRequirement { id: r.id.clone(), content_excerpt: excerpt(&r.content, UNCOVERED_EXCERPT_CHARS) })
            .collect(),
        coverage_by_category: by_category,
        generated_at: Utc::now(),
    }
}
