use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::Utc;
use reqtrace_core::config::EngineSettings;
use reqtrace_core::types::{
    MatrixMetadata, Requirement, RequirementEntry, TestCase, TestCaseEntry, TraceabilityMatrix,
};
use reqtrace_core::util::excerpt;

#[derive(Debug, Clone)]
pub struct MatrixConfig {
    /// Shared lowercase words needed for an implicit link.
    pub min_overlap: usize,
    pub excerpt_chars: usize,
    pub uncovered_limit: usize,
}

impl Default for MatrixConfig {
    fn default() -> Self { Self::from(&EngineSettings::default()) }
}

impl From<&EngineSettings> for MatrixConfig {
    fn from(s: &EngineSettings) -> Self {
        Self {
            min_overlap: s.coverage_min_overlap,
            excerpt_chars: s.excerpt_chars,
            uncovered_limit: s.uncovered_report_limit,
        }
    }
}

fn lowercase_words(text: &str) -> HashSet<String> {
    text.to_lowercase().split_whitespace().map(String::from).collect()
}

/// Build the matrix from scratch.
pub fn generate(requirements: &[Requirement], test_cases: &[TestCase], config: &MatrixConfig) -> TraceabilityMatrix {
    let mut entries: Vec<RequirementEntry> = requirements
        .iter()
        .map(|r| RequirementEntry {
            id: r.id.clone(),
            req_type: r.req_type,
            priority: r.priority,
            category: r.category,
            content_excerpt: excerpt(&r.content, config.excerpt_chars),
            covered: false,
            test_case_count: 0,
        })
        .collect();
    let position: HashMap<&str, usize> = requirements.iter().enumerate().map(|(i, r)| (r.id.as_str(), i)).collect();
    let requirement_words: Vec<HashSet<String>> = requirements.iter().map(|r| lowercase_words(&r.content)).collect();

    let mut mappings: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut tc_entries = Vec::with_capacity(test_cases.len());

    for tc in test_cases {
        let mut linked: Vec<usize> = Vec::new();
        if let Some(explicit) = tc.requirement_id.as_deref() {
            match position.get(explicit) {
                Some(&i) => linked.push(i),
                None => tracing::warn!(test_case = %tc.id, requirement = explicit, "explicit link to unknown requirement dropped"),
            }
        }

        let tc_words = lowercase_words(&tc.composite_text());
        for (i, words) in requirement_words.iter().enumerate() {
            if !linked.contains(&i) && words.intersection(&tc_words).count() >= config.min_overlap {
                linked.push(i);
            }
        }

        for &i in &linked {
            let entry = &mut entries[i];
            entry.covered = true;
            entry.test_case_count += 1;
            mappings.entry(entry.id.clone()).or_default().push(tc.id.clone());
        }

        tc_entries.push(TestCaseEntry {
            id: tc.id.clone(),
            title: tc.title.clone(),
            case_type: tc.case_type.clone(),
            priority: tc.priority.clone(),
            status: tc.status.clone(),
            requirement_mappings: linked.iter().map(|&i| entries[i].id.clone()).collect(),
        });
    }

    tracing::debug!(requirements = entries.len(), test_cases = tc_entries.len(), links = mappings.values().map(Vec::len).sum::<usize>(), "generated traceability matrix");

    TraceabilityMatrix {
        metadata: MatrixMetadata {
            generated_at: Utc::now(),
            total_requirements: entries.len(),
            total_test_cases: tc_entries.len(),
        },
        requirements: entries,
        test_cases: tc_entries,
        mappings,
    }
}
