use std::collections::HashSet;

use reqtrace_core::config::EngineSettings;
use reqtrace_core::types::{Category, Priority, Requirement, RequirementType, ValidationStatus};

use crate::classify::{categorize, determine_priority};
use crate::context::{requirement_context, split_sentences};
use crate::patterns::find_matches;

/// Chars of normalized content that make up a dedup fingerprint.
pub const FINGERPRINT_CHARS: usize = 100;

#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    pub min_chunk_chars: usize,
    pub generic_sentence_min_chars: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self { min_chunk_chars: 50, generic_sentence_min_chars: 60 }
    }
}

impl From<&EngineSettings> for ExtractorConfig {
    fn from(settings: &EngineSettings) -> Self {
        Self {
            min_chunk_chars: settings.min_chunk_chars,
            generic_sentence_min_chars: settings.generic_sentence_min_chars,
        }
    }
}

/// Stable dedup key: blake3 of the lowercased, whitespace-collapsed content
/// prefix. Identical across processes and runs.
pub fn fingerprint(content: &str) -> String {
    let normalized = content.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase();
    let prefix: String = normalized.chars().take(FINGERPRINT_CHARS).collect();
    blake3::hash(prefix.as_bytes()).to_hex().to_string()
}

/// State of one `extract` call: fingerprints and ids emitted so far.
#[derive(Default)]
struct ExtractionRun {
    fingerprints: HashSet<String>,
    ids: HashSet<String>,
}

impl ExtractionRun {
    fn is_new_content(&mut self, content: &str) -> bool {
        self.fingerprints.insert(fingerprint(content))
    }

    /// `base`, or `base_2`, `base_3`, ... if already taken in this run.
    fn claim_id(&mut self, base: String) -> String {
        if self.ids.insert(base.clone()) {
            return base;
        }
        let mut n = 2;
        loop {
            let candidate = format!("{base}_{n}");
            if self.ids.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RequirementExtractor {
    config: ExtractorConfig,
}

impl RequirementExtractor {
    pub fn new(config: ExtractorConfig) -> Self { Self { config } }

    /// Extract requirements from an ordered chunk sequence.
    ///
    /// Output is sorted by id; the same input always yields the same output.
    pub fn extract(&self, chunks: &[String]) -> Vec<Requirement> {
        let mut run = ExtractionRun::default();
        let mut requirements = Vec::new();

        for (chunk_index, chunk) in chunks.iter().enumerate() {
            if chunk.trim().chars().count() < self.config.min_chunk_chars {
                continue;
            }
            let before = requirements.len();
            if !self.extract_marked(chunk, chunk_index, &mut run, &mut requirements) {
                self.extract_sentences(chunk, chunk_index, &mut run, &mut requirements);
            }
            tracing::debug!(chunk_index, found = requirements.len() - before, "extracted from chunk");
        }

        requirements.sort_by(|a, b| a.id.cmp(&b.id));
        tracing::info!(chunks = chunks.len(), requirements = requirements.len(), "requirement extraction finished");
        requirements
    }

    /// Emit one candidate per marker match. Returns `false` when no pattern
    /// matched at all, which triggers the sentence fallback.
    fn extract_marked(
        &self,
        chunk: &str,
        chunk_index: usize,
        run: &mut ExtractionRun,
        out: &mut Vec<Requirement>,
    ) -> bool {
        let matches = find_matches(chunk);
        if matches.is_empty() {
            return false;
        }
        let mut local_counter = 0usize;
        for m in matches {
            let content = requirement_context(chunk, m.start, m.end).trim().to_string();
            if content.is_empty() || !run.is_new_content(&content) {
                continue;
            }
            let base_id = match &m.number {
                Some(number) => format!("{}_{}", m.req_type.id_prefix(), number),
                None => format!("{}_{}_{}", m.req_type.id_prefix(), chunk_index, local_counter),
            };
            local_counter += 1;
            out.push(Requirement {
                id: run.claim_id(base_id),
                req_type: m.req_type,
                priority: determine_priority(&content),
                category: categorize(&content),
                content,
                source_chunk_index: chunk_index,
                validation_status: ValidationStatus::Pending,
            });
        }
        true
    }

    fn extract_sentences(&self, chunk: &str, chunk_index: usize, run: &mut ExtractionRun, out: &mut Vec<Requirement>) {
        for (i, sentence) in split_sentences(chunk).into_iter().enumerate() {
            if sentence.chars().count() <= self.config.generic_sentence_min_chars || !run.is_new_content(sentence) {
                continue;
            }
            out.push(Requirement {
                id: run.claim_id(format!("REQ_{chunk_index}_{i}")),
                req_type: RequirementType::General,
                content: sentence.to_string(),
                source_chunk_index: chunk_index,
                priority: Priority::Medium,
                category: Category::General,
                validation_status: ValidationStatus::Pending,
            });
        }
    }
}
