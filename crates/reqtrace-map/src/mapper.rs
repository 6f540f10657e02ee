use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use chrono::Utc;
use reqtrace_core::config::EngineSettings;
use reqtrace_core::error::Result;
use reqtrace_core::traits::ChunkRetriever;
use reqtrace_core::types::{MappingMethod, MappingResult, Requirement, RequirementMatch, TestCase};
use reqtrace_core::util::{excerpt, round_to};
use reqtrace_text::{word_set, SimilarityScorer};

#[derive(Debug, Clone)]
pub struct MapperConfig {
    /// Candidates must score strictly above this.
    pub threshold: f64,
    pub max_matches: usize,
    pub explicit_link_boost: f64,
    pub broad_match_penalty: f64,
    pub keep_best_weak_match: bool,
    /// Words a weak match must share with the test case to be kept.
    pub weak_match_min_shared_words: usize,
    pub excerpt_chars: usize,
}

impl Default for MapperConfig {
    fn default() -> Self { Self::from(&EngineSettings::default()) }
}

impl From<&EngineSettings> for MapperConfig {
    fn from(s: &EngineSettings) -> Self {
        Self {
            threshold: s.map_threshold,
            max_matches: s.max_matches,
            explicit_link_boost: s.explicit_link_boost,
            broad_match_penalty: s.broad_match_penalty,
            keep_best_weak_match: s.keep_best_weak_match,
            weak_match_min_shared_words: s.weak_match_min_shared_words,
            excerpt_chars: s.excerpt_chars,
        }
    }
}

struct Candidate {
    matched: RequirementMatch,
    shared_words: usize,
}

#[derive(Debug, Clone, Default)]
pub struct RequirementMapper {
    config: MapperConfig,
}

impl RequirementMapper {
    pub fn new(config: MapperConfig) -> Self { Self { config } }

    /// One result per test case with a non-empty id, in input order.
    pub fn map(
        &self,
        test_cases: &[TestCase],
        requirements: &[Requirement],
        retriever: &dyn ChunkRetriever,
    ) -> Vec<MappingResult> {
        let words = requirement_words(requirements);
        let results: Vec<MappingResult> = test_cases
            .iter()
            .filter(|tc| {
                let ok = !tc.id.trim().is_empty();
                if !ok {
                    tracing::warn!(title = %tc.title, "skipping test case without id");
                }
                ok
            })
            .map(|tc| self.map_with_words(tc, requirements, &words, retriever))
            .collect();
        tracing::info!(
            test_cases = results.len(),
            mapped = results.iter().filter(|r| !r.matches.is_empty()).count(),
            "mapped test cases to requirements"
        );
        results
    }

    pub fn map_one(&self, tc: &TestCase, requirements: &[Requirement], retriever: &dyn ChunkRetriever) -> MappingResult {
        self.map_with_words(tc, requirements, &requirement_words(requirements), retriever)
    }

    fn map_with_words(
        &self,
        tc: &TestCase,
        requirements: &[Requirement],
        requirement_words: &[HashSet<String>],
        retriever: &dyn ChunkRetriever,
    ) -> MappingResult {
        let text = tc.composite_text();
        let (matches, method) = if text.is_empty() || requirements.is_empty() {
            (Vec::new(), MappingMethod::Retrieval)
        } else {
            let test_words = word_set(&text);
            match self.retrieval_candidates(&text, &test_words, requirements, requirement_words, retriever) {
                Ok(candidates) => (self.select(candidates), MappingMethod::Retrieval),
                Err(err) => {
                    tracing::warn!(test_case = %tc.id, error = %err, "retrieval failed, using keyword matching");
                    let candidates = self.keyword_candidates(&test_words, requirements, requirement_words);
                    (self.select(candidates), MappingMethod::KeywordFallback)
                }
            }
        };
        let confidence = self.confidence(&matches, tc.requirement_id.as_deref());
        tracing::debug!(test_case = %tc.id, matches = matches.len(), confidence, ?method, "mapped test case");
        MappingResult {
            test_case_id: tc.id.clone(),
            test_case_title: tc.title.clone(),
            matches,
            confidence,
            method,
            timestamp: Utc::now(),
        }
    }

    /// Score every indexed chunk, then attach requirements whose content
    /// contains the chunk or is contained in it.
    fn retrieval_candidates(
        &self,
        text: &str,
        test_words: &HashSet<String>,
        requirements: &[Requirement],
        requirement_words: &[HashSet<String>],
        retriever: &dyn ChunkRetriever,
    ) -> Result<Vec<Candidate>> {
        let scored = retriever.score_chunks(text, retriever.chunk_count())?;
        let mut candidates = Vec::new();
        for chunk in scored.iter().filter(|s| s.similarity > 0.0) {
            for (req, words) in requirements.iter().zip(requirement_words) {
                if req.content.is_empty() {
                    continue;
                }
                if chunk.chunk.contains(&req.content) || req.content.contains(&chunk.chunk) {
                    candidates.push(self.candidate(req, chunk.similarity, test_words, words));
                }
            }
        }
        Ok(candidates)
    }

    fn keyword_candidates(
        &self,
        test_words: &HashSet<String>,
        requirements: &[Requirement],
        requirement_words: &[HashSet<String>],
    ) -> Vec<Candidate> {
        requirements
            .iter()
            .zip(requirement_words)
            .map(|(req, words)| (req, words, SimilarityScorer::jaccard(test_words, words)))
            .filter(|(_, _, similarity)| *similarity > 0.0)
            .map(|(req, words, similarity)| self.candidate(req, similarity, test_words, words))
            .collect()
    }

    fn candidate(
        &self,
        req: &Requirement,
        similarity: f64,
        test_words: &HashSet<String>,
        requirement_words: &HashSet<String>,
    ) -> Candidate {
        Candidate {
            matched: RequirementMatch {
                requirement_id: req.id.clone(),
                similarity,
                content_excerpt: excerpt(&req.content, self.config.excerpt_chars),
            },
            shared_words: test_words.intersection(requirement_words).count(),
        }
    }

    /// Threshold, dedup by id (max similarity), sort descending, truncate.
    fn select(&self, candidates: Vec<Candidate>) -> Vec<RequirementMatch> {
        let mut kept: Vec<RequirementMatch> = candidates
            .iter()
            .filter(|c| c.matched.similarity > self.config.threshold)
            .map(|c| c.matched.clone())
            .collect();
        if kept.is_empty() && self.config.keep_best_weak_match {
            // first of the best on ties
            let best = candidates
                .into_iter()
                .filter(|c| c.shared_words >= self.config.weak_match_min_shared_words)
                .map(|c| c.matched)
                .reduce(|best, c| if c.similarity > best.similarity { c } else { best });
            kept.extend(best);
        }

        let mut position: HashMap<String, usize> = HashMap::new();
        let mut unique: Vec<RequirementMatch> = Vec::new();
        for c in kept {
            match position.get(&c.requirement_id) {
                Some(&i) => {
                    if c.similarity > unique[i].similarity {
                        unique[i] = c;
                    }
                }
                None => {
                    position.insert(c.requirement_id.clone(), unique.len());
                    unique.push(c);
                }
            }
        }
        unique.sort_by(|a, b| b.similarity.partial_cmp(&a.similarity).unwrap_or(Ordering::Equal));
        unique.truncate(self.config.max_matches);
        unique
    }

    /// Max similarity, boosted when the explicit link survived, damped when
    /// the match is broad, rounded to 3 decimals.
    pub fn confidence(&self, matches: &[RequirementMatch], explicit_requirement: Option<&str>) -> f64 {
        let Some(mut score) = matches.iter().map(|m| m.similarity).reduce(f64::max) else {
            return 0.0;
        };
        if let Some(explicit) = explicit_requirement {
            if matches.iter().any(|m| m.requirement_id == explicit) {
                score = (score + self.config.explicit_link_boost).min(1.0);
            }
        }
        if matches.len() > 2 {
            score *= self.config.broad_match_penalty;
        }
        round_to(score.clamp(0.0, 1.0), 3)
    }
}

fn requirement_words(requirements: &[Requirement]) -> Vec<HashSet<String>> {
    requirements.iter().map(|r| word_set(&r.content)).collect()
}
