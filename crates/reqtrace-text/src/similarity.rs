use std::collections::HashSet;
use std::hash::Hash;

use crate::tokenizer::word_set;

/// Jaccard overlap between token sets, shared by the index and the mapper.
pub struct SimilarityScorer;

impl SimilarityScorer {
	/// `|a ∩ b| / |a ∪ b|`; two empty sets carry no signal and score `0.0`.
	pub fn jaccard<T: Eq + Hash>(a: &HashSet<T>, b: &HashSet<T>) -> f64 {
		let intersection = a.intersection(b).count();
		let union = a.len() + b.len() - intersection;
		if union == 0 { return 0.0; }
		intersection as f64 / union as f64
	}

	pub fn text_similarity(a: &str, b: &str) -> f64 {
		Self::jaccard(&word_set(a), &word_set(b))
	}
}
