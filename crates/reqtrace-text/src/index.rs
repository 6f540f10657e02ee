use std::cmp::Ordering;
use std::collections::HashSet;

use reqtrace_core::error::{Error, Result};
use reqtrace_core::traits::ChunkRetriever;
use reqtrace_core::types::ScoredChunk;

use crate::similarity::SimilarityScorer;
use crate::tokenizer::word_set;

/// Ordered chunk sequence with token-set similarity retrieval.
///
/// Chunk order is the tie-break key: among equally similar chunks the one
/// indexed first ranks first.
#[derive(Debug, Default, Clone)]
pub struct LexicalIndex {
	chunks: Vec<String>,
	words: Vec<HashSet<String>>,
}

impl LexicalIndex {
	pub fn new() -> Self { Self::default() }

	/// Replace the indexed chunks. An empty sequence is rejected and leaves
	/// the previous contents in place.
	pub fn build(&mut self, chunks: Vec<String>) -> Result<()> {
		if chunks.is_empty() {
			return Err(Error::EmptyIndex("no text chunks provided".into()));
		}
		self.words = chunks.iter().map(|c| word_set(c)).collect();
		self.chunks = chunks;
		tracing::info!(chunks = self.chunks.len(), "built lexical index");
		Ok(())
	}

	pub fn len(&self) -> usize { self.chunks.len() }

	pub fn is_empty(&self) -> bool { self.chunks.is_empty() }

	pub fn chunks(&self) -> &[String] { &self.chunks }

	/// Top `k` chunk texts by similarity to `query`.
	///
	/// When nothing overlaps the query at all, the first `k` chunks are
	/// returned in their original order instead of an empty result.
	pub fn search(&self, query: &str, k: usize) -> Result<Vec<String>> {
		if self.chunks.is_empty() {
			return Err(Error::EmptyIndex("index not built yet; ingest a document first".into()));
		}
		let scored = self.score_all(query, self.chunks.len());
		if scored.iter().all(|s| s.similarity == 0.0) {
			tracing::debug!(query, "no lexical overlap, returning leading chunks");
			return Ok(self.chunks.iter().take(k).cloned().collect());
		}
		Ok(scored.into_iter().take(k).map(|s| s.chunk).collect())
	}

	/// Up to `k` scored chunks, most similar first. Empty when nothing is indexed.
	pub fn score_all(&self, query: &str, k: usize) -> Vec<ScoredChunk> {
		if self.chunks.is_empty() { return Vec::new(); }
		let query_words = word_set(query);
		let mut scored: Vec<ScoredChunk> = self
			.chunks
			.iter()
			.zip(&self.words)
			.enumerate()
			.map(|(index, (chunk, words))| ScoredChunk {
				chunk: chunk.clone(),
				similarity: SimilarityScorer::jaccard(&query_words, words),
				index,
			})
			.collect();
		// stable: equal scores keep chunk order
		scored.sort_by(|a, b| b.similarity.partial_cmp(&a.similarity).unwrap_or(Ordering::Equal));
		scored.truncate(k);
		scored
	}
}

impl ChunkRetriever for LexicalIndex {
	fn chunk_count(&self) -> usize { self.chunks.len() }

	fn search(&self, query: &str, k: usize) -> Result<Vec<String>> { Self::search(self, query, k) }

	fn score_chunks(&self, query: &str, k: usize) -> Result<Vec<ScoredChunk>> {
		if self.chunks.is_empty() {
			return Err(Error::EmptyIndex("index not built yet; ingest a document first".into()));
		}
		Ok(self.score_all(query, k))
	}
}
