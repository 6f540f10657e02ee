use crate::error::Result;
use crate::types::ScoredChunk;

/// Retrieval over an ordered chunk sequence.
///
/// Both methods fail with [`crate::error::Error::EmptyIndex`] when nothing
/// has been indexed yet; the mapper treats that as a retrieval failure and
/// falls back to direct keyword matching.
pub trait ChunkRetriever {
    /// Number of indexed chunks; `0` before the first build.
    fn chunk_count(&self) -> usize;
    fn search(&self, query: &str, k: usize) -> Result<Vec<String>>;
    fn score_chunks(&self, query: &str, k: usize) -> Result<Vec<ScoredChunk>>;
}
