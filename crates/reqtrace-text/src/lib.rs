//! reqtrace-text
//!
//! Token-set retrieval over an ordered chunk sequence. Tokenization reuses a
//! tantivy analyzer; similarity is plain Jaccard overlap, no ranking model.

pub mod tokenizer;
pub mod similarity;
pub mod index;

pub use index::LexicalIndex;
pub use similarity::SimilarityScorer;
pub use tokenizer::word_set;
