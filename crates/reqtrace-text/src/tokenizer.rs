use std::collections::HashSet;
use tantivy::tokenizer::{LowerCaser, SimpleTokenizer, TextAnalyzer, TokenStream};

/// Maximal alphanumeric runs, lowercased.
pub fn build_analyzer() -> TextAnalyzer {
	TextAnalyzer::builder(SimpleTokenizer::default())
		.filter(LowerCaser)
		.build()
}

/// Distinct lowercase words of `text`.
pub fn word_set(text: &str) -> HashSet<String> {
	let mut analyzer = build_analyzer();
	let mut stream = analyzer.token_stream(text);
	let mut words = HashSet::new();
	while stream.advance() {
		words.insert(stream.token().text.clone());
	}
	words
}
