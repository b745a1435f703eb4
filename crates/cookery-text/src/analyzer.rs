use std::collections::HashSet;

/// Common English words dropped from both documents and queries.
pub const ENGLISH_STOP_WORDS: &[&str] = &[
	"a","an","and","are","as","at","be","by","for","from","has","he","in","is","it","its","of","on","that","the","to","was","will","with","or","but","not","this","these","they","them","their","there","then","than","so","if","when","where","why","how","what","which","who","whom","whose","can","could","should","would","may","might","must","shall","do","does","did","have","had","having",
];

/// Lowercases, splits on non-alphanumeric boundaries and removes stop words.
/// Documents and queries go through the same analyzer.
#[derive(Debug, Clone)]
pub struct Analyzer {
	stop_words: HashSet<String>,
}

impl Default for Analyzer {
	fn default() -> Self { Self::with_stop_words(ENGLISH_STOP_WORDS.iter().copied()) }
}

impl Analyzer {
	/// Analyzer that keeps every token.
	pub fn plain() -> Self { Self { stop_words: HashSet::new() } }

	pub fn with_stop_words<I, S>(stop_words: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		Self { stop_words: stop_words.into_iter().map(|s| s.as_ref().to_lowercase()).collect() }
	}

	pub fn tokenize(&self, text: &str) -> Vec<String> {
		text.split(|c: char| !c.is_alphanumeric())
			.filter(|t| !t.is_empty())
			.map(str::to_lowercase)
			.filter(|t| !self.stop_words.contains(t))
			.collect()
	}

	/// True when `text` contains anything the tokenizer could turn into a term,
	/// before stop words are removed.
	pub fn has_terms(text: &str) -> bool { text.chars().any(char::is_alphanumeric) }
}
