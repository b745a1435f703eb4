use parking_lot::RwLock;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

use cookery_core::config::IndexConfig;
use cookery_core::data_processor::DataProcessor;
use cookery_core::error::{Error, Result};
use cookery_core::traits::TextIndexer;
use cookery_core::types::{Document, SearchQuery};

use crate::analyzer::Analyzer;

/// In-memory lexical index over a fixed set of text and keyword fields.
///
/// `fit` builds a complete [`IndexState`] off to the side and swaps it in under
/// a short write lock; searches clone the `Arc` and never see a partial build.
pub struct Index {
	text_fields: Vec<String>,
	keyword_fields: Vec<String>,
	analyzer: Analyzer,
	state: RwLock<Arc<IndexState>>,
}

/// Everything derived from one `fit` call. Documents are addressed by their
/// ordinal (position in the fitted sequence), which is also the tie-break order.
#[derive(Debug, Default)]
pub(crate) struct IndexState {
	pub(crate) documents: Vec<Document>,
	pub(crate) text: HashMap<String, FieldIndex>,
	pub(crate) keywords: HashMap<String, KeywordIndex>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Posting {
	pub(crate) ord: usize,
	pub(crate) tf: u32,
}

/// Inverted index of one text field.
#[derive(Debug, Default)]
pub(crate) struct FieldIndex {
	/// token → postings in ascending ordinal order; `len()` is the document frequency
	pub(crate) postings: HashMap<String, Vec<Posting>>,
	/// token count of the field per ordinal
	pub(crate) lengths: Vec<u32>,
}

/// Exact value → ordinals for one keyword field. Null values are never stored.
#[derive(Debug, Default)]
pub(crate) struct KeywordIndex {
	pub(crate) values: HashMap<String, Vec<usize>>,
}

/// Canonical hashable form of a keyword value; `None` for null, which matches nothing.
pub(crate) fn keyword_key(value: &Value) -> Option<String> {
	match value {
		Value::Null => None,
		other => Some(other.to_string()),
	}
}

impl Index {
	pub fn new<T, K>(text_fields: T, keyword_fields: K) -> Result<Self>
	where
		T: IntoIterator,
		T::Item: Into<String>,
		K: IntoIterator,
		K::Item: Into<String>,
	{
		let text_fields: Vec<String> = text_fields.into_iter().map(Into::into).collect();
		let keyword_fields: Vec<String> = keyword_fields.into_iter().map(Into::into).collect();
		// A field may be both searched and filtered on, but not listed twice in one role.
		for fields in [&text_fields, &keyword_fields] {
			let mut seen = HashSet::new();
			for field in fields {
				if field.is_empty() { return Err(Error::InvalidArgument("field names must not be empty".to_string())); }
				if !seen.insert(field.as_str()) { return Err(Error::InvalidArgument(format!("duplicate field name '{}'", field))); }
			}
		}
		Ok(Self { text_fields, keyword_fields, analyzer: Analyzer::default(), state: RwLock::new(Arc::new(IndexState::default())) })
	}

	pub fn from_config(config: &IndexConfig) -> Result<Self> {
		Self::new(config.text_fields.iter().cloned(), config.keyword_fields.iter().cloned())
	}

	pub fn with_analyzer(mut self, analyzer: Analyzer) -> Self { self.analyzer = analyzer; self }

	pub fn text_fields(&self) -> &[String] { &self.text_fields }

	pub fn keyword_fields(&self) -> &[String] { &self.keyword_fields }

	pub(crate) fn analyzer(&self) -> &Analyzer { &self.analyzer }

	/// Number of documents in the current state.
	pub fn len(&self) -> usize { self.state.read().documents.len() }

	pub fn is_empty(&self) -> bool { self.len() == 0 }

	pub(crate) fn snapshot(&self) -> Arc<IndexState> { Arc::clone(&self.state.read()) }

	/// Replace all indexed state with `documents`. Missing fields are indexed as
	/// empty text / null keywords.
	pub fn fit(&self, documents: Vec<Document>) {
		let state = self.build(documents);
		let count = state.documents.len();
		*self.state.write() = Arc::new(state);
		info!(documents = count, "Index fitted");
	}

	fn build(&self, documents: Vec<Document>) -> IndexState {
		let mut text: HashMap<String, FieldIndex> = HashMap::new();
		for field in &self.text_fields {
			let mut index = FieldIndex { postings: HashMap::new(), lengths: Vec::with_capacity(documents.len()) };
			let mut missing = 0usize;
			for (ord, doc) in documents.iter().enumerate() {
				if doc.get(field).is_none() { missing += 1; }
				let tokens = self.analyzer.tokenize(&doc.text(field));
				index.lengths.push(u32::try_from(tokens.len()).unwrap_or(u32::MAX));
				let mut tf: HashMap<String, u32> = HashMap::new();
				for token in tokens { *tf.entry(token).or_insert(0) += 1; }
				for (token, count) in tf { index.postings.entry(token).or_default().push(Posting { ord, tf: count }); }
			}
			if missing > 0 { warn!(field = %field, missing, "Documents missing text field; indexed as empty"); }
			debug!(field = %field, terms = index.postings.len(), "Built text field index");
			text.insert(field.clone(), index);
		}

		let mut keywords: HashMap<String, KeywordIndex> = HashMap::new();
		for field in &self.keyword_fields {
			let mut index = KeywordIndex::default();
			let mut missing = 0usize;
			for (ord, doc) in documents.iter().enumerate() {
				match doc.get(field).and_then(keyword_key) {
					Some(key) => index.values.entry(key).or_default().push(ord),
					None => missing += 1,
				}
			}
			if missing > 0 { debug!(field = %field, missing, "Documents without keyword value; they never match a filter"); }
			keywords.insert(field.clone(), index);
		}

		IndexState { documents, text, keywords }
	}
}

impl TextIndexer for Index {
	fn index(&self, documents: Vec<Document>) -> Result<()> { self.fit(documents); Ok(()) }

	fn search(&self, query: &SearchQuery) -> Result<Vec<Document>> { Index::search(self, query) }
}

/// Read the knowledge-base CSV at `path` and fit a new index over it.
pub fn load_index(path: &Path, config: &IndexConfig) -> Result<Index> {
	let index = Index::from_config(config)?;
	let processor = DataProcessor::new(config.text_fields.iter().cloned(), config.keyword_fields.iter().cloned());
	index.fit(processor.process_csv(path)?);
	Ok(index)
}
