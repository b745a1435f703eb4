//! Filtering, scoring and ranking over an [`Index`] snapshot.
//!
//! Each text field is scored with sublinear TF-IDF normalized by field length:
//!
//! ```text
//! field_score(d, f) = Σ_{t ∈ Q ∩ f(d)} (1 + ln tf(t, d, f)) · idf(t, f) / √|f(d)|
//! idf(t, f)         = ln((1 + N) / (1 + df(t, f))) + 1
//! score(d)          = Σ_f boost(f) · field_score(d, f)
//! ```
//!
//! `Q` is the set of distinct analyzed query terms and `N` the number of
//! documents. Every shared term adds a strictly positive amount, so the score
//! is zero exactly when no query term occurs and grows with each additional
//! distinct shared term.
use std::collections::BTreeSet;
use tracing::debug;

use cookery_core::error::Result;
use cookery_core::types::{Document, SearchHit, SearchQuery};

use crate::analyzer::Analyzer;
use crate::index::{keyword_key, Index, IndexState};

impl Index {
	/// Ranked documents for `query`, best first.
	pub fn search(&self, query: &SearchQuery) -> Result<Vec<Document>> {
		Ok(self.search_scored(query)?.into_iter().map(|hit| hit.document).collect())
	}

	/// Like [`Index::search`] but keeps the aggregated score of every hit.
	///
	/// A query without any alphanumeric content places no lexical constraint:
	/// every document passing the filters is returned with score 0 in
	/// ingestion order. Otherwise only documents with a positive score surface.
	pub fn search_scored(&self, query: &SearchQuery) -> Result<Vec<SearchHit>> {
		query.validate()?;
		let state = self.snapshot();
		let allowed = self.filter_mask(&state, query);

		let mut ranked: Vec<(usize, f64)> = if Analyzer::has_terms(&query.text) {
			let terms: BTreeSet<String> = self.analyzer().tokenize(&query.text).into_iter().collect();
			let scores = self.score(&state, &terms, &allowed, query);
			scores.into_iter().enumerate().filter(|(ord, score)| allowed[*ord] && *score > 0.0).collect()
		} else {
			allowed.iter().enumerate().filter(|(_, ok)| **ok).map(|(ord, _)| (ord, 0.0)).collect()
		};

		// stable: equal scores keep ingestion order
		ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
		ranked.truncate(query.num_results);
		debug!(query = %query.text, filters = query.filters.len(), hits = ranked.len(), "Search completed");

		Ok(ranked.into_iter().map(|(ord, score)| SearchHit { document: state.documents[ord].clone(), score }).collect())
	}

	/// Hard AND over all filters. A filter on an undeclared keyword field, or a
	/// null filter value, matches nothing.
	fn filter_mask(&self, state: &IndexState, query: &SearchQuery) -> Vec<bool> {
		let n = state.documents.len();
		if query.filters.is_empty() { return vec![true; n]; }
		let mut matched = vec![0usize; n];
		for (field, value) in &query.filters {
			let ords = state.keywords.get(field).zip(keyword_key(value)).and_then(|(index, key)| index.values.get(&key));
			match ords {
				Some(ords) => for &ord in ords { matched[ord] += 1; },
				None => return vec![false; n],
			}
		}
		matched.into_iter().map(|m| m == query.filters.len()).collect()
	}

	fn score(&self, state: &IndexState, terms: &BTreeSet<String>, allowed: &[bool], query: &SearchQuery) -> Vec<f64> {
		let n = state.documents.len();
		let mut total = vec![0.0f64; n];
		if terms.is_empty() { return total; }
		#[allow(clippy::cast_precision_loss)]
		let docs = n as f64;
		for field in self.text_fields() {
			let Some(index) = state.text.get(field) else { continue };
			let boost = query.boost_for(field);
			let mut field_scores = vec![0.0f64; n];
			for term in terms {
				let Some(postings) = index.postings.get(term) else { continue };
				#[allow(clippy::cast_precision_loss)]
				let idf = ((1.0 + docs) / (1.0 + postings.len() as f64)).ln() + 1.0;
				for p in postings.iter().filter(|p| allowed[p.ord]) {
					let tf = 1.0 + f64::from(p.tf).ln();
					let norm = f64::from(index.lengths[p.ord].max(1)).sqrt();
					field_scores[p.ord] += tf * idf / norm;
				}
			}
			for (acc, s) in total.iter_mut().zip(field_scores) { *acc += boost * s; }
		}
		total
	}
}
