//! Domain types shared by the index, the RAG pipeline and the CLI.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// Identifier assigned to a document at ingestion time (zero-based row position).
pub type DocId = usize;

/// Keyword field → required exact value.
pub type FilterMap = BTreeMap<String, Value>;

/// Field → score multiplier. Fields not present weigh 1.0.
pub type BoostMap = BTreeMap<String, f64>;

/// One ingested record of the knowledge base.
///
/// - `id`: immutable, unique within one ingestion
/// - `fields`: column name → value; text fields hold strings, keyword fields
///   may hold any JSON scalar (`Null` when the cell was empty)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    pub fields: BTreeMap<String, Value>,
}

impl Document {
    pub fn new(id: DocId) -> Self {
        Self { id, fields: BTreeMap::new() }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Field rendered as text. Missing and null fields are empty.
    pub fn text(&self, field: &str) -> Cow<'_, str> {
        match self.fields.get(field) {
            Some(Value::String(s)) => Cow::Borrowed(s.as_str()),
            None | Some(Value::Null) => Cow::Borrowed(""),
            Some(other) => Cow::Owned(other.to_string()),
        }
    }
}

/// A ranked document together with its aggregated lexical score.
///
/// `score` is higher-is-better; it is 0.0 for every hit of a query without
/// lexical terms (filter-only search).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub document: Document,
    pub score: f64,
}

/// A transient search request: free text plus hard filters and per-field boosts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub text: String,
    #[serde(default)]
    pub filters: FilterMap,
    #[serde(default)]
    pub boosts: BoostMap,
    #[serde(default = "default_num_results")]
    pub num_results: usize,
}

fn default_num_results() -> usize {
    SearchQuery::DEFAULT_NUM_RESULTS
}

impl SearchQuery {
    pub const DEFAULT_NUM_RESULTS: usize = 10;

    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            filters: FilterMap::new(),
            boosts: BoostMap::new(),
            num_results: Self::DEFAULT_NUM_RESULTS,
        }
    }

    pub fn with_filter(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.insert(field.into(), value.into());
        self
    }

    pub fn with_filters(mut self, filters: FilterMap) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_boost(mut self, field: impl Into<String>, weight: f64) -> Self {
        self.boosts.insert(field.into(), weight);
        self
    }

    pub fn with_boosts(mut self, boosts: BoostMap) -> Self {
        self.boosts = boosts;
        self
    }

    pub fn with_num_results(mut self, num_results: usize) -> Self {
        self.num_results = num_results;
        self
    }

    /// Weight applied to `field`'s lexical score.
    pub fn boost_for(&self, field: &str) -> f64 {
        self.boosts.get(field).copied().unwrap_or(1.0)
    }

    pub fn validate(&self) -> Result<()> {
        if self.num_results == 0 {
            return Err(Error::InvalidArgument("num_results must be positive".to_string()));
        }
        validate_boosts(&self.boosts)
    }
}

/// Boost weights must be finite and non-negative.
pub fn validate_boosts(boosts: &BoostMap) -> Result<()> {
    for (field, weight) in boosts {
        if !weight.is_finite() || *weight < 0.0 {
            return Err(Error::InvalidArgument(format!(
                "boost for '{}' must be a finite non-negative number, got {}",
                field, weight
            )));
        }
    }
    Ok(())
}
