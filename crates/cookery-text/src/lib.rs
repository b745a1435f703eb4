//! cookery-text
//!
//! In-memory lexical index for the cooking knowledge base: tokenized text
//! fields scored with TF-IDF, exact-match keyword filters and per-field boosts.
//! See `index` for construction and `search` for the scoring formula.
pub mod analyzer;
pub mod index;
pub mod search;

pub use analyzer::Analyzer;
pub use index::{load_index, Index};
