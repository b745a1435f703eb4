use crate::error::Result;
use crate::types::{Document, SearchQuery};

/// A lexical index that can be (re)built from documents and queried.
pub trait TextIndexer: Send + Sync {
    /// Replace all indexed state with `documents`.
    fn index(&self, documents: Vec<Document>) -> Result<()>;
    fn search(&self, query: &SearchQuery) -> Result<Vec<Document>>;
}

/// A text-completion backend.
pub trait Generator: Send + Sync {
    fn model(&self) -> &str;
    fn complete(&self, prompt: &str) -> Result<String>;
}
