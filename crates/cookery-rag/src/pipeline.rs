use serde::Serialize;
use tracing::info;

use cookery_core::config::SearchConfig;
use cookery_core::error::{Error, Result};
use cookery_core::traits::{Generator, TextIndexer};
use cookery_core::types::{BoostMap, Document, SearchQuery};

use crate::prompt::build_prompt;

/// Everything produced while answering one question.
#[derive(Debug, Clone, Serialize)]
pub struct RagAnswer {
    pub question: String,
    pub answer: String,
    pub model: String,
    pub prompt: String,
    pub documents: Vec<Document>,
}

/// Process-scoped retrieval + generation state: built once at startup and
/// borrowed by every request.
pub struct RagPipeline<TI> where TI: TextIndexer {
    index: TI,
    generator: Box<dyn Generator>,
    num_results: usize,
    boosts: BoostMap,
}

impl<TI> RagPipeline<TI> where TI: TextIndexer {
    pub fn new(index: TI, generator: Box<dyn Generator>) -> Self {
        Self { index, generator, num_results: SearchQuery::DEFAULT_NUM_RESULTS, boosts: BoostMap::new() }
    }

    /// Default result count and boosts applied to every question.
    pub fn with_search_config(mut self, config: &SearchConfig) -> Self {
        self.num_results = config.num_results;
        self.boosts = config.boost.clone();
        self
    }

    pub fn index(&self) -> &TI { &self.index }

    pub fn default_query(&self, question: &str) -> SearchQuery {
        SearchQuery::new(question)
            .with_boosts(self.boosts.clone())
            .with_num_results(self.num_results)
    }

    pub fn search(&self, question: &str) -> Result<Vec<Document>> {
        self.index.search(&self.default_query(question))
    }

    /// Retrieve context for `query` and compose the prompt without calling the model.
    pub fn prompt_for(&self, query: &SearchQuery) -> Result<(Vec<Document>, String)> {
        let documents = self.index.search(query)?;
        let prompt = build_prompt(&query.text, &documents);
        Ok((documents, prompt))
    }

    /// Search with the pipeline defaults, build the prompt and ask the model.
    pub fn ask(&self, question: &str) -> Result<RagAnswer> {
        self.ask_with(&self.default_query(question))
    }

    pub fn ask_with(&self, query: &SearchQuery) -> Result<RagAnswer> {
        if query.text.trim().is_empty() {
            return Err(Error::InvalidArgument("question must not be empty".to_string()));
        }
        let (documents, prompt) = self.prompt_for(query)?;
        info!(question = %query.text, context_entries = documents.len(), model = %self.generator.model(), "Answering question");
        let answer = self.generator.complete(&prompt)?;
        Ok(RagAnswer {
            question: query.text.clone(),
            answer,
            model: self.generator.model().to_string(),
            prompt,
            documents,
        })
    }
}
