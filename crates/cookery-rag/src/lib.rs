//! cookery-rag
//!
//! Retrieval-augmented answering on top of any `TextIndexer`: prompt
//! composition, an OpenAI-compatible chat client and the pipeline that ties
//! search, prompt and generation together.
pub mod llm;
pub mod pipeline;
pub mod prompt;

pub use llm::OpenAiClient;
pub use pipeline::{RagAnswer, RagPipeline};
pub use prompt::{build_prompt, format_entry};
