//! Answer generation with an LLM over retrieved chunks

pub mod answerer;
pub mod ollama;
pub mod prompt;

pub use answerer::{AnsweringBackend, StuffAnswerer};
pub use ollama::OllamaClient;
pub use prompt::PromptBuilder;
