//! docqa: ask questions about your documents
//!
//! Extracts text from PDF, Word and plain-text files, splits it into
//! overlapping chunks, embeds the chunks into an in-memory vector index and
//! answers free-text questions with an LLM, returning the supporting excerpts.
//!
//! ```no_run
//! # async fn run() -> docqa::Result<()> {
//! let assistant = docqa::Assistant::from_config(docqa::DocqaConfig::default())?;
//! assistant.process_folder("./reports").await?;
//! let answer = assistant.ask("What was the revenue in Q3?").await?;
//! println!("{}", answer.text);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod providers;
pub mod retrieval;
pub mod session;
pub mod types;

pub use config::DocqaConfig;
pub use error::{Error, Result};
pub use session::{Assistant, AssistantBuilder, SessionState};
pub use types::{
    document::{Chunk, DocumentFormat, SourceFile, Upload},
    response::{Answer, ProcessingReport, SourceExcerpt, SupportingChunk},
};
