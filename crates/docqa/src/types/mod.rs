//! Core types for documents, chunks and answers

pub mod document;
pub mod response;

pub use document::{Chunk, DocumentFormat, SourceFile, Upload};
pub use response::{Answer, ProcessingReport, SourceExcerpt, SupportingChunk};
