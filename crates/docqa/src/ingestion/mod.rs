//! Document ingestion: text extraction and chunking

mod chunker;
pub mod encoding;
mod extractor;
mod parser;

pub use chunker::{split, TextChunker};
pub use encoding::{decode_text, TextEncoding};
pub use extractor::{scan_folder, BatchExtraction, FileExtractor, FileOutcome};
pub use parser::{cleanup_pdf_text, FileParser, BLOCK_SEPARATOR};
