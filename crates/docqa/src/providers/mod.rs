//! Provider abstractions for embeddings, LLM, and vector storage
//!
//! Trait-based so the answering pipeline can switch between a local Ollama
//! server, an offline hashing embedder, and test doubles.

pub mod embedding;
pub mod hashing;
pub mod llm;
pub mod memory;
pub mod ollama;
pub mod vector_store;

pub use embedding::EmbeddingProvider;
pub use hashing::HashingEmbedder;
pub use llm::LlmProvider;
pub use memory::MemoryVectorStore;
pub use ollama::{OllamaEmbedder, OllamaLlm, OllamaProvider};
pub use vector_store::{IndexedChunk, VectorSearchResult, VectorStoreProvider};
