//! Retrieval over an embedded document index

pub mod index;

pub use index::{memory_store_factory, DocumentIndex, IndexBuilder, Retriever, VectorStoreFactory};
