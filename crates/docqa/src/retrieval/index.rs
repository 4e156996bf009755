//! Document index: chunks embedded into a vector store, queried by text

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::providers::{
    EmbeddingProvider, IndexedChunk, MemoryVectorStore, VectorSearchResult, VectorStoreProvider,
};
use crate::types::Chunk;

/// Creates an empty vector store for the given embedding dimensions
pub type VectorStoreFactory = Arc<dyn Fn(usize) -> Arc<dyn VectorStoreProvider> + Send + Sync>;

/// Factory for fresh in-memory stores
pub fn memory_store_factory() -> VectorStoreFactory {
    Arc::new(|dimensions| Arc::new(MemoryVectorStore::new(dimensions)) as Arc<dyn VectorStoreProvider>)
}

/// Anything that can return the chunks most relevant to a query
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Most relevant chunks for `query`, best first
    async fn retrieve(&self, query: &str) -> Result<Vec<VectorSearchResult>>;
}

/// Queryable collection of embedded chunks.
///
/// Built wholesale by [`IndexBuilder`]; never updated in place.
pub struct DocumentIndex {
    id: Uuid,
    store: Arc<dyn VectorStoreProvider>,
    embedder: Arc<dyn EmbeddingProvider>,
    top_k: usize,
    chunk_count: usize,
}

impl DocumentIndex {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn chunk_count(&self) -> usize {
        self.chunk_count
    }
}

impl std::fmt::Debug for DocumentIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentIndex")
            .field("id", &self.id)
            .field("top_k", &self.top_k)
            .field("chunk_count", &self.chunk_count)
            .finish()
    }
}

#[async_trait]
impl Retriever for DocumentIndex {
    async fn retrieve(&self, query: &str) -> Result<Vec<VectorSearchResult>> {
        let query_embedding = self.embedder.embed(query).await?;
        let results = self.store.search(&query_embedding, self.top_k).await?;

        tracing::debug!(
            "Index {} returned {} chunks for query ({} stored)",
            self.id,
            results.len(),
            self.chunk_count
        );
        Ok(results)
    }
}

/// Embeds chunks in batches into a fresh vector store
pub struct IndexBuilder {
    embedder: Arc<dyn EmbeddingProvider>,
    store_factory: VectorStoreFactory,
    batch_size: usize,
    top_k: usize,
}

impl IndexBuilder {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        store_factory: VectorStoreFactory,
        batch_size: usize,
        top_k: usize,
    ) -> Self {
        Self {
            embedder,
            store_factory,
            batch_size: batch_size.max(1),
            top_k: top_k.max(1),
        }
    }

    /// Embed every chunk and return the finished index
    pub async fn build(&self, chunks: Vec<Chunk>) -> Result<DocumentIndex> {
        if chunks.is_empty() {
            return Err(Error::internal("Cannot build an index from zero chunks"));
        }

        let chunk_count = chunks.len();
        let store = (self.store_factory)(self.embedder.dimensions());

        tracing::info!(
            "Embedding {} chunks in batches of {}",
            chunk_count,
            self.batch_size
        );

        let mut remaining = chunks.into_iter().peekable();
        while remaining.peek().is_some() {
            let batch: Vec<Chunk> = remaining.by_ref().take(self.batch_size).collect();
            let texts: Vec<String> = batch.iter().map(|c| c.content.clone()).collect();
            let embeddings = self.embedder.embed_batch(&texts).await?;

            if embeddings.len() != batch.len() {
                return Err(Error::embedding(format!(
                    "Expected {} embeddings, got {}",
                    batch.len(),
                    embeddings.len()
                )));
            }

            let entries = batch
                .into_iter()
                .zip(embeddings)
                .map(|(chunk, embedding)| IndexedChunk { chunk, embedding })
                .collect();
            store.insert_chunks(entries).await?;
        }

        let index = DocumentIndex {
            id: Uuid::new_v4(),
            store,
            embedder: Arc::clone(&self.embedder),
            top_k: self.top_k,
            chunk_count,
        };
        tracing::info!("Built index {} with {} chunks", index.id, chunk_count);
        Ok(index)
    }
}
