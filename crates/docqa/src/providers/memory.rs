//! In-memory vector store with brute-force cosine search

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::{Error, Result};

use super::vector_store::{IndexedChunk, VectorSearchResult, VectorStoreProvider};

/// Vector store that keeps every embedding in memory.
///
/// Lives only as long as the index that owns it.
pub struct MemoryVectorStore {
    dimensions: usize,
    entries: RwLock<Vec<IndexedChunk>>,
}

impl MemoryVectorStore {
    /// Create an empty store accepting vectors of `dimensions` length
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Compute cosine similarity between two vectors
    fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() {
            return 0.0;
        }

        let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }

        dot / (norm_a * norm_b)
    }
}

#[async_trait]
impl VectorStoreProvider for MemoryVectorStore {
    async fn insert_chunks(&self, entries: Vec<IndexedChunk>) -> Result<()> {
        if let Some(bad) = entries.iter().find(|e| e.embedding.len() != self.dimensions) {
            return Err(Error::vector_db(format!(
                "Chunk {} has {} dimensions, store expects {}",
                bad.chunk.index,
                bad.embedding.len(),
                self.dimensions
            )));
        }

        let count = entries.len();
        self.entries.write().extend(entries);
        tracing::debug!("Inserted {} chunks into memory store", count);
        Ok(())
    }

    async fn search(&self, query_embedding: &[f32], top_k: usize) -> Result<Vec<VectorSearchResult>> {
        if query_embedding.len() != self.dimensions {
            return Err(Error::vector_db(format!(
                "Query has {} dimensions, store expects {}",
                query_embedding.len(),
                self.dimensions
            )));
        }

        let entries = self.entries.read();
        let mut scored: Vec<(f32, &IndexedChunk)> = entries
            .iter()
            .map(|entry| (Self::cosine_similarity(query_embedding, &entry.embedding), entry))
            .collect();

        // Best first; ties keep document order
        scored.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.1.chunk.index.cmp(&b.1.chunk.index))
        });

        Ok(scored
            .into_iter()
            .take(top_k)
            .map(|(similarity, entry)| VectorSearchResult {
                chunk: entry.chunk.clone(),
                similarity,
            })
            .collect())
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.entries.read().len())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Chunk;

    fn entry(index: usize, embedding: Vec<f32>) -> IndexedChunk {
        IndexedChunk {
            chunk: Chunk::new(index, format!("chunk {}", index), 0, 7),
            embedding,
        }
    }

    #[tokio::test]
    async fn test_search_orders_by_similarity() {
        let store = MemoryVectorStore::new(2);
        store
            .insert_chunks(vec![
                entry(0, vec![1.0, 0.0]),
                entry(1, vec![0.0, 1.0]),
                entry(2, vec![0.7, 0.7]),
            ])
            .await
            .unwrap();

        let results = store.search(&[0.0, 1.0], 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk.index, 1);
        assert_eq!(results[1].chunk.index, 2);
        assert!(results[0].similarity > results[1].similarity);
        assert_eq!(store.len().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_rejects_wrong_dimensions() {
        let store = MemoryVectorStore::new(3);
        let result = store.insert_chunks(vec![entry(0, vec![1.0])]).await;
        assert!(matches!(result, Err(Error::VectorDb(_))));
        assert!(store.is_empty().await.unwrap());

        assert!(store.search(&[1.0, 0.0], 1).await.is_err());
    }

    #[test]
    fn test_cosine_zero_vector() {
        assert_eq!(MemoryVectorStore::cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }
}
