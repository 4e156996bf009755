//! Answering backends: question plus retriever in, answer plus sources out

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::Result;
use crate::providers::LlmProvider;
use crate::retrieval::Retriever;
use crate::types::{Answer, SupportingChunk};

use super::prompt::PromptBuilder;

/// Produces an answer to a question from the chunks a retriever returns
#[async_trait]
pub trait AnsweringBackend: Send + Sync {
    async fn answer(&self, question: &str, retriever: &dyn Retriever) -> Result<Answer>;
}

/// Stuffs every retrieved chunk into a single prompt
pub struct StuffAnswerer {
    llm: Arc<dyn LlmProvider>,
}

impl StuffAnswerer {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl AnsweringBackend for StuffAnswerer {
    async fn answer(&self, question: &str, retriever: &dyn Retriever) -> Result<Answer> {
        let results = retriever.retrieve(question).await?;
        let context = PromptBuilder::build_context(&results);

        tracing::info!(
            "Answering with {} retrieved chunks ({} context chars)",
            results.len(),
            context.chars().count()
        );

        let text = self.llm.generate_answer(question, &context).await?;

        Ok(Answer {
            text,
            sources: results
                .into_iter()
                .map(|r| SupportingChunk {
                    chunk: r.chunk,
                    similarity: r.similarity,
                })
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::providers::VectorSearchResult;
    use crate::types::Chunk;
    use parking_lot::Mutex;

    struct FixedRetriever(Vec<VectorSearchResult>);

    #[async_trait]
    impl Retriever for FixedRetriever {
        async fn retrieve(&self, _query: &str) -> Result<Vec<VectorSearchResult>> {
            Ok(self.0.clone())
        }
    }

    /// Records the context it was given
    #[derive(Default)]
    struct RecordingLlm {
        seen: Mutex<Vec<(String, String)>>,
        fail: bool,
    }

    #[async_trait]
    impl LlmProvider for RecordingLlm {
        async fn generate_answer(&self, question: &str, context: &str) -> Result<String> {
            if self.fail {
                return Err(Error::llm("model unavailable"));
            }
            self.seen.lock().push((question.to_string(), context.to_string()));
            Ok("Two years.".to_string())
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }

        fn name(&self) -> &str {
            "recording"
        }

        fn model(&self) -> &str {
            "recording"
        }
    }

    fn result(index: usize, content: &str, similarity: f32) -> VectorSearchResult {
        VectorSearchResult {
            chunk: Chunk::new(index, content.to_string(), 0, content.len()),
            similarity,
        }
    }

    #[tokio::test]
    async fn test_stuffs_all_chunks_and_keeps_order() {
        let llm = Arc::new(RecordingLlm::default());
        let answerer = StuffAnswerer::new(llm.clone());
        let retriever = FixedRetriever(vec![
            result(3, "Warranty: two years.", 0.8),
            result(0, "Contact support.", 0.2),
        ]);

        let answer = answerer.answer("How long is the warranty?", &retriever).await.unwrap();

        assert_eq!(answer.text, "Two years.");
        let order: Vec<usize> = answer.sources.iter().map(|s| s.chunk.index).collect();
        assert_eq!(order, vec![3, 0]);

        let seen = llm.seen.lock();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, "How long is the warranty?");
        assert!(seen[0].1.contains("Warranty: two years."));
        assert!(seen[0].1.contains("Contact support."));
    }

    #[tokio::test]
    async fn test_llm_failure_propagates() {
        let answerer = StuffAnswerer::new(Arc::new(RecordingLlm {
            fail: true,
            ..Default::default()
        }));
        let retriever = FixedRetriever(vec![result(0, "text", 1.0)]);

        let err = answerer.answer("q", &retriever).await.unwrap_err();
        assert!(matches!(err, Error::Llm(_)));
    }
}
