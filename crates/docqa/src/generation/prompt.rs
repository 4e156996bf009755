//! Prompt templates for retrieval-augmented answering

use crate::providers::VectorSearchResult;

/// Prompt builder for RAG queries
pub struct PromptBuilder;

impl PromptBuilder {
    /// Stuff every retrieved chunk into one numbered context block
    pub fn build_context(results: &[VectorSearchResult]) -> String {
        results
            .iter()
            .enumerate()
            .map(|(i, result)| format!("[{}]\n{}", i + 1, result.chunk.content.trim()))
            .collect::<Vec<_>>()
            .join("\n\n---\n\n")
    }

    /// Build the full RAG prompt
    pub fn build_rag_prompt(question: &str, context: &str) -> String {
        format!(
            r#"Use the following pieces of context to answer the question at the end. If you don't know the answer, just say that you don't know, don't try to make up an answer.

{context}

Question: {question}
Helpful Answer:"#,
            context = context,
            question = question
        )
    }
}
