//! The document assistant: one session, one writer at a time

use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard};

use crate::config::{DocqaConfig, EmbeddingBackend};
use crate::error::{Error, Result};
use crate::generation::{AnsweringBackend, StuffAnswerer};
use crate::ingestion::{scan_folder, BatchExtraction, FileExtractor, TextChunker};
use crate::providers::{EmbeddingProvider, HashingEmbedder, LlmProvider, OllamaProvider};
use crate::retrieval::{memory_store_factory, IndexBuilder, VectorStoreFactory};
use crate::types::{Answer, ProcessingReport, SourceFile, Upload};

use super::state::{Session, SessionState};

/// Document question-answering assistant.
///
/// Cheap to clone; clones share the same session. Processing requests and
/// questions are serialized through the session lock.
#[derive(Clone)]
pub struct Assistant {
    inner: Arc<AssistantInner>,
}

struct AssistantInner {
    config: DocqaConfig,
    extractor: FileExtractor,
    chunker: TextChunker,
    index_builder: IndexBuilder,
    answerer: Arc<dyn AnsweringBackend>,
    session: Mutex<Session>,
    /// Last published session state, readable while the session is locked
    state: RwLock<SessionState>,
}

impl Assistant {
    pub fn builder() -> AssistantBuilder {
        AssistantBuilder::default()
    }

    /// Assistant with the backends selected in `config`
    pub fn from_config(config: DocqaConfig) -> Result<Self> {
        Self::builder().config(config).build()
    }

    pub fn config(&self) -> &DocqaConfig {
        &self.inner.config
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        *self.inner.state.read()
    }

    /// Names of the files behind the current index
    pub async fn processed_files(&self) -> Vec<String> {
        self.inner.session.lock().await.processed_files().to_vec()
    }

    /// Extract, chunk and index `paths`, replacing any previous index
    pub async fn process_files<P: AsRef<Path>>(&self, paths: &[P]) -> Result<ProcessingReport> {
        let paths: Vec<PathBuf> = paths.iter().map(|p| p.as_ref().to_path_buf()).collect();
        let mut session = self.inner.session.lock().await;
        self.process_locked(&mut session, paths).await
    }

    /// Process every supported file directly inside `dir`
    pub async fn process_folder(&self, dir: impl AsRef<Path>) -> Result<ProcessingReport> {
        let paths = scan_folder(dir.as_ref(), &self.inner.config.extraction)?;

        let mut session = self.inner.session.lock().await;
        self.process_locked(&mut session, paths).await
    }

    /// Process in-memory files. They are written to a temporary directory
    /// that is removed when the request finishes.
    pub async fn process_uploads(&self, uploads: Vec<Upload>) -> Result<ProcessingReport> {
        let temp_dir = tempfile::tempdir()?;
        let mut paths = Vec::with_capacity(uploads.len());

        for upload in &uploads {
            let name = upload
                .file_name()
                .ok_or_else(|| Error::file_parse(upload.name.clone(), "Invalid upload file name"))?;
            let path = temp_dir.path().join(name);
            tokio::fs::write(&path, &upload.data).await?;
            paths.push(path);
        }

        let mut session = self.inner.session.lock().await;
        self.process_locked(&mut session, paths).await
    }

    async fn process_locked(&self, session: &mut Session, paths: Vec<PathBuf>) -> Result<ProcessingReport> {
        if paths.is_empty() {
            tracing::warn!("Processing request selected no files");
            return Err(Error::NoDocuments);
        }

        let files_selected = paths.len();
        let processed_files: Vec<String> = paths
            .iter()
            .map(|p| SourceFile::new(p.clone()).display_name())
            .collect();

        let batch = self.extract(paths).await?;
        if batch.text.trim().is_empty() {
            tracing::warn!("No text could be extracted from {} file(s)", batch.total());
            return Err(Error::NoExtractableText { total: batch.total() });
        }

        let chunks = self.inner.chunker.split(&batch.text);
        let chunk_count = chunks.len();
        tracing::info!(
            "Extracted {} characters (sha256 {}) into {} chunks",
            batch.text.chars().count(),
            batch.content_hash(),
            chunk_count
        );

        let timeout = self.inner.config.processing.index_timeout();
        let index = with_timeout("Index build", timeout, self.inner.index_builder.build(chunks)).await?;

        session.install(index, processed_files.clone());
        self.publish(session);

        Ok(ProcessingReport {
            files_selected,
            files_extracted: batch.successful(),
            chunks: chunk_count,
            processed_files,
        })
    }

    /// Batch extraction runs on the blocking pool
    async fn extract(&self, paths: Vec<PathBuf>) -> Result<BatchExtraction> {
        let extractor = self.inner.extractor.clone();
        tokio::task::spawn_blocking(move || extractor.extract_batch(&paths))
            .await
            .map_err(|e| Error::internal(format!("Extraction task failed: {}", e)))
    }

    /// Answer `question` from the current index
    pub async fn ask(&self, question: &str) -> Result<Answer> {
        let mut session = self.inner.session.lock().await;

        let Some(index) = session.begin_answering() else {
            tracing::warn!("Question asked before any documents were processed");
            return Err(Error::NoIndex);
        };
        self.publish(&session);
        let answering = AnsweringGuard {
            assistant: self,
            session,
        };

        let timeout = self.inner.config.processing.answer_timeout();
        let result = with_timeout(
            "Answer generation",
            timeout,
            self.inner.answerer.answer(question, &*index),
        )
        .await;

        drop(answering);

        if let Err(e) = &result {
            tracing::error!("Failed to answer question: {}", e);
        }
        result
    }

    /// Discard the index and processed-file list
    pub async fn clear(&self) {
        let mut session = self.inner.session.lock().await;
        session.clear();
        self.publish(&session);
        tracing::info!("Session cleared");
    }

    fn publish(&self, session: &Session) {
        *self.inner.state.write() = session.state();
    }
}

/// Leaves `Answering` when dropped, including when the `ask` future is cancelled
struct AnsweringGuard<'a> {
    assistant: &'a Assistant,
    session: MutexGuard<'a, Session>,
}

impl Drop for AnsweringGuard<'_> {
    fn drop(&mut self) {
        self.session.finish_answering();
        self.assistant.publish(&self.session);
    }
}

async fn with_timeout<T>(
    operation: &'static str,
    limit: Duration,
    future: impl std::future::Future<Output = Result<T>>,
) -> Result<T> {
    match tokio::time::timeout(limit, future).await {
        Ok(result) => result,
        Err(_) => Err(Error::Timeout {
            operation,
            elapsed: limit,
        }),
    }
}

/// Builder for [`Assistant`] with injectable backends.
///
/// Anything not set falls back to what the configuration selects.
#[derive(Default)]
pub struct AssistantBuilder {
    config: DocqaConfig,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    llm: Option<Arc<dyn LlmProvider>>,
    answerer: Option<Arc<dyn AnsweringBackend>>,
    store_factory: Option<VectorStoreFactory>,
}

impl AssistantBuilder {
    pub fn config(mut self, config: DocqaConfig) -> Self {
        self.config = config;
        self
    }

    pub fn embedder(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// LLM used by the default stuffing answerer
    pub fn llm(mut self, llm: Arc<dyn LlmProvider>) -> Self {
        self.llm = Some(llm);
        self
    }

    /// Replace the answering backend entirely
    pub fn answerer(mut self, answerer: Arc<dyn AnsweringBackend>) -> Self {
        self.answerer = Some(answerer);
        self
    }

    pub fn vector_store_factory(mut self, factory: VectorStoreFactory) -> Self {
        self.store_factory = Some(factory);
        self
    }

    pub fn build(self) -> Result<Assistant> {
        let config = self.config;
        config.validate()?;

        let needs_ollama = (self.answerer.is_none() && self.llm.is_none())
            || (self.embedder.is_none() && config.embeddings.backend == EmbeddingBackend::Ollama);
        let ollama = if needs_ollama {
            Some(OllamaProvider::new(&config.llm, &config.embeddings)?)
        } else {
            None
        };

        let embedder: Arc<dyn EmbeddingProvider> = match (self.embedder, &ollama) {
            (Some(embedder), _) => embedder,
            (None, _) if config.embeddings.backend == EmbeddingBackend::Hashing => {
                Arc::new(HashingEmbedder::new(config.embeddings.dimensions))
            }
            (None, Some(ollama)) => ollama.embedder(),
            (None, None) => return Err(Error::internal("No embedding backend available")),
        };

        let answerer: Arc<dyn AnsweringBackend> = match (self.answerer, self.llm, &ollama) {
            (Some(answerer), _, _) => answerer,
            (None, Some(llm), _) => Arc::new(StuffAnswerer::new(llm)),
            (None, None, Some(ollama)) => Arc::new(StuffAnswerer::new(ollama.llm())),
            (None, None, None) => return Err(Error::internal("No answering backend available")),
        };

        let index_builder = IndexBuilder::new(
            embedder,
            self.store_factory.unwrap_or_else(memory_store_factory),
            config.embeddings.batch_size,
            config.retrieval.top_k,
        );

        tracing::info!(
            "Assistant ready (embeddings: {:?}/{}, top_k: {})",
            config.embeddings.backend,
            config.embeddings.model,
            config.retrieval.top_k
        );

        Ok(Assistant {
            inner: Arc::new(AssistantInner {
                extractor: FileExtractor::new(&config.extraction),
                chunker: TextChunker::from_config(&config.chunking)?,
                index_builder,
                answerer,
                session: Mutex::new(Session::new()),
                state: RwLock::new(SessionState::Idle),
                config,
            }),
        })
    }
}
