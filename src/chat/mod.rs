//! Request-path engine: retrieve, compose, generate.
//!
//! The request path is a linear chain:
//! `received -> (embed)? -> (retrieve)? -> compose-prompt -> generate`.
//! Embedding and retrieval failures degrade the request to an ungrounded
//! answer; only generation failures are terminal.

use crate::completion::{ChatModel, Message, OpenAIChatModel, Role};
use crate::config::{Prompts, Settings};
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::{PaddockError, Result};
use crate::openai;
use crate::vector_store::{open_store, VectorStore};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Engine behind the chat endpoint.
///
/// All clients are injected explicitly; the process entry point owns their
/// lifecycle, and tests substitute fakes.
pub struct ChatEngine {
    embedder: Option<Arc<dyn Embedder>>,
    store: Option<Arc<dyn VectorStore>>,
    model: Arc<dyn ChatModel>,
    prompts: Prompts,
    max_context_chunks: usize,
}

impl ChatEngine {
    /// Create an engine without retrieval (ungrounded generation only).
    pub fn new(model: Arc<dyn ChatModel>, prompts: Prompts, max_context_chunks: usize) -> Self {
        Self {
            embedder: None,
            store: None,
            model,
            prompts,
            max_context_chunks,
        }
    }

    /// Attach a retrieval pair (embedder and vector store).
    pub fn with_retrieval(
        mut self,
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
    ) -> Self {
        self.embedder = Some(embedder);
        self.store = Some(store);
        self
    }

    /// Build an engine from the configuration.
    ///
    /// Missing retrieval configuration is not fatal here: the request path
    /// runs in a degraded, ungrounded mode instead.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let model = Arc::new(OpenAIChatModel::new(&settings.rag.model));
        let prompts = Prompts::load(settings.prompts.custom_dir.as_deref())?;

        let mut engine = Self::new(model, prompts, settings.rag.max_context_chunks);

        if openai::api_key().is_none() {
            warn!(
                "{} is not set; retrieval disabled, responses will be ungrounded",
                openai::LLM_API_KEY_VAR
            );
            return Ok(engine);
        }

        match open_store(settings) {
            Ok(store) => {
                let embedder = Arc::new(OpenAIEmbedder::with_config(
                    &settings.embedding.model,
                    settings.embedding.dimensions as usize,
                ));
                engine = engine.with_retrieval(embedder, store);
            }
            Err(e) => {
                warn!("Vector store unavailable, responses will be ungrounded: {}", e);
            }
        }

        Ok(engine)
    }

    /// Generate a response for the conversation.
    ///
    /// An empty message list is rejected; retrieval failures degrade to an
    /// empty context section.
    #[instrument(skip(self, messages), fields(count = messages.len()))]
    pub async fn respond(&self, messages: &[Message]) -> Result<String> {
        if messages.is_empty() {
            return Err(PaddockError::InvalidInput(
                "messages must not be empty".to_string(),
            ));
        }

        let context = self.retrieve_context(messages).await;

        let mut vars = HashMap::new();
        vars.insert("context".to_string(), context);
        let system_prompt = Prompts::render(&self.prompts.chat.system, &vars);

        self.model.complete(&system_prompt, messages).await
    }

    /// Best-effort retrieval of context for the latest user message.
    ///
    /// Returns the retrieved chunk texts JSON-stringified, or an empty
    /// string when retrieval is unavailable, inapplicable, or failed.
    async fn retrieve_context(&self, messages: &[Message]) -> String {
        let (Some(embedder), Some(store)) = (&self.embedder, &self.store) else {
            debug!("No retrieval clients configured, composing without context");
            return String::new();
        };

        let Some(latest) = messages
            .last()
            .filter(|m| m.role == Role::User && !m.content.is_empty())
        else {
            debug!("Latest message is not a non-empty user message, skipping retrieval");
            return String::new();
        };

        let vector = match embedder.embed(&latest.content).await {
            Ok(v) => v,
            Err(e) => {
                warn!("Error generating embedding, continuing without context: {}", e);
                return String::new();
            }
        };

        let chunks = match store.query(&vector, self.max_context_chunks).await {
            Ok(c) => c,
            Err(e) => {
                warn!("Error querying vector store, continuing without context: {}", e);
                return String::new();
            }
        };

        info!("Retrieved {} context chunks", chunks.len());

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        serde_json::to_string(&texts).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector_store::{ChunkRecord, ScoredChunk, SimilarityMetric};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FakeEmbedder {
        fail: bool,
    }

    #[async_trait]
    impl Embedder for FakeEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            if self.fail {
                Err(PaddockError::Embedding("provider unreachable".to_string()))
            } else {
                Ok(vec![1.0, 0.0, 0.0])
            }
        }

        fn dimensions(&self) -> usize {
            3
        }
    }

    struct FakeStore {
        chunks: Vec<String>,
        fail: bool,
    }

    #[async_trait]
    impl VectorStore for FakeStore {
        async fn create_collection(
            &self,
            _dimension: usize,
            _metric: SimilarityMetric,
        ) -> Result<()> {
            Ok(())
        }

        async fn insert(&self, _record: &ChunkRecord) -> Result<()> {
            Ok(())
        }

        async fn query(&self, _embedding: &[f32], limit: usize) -> Result<Vec<ScoredChunk>> {
            if self.fail {
                return Err(PaddockError::VectorStore("query failed".to_string()));
            }
            Ok(self
                .chunks
                .iter()
                .take(limit)
                .map(|text| ScoredChunk {
                    text: text.clone(),
                    score: 0.9,
                })
                .collect())
        }

        async fn count(&self) -> Result<usize> {
            Ok(self.chunks.len())
        }
    }

    struct FakeModel {
        seen_system_prompts: Mutex<Vec<String>>,
        fail: bool,
    }

    impl FakeModel {
        fn new(fail: bool) -> Self {
            Self {
                seen_system_prompts: Mutex::new(Vec::new()),
                fail,
            }
        }
    }

    #[async_trait]
    impl ChatModel for FakeModel {
        async fn complete(&self, system_prompt: &str, _messages: &[Message]) -> Result<String> {
            if self.fail {
                return Err(PaddockError::Completion("model unavailable".to_string()));
            }
            self.seen_system_prompts
                .lock()
                .unwrap()
                .push(system_prompt.to_string());
            Ok("Max Verstappen é o atual campeão.".to_string())
        }
    }

    fn engine_with(
        model: Arc<FakeModel>,
        embedder_fails: bool,
        store: FakeStore,
    ) -> ChatEngine {
        ChatEngine::new(model, Prompts::default(), 10).with_retrieval(
            Arc::new(FakeEmbedder {
                fail: embedder_fails,
            }),
            Arc::new(store),
        )
    }

    fn user_question() -> Vec<Message> {
        vec![Message::new(Role::User, "Quem é o atual campeão mundial?")]
    }

    #[tokio::test]
    async fn grounded_response_includes_retrieved_context() {
        let model = Arc::new(FakeModel::new(false));
        let engine = engine_with(
            model.clone(),
            false,
            FakeStore {
                chunks: vec!["Verstappen venceu o campeonato".to_string()],
                fail: false,
            },
        );

        let answer = engine.respond(&user_question()).await.unwrap();
        assert!(!answer.is_empty());

        let prompts = model.seen_system_prompts.lock().unwrap();
        assert!(prompts[0].contains("Verstappen venceu o campeonato"));
    }

    #[tokio::test]
    async fn embedding_failure_degrades_instead_of_failing() {
        let model = Arc::new(FakeModel::new(false));
        let engine = engine_with(
            model.clone(),
            true,
            FakeStore {
                chunks: vec!["unused".to_string()],
                fail: false,
            },
        );

        let answer = engine.respond(&user_question()).await.unwrap();
        assert!(!answer.is_empty());

        // Context slot is rendered empty, not left as a placeholder.
        let prompts = model.seen_system_prompts.lock().unwrap();
        assert!(!prompts[0].contains("{{context}}"));
        assert!(!prompts[0].contains("unused"));
    }

    #[tokio::test]
    async fn retrieval_failure_degrades_instead_of_failing() {
        let model = Arc::new(FakeModel::new(false));
        let engine = engine_with(
            model.clone(),
            false,
            FakeStore {
                chunks: Vec::new(),
                fail: true,
            },
        );

        let answer = engine.respond(&user_question()).await.unwrap();
        assert!(!answer.is_empty());
    }

    #[tokio::test]
    async fn engine_without_retrieval_still_answers() {
        let model = Arc::new(FakeModel::new(false));
        let engine = ChatEngine::new(model.clone(), Prompts::default(), 10);

        let answer = engine.respond(&user_question()).await.unwrap();
        assert!(!answer.is_empty());
    }

    #[tokio::test]
    async fn empty_message_list_is_rejected() {
        let model = Arc::new(FakeModel::new(false));
        let engine = ChatEngine::new(model, Prompts::default(), 10);

        let result = engine.respond(&[]).await;
        assert!(matches!(result, Err(PaddockError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn generation_failure_is_terminal() {
        let model = Arc::new(FakeModel::new(true));
        let engine = ChatEngine::new(model, Prompts::default(), 10);

        let result = engine.respond(&user_question()).await;
        assert!(matches!(result, Err(PaddockError::Completion(_))));
    }

    #[tokio::test]
    async fn retrieval_respects_max_context_chunks() {
        let model = Arc::new(FakeModel::new(false));
        let chunks: Vec<String> = (0..20).map(|i| format!("chunk {}", i)).collect();
        let engine = ChatEngine::new(model.clone(), Prompts::default(), 10).with_retrieval(
            Arc::new(FakeEmbedder { fail: false }),
            Arc::new(FakeStore {
                chunks,
                fail: false,
            }),
        );

        engine.respond(&user_question()).await.unwrap();

        let prompts = model.seen_system_prompts.lock().unwrap();
        assert!(prompts[0].contains("chunk 9"));
        assert!(!prompts[0].contains("chunk 10"));
    }
}
