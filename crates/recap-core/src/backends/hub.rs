//! Shared model handles.
//!
//! Building a backend client is cheap (no network at construction), but the
//! hub exists so every invocation in the process reuses the same handles:
//! initialized at most once, read-only afterwards, safe to share across
//! concurrent pipeline runs.

use crate::error::Result;
use once_cell::sync::OnceCell;
use std::sync::Arc;

use super::{
    EmbeddingBackend, GenerationBackend, HfInferenceClient, SentimentBackend, SummaryBackend,
};

static SHARED_HUB: OnceCell<Arc<ModelHub>> = OnceCell::new();

/// One handle per model collaborator, injected into the pipeline.
#[derive(Clone)]
pub struct ModelHub {
    pub summary: Arc<dyn SummaryBackend>,
    pub sentiment: Arc<dyn SentimentBackend>,
    pub embedding: Arc<dyn EmbeddingBackend>,
    pub generation: Arc<dyn GenerationBackend>,
}

impl ModelHub {
    /// Hub with explicit backends (tests inject counting mocks here).
    pub fn new(
        summary: Arc<dyn SummaryBackend>,
        sentiment: Arc<dyn SentimentBackend>,
        embedding: Arc<dyn EmbeddingBackend>,
        generation: Arc<dyn GenerationBackend>,
    ) -> Self {
        Self {
            summary,
            sentiment,
            embedding,
            generation,
        }
    }

    /// Hub backed by the Hugging Face Inference API, configured from env.
    pub fn from_env() -> Result<Self> {
        let client = Arc::new(HfInferenceClient::from_env()?);
        Ok(Self {
            summary: client.clone(),
            sentiment: client.clone(),
            embedding: client.clone(),
            generation: client,
        })
    }

    /// Process-wide hub, lazily initialized from env on first use.
    ///
    /// Idempotent under concurrent first use; later callers always see the
    /// instance the first caller built. A failed initialization is returned
    /// as an error and retried on the next call rather than poisoning the
    /// cell.
    pub fn shared() -> Result<Arc<ModelHub>> {
        SHARED_HUB
            .get_or_try_init(|| Ok(Arc::new(ModelHub::from_env()?)))
            .cloned()
    }
}
