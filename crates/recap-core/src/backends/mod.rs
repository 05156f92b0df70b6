//! Trait seams for the external model collaborators.
//!
//! Each collaborator from the pipeline boundary gets one trait; adapters
//! normalize their provider's native response shape into the crate's data
//! model immediately, so nothing provider-specific leaks past this module.
//! Backends are shared as `Arc<dyn _>` and must be safe to call from many
//! invocations at once.

mod hf;
mod hub;
mod transcription;

pub use hf::HfInferenceClient;
pub use hub::ModelHub;
pub use transcription::RemoteTranscriber;

use crate::error::Result;
use crate::types::{Segment, SentimentEntry};
use async_trait::async_trait;

/// Summarization model: returns one summary string for `text`.
///
/// `max_length`/`min_length` bound the REQUEST; the model may overshoot, so
/// callers must not assume an exact character bound on the return value.
/// Called many times per invocation in chunked mode.
#[async_trait]
pub trait SummaryBackend: Send + Sync {
    async fn summarize(&self, text: &str, max_length: usize, min_length: usize) -> Result<String>;
}

/// Sentiment model: classifies a batch of text units.
///
/// Must return one entry per input unit, same order, same count; adapters
/// enforce this and report a count mismatch as `Error::MalformedOutput`.
#[async_trait]
pub trait SentimentBackend: Send + Sync {
    async fn classify(&self, units: &[String]) -> Result<Vec<SentimentEntry>>;
}

/// Sentence-embedding model: one fixed-dimensional dense vector per input
/// string, same order, same count. Semantically similar texts map to nearby
/// vectors under Euclidean/cosine distance.
#[async_trait]
pub trait EmbeddingBackend: Send + Sync {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Free-form text generation for bullet prompts. The output is untrusted
/// text; callers post-process it and fall back when parsing fails.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn generate(&self, prompt: &str, max_tokens: usize) -> Result<String>;
}

/// Audio transcription collaborator (outside the core pipeline).
///
/// Returns the full text plus ordered segments. Backends may legitimately
/// return zero segments or segments without meaningful timestamps; the
/// pipeline tolerates both.
#[async_trait]
pub trait TranscriptionBackend: Send + Sync {
    async fn transcribe(&self, audio_path: &str) -> Result<(String, Vec<Segment>)>;
}
