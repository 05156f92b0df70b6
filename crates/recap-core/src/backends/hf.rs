//! Hugging Face Inference API adapter.
//!
//! One HTTP client covers the four hosted-model collaborators:
//! summarization (distilbart-cnn-12-6), sentiment (SST-2), sentence
//! embeddings (all-MiniLM-L6-v2), and text generation (flan-t5-small).
//! Every response is normalized into the crate's data model here; the
//! provider's native JSON never leaves this file.

use crate::error::{Error, Result};
use crate::types::{SentimentEntry, SentimentLabel};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

use super::{EmbeddingBackend, GenerationBackend, SentimentBackend, SummaryBackend};

const DEFAULT_API_BASE: &str = "https://api-inference.huggingface.co";
const DEFAULT_SUMMARY_MODEL: &str = "sshleifer/distilbart-cnn-12-6";
const DEFAULT_SENTIMENT_MODEL: &str = "distilbert-base-uncased-finetuned-sst-2-english";
const DEFAULT_EMBEDDING_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";
const DEFAULT_GENERATION_MODEL: &str = "google/flan-t5-small";

#[derive(Serialize)]
struct SummaryRequest<'a> {
    inputs: &'a str,
    parameters: SummaryParameters,
}

#[derive(Serialize)]
struct SummaryParameters {
    max_length: usize,
    min_length: usize,
    do_sample: bool,
}

#[derive(Serialize)]
struct BatchRequest<'a> {
    inputs: &'a [String],
}

#[derive(Serialize)]
struct GenerationRequest<'a> {
    inputs: &'a str,
    parameters: GenerationParameters,
}

#[derive(Serialize)]
struct GenerationParameters {
    max_new_tokens: usize,
    do_sample: bool,
}

/// Client for the Hugging Face Inference API.
#[derive(Clone)]
pub struct HfInferenceClient {
    base_url: String,
    api_key: Option<String>,
    summary_model: String,
    sentiment_model: String,
    embedding_model: String,
    generation_model: String,
    client: reqwest::Client,
}

impl HfInferenceClient {
    /// Build from environment: `RECAP_HF_API_URL`, `RECAP_HF_API_KEY`
    /// (optional; anonymous calls are rate-limited), and per-task model
    /// overrides `RECAP_SUMMARY_MODEL` / `RECAP_SENTIMENT_MODEL` /
    /// `RECAP_EMBEDDING_MODEL` / `RECAP_GENERATION_MODEL`.
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("RECAP_HF_API_URL")
            .unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
        let api_key = std::env::var("RECAP_HF_API_KEY")
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        Self::new(base_url, api_key)
    }

    /// Create with explicit configuration.
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| Error::Config(format!("http client: {e}")))?;
        Ok(Self {
            base_url: base_url.into(),
            api_key,
            summary_model: env_model("RECAP_SUMMARY_MODEL", DEFAULT_SUMMARY_MODEL),
            sentiment_model: env_model("RECAP_SENTIMENT_MODEL", DEFAULT_SENTIMENT_MODEL),
            embedding_model: env_model("RECAP_EMBEDDING_MODEL", DEFAULT_EMBEDDING_MODEL),
            generation_model: env_model("RECAP_GENERATION_MODEL", DEFAULT_GENERATION_MODEL),
            client,
        })
    }

    async fn post_model<B: Serialize>(&self, model: &str, body: &B) -> Result<serde_json::Value> {
        let url = format!(
            "{}/models/{}",
            self.base_url.trim_end_matches('/'),
            model
        );
        let mut req = self.client.post(&url).json(body);
        if let Some(ref key) = self.api_key {
            req = req.header("Authorization", format!("Bearer {key}"));
        }

        let res = req.send().await?;
        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(Error::ModelUnavailable(format!(
                "{model} returned {status}: {text}"
            )));
        }

        let value = res
            .json::<serde_json::Value>()
            .await
            .map_err(|e| Error::MalformedOutput(format!("{model}: {e}")))?;
        Ok(value)
    }
}

// The api key must never reach logs or error backtraces.
impl std::fmt::Debug for HfInferenceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HfInferenceClient")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("summary_model", &self.summary_model)
            .field("sentiment_model", &self.sentiment_model)
            .field("embedding_model", &self.embedding_model)
            .field("generation_model", &self.generation_model)
            .finish()
    }
}

fn env_model(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

#[async_trait]
impl SummaryBackend for HfInferenceClient {
    async fn summarize(&self, text: &str, max_length: usize, min_length: usize) -> Result<String> {
        let body = SummaryRequest {
            inputs: text,
            parameters: SummaryParameters {
                max_length,
                min_length,
                do_sample: false,
            },
        };
        let value = self.post_model(&self.summary_model, &body).await?;
        value
            .get(0)
            .and_then(|v| v.get("summary_text"))
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| {
                Error::MalformedOutput(format!(
                    "{}: missing summary_text field",
                    self.summary_model
                ))
            })
    }
}

#[async_trait]
impl SentimentBackend for HfInferenceClient {
    async fn classify(&self, units: &[String]) -> Result<Vec<SentimentEntry>> {
        let body = BatchRequest { inputs: units };
        let value = self.post_model(&self.sentiment_model, &body).await?;

        // One ranked label list per input unit; the head is the winner.
        let rows = value.as_array().ok_or_else(|| {
            Error::MalformedOutput(format!("{}: expected array response", self.sentiment_model))
        })?;
        if rows.len() != units.len() {
            return Err(Error::MalformedOutput(format!(
                "{}: {} classifications for {} units",
                self.sentiment_model,
                rows.len(),
                units.len()
            )));
        }

        let mut entries = Vec::with_capacity(units.len());
        for (unit, row) in units.iter().zip(rows) {
            let top = row.get(0).unwrap_or(row);
            let label = top
                .get("label")
                .and_then(|v| v.as_str())
                .ok_or_else(|| {
                    Error::MalformedOutput(format!("{}: missing label", self.sentiment_model))
                })?;
            let confidence = top
                .get("score")
                .and_then(|v| v.as_f64())
                .unwrap_or(0.0) as f32;
            entries.push(SentimentEntry {
                unit_text: unit.clone(),
                label: SentimentLabel::from_raw(label),
                confidence,
            });
        }
        Ok(entries)
    }
}

#[async_trait]
impl EmbeddingBackend for HfInferenceClient {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let body = BatchRequest { inputs: texts };
        let value = self.post_model(&self.embedding_model, &body).await?;

        let rows = value.as_array().ok_or_else(|| {
            Error::MalformedOutput(format!("{}: expected array response", self.embedding_model))
        })?;
        if rows.len() != texts.len() {
            return Err(Error::MalformedOutput(format!(
                "{}: {} vectors for {} texts",
                self.embedding_model,
                rows.len(),
                texts.len()
            )));
        }

        rows.iter()
            .map(|row| normalize_vector(row, &self.embedding_model))
            .collect()
    }
}

/// Accept either a sentence vector or token-level vectors (mean-pooled);
/// sentence-transformers models on the API can return either shape.
fn normalize_vector(row: &serde_json::Value, model: &str) -> Result<Vec<f32>> {
    let items = row
        .as_array()
        .ok_or_else(|| Error::MalformedOutput(format!("{model}: expected vector")))?;

    if items.iter().all(|v| v.is_number()) {
        return items
            .iter()
            .map(|v| {
                v.as_f64()
                    .map(|f| f as f32)
                    .ok_or_else(|| Error::MalformedOutput(format!("{model}: non-numeric value")))
            })
            .collect();
    }

    // Token-level: mean-pool the rows.
    let token_vectors: Vec<Vec<f32>> = items
        .iter()
        .map(|v| normalize_vector(v, model))
        .collect::<Result<_>>()?;
    let dim = token_vectors
        .first()
        .map(|v| v.len())
        .filter(|&d| d > 0)
        .ok_or_else(|| Error::MalformedOutput(format!("{model}: empty embedding")))?;
    let mut pooled = vec![0.0f32; dim];
    for vector in &token_vectors {
        if vector.len() != dim {
            return Err(Error::MalformedOutput(format!(
                "{model}: ragged token embeddings"
            )));
        }
        for (acc, v) in pooled.iter_mut().zip(vector) {
            *acc += v;
        }
    }
    for v in &mut pooled {
        *v /= token_vectors.len() as f32;
    }
    Ok(pooled)
}

#[async_trait]
impl GenerationBackend for HfInferenceClient {
    async fn generate(&self, prompt: &str, max_tokens: usize) -> Result<String> {
        let body = GenerationRequest {
            inputs: prompt,
            parameters: GenerationParameters {
                max_new_tokens: max_tokens,
                do_sample: false,
            },
        };
        let value = self.post_model(&self.generation_model, &body).await?;
        value
            .get(0)
            .and_then(|v| v.get("generated_text"))
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| {
                Error::MalformedOutput(format!(
                    "{}: missing generated_text field",
                    self.generation_model
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_redacts_the_api_key() {
        let client =
            HfInferenceClient::new("https://example.test", Some("hf_secret_token".to_string()))
                .unwrap();
        let printed = format!("{client:?}");
        assert!(!printed.contains("hf_secret_token"));
        assert!(printed.contains("<redacted>"));
        assert!(printed.contains("https://example.test"));
    }
}
