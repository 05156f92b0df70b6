//! Remote transcription adapter (OpenAI-compatible Whisper endpoint).
//!
//! Uploads the audio file as multipart form data and normalizes the
//! response into `(text, segments)`. Some hosted Whisper deployments do not
//! return segments at all; in that case pseudo-segments are derived by
//! sentence splitting, with the timing-unknown sentinel.

use crate::error::{Error, Result};
use crate::types::Segment;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use super::TranscriptionBackend;

const DEFAULT_STT_MODEL: &str = "whisper-large-v3";

#[derive(Deserialize)]
struct TranscriptionResponse {
    text: Option<String>,
    #[serde(default)]
    segments: Vec<RawSegment>,
}

#[derive(Deserialize)]
struct RawSegment {
    #[serde(default)]
    start: f64,
    #[serde(default)]
    end: f64,
    text: String,
}

/// Whisper-compatible transcription API client.
#[derive(Clone)]
pub struct RemoteTranscriber {
    /// Full transcription endpoint URL.
    endpoint: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl RemoteTranscriber {
    /// Build from environment: `RECAP_STT_API_URL` (base, e.g.
    /// https://api.groq.com/openai/v1), `RECAP_STT_API_KEY`, and
    /// `RECAP_STT_MODEL` (default whisper-large-v3).
    pub fn from_env() -> Result<Self> {
        let base = std::env::var("RECAP_STT_API_URL")
            .map_err(|_| Error::Config("RECAP_STT_API_URL is not set".to_string()))?;
        let api_key = std::env::var("RECAP_STT_API_KEY")
            .map_err(|_| Error::Config("RECAP_STT_API_KEY is not set".to_string()))?;
        let model = std::env::var("RECAP_STT_MODEL")
            .unwrap_or_else(|_| DEFAULT_STT_MODEL.to_string());
        Self::new(base, api_key, model)
    }

    /// Create with explicit configuration.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| Error::Config(format!("http client: {e}")))?;
        let base: String = base_url.into();
        Ok(Self {
            endpoint: format!("{}/audio/transcriptions", base.trim_end_matches('/')),
            api_key: api_key.into(),
            model: model.into(),
            client,
        })
    }
}

// The api key must never reach logs or error backtraces.
impl std::fmt::Debug for RemoteTranscriber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteTranscriber")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .finish()
    }
}

/// Fallback segmentation when the backend returns no segments: split on
/// sentence boundaries with the timing-unknown sentinel.
fn pseudo_segments(text: &str) -> Vec<Segment> {
    text.split(". ")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(Segment::untimed)
        .collect()
}

#[async_trait]
impl TranscriptionBackend for RemoteTranscriber {
    async fn transcribe(&self, audio_path: &str) -> Result<(String, Vec<Segment>)> {
        let bytes = tokio::fs::read(audio_path).await?;
        let file_name = std::path::Path::new(audio_path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio.wav".to_string());

        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name);
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("model", self.model.clone())
            .text("response_format", "verbose_json");

        let res = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .multipart(form)
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(Error::ModelUnavailable(format!(
                "transcription API returned {status}: {body}"
            )));
        }

        let parsed: TranscriptionResponse = res
            .json()
            .await
            .map_err(|e| Error::MalformedOutput(format!("transcription response: {e}")))?;

        let text = parsed
            .text
            .ok_or_else(|| {
                Error::MalformedOutput("transcription response missing text field".to_string())
            })?;

        let segments: Vec<Segment> = parsed
            .segments
            .into_iter()
            .map(|s| Segment {
                start: s.start.max(0.0),
                end: s.end.max(s.start.max(0.0)),
                text: s.text.trim().to_string(),
            })
            .filter(|s| !s.text.is_empty())
            .collect();

        let segments = if segments.is_empty() {
            pseudo_segments(&text)
        } else {
            segments
        };

        Ok((text, segments))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pseudo_segments_split_on_sentence_boundaries() {
        let segs = pseudo_segments("We approved the budget. We will hire two engineers. ");
        assert_eq!(segs.len(), 2);
        assert_eq!(segs[0].text, "We approved the budget");
        assert!(segs.iter().all(|s| s.start == 0.0 && s.end == 0.0));
    }

    #[test]
    fn pseudo_segments_of_empty_text_are_empty() {
        assert!(pseudo_segments("").is_empty());
        assert!(pseudo_segments("   ").is_empty());
    }

    #[test]
    fn debug_output_redacts_the_api_key() {
        let t = RemoteTranscriber::new("https://example.test/v1", "sk_secret_token", "whisper-1")
            .unwrap();
        let printed = format!("{t:?}");
        assert!(!printed.contains("sk_secret_token"));
        assert!(printed.contains("<redacted>"));
    }
}
