//! Pipeline orchestrator: one invocation, one `PipelineResult`.
//!
//! Stages with no data dependency (sentiment, clustering, and the two
//! summary passes) run concurrently; bullet generation waits for the short
//! summary. A recoverable stage failure is degraded to an `Unavailable`
//! marker in the result instead of aborting its siblings; empty input and
//! non-recoverable errors abort the run.

use crate::backends::ModelHub;
use crate::bullets::BulletGenerator;
use crate::cluster::TopicClusterer;
use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::keyphrase::extract_keyphrases;
use crate::sentiment::{paragraph_units, SentimentAnalyzer};
use crate::summarize::Summarizer;
use crate::types::{PipelineResult, Segment, StageOutcome, SummaryPair};
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{info, warn};

/// Raw input for one invocation: pasted text, or the transcription
/// collaborator's `(text, segments)` pair.
#[derive(Debug, Clone)]
pub enum PipelineInput {
    Text(String),
    Transcribed {
        text: String,
        segments: Vec<Segment>,
    },
}

impl From<String> for PipelineInput {
    fn from(text: String) -> Self {
        PipelineInput::Text(text)
    }
}

impl From<&str> for PipelineInput {
    fn from(text: &str) -> Self {
        PipelineInput::Text(text.to_string())
    }
}

/// Derive segments from pasted text: blank-line paragraphs first, falling
/// back to sentence boundaries for single-block input. All derived segments
/// carry the timing-unknown sentinel.
fn derive_segments(text: &str) -> Vec<Segment> {
    let paragraphs: Vec<Segment> = paragraph_units(text)
        .into_iter()
        .map(Segment::untimed)
        .collect();
    if paragraphs.len() > 1 {
        return paragraphs;
    }

    let sentences: Vec<Segment> = text
        .split(". ")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(Segment::untimed)
        .collect();
    if !sentences.is_empty() {
        sentences
    } else {
        paragraphs
    }
}

pub struct Pipeline {
    hub: ModelHub,
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(hub: ModelHub, config: PipelineConfig) -> Self {
        Self { hub, config }
    }

    /// Pipeline over the process-wide shared model hub with env config.
    pub fn from_env() -> Result<Self> {
        let hub = ModelHub::shared()?;
        Ok(Self::new((*hub).clone(), PipelineConfig::from_env()))
    }

    /// Run the full analysis over one input and assemble the result bundle.
    ///
    /// Returns `Error::Input` when there is neither text nor segments.
    /// Recoverable model failures are scoped to their stage; configuration
    /// and io errors propagate.
    pub async fn run(&self, input: impl Into<PipelineInput>) -> Result<PipelineResult> {
        let (transcript, segments) = self.normalize_input(input.into())?;
        let segment_texts: Vec<String> = segments.iter().map(|s| s.text.clone()).collect();
        info!(
            chars = transcript.chars().count(),
            segments = segments.len(),
            "pipeline run started"
        );

        let summarizer = Summarizer::new(self.hub.summary.clone(), &self.config);
        let sentiment = SentimentAnalyzer::new(self.hub.sentiment.clone(), &self.config);
        let clusterer = TopicClusterer::new(self.hub.embedding.clone());

        // Keyphrase extraction is a pure local function of the transcript
        // (the full transcript, not a summary) and cannot fail.
        let keyphrases = StageOutcome::ready(extract_keyphrases(
            &transcript,
            self.config.keyphrase_ngram,
            self.config.keyphrase_top_k,
        ));

        let (summaries, sentiment, clusters) = tokio::join!(
            self.stage("summaries", async {
                let short = summarizer
                    .summarize(&transcript, self.config.short_summary_len)
                    .await?;
                let long = summarizer
                    .summarize(&transcript, self.config.long_summary_len)
                    .await?;
                Ok(SummaryPair { short, long })
            }),
            self.stage("sentiment", sentiment.analyze(&transcript)),
            self.stage(
                "clusters",
                clusterer.cluster(&segment_texts, self.config.cluster_k)
            ),
        );
        let (summaries, sentiment, clusters) = (summaries?, sentiment?, clusters?);

        // Bullets strictly depend on the short summary.
        let bullets = match summaries.value() {
            Some(pair) => {
                let generator = BulletGenerator::new(self.hub.generation.clone());
                self.stage(
                    "bullets",
                    generator.generate(&pair.short, self.config.bullet_count),
                )
                .await?
            }
            None => StageOutcome::unavailable("short summary unavailable"),
        };

        Ok(PipelineResult {
            transcript,
            segments,
            summaries,
            keyphrases,
            sentiment,
            clusters,
            bullets,
        })
    }

    /// Run one model-backed stage under the per-stage timeout. Recoverable
    /// failures (model down, malformed output) and timeouts are degraded to
    /// an `Unavailable` marker and logged so no error disappears silently;
    /// anything else (config, io) is a caller problem and propagates.
    async fn stage<T, F>(&self, name: &str, fut: F) -> Result<StageOutcome<T>>
    where
        F: Future<Output = Result<T>>,
    {
        let limit = Duration::from_secs(self.config.stage_timeout_secs);
        match timeout(limit, fut).await {
            Ok(Ok(value)) => Ok(StageOutcome::ready(value)),
            Ok(Err(e)) if e.is_stage_recoverable() => {
                warn!(stage = name, error = %e, "stage failed, marking unavailable");
                Ok(StageOutcome::unavailable(e.to_string()))
            }
            Ok(Err(e)) => Err(e),
            Err(_) => {
                warn!(stage = name, timeout_secs = limit.as_secs(), "stage timed out");
                Ok(StageOutcome::unavailable(format!(
                    "timed out after {}s",
                    limit.as_secs()
                )))
            }
        }
    }

    fn normalize_input(&self, input: PipelineInput) -> Result<(String, Vec<Segment>)> {
        let (text, segments) = match input {
            PipelineInput::Text(text) => (text, Vec::new()),
            PipelineInput::Transcribed { text, segments } => (text, segments),
        };

        if text.trim().is_empty() && segments.is_empty() {
            return Err(Error::Input(
                "neither transcript text nor segments were provided".to_string(),
            ));
        }

        // A segments-only input still needs a transcript for the text-wide
        // stages; rebuild it from the segment texts.
        let text = if text.trim().is_empty() {
            segments
                .iter()
                .map(|s| s.text.as_str())
                .collect::<Vec<_>>()
                .join("\n\n")
        } else {
            text
        };

        let segments = if segments.is_empty() {
            derive_segments(&text)
        } else {
            segments
        };

        Ok((text, segments))
    }
}
