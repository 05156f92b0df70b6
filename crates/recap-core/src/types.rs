//! Data model for pipeline inputs and the assembled result bundle.

use serde::{Deserialize, Serialize};

/// One semantically coherent unit of transcript text (sentence, utterance,
/// or paragraph), with timing in seconds.
///
/// When no timing information exists (pasted text, or a transcription
/// backend that returns none), `start == end == 0.0` is the "timing
/// unknown" sentinel; consumers must not assume `end > start`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

impl Segment {
    /// Segment with the timing-unknown sentinel.
    pub fn untimed(text: impl Into<String>) -> Self {
        Self {
            start: 0.0,
            end: 0.0,
            text: text.into(),
        }
    }
}

/// Short and long summaries derived from the same transcript.
///
/// `short` is the more compressed of the two and is the only one fed into
/// bullet generation. `short.len() <= long.len()` is desired but not
/// enforced (the underlying model may overshoot either request).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummaryPair {
    pub short: String,
    pub long: String,
}

/// Sentiment class assigned to one text unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    /// Anything the model labeled outside the positive/negative classes.
    Neutral,
}

impl SentimentLabel {
    /// Map a model's raw label string, case-insensitive prefix match on the
    /// positive/negative class names. Unrecognized labels become `Neutral`.
    pub fn from_raw(raw: &str) -> Self {
        let lower = raw.trim().to_ascii_lowercase();
        if lower.starts_with("pos") {
            SentimentLabel::Positive
        } else if lower.starts_with("neg") {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }
}

/// Classification of one unit: the unit text, its label, and the model's
/// confidence in [0, 1].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentEntry {
    pub unit_text: String,
    pub label: SentimentLabel,
    pub confidence: f32,
}

/// Per-unit sentiment detail plus aggregate counts.
///
/// `positive_count + negative_count <= detail.len()`; neutral units are
/// listed in `detail` but counted in neither aggregate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SentimentReport {
    pub positive_count: usize,
    pub negative_count: usize,
    pub detail: Vec<SentimentEntry>,
}

impl SentimentReport {
    /// Build a report from classified units, deriving the counts.
    pub fn from_entries(detail: Vec<SentimentEntry>) -> Self {
        let positive_count = detail
            .iter()
            .filter(|e| e.label == SentimentLabel::Positive)
            .count();
        let negative_count = detail
            .iter()
            .filter(|e| e.label == SentimentLabel::Negative)
            .count();
        Self {
            positive_count,
            negative_count,
            detail,
        }
    }
}

/// Topic clusters over segment texts.
///
/// Cluster ids are dense integers `0..k-1` (index into `clusters`); every
/// input segment text appears in exactly one cluster, in input order within
/// its cluster.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterSet {
    pub clusters: Vec<Vec<String>>,
}

impl ClusterSet {
    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// Number of clusters (`effective_k`).
    pub fn len(&self) -> usize {
        self.clusters.len()
    }
}

/// Outcome of one pipeline stage: the value, or an explicit marker that the
/// stage failed with the reason it failed.
///
/// A stage never appears to have succeeded with an empty result when it
/// actually failed; the marker is the record of the failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum StageOutcome<T> {
    Ready { value: T },
    Unavailable { reason: String },
}

impl<T> StageOutcome<T> {
    pub fn ready(value: T) -> Self {
        StageOutcome::Ready { value }
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        StageOutcome::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, StageOutcome::Ready { .. })
    }

    /// The stage value, if the stage succeeded.
    pub fn value(&self) -> Option<&T> {
        match self {
            StageOutcome::Ready { value } => Some(value),
            StageOutcome::Unavailable { .. } => None,
        }
    }
}

/// Everything one pipeline invocation produced, assembled once and handed
/// to the caller by value. Rendering is the caller's concern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    /// Full transcript text, the source of truth for all derived fields.
    pub transcript: String,
    /// Segments supplied by the caller or derived from the transcript.
    pub segments: Vec<Segment>,
    pub summaries: StageOutcome<SummaryPair>,
    pub keyphrases: StageOutcome<Vec<String>>,
    pub sentiment: StageOutcome<SentimentReport>,
    pub clusters: StageOutcome<ClusterSet>,
    pub bullets: StageOutcome<Vec<String>>,
}
