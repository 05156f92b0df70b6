//! Pipeline configuration loaded from the environment.
//!
//! Every knob has a default taken from the reference deployment; set the
//! `RECAP_*` variables to change behavior without code edits.

use serde::{Deserialize, Serialize};

fn default_chunk_size() -> usize {
    700
}

fn default_short_text_threshold() -> usize {
    1000
}

fn default_chunk_summary_max_len() -> usize {
    120
}

fn default_chunk_summary_min_len() -> usize {
    30
}

fn default_short_summary_len() -> usize {
    120
}

fn default_long_summary_len() -> usize {
    400
}

fn default_keyphrase_top_k() -> usize {
    15
}

fn default_keyphrase_ngram() -> usize {
    3
}

fn default_sentiment_unit_cap() -> usize {
    12
}

fn default_cluster_k() -> usize {
    3
}

fn default_bullet_count() -> usize {
    5
}

fn default_stage_timeout_secs() -> u64 {
    60
}

/// Tunables for one pipeline invocation.
///
/// | Env | Default | Description |
/// |-----|---------|-------------|
/// | RECAP_CHUNK_SIZE | 700 | Summarizer chunk size in characters. Approximates the summarization model's token window; not a token-exact bound. |
/// | RECAP_SHORT_TEXT_THRESHOLD | 1000 | Below this many characters the summarizer makes a single direct call. |
/// | RECAP_KEYPHRASE_TOP_K | 15 | Keyphrases returned per transcript. |
/// | RECAP_SENTIMENT_UNIT_CAP | 12 | Max paragraph units classified per transcript (bounds model cost). |
/// | RECAP_CLUSTER_K | 3 | Requested topic cluster count (capped at segment count). |
/// | RECAP_BULLET_COUNT | 5 | Resume bullets requested from the short summary. |
/// | RECAP_STAGE_TIMEOUT_SECS | 60 | Per-stage timeout for model-backed stages. |
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_short_text_threshold")]
    pub short_text_threshold: usize,
    /// Per-chunk summary length cap used during the map pass.
    #[serde(default = "default_chunk_summary_max_len")]
    pub chunk_summary_max_len: usize,
    #[serde(default = "default_chunk_summary_min_len")]
    pub chunk_summary_min_len: usize,
    /// `max_length` for the short summary request.
    #[serde(default = "default_short_summary_len")]
    pub short_summary_len: usize,
    /// `max_length` for the long summary request.
    #[serde(default = "default_long_summary_len")]
    pub long_summary_len: usize,
    #[serde(default = "default_keyphrase_top_k")]
    pub keyphrase_top_k: usize,
    /// Maximum words per keyphrase candidate.
    #[serde(default = "default_keyphrase_ngram")]
    pub keyphrase_ngram: usize,
    #[serde(default = "default_sentiment_unit_cap")]
    pub sentiment_unit_cap: usize,
    #[serde(default = "default_cluster_k")]
    pub cluster_k: usize,
    #[serde(default = "default_bullet_count")]
    pub bullet_count: usize,
    #[serde(default = "default_stage_timeout_secs")]
    pub stage_timeout_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            short_text_threshold: default_short_text_threshold(),
            chunk_summary_max_len: default_chunk_summary_max_len(),
            chunk_summary_min_len: default_chunk_summary_min_len(),
            short_summary_len: default_short_summary_len(),
            long_summary_len: default_long_summary_len(),
            keyphrase_top_k: default_keyphrase_top_k(),
            keyphrase_ngram: default_keyphrase_ngram(),
            sentiment_unit_cap: default_sentiment_unit_cap(),
            cluster_k: default_cluster_k(),
            bullet_count: default_bullet_count(),
            stage_timeout_secs: default_stage_timeout_secs(),
        }
    }
}

impl PipelineConfig {
    /// Load tunables from environment. Unset or unparseable => defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            chunk_size: env_usize("RECAP_CHUNK_SIZE", defaults.chunk_size).max(1),
            short_text_threshold: env_usize(
                "RECAP_SHORT_TEXT_THRESHOLD",
                defaults.short_text_threshold,
            ),
            chunk_summary_max_len: env_usize(
                "RECAP_CHUNK_SUMMARY_MAX_LEN",
                defaults.chunk_summary_max_len,
            ),
            chunk_summary_min_len: env_usize(
                "RECAP_CHUNK_SUMMARY_MIN_LEN",
                defaults.chunk_summary_min_len,
            ),
            short_summary_len: env_usize("RECAP_SHORT_SUMMARY_LEN", defaults.short_summary_len),
            long_summary_len: env_usize("RECAP_LONG_SUMMARY_LEN", defaults.long_summary_len),
            keyphrase_top_k: env_usize("RECAP_KEYPHRASE_TOP_K", defaults.keyphrase_top_k),
            keyphrase_ngram: env_usize("RECAP_KEYPHRASE_NGRAM", defaults.keyphrase_ngram).max(1),
            sentiment_unit_cap: env_usize("RECAP_SENTIMENT_UNIT_CAP", defaults.sentiment_unit_cap)
                .max(1),
            cluster_k: env_usize("RECAP_CLUSTER_K", defaults.cluster_k).max(1),
            bullet_count: env_usize("RECAP_BULLET_COUNT", defaults.bullet_count),
            stage_timeout_secs: env_u64("RECAP_STAGE_TIMEOUT_SECS", defaults.stage_timeout_secs)
                .max(1),
        }
    }
}

fn env_usize(name: &str, default: usize) -> usize {
    match std::env::var(name) {
        Ok(v) => v.trim().parse().unwrap_or(default),
        Err(_) => default,
    }
}

fn env_u64(name: &str, default: u64) -> u64 {
    match std::env::var(name) {
        Ok(v) => v.trim().parse().unwrap_or(default),
        Err(_) => default,
    }
}
