//! Segment-level sentiment aggregation.
//!
//! The transcript is split into paragraph units (blank-line delimited) and
//! a capped number of them is classified in one batch call; the cap bounds
//! model cost on long transcripts. Units beyond the cap are neither
//! classified nor counted.

use crate::backends::SentimentBackend;
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::types::SentimentReport;
use std::sync::Arc;
use tracing::debug;

pub struct SentimentAnalyzer {
    backend: Arc<dyn SentimentBackend>,
    unit_cap: usize,
}

/// Blank-line delimited paragraph units, trimmed, blanks dropped. Also
/// used by the orchestrator's segment derivation, so CRLF and LF
/// transcripts split the same way everywhere.
pub(crate) fn paragraph_units(text: &str) -> Vec<String> {
    text.split("\n\n")
        .flat_map(|block| block.split("\r\n\r\n"))
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

impl SentimentAnalyzer {
    pub fn new(backend: Arc<dyn SentimentBackend>, config: &PipelineConfig) -> Self {
        Self {
            backend,
            unit_cap: config.sentiment_unit_cap,
        }
    }

    /// Classify up to the unit cap of paragraphs and aggregate the counts.
    ///
    /// When the text has no non-blank paragraph units the whole text is
    /// classified as a single unit instead of returning an empty report.
    pub async fn analyze(&self, text: &str) -> Result<SentimentReport> {
        let mut units = paragraph_units(text);
        units.truncate(self.unit_cap);

        if units.is_empty() {
            units = vec![text.to_string()];
        }
        debug!(units = units.len(), "classifying sentiment units");

        let entries = self.backend.classify(&units).await?;
        Ok(SentimentReport::from_entries(entries))
    }
}
