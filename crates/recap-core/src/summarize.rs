//! Two-level map-reduce summarization for long transcripts.
//!
//! The summarization model has a fixed input window, so an hour-long
//! transcript cannot be summarized in one call: long texts are chunked,
//! each chunk summarized with a smaller cap, and the newline-joined partial
//! summaries reduced with a second pass. `max_length` bounds the request,
//! not the response; the model may overshoot.

use crate::backends::SummaryBackend;
use crate::chunk::chunk_text;
use crate::config::PipelineConfig;
use crate::error::Result;
use std::sync::Arc;
use tracing::debug;

pub struct Summarizer {
    backend: Arc<dyn SummaryBackend>,
    chunk_size: usize,
    short_text_threshold: usize,
    chunk_max_len: usize,
    chunk_min_len: usize,
}

impl Summarizer {
    pub fn new(backend: Arc<dyn SummaryBackend>, config: &PipelineConfig) -> Self {
        Self {
            backend,
            // from_env clamps too, but the config struct can be hand-built.
            chunk_size: config.chunk_size.max(1),
            short_text_threshold: config.short_text_threshold,
            chunk_max_len: config.chunk_summary_max_len,
            chunk_min_len: config.chunk_summary_min_len,
        }
    }

    /// Summarize `text` with the request bounded by `max_length`.
    ///
    /// Empty or whitespace-only text returns an empty summary without a
    /// model call. Texts under the short-text threshold are summarized in
    /// one direct call; longer texts go through chunk-then-reduce. The
    /// chunk size is independent of `max_length`.
    pub async fn summarize(&self, text: &str, max_length: usize) -> Result<String> {
        if text.trim().is_empty() {
            return Ok(String::new());
        }

        let min_length = self.chunk_min_len.min(max_length);
        if text.chars().count() < self.short_text_threshold {
            return self.backend.summarize(text, max_length, min_length).await;
        }

        let chunks = chunk_text(text, self.chunk_size);
        debug!(chunks = chunks.len(), "summarizing in chunked mode");

        let mut partials = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
            // Blank slices of the transcript would make a nonsense request.
            if chunk.text.trim().is_empty() {
                continue;
            }
            let partial = self
                .backend
                .summarize(&chunk.text, self.chunk_max_len, self.chunk_min_len)
                .await?;
            partials.push(partial);
        }

        if partials.is_empty() {
            return Ok(String::new());
        }

        // Reduce pass over the concatenated partials, in chunk order.
        let combined = partials.join("\n");
        self.backend
            .summarize(&combined, max_length, min_length)
            .await
    }
}
