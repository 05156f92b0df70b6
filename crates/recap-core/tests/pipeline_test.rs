//! End-to-end pipeline tests over counting mock backends.
//!
//! Run with: `cargo test --test pipeline_test`

use async_trait::async_trait;
use recap_core::backends::{
    EmbeddingBackend, GenerationBackend, ModelHub, SentimentBackend, SummaryBackend,
};
use recap_core::{
    Error, Pipeline, PipelineConfig, PipelineInput, Result, Segment, SentimentEntry,
    SentimentLabel, StageOutcome,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Default)]
struct MockSummary {
    calls: AtomicUsize,
    /// When true, return an empty summary (models sometimes produce none).
    return_empty: bool,
}

#[async_trait]
impl SummaryBackend for MockSummary {
    async fn summarize(&self, text: &str, max_length: usize, _min_length: usize) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.return_empty {
            return Ok(String::new());
        }
        let head: String = text.chars().take(max_length.min(32)).collect();
        Ok(format!("summary: {}", head.trim()))
    }
}

#[derive(Default)]
struct MockSentiment {
    calls: AtomicUsize,
}

#[async_trait]
impl SentimentBackend for MockSentiment {
    async fn classify(&self, units: &[String]) -> Result<Vec<SentimentEntry>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(units
            .iter()
            .map(|u| SentimentEntry {
                unit_text: u.clone(),
                label: if u.contains("approved") {
                    SentimentLabel::Positive
                } else {
                    SentimentLabel::Neutral
                },
                confidence: 0.87,
            })
            .collect())
    }
}

/// Sentiment backend that never answers; the stage timeout has to fire.
struct StalledSentiment;

#[async_trait]
impl SentimentBackend for StalledSentiment {
    async fn classify(&self, _units: &[String]) -> Result<Vec<SentimentEntry>> {
        tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
        unreachable!("stalled backend should be timed out first")
    }
}

/// Sentiment backend that fails outright, as a remote model would on a
/// network error.
struct BrokenSentiment;

#[async_trait]
impl SentimentBackend for BrokenSentiment {
    async fn classify(&self, _units: &[String]) -> Result<Vec<SentimentEntry>> {
        Err(Error::ModelUnavailable("connection refused".to_string()))
    }
}

/// Sentiment backend with a broken configuration; not a transient model
/// failure, so the run must not paper over it.
struct MisconfiguredSentiment;

#[async_trait]
impl SentimentBackend for MisconfiguredSentiment {
    async fn classify(&self, _units: &[String]) -> Result<Vec<SentimentEntry>> {
        Err(Error::Config("sentiment model name is empty".to_string()))
    }
}

#[derive(Default)]
struct MockEmbedder {
    calls: AtomicUsize,
}

#[async_trait]
impl EmbeddingBackend for MockEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts
            .iter()
            .map(|t| {
                vec![
                    t.matches("budget").count() as f32 * 8.0,
                    t.matches("hire").count() as f32 * 8.0,
                    t.len() as f32 / 50.0,
                ]
            })
            .collect())
    }
}

#[derive(Default)]
struct MockGenerator {
    calls: AtomicUsize,
}

#[async_trait]
impl GenerationBackend for MockGenerator {
    async fn generate(&self, _prompt: &str, _max_tokens: usize) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok("- Approved the Q1 budget\n- Planned two engineering hires".to_string())
    }
}

struct Fixture {
    summary: Arc<MockSummary>,
    sentiment_calls: Arc<MockSentiment>,
    embedder: Arc<MockEmbedder>,
    generator: Arc<MockGenerator>,
    pipeline: Pipeline,
}

fn fixture_with_sentiment(sentiment: Arc<dyn SentimentBackend>) -> Fixture {
    let summary = Arc::new(MockSummary::default());
    let sentiment_calls = Arc::new(MockSentiment::default());
    let embedder = Arc::new(MockEmbedder::default());
    let generator = Arc::new(MockGenerator::default());
    let hub = ModelHub::new(
        summary.clone(),
        sentiment,
        embedder.clone(),
        generator.clone(),
    );
    Fixture {
        summary,
        sentiment_calls,
        embedder,
        generator,
        pipeline: Pipeline::new(hub, PipelineConfig::default()),
    }
}

fn fixture() -> Fixture {
    let summary = Arc::new(MockSummary::default());
    let sentiment_calls = Arc::new(MockSentiment::default());
    let embedder = Arc::new(MockEmbedder::default());
    let generator = Arc::new(MockGenerator::default());
    let hub = ModelHub::new(
        summary.clone(),
        sentiment_calls.clone(),
        embedder.clone(),
        generator.clone(),
    );
    Fixture {
        summary,
        sentiment_calls,
        embedder,
        generator,
        pipeline: Pipeline::new(hub, PipelineConfig::default()),
    }
}

const TWO_PARAGRAPHS: &str = "We discussed the Q1 budget and approved it.\n\nWe also agreed to hire two engineers next quarter.";

#[tokio::test]
async fn empty_input_aborts_with_input_error() {
    let f = fixture();
    let err = f.pipeline.run("").await.unwrap_err();
    assert!(matches!(err, Error::Input(_)));

    let err = f
        .pipeline
        .run(PipelineInput::Transcribed {
            text: "   ".to_string(),
            segments: Vec::new(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Input(_)));

    // No partial result means no model was ever consulted.
    assert_eq!(f.summary.calls.load(Ordering::SeqCst), 0);
    assert_eq!(f.generator.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn two_paragraph_input_produces_full_bundle() {
    let f = fixture();
    let result = f.pipeline.run(TWO_PARAGRAPHS).await.unwrap();

    assert_eq!(result.transcript, TWO_PARAGRAPHS);

    // Derived segments are exactly the two paragraphs, timing unknown.
    assert_eq!(result.segments.len(), 2);
    assert_eq!(
        result.segments[0].text,
        "We discussed the Q1 budget and approved it."
    );
    assert_eq!(
        result.segments[1].text,
        "We also agreed to hire two engineers next quarter."
    );
    assert!(result.segments.iter().all(|s| s.start == 0.0 && s.end == 0.0));

    // With two segments and requested k = 3, effective_k is 2, one
    // segment per cluster.
    let clusters = result.clusters.value().expect("clusters ready");
    assert_eq!(clusters.len(), 2);
    assert!(clusters.clusters.iter().all(|c| c.len() == 1));

    let summaries = result.summaries.value().expect("summaries ready");
    assert!(!summaries.short.is_empty());
    assert!(!summaries.long.is_empty());

    let sentiment = result.sentiment.value().expect("sentiment ready");
    assert_eq!(sentiment.detail.len(), 2);
    assert_eq!(sentiment.positive_count, 1);

    assert!(result.keyphrases.is_ready());

    let bullets = result.bullets.value().expect("bullets ready");
    assert_eq!(bullets.len(), 2);
    assert!(bullets[0].starts_with("Approved"));
    assert_eq!(f.generator.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn long_transcript_summarizes_in_chunks() {
    let f = fixture();
    let text = "The committee walked through the quarterly budget line by line. "
        .repeat(80); // ~5100 characters
    assert!(text.chars().count() >= 5000);

    let result = f.pipeline.run(text.as_str()).await.unwrap();
    assert!(result.summaries.is_ready());

    // Each summary pass must have chunked: at least two chunk-level calls
    // plus a reduce call, twice (short + long).
    let calls = f.summary.calls.load(Ordering::SeqCst);
    let chunks = text.chars().count().div_ceil(700);
    assert!(chunks >= 2);
    assert_eq!(calls, 2 * (chunks + 1));
}

#[tokio::test(start_paused = true)]
async fn stalled_sentiment_times_out_but_siblings_survive() {
    let f = fixture_with_sentiment(Arc::new(StalledSentiment));
    let result = f.pipeline.run(TWO_PARAGRAPHS).await.unwrap();

    match &result.sentiment {
        StageOutcome::Unavailable { reason } => {
            assert!(reason.contains("timed out"), "unexpected reason: {reason}");
        }
        StageOutcome::Ready { .. } => panic!("sentiment should have timed out"),
    }

    // Siblings from the same input are fully populated.
    let keyphrases = result.keyphrases.value().expect("keyphrases ready");
    assert!(!keyphrases.is_empty());
    let clusters = result.clusters.value().expect("clusters ready");
    assert_eq!(clusters.len(), 2);
    assert_eq!(f.embedder.calls.load(Ordering::SeqCst), 1);
    assert!(result.summaries.is_ready());
    assert!(result.bullets.is_ready());
}

#[tokio::test]
async fn broken_sentiment_is_marked_unavailable_not_fatal() {
    let f = fixture_with_sentiment(Arc::new(BrokenSentiment));
    let result = f.pipeline.run(TWO_PARAGRAPHS).await.unwrap();

    match &result.sentiment {
        StageOutcome::Unavailable { reason } => {
            assert!(reason.contains("connection refused"));
        }
        StageOutcome::Ready { .. } => panic!("sentiment should be unavailable"),
    }
    assert!(result.clusters.is_ready());
    assert!(result.keyphrases.is_ready());
}

#[tokio::test]
async fn configuration_error_in_a_stage_fails_the_run() {
    let f = fixture_with_sentiment(Arc::new(MisconfiguredSentiment));
    let err = f.pipeline.run(TWO_PARAGRAPHS).await.unwrap_err();
    assert!(matches!(err, Error::Config(_)), "got: {err}");
}

#[tokio::test]
async fn empty_short_summary_skips_bullet_generation() {
    let summary = Arc::new(MockSummary {
        calls: AtomicUsize::new(0),
        return_empty: true,
    });
    let generator = Arc::new(MockGenerator::default());
    let hub = ModelHub::new(
        summary,
        Arc::new(MockSentiment::default()),
        Arc::new(MockEmbedder::default()),
        generator.clone(),
    );
    let pipeline = Pipeline::new(hub, PipelineConfig::default());

    let result = pipeline.run(TWO_PARAGRAPHS).await.unwrap();
    let bullets = result.bullets.value().expect("bullets stage ran");
    assert!(bullets.is_empty());
    // Blank summary must not reach the generation model.
    assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn caller_segments_are_kept_verbatim() {
    let f = fixture();
    let segments = vec![
        Segment {
            start: 0.0,
            end: 4.5,
            text: "Opening remarks about the budget.".to_string(),
        },
        Segment {
            start: 4.5,
            end: 11.2,
            text: "Decision to hire two engineers.".to_string(),
        },
    ];
    let result = f
        .pipeline
        .run(PipelineInput::Transcribed {
            text: "Opening remarks about the budget. Decision to hire two engineers.".to_string(),
            segments: segments.clone(),
        })
        .await
        .unwrap();

    assert_eq!(result.segments, segments);
    let clusters = result.clusters.value().expect("clusters ready");
    let clustered: usize = clusters.clusters.iter().map(|c| c.len()).sum();
    assert_eq!(clustered, segments.len());
    assert_eq!(f.sentiment_calls.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn segments_only_input_rebuilds_transcript() {
    let f = fixture();
    let result = f
        .pipeline
        .run(PipelineInput::Transcribed {
            text: String::new(),
            segments: vec![
                Segment::untimed("Budget approved."),
                Segment::untimed("Hiring plan agreed."),
            ],
        })
        .await
        .unwrap();

    assert_eq!(result.transcript, "Budget approved.\n\nHiring plan agreed.");
    assert_eq!(result.segments.len(), 2);
}
