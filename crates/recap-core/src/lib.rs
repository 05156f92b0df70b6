//! recap-core: meeting transcript analysis pipeline.
//!
//! Turns a raw transcript (or timestamped segments) into one structured
//! bundle: short/long summaries, keyphrases, sentiment breakdown, topic
//! clusters, and resume-style bullets. Invoked once per document; model
//! collaborators sit behind trait seams in [`backends`] so any stage can be
//! backed by a hosted API or a test double.

pub mod backends;
mod bullets;
mod chunk;
mod cluster;
mod config;
mod error;
mod keyphrase;
mod pipeline;
pub mod prompts;
mod sentiment;
mod summarize;
mod types;

pub use bullets::BulletGenerator;
pub use cluster::TopicClusterer;
pub use config::PipelineConfig;
pub use error::{Error, Result};
pub use keyphrase::extract_keyphrases;
pub use pipeline::{Pipeline, PipelineInput};
pub use sentiment::SentimentAnalyzer;
pub use summarize::Summarizer;
pub use types::{
    ClusterSet, PipelineResult, Segment, SentimentEntry, SentimentLabel, SentimentReport,
    StageOutcome, SummaryPair,
};
