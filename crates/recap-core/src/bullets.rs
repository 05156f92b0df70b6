//! Resume-bullet generation from the short meeting summary.
//!
//! The model's reply is untrusted free-form text: it is split on line
//! boundaries, list markers and surrounding whitespace are stripped, blank
//! lines are dropped, and the result is truncated to the requested count.
//! When the model returns fewer usable lines, fewer bullets come back;
//! nothing is padded or invented.

use crate::backends::GenerationBackend;
use crate::error::Result;
use crate::prompts::resume_bullets_prompt;
use std::sync::Arc;

const GENERATION_MAX_TOKENS: usize = 256;

pub struct BulletGenerator {
    backend: Arc<dyn GenerationBackend>,
}

/// Strip leading list markers (hyphens, bullet glyphs, asterisks) and
/// surrounding whitespace from one output line.
fn clean_line(line: &str) -> &str {
    line.trim()
        .trim_start_matches(['-', '•', '*', '–'])
        .trim()
}

impl BulletGenerator {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self { backend }
    }

    /// Generate up to `n` single-line bullets from `summary`.
    ///
    /// A blank summary returns an empty list without invoking the model.
    pub async fn generate(&self, summary: &str, n: usize) -> Result<Vec<String>> {
        if n == 0 || summary.trim().is_empty() {
            return Ok(Vec::new());
        }

        let prompt = resume_bullets_prompt(summary, n);
        let raw = self.backend.generate(&prompt, GENERATION_MAX_TOKENS).await?;

        Ok(raw
            .lines()
            .map(clean_line)
            .filter(|l| !l.is_empty())
            .take(n)
            .map(str::to_string)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CannedGenerator {
        reply: String,
        calls: AtomicUsize,
    }

    impl CannedGenerator {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl GenerationBackend for CannedGenerator {
        async fn generate(&self, _prompt: &str, _max_tokens: usize) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.reply.clone())
        }
    }

    #[tokio::test]
    async fn blank_summary_skips_the_model() {
        let backend = Arc::new(CannedGenerator::new("- should not appear"));
        let gen = BulletGenerator::new(backend.clone());

        assert!(gen.generate("", 5).await.unwrap().is_empty());
        assert!(gen.generate("   \n ", 5).await.unwrap().is_empty());
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn strips_markers_and_truncates() {
        let backend = Arc::new(CannedGenerator::new(
            "- Led the Q1 budget approval\n• Hired two engineers\n\n  * Cut review time by 30%\n- Shipped the beta\n- Extra one",
        ));
        let gen = BulletGenerator::new(backend);

        let bullets = gen.generate("summary text", 4).await.unwrap();
        assert_eq!(
            bullets,
            vec![
                "Led the Q1 budget approval",
                "Hired two engineers",
                "Cut review time by 30%",
                "Shipped the beta",
            ]
        );
    }

    #[tokio::test]
    async fn fewer_usable_lines_than_requested_returns_fewer() {
        let backend = Arc::new(CannedGenerator::new("- Only bullet\n\n   \n"));
        let gen = BulletGenerator::new(backend);

        let bullets = gen.generate("summary text", 5).await.unwrap();
        assert_eq!(bullets, vec!["Only bullet"]);
    }
}
