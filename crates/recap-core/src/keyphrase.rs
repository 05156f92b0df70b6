//! Unsupervised statistical keyphrase extraction.
//!
//! YAKE-style scoring: each term gets a significance score from casing,
//! sentence position, frequency, and dispersion statistics; candidate
//! phrases (n-grams free of edge stopwords) combine their term scores so
//! that a LOWER score means a more significant phrase. Pure function of the
//! input text and parameters, fully deterministic, no model calls.

use std::collections::{BTreeMap, HashSet};

const STOPWORDS: &[&str] = &[
    "a", "about", "after", "all", "also", "an", "and", "any", "are", "as", "at", "be", "because",
    "been", "but", "by", "can", "could", "did", "do", "does", "for", "from", "had", "has", "have",
    "he", "her", "his", "how", "i", "if", "in", "into", "is", "it", "its", "just", "like", "me",
    "more", "most", "my", "no", "not", "of", "on", "one", "or", "our", "out", "over", "she", "so",
    "some", "than", "that", "the", "their", "them", "then", "there", "these", "they", "this", "to",
    "up", "us", "was", "we", "were", "what", "when", "which", "who", "will", "with", "would",
    "you", "your",
];

fn is_stopword(word: &str) -> bool {
    STOPWORDS.binary_search(&word).is_ok()
}

#[derive(Debug, Default)]
struct TermStats {
    /// Total occurrences (lowercased form).
    tf: f64,
    /// Occurrences starting with an uppercase letter mid-sentence.
    tf_upper: f64,
    /// Sentence indices where the term appears.
    sentences: HashSet<usize>,
    /// Sum of sentence indices, for the mean position.
    position_sum: f64,
}

/// A token with its casing and position context preserved.
struct Token {
    lower: String,
    original: String,
    sentence: usize,
    /// True when the token is capitalized and not the first word of its
    /// sentence (a proper-noun signal).
    upper_mid_sentence: bool,
}

fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    for (sentence_idx, sentence) in text
        .split(|c: char| matches!(c, '.' | '!' | '?' | '\n'))
        .enumerate()
    {
        let mut first_in_sentence = true;
        for raw in sentence.split_whitespace() {
            let word: String = raw
                .chars()
                .filter(|c| c.is_alphanumeric() || *c == '-' || *c == '\'')
                .collect();
            if word.is_empty() || !word.chars().any(|c| c.is_alphabetic()) {
                continue;
            }
            let upper = word.chars().next().is_some_and(|c| c.is_uppercase());
            tokens.push(Token {
                lower: word.to_lowercase(),
                original: word,
                sentence: sentence_idx,
                upper_mid_sentence: upper && !first_in_sentence,
            });
            first_in_sentence = false;
        }
    }
    tokens
}

/// Per-term significance. Lower = more significant, matching the phrase
/// score convention.
fn term_scores(tokens: &[Token], sentence_count: usize) -> BTreeMap<String, f64> {
    let mut stats: BTreeMap<String, TermStats> = BTreeMap::new();
    for token in tokens {
        let entry = stats.entry(token.lower.clone()).or_default();
        entry.tf += 1.0;
        if token.upper_mid_sentence {
            entry.tf_upper += 1.0;
        }
        entry.sentences.insert(token.sentence);
        entry.position_sum += token.sentence as f64;
    }

    let tfs: Vec<f64> = stats.values().map(|s| s.tf).collect();
    let mean_tf = tfs.iter().sum::<f64>() / tfs.len().max(1) as f64;
    let std_tf = (tfs.iter().map(|t| (t - mean_tf).powi(2)).sum::<f64>()
        / tfs.len().max(1) as f64)
        .sqrt();

    stats
        .into_iter()
        .map(|(term, s)| {
            let casing = s.tf_upper / (1.0 + s.tf.ln());
            let mean_position = s.position_sum / s.tf;
            let position = (3.0 + mean_position).ln().ln().max(0.0);
            let frequency = s.tf / (mean_tf + std_tf + f64::EPSILON);
            let dispersion = s.sentences.len() as f64 / sentence_count.max(1) as f64;
            // Informative terms (frequent, well spread, early, cased) score low.
            let score = (1.0 + position) / (1.0 + casing + frequency + dispersion);
            (term, score)
        })
        .collect()
}

/// Extract up to `top_k` distinct keyphrases of at most `max_words` words,
/// ranked most significant first (ascending internal score). Empty text
/// yields an empty vector.
pub fn extract_keyphrases(text: &str, max_words: usize, top_k: usize) -> Vec<String> {
    if top_k == 0 || text.trim().is_empty() {
        return Vec::new();
    }
    let max_words = max_words.max(1);

    let tokens = tokenize(text);
    if tokens.is_empty() {
        return Vec::new();
    }
    let sentence_count = tokens.last().map(|t| t.sentence + 1).unwrap_or(1);
    let scores = term_scores(&tokens, sentence_count);

    // Candidate n-grams: contiguous within a sentence, no stopword at
    // either edge. Scored as prod(term scores) / (tf * (1 + sum)).
    let mut phrase_tf: BTreeMap<String, f64> = BTreeMap::new();
    let mut phrase_original: BTreeMap<String, (String, usize)> = BTreeMap::new();
    for n in 1..=max_words {
        for (start, window) in tokens.windows(n).enumerate() {
            if window.iter().any(|t| t.sentence != window[0].sentence) {
                continue;
            }
            if is_stopword(&window[0].lower) || is_stopword(&window[n - 1].lower) {
                continue;
            }
            let key = window
                .iter()
                .map(|t| t.lower.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            *phrase_tf.entry(key.clone()).or_insert(0.0) += 1.0;
            phrase_original.entry(key).or_insert_with(|| {
                (
                    window
                        .iter()
                        .map(|t| t.original.as_str())
                        .collect::<Vec<_>>()
                        .join(" "),
                    start,
                )
            });
        }
    }

    let mut ranked: Vec<(f64, usize, String)> = phrase_tf
        .iter()
        .map(|(key, tf)| {
            let terms: Vec<&str> = key.split(' ').collect();
            let product: f64 = terms.iter().map(|t| scores[*t]).product();
            let sum: f64 = terms.iter().map(|t| scores[*t]).sum();
            let score = product / (tf * (1.0 + sum));
            let first_seen = phrase_original[key].1;
            (score, first_seen, key.clone())
        })
        .collect();

    // Ascending score; ties broken by first occurrence for determinism.
    ranked.sort_by(|a, b| {
        a.0.partial_cmp(&b.0)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.1.cmp(&b.1))
    });

    ranked
        .into_iter()
        .take(top_k)
        .map(|(_, _, key)| phrase_original[&key].0.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRANSCRIPT: &str = "The budget review covered the Q1 budget in detail. \
        The team approved the Q1 budget after a short discussion. \
        Hiring plans for the engineering team were also approved. \
        The engineering team will add two engineers next quarter.";

    #[test]
    fn stopword_table_is_sorted_for_binary_search() {
        let mut sorted = STOPWORDS.to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, STOPWORDS);
    }

    #[test]
    fn empty_text_yields_no_phrases() {
        assert!(extract_keyphrases("", 3, 10).is_empty());
        assert!(extract_keyphrases("   \n\n  ", 3, 10).is_empty());
        assert!(extract_keyphrases(TRANSCRIPT, 3, 0).is_empty());
    }

    #[test]
    fn extraction_is_deterministic() {
        let a = extract_keyphrases(TRANSCRIPT, 3, 10);
        let b = extract_keyphrases(TRANSCRIPT, 3, 10);
        assert_eq!(a, b);
        assert!(!a.is_empty());
    }

    #[test]
    fn phrases_are_distinct_and_bounded() {
        let phrases = extract_keyphrases(TRANSCRIPT, 3, 5);
        assert!(phrases.len() <= 5);
        let lowered: HashSet<String> = phrases.iter().map(|p| p.to_lowercase()).collect();
        assert_eq!(lowered.len(), phrases.len());
        for p in &phrases {
            assert!(p.split(' ').count() <= 3);
        }
    }

    #[test]
    fn repeated_topical_phrase_ranks_above_background_words() {
        let phrases = extract_keyphrases(TRANSCRIPT, 3, 10);
        let lowered: Vec<String> = phrases.iter().map(|p| p.to_lowercase()).collect();
        assert!(
            lowered.iter().any(|p| p.contains("budget")),
            "expected a budget phrase in {lowered:?}"
        );
    }

    #[test]
    fn no_stopword_edges() {
        let phrases = extract_keyphrases(TRANSCRIPT, 3, 15);
        for p in &phrases {
            let words: Vec<&str> = p.split(' ').collect();
            let first = words.first().unwrap().to_lowercase();
            let last = words.last().unwrap().to_lowercase();
            assert!(!is_stopword(&first), "phrase starts with stopword: {p}");
            assert!(!is_stopword(&last), "phrase ends with stopword: {p}");
        }
    }
}
