//! Character-based chunking for long-document summarization.
//!
//! Chunk size counts Unicode scalar values, not bytes and not model tokens:
//! it is a deliberate approximation of the summarization model's input
//! window, chosen for simplicity over token-exact sizing. Byte offsets are
//! tracked so a chunk never splits a UTF-8 sequence.

/// A contiguous slice of the transcript with its byte-offset span.
/// Internal to the summarizer; never part of the caller-facing result.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TextChunk {
    pub text: String,
    /// Byte offset of the chunk start within the source text.
    pub start: usize,
    /// Byte offset one past the chunk end.
    pub end: usize,
}

/// Split `text` into contiguous, non-overlapping chunks of at most
/// `chunk_size` characters; the final chunk may be shorter.
///
/// Concatenating all chunk texts reproduces `text` exactly, and the chunk
/// count equals `ceil(char_count / chunk_size)`. Empty input yields no
/// chunks; a zero `chunk_size` is clamped to one.
pub(crate) fn chunk_text(text: &str, chunk_size: usize) -> Vec<TextChunk> {
    let chunk_size = chunk_size.max(1);

    let mut chunks = Vec::new();
    let mut chunk_start = 0usize;
    let mut chars_in_chunk = 0usize;

    for (byte_idx, _) in text.char_indices() {
        if chars_in_chunk == chunk_size {
            chunks.push(TextChunk {
                text: text[chunk_start..byte_idx].to_string(),
                start: chunk_start,
                end: byte_idx,
            });
            chunk_start = byte_idx;
            chars_in_chunk = 0;
        }
        chars_in_chunk += 1;
    }

    if chunk_start < text.len() {
        chunks.push(TextChunk {
            text: text[chunk_start..].to_string(),
            start: chunk_start,
            end: text.len(),
        });
    }

    chunks
}
