//! Filepath: src/core/split.rs
//! Bounded-size chunking of an artifact under a token budget, by
//! three strategies: whole-file, raw-token-window, or file-first with
//! a token-window fallback.

use crate::core::error::{PipelineError, Result};
use crate::core::util::approx_tokens;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitStrategy {
    File,
    Token,
    Smart,
}

#[derive(Debug, Clone, Copy)]
pub struct SplitSettings {
    pub max_tokens_per_chunk: usize,
    pub overlap_tokens: usize,
    pub strategy: SplitStrategy,
}

impl SplitSettings {
    /// Validates `max_tokens_per_chunk > 0` and
    /// `overlap_tokens < max_tokens_per_chunk`.
    pub fn new(
        max_tokens_per_chunk: usize,
        overlap_tokens: usize,
        strategy: SplitStrategy,
    ) -> Result<Self> {
        if max_tokens_per_chunk == 0 {
            return Err(PipelineError::InvalidArgument(
                "maxTokensPerChunk must be > 0".to_string(),
            ));
        }
        if overlap_tokens >= max_tokens_per_chunk {
            return Err(PipelineError::InvalidArgument(
                "overlapTokens must be < maxTokensPerChunk".to_string(),
            ));
        }
        Ok(Self { max_tokens_per_chunk, overlap_tokens, strategy })
    }
}

/// Split `text` per `settings`. Short-circuits to a single chunk if
/// the whole text already fits the budget.
pub fn split(text: &str, settings: &SplitSettings) -> Result<Vec<String>> {
    if approx_tokens(text) <= settings.max_tokens_per_chunk {
        return Ok(vec![text.to_string()]);
    }

    match settings.strategy {
        SplitStrategy::File => Ok(split_by_file(text, settings)),
        SplitStrategy::Token => split_by_token(text, settings),
        SplitStrategy::Smart => split_smart(text, settings),
    }
}

const HEADER_PREFIX: &str = "--- File: ";

fn find_header_starts(text: &str) -> Vec<usize> {
    let mut starts = Vec::new();
    let mut search_from = 0usize;
    while let Some(rel) = text[search_from..].find(HEADER_PREFIX) {
        let pos = search_from + rel;
        let line_start = text[..pos].rfind('\n').map_or(0, |i| i + 1);
        if text[line_start..pos].trim().is_empty() {
            starts.push(line_start);
        }
        search_from = pos + HEADER_PREFIX.len();
    }
    starts
}

fn split_by_file(text: &str, settings: &SplitSettings) -> Vec<String> {
    let starts = find_header_starts(text);
    if starts.is_empty() {
        return vec![text.trim_end().to_string()];
    }

    let mut segments: Vec<&str> = Vec::new();
    if starts[0] > 0 {
        segments.push(&text[..starts[0]]);
    }
    for (i, &start) in starts.iter().enumerate() {
        let end = starts.get(i + 1).copied().unwrap_or(text.len());
        segments.push(&text[start..end]);
    }

    let max = settings.max_tokens_per_chunk;
    let mut chunks: Vec<String> = Vec::new();
    let mut current = String::new();

    for segment in segments {
        let would_be = if current.is_empty() {
            approx_tokens(segment)
        } else {
            approx_tokens(&current) + approx_tokens(segment)
        };
        if would_be > max && !current.is_empty() {
            chunks.push(current.trim_end().to_string());
            current = String::new();
        }
        current.push_str(segment);
    }
    if !current.is_empty() {
        chunks.push(current.trim_end().to_string());
    }
    chunks
}

fn split_by_token(text: &str, settings: &SplitSettings) -> Result<Vec<String>> {
    let char_limit = settings.max_tokens_per_chunk * 4;
    let overlap_chars = settings.overlap_tokens * 4;
    if overlap_chars >= char_limit {
        return Err(PipelineError::InvalidArgument(
            "overlap in characters must be smaller than the chunk character limit".to_string(),
        ));
    }
    let step = (char_limit - overlap_chars).max(1);

    let chars: Vec<char> = text.chars().collect();
    let mut chunks = Vec::new();
    let mut pos = 0usize;
    while pos < chars.len() {
        let end = (pos + char_limit).min(chars.len());
        chunks.push(chars[pos..end].iter().collect());
        if end == chars.len() {
            break;
        }
        pos += step;
    }
    if chunks.is_empty() {
        chunks.push(String::new());
    }
    Ok(chunks)
}

fn split_smart(text: &str, settings: &SplitSettings) -> Result<Vec<String>> {
    let file_chunks = split_by_file(text, settings);
    let oversized = file_chunks.iter().any(|c| approx_tokens(c) > settings.max_tokens_per_chunk);
    if oversized {
        split_by_token(text, settings)
    } else {
        Ok(file_chunks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(max: usize, overlap: usize, strategy: SplitStrategy) -> SplitSettings {
        SplitSettings::new(max, overlap, strategy).unwrap()
    }

    #[test]
    fn rejects_zero_max_tokens() {
        assert!(SplitSettings::new(0, 0, SplitStrategy::File).is_err());
    }

    #[test]
    fn rejects_overlap_not_less_than_max() {
        assert!(SplitSettings::new(10, 10, SplitStrategy::Token).is_err());
    }

    #[test]
    fn short_text_is_single_chunk() {
        let s = settings(1000, 0, SplitStrategy::File);
        let out = split("short", &s).unwrap();
        assert_eq!(out, vec!["short".to_string()]);
    }

    #[test]
    fn file_strategy_splits_at_file_boundary_under_tight_limit() {
        let file1 = "a".repeat(160);
        let file2 = "b".repeat(280);
        let text = format!("--- File: one.rs ---\n{file1}\n\n--- File: two.rs ---\n{file2}\n\n");
        let s = settings(80, 0, SplitStrategy::File);
        let out = split(&text, &s).unwrap();
        assert_eq!(out.len(), 2);
        assert!(out[0].contains("one.rs"));
        assert!(out[1].contains("two.rs"));
    }

    #[test]
    fn file_strategy_combines_under_generous_limit() {
        let file1 = "a".repeat(160);
        let file2 = "b".repeat(280);
        let text = format!("--- File: one.rs ---\n{file1}\n\n--- File: two.rs ---\n{file2}\n\n");
        let s = settings(120, 0, SplitStrategy::File);
        let out = split(&text, &s).unwrap();
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn smart_falls_back_to_token_when_oversized() {
        let file1 = "x".repeat(1200);
        let text = format!("--- File: big.go ---\n{file1}\n\n");
        let s = settings(80, 8, SplitStrategy::Smart);
        let out = split(&text, &s).unwrap();
        assert!(out.len() >= 4);
        for chunk in &out[..out.len() - 1] {
            assert!(approx_tokens(chunk) <= 80);
        }
    }

    #[test]
    fn token_strategy_preserves_exact_text_minus_overlap() {
        let text = "0123456789".repeat(50);
        let s = settings(10, 2, SplitStrategy::Token);
        let out = split(&text, &s).unwrap();
        let mut reassembled = out[0].clone();
        for chunk in &out[1..] {
            let overlap = s.overlap_tokens * 4;
            reassembled.push_str(&chunk[overlap.min(chunk.len())..]);
        }
        assert_eq!(reassembled, text);
    }
}
