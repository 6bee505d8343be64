//! Filepath: src/core/diffsplit.rs
//! Unified-diff aware chunking: never splits inside a hunk, and
//! budgets by line count rather than approximate tokens.

/// One `diff --git` block of unified-diff text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffBlock(pub String);

const FILE_HEADER: &str = "diff --git ";

fn is_hunk_header(line: &str) -> bool {
    line.starts_with("@@ ") && line[3..].find(" @@").is_some()
}

/// Slice diff text on `diff --git ` line starts. With no such header,
/// the whole text is one block (unless blank).
#[must_use]
pub fn extract_diff_blocks(text: &str) -> Vec<DiffBlock> {
    let mut starts = Vec::new();
    for (i, line) in text.split('\n').enumerate() {
        if line.starts_with(FILE_HEADER) {
            starts.push(i);
        }
    }
    let lines: Vec<&str> = text.split('\n').collect();

    if starts.is_empty() {
        return if text.trim().is_empty() {
            Vec::new()
        } else {
            vec![DiffBlock(text.to_string())]
        };
    }

    let mut blocks = Vec::new();
    for (i, &start) in starts.iter().enumerate() {
        let end = starts.get(i + 1).copied().unwrap_or(lines.len());
        blocks.push(DiffBlock(lines[start..end].join("\n")));
    }
    blocks
}

fn count_lines(s: &str) -> usize {
    s.split('\n').count()
}

fn trim_chunk(s: &str) -> String {
    s.trim_end().to_string()
}

fn chunk_by_lines(block: &str, limit: usize) -> Vec<String> {
    let lines: Vec<&str> = block.split('\n').collect();
    let mut chunks = Vec::new();
    for group in lines.chunks(limit.max(1)) {
        chunks.push(trim_chunk(&group.join("\n")));
    }
    chunks
}

/// Split `block`'s lines at hunk boundaries: the file-header prelude
/// (everything up to the first `@@ ... @@` line) is repeated at the
/// top of every sub-chunk; a hunk is never split across chunks.
fn split_oversized_block(block: &str, limit: usize) -> Vec<String> {
    let lines: Vec<&str> = block.split('\n').collect();
    let first_hunk = lines.iter().position(|l| is_hunk_header(l));

    let Some(first_hunk) = first_hunk else {
        return chunk_by_lines(block, limit);
    };

    let prelude: Vec<&str> = lines[..first_hunk].to_vec();
    let mut hunks: Vec<Vec<&str>> = Vec::new();
    for &line in &lines[first_hunk..] {
        if is_hunk_header(line) {
            hunks.push(vec![line]);
        } else if let Some(last) = hunks.last_mut() {
            last.push(line);
        }
    }

    let mut chunks = Vec::new();
    let mut current = prelude.clone();
    let mut current_len = current.len();

    for hunk in hunks {
        if current_len + hunk.len() > limit && current_len > prelude.len() {
            chunks.push(trim_chunk(&current.join("\n")));
            current = prelude.clone();
            current_len = current.len();
        }
        current.extend(hunk.iter().copied());
        current_len += hunk.len();
    }
    if current_len > prelude.len() {
        chunks.push(trim_chunk(&current.join("\n")));
    }
    chunks
}

/// Split unified-diff `text` into line-bounded chunks under
/// `approx_line_limit`. Empty input yields an empty vector.
#[must_use]
pub fn split_diff(text: &str, approx_line_limit: usize) -> Vec<String> {
    let blocks = extract_diff_blocks(text);
    if blocks.is_empty() {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut rolling = String::new();
    let mut rolling_lines = 0usize;

    for DiffBlock(block) in blocks {
        let block_lines = count_lines(&block);
        if block_lines <= approx_line_limit {
            if rolling_lines + block_lines > approx_line_limit && !rolling.is_empty() {
                chunks.push(trim_chunk(&rolling));
                rolling = String::new();
                rolling_lines = 0;
            }
            if !rolling.is_empty() {
                rolling.push('\n');
            }
            rolling.push_str(&block);
            rolling_lines += block_lines;
        } else {
            if !rolling.is_empty() {
                chunks.push(trim_chunk(&rolling));
                rolling = String::new();
                rolling_lines = 0;
            }
            chunks.extend(split_oversized_block(&block, approx_line_limit));
        }
    }
    if !rolling.is_empty() {
        chunks.push(trim_chunk(&rolling));
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_hunk(n: usize) -> String {
        let mut s = format!("@@ -{n},5 +{n},5 @@\n");
        for i in 0..10 {
            s.push_str(&format!(" context line {i}\n"));
        }
        s
    }

    #[test]
    fn no_header_yields_one_block() {
        let blocks = extract_diff_blocks("just some text\nmore text");
        assert_eq!(blocks.len(), 1);
    }

    #[test]
    fn blank_text_yields_no_blocks() {
        assert!(extract_diff_blocks("   \n  ").is_empty());
    }

    #[test]
    fn two_file_headers_yield_two_blocks() {
        let text = "diff --git a/x b/x\nfoo\ndiff --git a/y b/y\nbar";
        let blocks = extract_diff_blocks(text);
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].0.contains("a/x"));
        assert!(blocks[1].0.contains("a/y"));
    }

    #[test]
    fn oversized_block_splits_at_hunk_boundaries_with_shared_header() {
        let mut block = "diff --git a/f b/f\nindex 111..222 100644\n--- a/f\n+++ b/f\n".to_string();
        for i in 0..5 {
            block.push_str(&make_hunk(i));
        }
        let chunks = split_diff(&block, 20);
        assert!(chunks.len() >= 2);
        for chunk in &chunks {
            assert!(chunk.contains("diff --git a/f b/f"));
        }
    }

    #[test]
    fn small_diff_fits_in_one_chunk() {
        let text = "diff --git a/f b/f\n@@ -1,1 +1,1 @@\n-old\n+new";
        let chunks = split_diff(text, 100);
        assert_eq!(chunks.len(), 1);
    }
}
