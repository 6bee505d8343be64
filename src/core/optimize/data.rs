//! Filepath: src/core/optimize/data.rs
//! Data-file compaction: JSON is re-encoded without indentation;
//! YAML gets a line-oriented comment/blank-line strip since there is
//! no YAML parser in the dependency stack.

use std::path::Path;

/// Compact a data file by extension. Unknown extensions, or content
/// that fails to parse, pass through unchanged.
#[must_use]
pub fn compact(content: &str, path: &Path) -> String {
    match path.extension().and_then(|e| e.to_str()).map(|e| e.to_ascii_lowercase()).as_deref() {
        Some("json") => compact_json(content),
        Some("yaml" | "yml") => compact_yaml(content),
        _ => content.to_string(),
    }
}

/// Re-encode JSON compactly. Falls back to the original text if it
/// doesn't parse as valid JSON.
#[must_use]
pub fn compact_json(content: &str) -> String {
    if !content.contains('\n') {
        return content.to_string();
    }
    match serde_json::from_str::<serde_json::Value>(content) {
        Ok(value) => serde_json::to_string(&value).unwrap_or_else(|_| content.to_string()),
        Err(_) => content.to_string(),
    }
}

/// Strip full-line and inline `#` comments from YAML, quote-aware,
/// right-trim each line, and collapse blank-line runs to at most one.
#[must_use]
pub fn compact_yaml(content: &str) -> String {
    let mut out_lines: Vec<String> = Vec::new();
    let mut last_was_blank = false;

    for raw_line in content.split('\n') {
        if raw_line.trim_start().starts_with('#') {
            continue;
        }
        let processed = strip_inline_comment(raw_line);
        if processed.trim().is_empty() {
            if last_was_blank {
                continue;
            }
            last_was_blank = true;
            out_lines.push(String::new());
        } else {
            last_was_blank = false;
            out_lines.push(processed);
        }
    }

    out_lines.join("\n")
}

fn strip_inline_comment(line: &str) -> String {
    let mut in_single = false;
    let mut in_double = false;
    let mut comment_at: Option<usize> = None;
    let mut prev_char: Option<char> = None;

    for (i, ch) in line.char_indices() {
        match ch {
            '\'' if !in_double => in_single = !in_single,
            '"' if !in_single => in_double = !in_double,
            '#' if !in_single && !in_double => {
                let preceded_ok = i == 0 || prev_char.is_some_and(char::is_whitespace);
                if preceded_ok {
                    comment_at = Some(i);
                    break;
                }
            }
            _ => {}
        }
        prev_char = Some(ch);
    }

    let without_comment = match comment_at {
        Some(i) => &line[..i],
        None => line,
    };
    without_comment.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_compacts_to_single_line() {
        let src = "{\n  \"a\": 1,\n  \"b\": [1, 2, 3]\n}\n";
        assert_eq!(compact_json(src), r#"{"a":1,"b":[1,2,3]}"#);
    }

    #[test]
    fn invalid_json_passes_through() {
        let src = "{ not json\n";
        assert_eq!(compact_json(src), src);
    }

    #[test]
    fn yaml_strips_comments_and_collapses_blanks() {
        let src = "a: 1  # comment\n# full line\n\n\n\nb: 2\n";
        let out = compact_yaml(src);
        assert_eq!(out, "a: 1\n\nb: 2\n");
    }

    #[test]
    fn yaml_hash_inside_quotes_is_preserved() {
        let src = "url: \"http://x/#frag\"\n";
        let out = compact_yaml(src);
        assert_eq!(out, "url: \"http://x/#frag\"");
    }
}
