//! Filepath: src/core/optimize/comments.rs
//! Heuristic, string-literal-unaware comment stripping across three
//! dialects. Not a substitute for a real lexer — see module docs on
//! `strip_c_style` for the accepted trade-off.

/// Strip comments for the dialect implied by a file extension.
/// Unknown extensions pass the content through unchanged.
#[must_use]
pub fn strip_comments(content: &str, ext: &str) -> String {
    match ext.to_ascii_lowercase().as_str() {
        "go" | "js" | "jsx" | "ts" | "tsx" | "java" | "kt" | "c" | "h" | "cpp" | "cc" | "cxx"
        | "hpp" | "cs" | "rs" | "swift" | "scala" | "dart" => strip_c_style(content),
        "py" | "sh" | "bash" | "zsh" | "rb" | "pl" | "r" | "yaml" | "yml" => strip_hash(content),
        "html" | "htm" | "xml" | "vue" | "svelte" => strip_xml(content),
        _ => content.to_string(),
    }
}

/// `//` and `/* */` stripping over a per-line state machine. The
/// stripper is intentionally string-literal-unaware: a `//` or `/*`
/// sequence inside a string or char literal is treated as a real
/// comment marker. Lines left empty after stripping are dropped,
/// which implicitly collapses some blank lines.
#[must_use]
pub fn strip_c_style(s: &str) -> String {
    let mut in_block = false;
    s.split('\n')
        .filter_map(|line| process_c_line(line, &mut in_block))
        .collect::<Vec<_>>()
        .join("\n")
}

fn process_c_line(line: &str, in_block: &mut bool) -> Option<String> {
    let mut line = line.to_string();

    if *in_block {
        match line.find("*/") {
            Some(pos) => {
                line = line[pos + 2..].to_string();
                *in_block = false;
            }
            None => return None,
        }
    }

    if !*in_block {
        if let Some(start) = line.find("/*") {
            match line[start + 2..].find("*/") {
                Some(_) => {}
                None => {
                    line.truncate(start);
                    *in_block = true;
                }
            }
        }
    }

    if let Some(pos) = line.find("//") {
        line.truncate(pos);
    }

    loop {
        if *in_block {
            break;
        }
        let Some(start) = line.find("/*") else { break };
        let Some(end_rel) = line[start + 2..].find("*/") else {
            break;
        };
        let end = start + 2 + end_rel;
        let mut next = String::with_capacity(line.len());
        next.push_str(&line[..start]);
        next.push_str(&line[end + 2..]);
        line = next;
    }

    if line.trim().is_empty() { None } else { Some(line) }
}

/// `#` to end-of-line, dropping any line left blank afterward.
#[must_use]
pub fn strip_hash(s: &str) -> String {
    s.split('\n')
        .filter_map(|line| {
            let stripped = match line.find('#') {
                Some(pos) => &line[..pos],
                None => line,
            };
            if stripped.trim().is_empty() {
                None
            } else {
                Some(stripped.to_string())
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// `<!-- -->` stripped greedily forward across the whole document
/// (comments may span multiple lines). An unterminated `<!--`
/// discards everything after it.
#[must_use]
pub fn strip_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    loop {
        match rest.find("<!--") {
            None => {
                out.push_str(rest);
                break;
            }
            Some(start) => {
                out.push_str(&rest[..start]);
                let after = &rest[start + 4..];
                match after.find("-->") {
                    Some(end) => rest = &after[end + 3..],
                    None => break,
                }
            }
        }
    }
    out.lines()
        .filter(|l| !l.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn c_style_strips_line_and_block_comments() {
        let src = "int x = 1; // trailing\n/* whole line */\nint y = 2;";
        let out = strip_c_style(src);
        assert_eq!(out, "int x = 1;\nint y = 2;");
    }

    #[test]
    fn c_style_handles_multiline_block() {
        let src = "a();\n/* start\nmiddle\nend */\nb();";
        let out = strip_c_style(src);
        assert_eq!(out, "a();\nb();");
    }

    #[test]
    fn c_style_is_idempotent() {
        let src = "a(); // x\n/* y */\nb();";
        let once = strip_c_style(src);
        let twice = strip_c_style(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn hash_strips_python_comments() {
        let src = "x = 1  # comment\n# full line\ny = 2";
        assert_eq!(strip_hash(src), "x = 1\ny = 2");
    }

    #[test]
    fn xml_strips_multiline_comment() {
        let src = "<a/>\n<!-- c1\nc2 -->\n<b/>";
        assert_eq!(strip_xml(src), "<a/>\n<b/>");
    }

    #[test]
    fn dispatch_passes_through_unknown_extension() {
        assert_eq!(strip_comments("# not stripped", "bin"), "# not stripped");
    }
}
