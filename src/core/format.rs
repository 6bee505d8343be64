//! Filepath: src/core/format.rs
//! The canonical artifact grammar: producing it in five output
//! formats, and parsing it back into entries.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::core::util::approx_tokens;

/// One file's worth of content inside an artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub path: String,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Plain,
    Manifest,
    Json,
    Markdown,
    Xml,
}

const HEADER_PREFIX: &str = "--- File: ";
const HEADER_SUFFIX: &str = " ---";

fn is_header_line(line: &str) -> Option<&str> {
    let trimmed = line.trim_start();
    let trimmed = trimmed.strip_prefix(HEADER_PREFIX)?;
    let trimmed = trimmed.trim_end_matches(['\r']);
    let path = trimmed.strip_suffix(HEADER_SUFFIX)?;
    Some(path.trim())
}

/// Parse an artifact back into entries. Any text before the first
/// header (the optional manifest preamble) is discarded. Entries are
/// sorted by path, matching the formatter's own determinism.
#[must_use]
pub fn parse_context(artifact: &str) -> Vec<Entry> {
    let mut entries: BTreeMap<String, String> = BTreeMap::new();
    let mut current: Option<(String, Vec<&str>)> = None;

    for line in artifact.split('\n') {
        if let Some(path) = is_header_line(line) {
            if let Some((path, body)) = current.take() {
                entries.insert(path, body.join("\n"));
            }
            current = Some((path.to_string(), Vec::new()));
        } else if let Some((_, body)) = current.as_mut() {
            body.push(line);
        }
    }
    if let Some((path, body)) = current {
        entries.insert(path, body.join("\n"));
    }

    entries.into_iter().map(|(path, content)| Entry { path, content }).collect()
}

fn header_line(path: &str) -> String {
    format!("{HEADER_PREFIX}{path}{HEADER_SUFFIX}")
}

/// Header + content, blank-line separated, entries sorted by path.
#[must_use]
pub fn format_plain(entries: &[Entry]) -> String {
    let mut sorted: Vec<&Entry> = entries.iter().collect();
    sorted.sort_by(|a, b| a.path.cmp(&b.path));

    let mut out = String::new();
    for entry in sorted {
        out.push_str(&header_line(&entry.path));
        out.push('\n');
        out.push_str(&entry.content);
        out.push_str("\n\n");
    }
    out
}

#[derive(Default)]
struct TreeNode {
    children: BTreeMap<String, TreeNode>,
}

impl TreeNode {
    fn insert(&mut self, components: &[&str]) {
        let Some((head, rest)) = components.split_first() else { return };
        self.children.entry((*head).to_string()).or_default().insert(rest);
    }
}

fn render_children(node: &TreeNode, prefix: &str, out: &mut String) {
    let names: Vec<&String> = node.children.keys().collect();
    for (i, name) in names.iter().enumerate() {
        let last = i == names.len() - 1;
        let connector = if last { "└─ " } else { "├─ " };
        out.push_str(prefix);
        out.push_str(connector);
        out.push_str(name);
        out.push('\n');
        let child_prefix = format!("{prefix}{}", if last { "   " } else { "│  " });
        render_children(&node.children[*name], &child_prefix, out);
    }
}

fn build_tree(entries: &[Entry]) -> String {
    let mut root = TreeNode::default();
    for entry in entries {
        let components: Vec<&str> = entry.path.split('/').collect();
        root.insert(&components);
    }
    let mut out = String::new();
    render_children(&root, "", &mut out);
    out
}

/// `Manifest:` preamble with an ASCII directory tree, then the plain
/// body.
#[must_use]
pub fn format_manifest(entries: &[Entry]) -> String {
    let mut sorted: Vec<&Entry> = entries.iter().collect();
    sorted.sort_by(|a, b| a.path.cmp(&b.path));
    let sorted_entries: Vec<Entry> = sorted.into_iter().cloned().collect();

    let mut out = String::from("Manifest:\n");
    out.push_str(&build_tree(&sorted_entries));
    out.push('\n');
    out.push_str(&format_plain(&sorted_entries));
    out
}

/// Indented JSON array of `{path, content}`.
#[must_use]
pub fn format_json(entries: &[Entry]) -> String {
    let mut sorted: Vec<&Entry> = entries.iter().collect();
    sorted.sort_by(|a, b| a.path.cmp(&b.path));
    serde_json::to_string_pretty(&sorted).unwrap_or_default()
}

const LANG_MAP: &[(&str, &str)] = &[
    ("rs", "rust"),
    ("py", "python"),
    ("go", "go"),
    ("js", "javascript"),
    ("jsx", "jsx"),
    ("ts", "typescript"),
    ("tsx", "tsx"),
    ("java", "java"),
    ("kt", "kotlin"),
    ("c", "c"),
    ("h", "c"),
    ("cpp", "cpp"),
    ("cc", "cpp"),
    ("cxx", "cpp"),
    ("hpp", "cpp"),
    ("cs", "csharp"),
    ("rb", "ruby"),
    ("php", "php"),
    ("sh", "bash"),
    ("bash", "bash"),
    ("yaml", "yaml"),
    ("yml", "yaml"),
    ("json", "json"),
    ("toml", "toml"),
    ("md", "markdown"),
    ("html", "html"),
    ("htm", "html"),
    ("xml", "xml"),
    ("css", "css"),
    ("sql", "sql"),
];

fn lang_for(path: &str) -> &'static str {
    let ext = path.rsplit('.').next().unwrap_or("");
    LANG_MAP
        .iter()
        .find(|(e, _)| e.eq_ignore_ascii_case(ext))
        .map_or("", |(_, lang)| lang)
}

/// `## File: P` headers with fenced code blocks.
#[must_use]
pub fn format_markdown(entries: &[Entry]) -> String {
    let mut sorted: Vec<&Entry> = entries.iter().collect();
    sorted.sort_by(|a, b| a.path.cmp(&b.path));

    let mut out = String::new();
    for entry in sorted {
        out.push_str(&format!("## File: {}\n", entry.path));
        out.push_str(&format!("```{}\n", lang_for(&entry.path)));
        out.push_str(&entry.content);
        out.push_str("\n```\n\n");
    }
    out
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn xml_escape_attr(s: &str) -> String {
    xml_escape(s).replace('"', "&quot;")
}

/// `<files><file path="…"><content><![CDATA[…]]></content></file>…</files>`.
#[must_use]
pub fn format_xml(entries: &[Entry]) -> String {
    let mut sorted: Vec<&Entry> = entries.iter().collect();
    sorted.sort_by(|a, b| a.path.cmp(&b.path));

    let mut out = String::from("<files>\n");
    for entry in sorted {
        out.push_str(&format!("  <file path=\"{}\">\n", xml_escape_attr(&entry.path)));
        out.push_str("    <content><![CDATA[");
        out.push_str(&xml_escape(&entry.content));
        out.push_str("]]></content>\n  </file>\n");
    }
    out.push_str("</files>\n");
    out
}

/// Dispatch to one of the five output formats.
#[must_use]
pub fn format_context(entries: &[Entry], format: OutputFormat) -> String {
    match format {
        OutputFormat::Plain => format_plain(entries),
        OutputFormat::Manifest => format_manifest(entries),
        OutputFormat::Json => format_json(entries),
        OutputFormat::Markdown => format_markdown(entries),
        OutputFormat::Xml => format_xml(entries),
    }
}

/// Crude formatter-level comment strip for callers that did not run
/// the semantic stripper upstream: `//`/`#` to end of line, plus
/// `/* ... */` blocks. Not dialect-aware like `optimize::comments`.
#[must_use]
pub fn crude_strip_comments(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut rest = content;
    loop {
        match rest.find("/*") {
            None => {
                out.push_str(rest);
                break;
            }
            Some(start) => match rest[start + 2..].find("*/") {
                Some(end_rel) => {
                    out.push_str(&rest[..start]);
                    rest = &rest[start + 2 + end_rel + 2..];
                }
                None => {
                    out.push_str(&rest[..start]);
                    break;
                }
            },
        }
    }

    out.lines()
        .filter(|line| {
            let trimmed = line.trim_start();
            !(trimmed.starts_with("//") || trimmed.starts_with('#'))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[allow(dead_code)]
fn approx_tokens_of(entries: &[Entry]) -> usize {
    entries.iter().map(|e| approx_tokens(&e.content)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Entry> {
        vec![
            Entry { path: "src/b.rs".to_string(), content: "fn b() {}".to_string() },
            Entry { path: "src/a.rs".to_string(), content: "fn a() {}".to_string() },
        ]
    }

    #[test]
    fn plain_round_trips_through_parse() {
        let artifact = format_plain(&sample());
        let parsed = parse_context(&artifact);
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].path, "src/a.rs");
        assert_eq!(parsed[1].path, "src/b.rs");
    }

    #[test]
    fn manifest_includes_tree_and_body() {
        let out = format_manifest(&sample());
        assert!(out.starts_with("Manifest:\n"));
        assert!(out.contains("├─ a.rs") || out.contains("└─ a.rs"));
        assert!(out.contains("--- File: src/a.rs ---"));
    }

    #[test]
    fn json_emits_sorted_array() {
        let out = format_json(&sample());
        let idx_a = out.find("src/a.rs").unwrap();
        let idx_b = out.find("src/b.rs").unwrap();
        assert!(idx_a < idx_b);
    }

    #[test]
    fn markdown_infers_language_from_extension() {
        let out = format_markdown(&sample());
        assert!(out.contains("```rust"));
    }

    #[test]
    fn xml_escapes_special_characters() {
        let entries = vec![Entry { path: "a.txt".to_string(), content: "a < b & c > d".to_string() }];
        let out = format_xml(&entries);
        assert!(out.contains("a &lt; b &amp; c &gt; d"));
    }

    #[test]
    fn parse_tolerates_crlf_headers() {
        let artifact = "--- File: a.rs ---\r\nfn a() {}\r\n\r\n";
        let parsed = parse_context(artifact);
        assert_eq!(parsed[0].path, "a.rs");
    }

    #[test]
    fn crude_strip_drops_comment_lines() {
        let src = "a();\n// comment\n/* block */\nb();";
        let out = crude_strip_comments(src);
        assert_eq!(out, "a();\n\nb();");
    }
}
