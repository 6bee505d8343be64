//! Filepath: src/core/optimize/license.rs
//! Leading-license-block detection and removal. Only a block at the
//! very start of the file is considered; a block that doesn't look
//! like a license (no recognizable keyword) is left alone.

const KEYWORDS: &[&str] = &[
    "copyright",
    "license",
    "licensed",
    "spdx-license",
    "mit license",
    "apache license",
    "bsd license",
    "gnu general public",
    "gpl",
    "lgpl",
    "mozilla public",
    "all rights reserved",
    "permission is hereby granted",
    "redistribution and use",
    "this file is part of",
    "автор:",
    "лицензия",
];

#[derive(Clone, Copy)]
enum CommentStyle {
    Block(&'static str, &'static str),
    Line(&'static str),
}

impl CommentStyle {
    fn matches_prefix(self, trimmed: &str) -> bool {
        match self {
            CommentStyle::Block(open, _) => trimmed.starts_with(open),
            CommentStyle::Line(prefix) => {
                trimmed.starts_with(prefix) && !(prefix == "#" && trimmed.starts_with("#!"))
            }
        }
    }
}

const AUTODETECT_ORDER: &[CommentStyle] = &[
    CommentStyle::Block("/*", "*/"),
    CommentStyle::Block("<!--", "-->"),
    CommentStyle::Block("\"\"\"", "\"\"\""),
    CommentStyle::Block("'''", "'''"),
    CommentStyle::Line("//"),
    CommentStyle::Line("#"),
    CommentStyle::Line("--"),
];

fn candidates_for_ext(ext: &str) -> &'static [CommentStyle] {
    match ext.to_ascii_lowercase().as_str() {
        "rs" | "go" | "js" | "jsx" | "ts" | "tsx" | "java" | "kt" | "c" | "h" | "cpp" | "cc"
        | "cxx" | "hpp" | "cs" | "swift" | "scala" | "dart" => {
            &[CommentStyle::Block("/*", "*/"), CommentStyle::Line("//")]
        }
        "py" => &[
            CommentStyle::Block("\"\"\"", "\"\"\""),
            CommentStyle::Block("'''", "'''"),
            CommentStyle::Line("#"),
        ],
        "sh" | "bash" | "zsh" | "rb" | "pl" | "r" | "yaml" | "yml" | "toml" => {
            &[CommentStyle::Line("#")]
        }
        "html" | "htm" | "xml" | "vue" | "svelte" => &[CommentStyle::Block("<!--", "-->")],
        "sql" => &[CommentStyle::Line("--")],
        _ => &[],
    }
}

fn detect_style(content: &str, candidates: &[CommentStyle]) -> Option<CommentStyle> {
    let trimmed = content.trim_start();
    candidates.iter().copied().find(|c| c.matches_prefix(trimmed))
}

fn contains_license_keyword(block_lower: &str) -> bool {
    KEYWORDS.iter().any(|k| block_lower.contains(k))
}

fn strip_block(content: &str, open: &str, close: &str) -> String {
    let leading_ws = content.len() - content.trim_start().len();
    let search_from = leading_ws + open.len();
    let Some(rel) = content.get(search_from..).and_then(|t| t.find(close)) else {
        return content.to_string();
    };
    let end = search_from + rel + close.len();
    let block = &content[leading_ws..end];
    if !contains_license_keyword(&block.to_lowercase()) {
        return content.to_string();
    }
    let rest = content[end..].trim_start_matches(['\n', '\r']);
    rest.to_string()
}

fn strip_line(content: &str, prefix: &str) -> String {
    let lines: Vec<&str> = content.split('\n').collect();
    let mut last_comment_idx: Option<usize> = None;
    for (i, line) in lines.iter().enumerate() {
        let t = line.trim();
        if t.is_empty() {
            continue;
        }
        let is_shebang_exempt = prefix == "#" && t.starts_with("#!");
        if t.starts_with(prefix) && !is_shebang_exempt {
            last_comment_idx = Some(i);
        } else {
            break;
        }
    }
    let Some(idx) = last_comment_idx else {
        return content.to_string();
    };
    let block = lines[0..=idx].join("\n");
    if !contains_license_keyword(&block.to_lowercase()) {
        return content.to_string();
    }
    let rest = lines[idx + 1..].join("\n");
    rest.trim_start_matches(['\n', '\r']).to_string()
}

fn strip_with_style(content: &str, style: CommentStyle) -> String {
    match style {
        CommentStyle::Block(open, close) => strip_block(content, open, close),
        CommentStyle::Line(prefix) => strip_line(content, prefix),
    }
}

/// Autodetect the comment style from the file's own leading bytes
/// and strip a leading license block if one is found.
#[must_use]
pub fn strip_license(content: &str) -> String {
    match detect_style(content, AUTODETECT_ORDER) {
        Some(style) => strip_with_style(content, style),
        None => content.to_string(),
    }
}

/// As `strip_license`, but pre-select the candidate style set from a
/// file extension instead of trying every dialect.
#[must_use]
pub fn strip_license_with_hint(content: &str, ext: &str) -> String {
    let candidates = candidates_for_ext(ext);
    match detect_style(content, candidates) {
        Some(style) => strip_with_style(content, style),
        None => content.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_go_style_block_license() {
        let src = "/*\nCopyright 2024 Example Corp.\nLicensed under Apache 2.0.\n*/\n\npackage main\n";
        let out = strip_license(src);
        assert!(out.trim_start().starts_with("package main"));
    }

    #[test]
    fn strips_line_style_license_with_blank_line_inside() {
        let src = "# Copyright 2024\n#\n# Licensed under MIT\n\nimport os\n";
        let out = strip_license(src);
        assert!(out.trim_start().starts_with("import os"));
    }

    #[test]
    fn leaves_non_license_block_untouched() {
        let src = "/* just a regular file header, nothing legal here */\nfn main() {}\n";
        assert_eq!(strip_license(src), src);
    }

    #[test]
    fn shebang_is_not_mistaken_for_comment_style() {
        let src = "#!/usr/bin/env python3\nprint(1)\n";
        assert_eq!(strip_license(src), src);
    }

    #[test]
    fn strips_cyrillic_license_header() {
        let src = "/*\nАвтор: Example Corp.\nЛицензия: MIT\n*/\n\nfn main() {}\n";
        let out = strip_license(src);
        assert!(out.trim_start().starts_with("fn main"));
    }

    #[test]
    fn hint_skips_autodetect_ambiguity() {
        let src = "// Copyright 2024 Example\n// Licensed under MIT\nfn main() {}\n";
        let out = strip_license_with_hint(src, "rs");
        assert!(out.trim_start().starts_with("fn main"));
    }
}
