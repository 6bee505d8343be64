//! Filepath: src/parsers/python_analyzer.rs
//! Python symbol and import extraction via a broad, stable query;
//! methods are distinguished from functions by ancestry, not by a
//! separate query pattern.

use std::path::Path;

use tree_sitter::{Language, Node, Parser, Query, QueryCursor, StreamingIterator};

use crate::core::error::{PipelineError, Result};
use crate::core::optimize::skeleton::{Analyzer, Import, Symbol, SymbolKind};
use crate::infra::utils::TsNodeUtils;

pub struct PythonAnalyzer {
    language: Language,
    query: Query,
    import_query: Query,
}

impl PythonAnalyzer {
    pub fn new() -> Result<Self> {
        let language: Language = tree_sitter_python::LANGUAGE.into();

        let query_src = r#"
            (function_definition
              name: (identifier) @name) @item

            (class_definition
              name: (identifier) @name) @item
        "#;
        let query = Query::new(&language, query_src)
            .map_err(|e| PipelineError::Internal(format!("create Python query: {e}")))?;

        let import_query_src = r#"
            (import_statement) @import
            (import_from_statement) @import_from
        "#;
        let import_query = Query::new(&language, import_query_src)
            .map_err(|e| PipelineError::Internal(format!("create Python import query: {e}")))?;

        Ok(Self { language, query, import_query })
    }

    fn parse(&self, content: &[u8]) -> Result<tree_sitter::Tree> {
        let mut parser = Parser::new();
        parser
            .set_language(&self.language)
            .map_err(|e| PipelineError::Internal(format!("set language: {e}")))?;
        parser
            .parse(content, None)
            .ok_or_else(|| PipelineError::ParseFailure("failed to parse Python source".to_string()))
    }
}

impl Analyzer for PythonAnalyzer {
    fn language(&self) -> &'static str {
        "python"
    }

    fn extract_symbols(&self, _path: &Path, content: &[u8]) -> Result<Vec<Symbol>> {
        let tree = self.parse(content)?;
        let bytes = content;

        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&self.query, tree.root_node(), bytes);
        let cap_names: Vec<&str> = self.query.capture_names().to_vec();

        let mut out = Vec::with_capacity(16);

        while let Some(m) = matches.next() {
            let mut picked: Option<Node> = None;
            let mut name_text: Option<String> = None;

            for cap in m.captures {
                let cname = cap_names[cap.index as usize];
                if cname == "item" {
                    picked = Some(cap.node);
                } else if cname == "name" {
                    name_text = cap.node.utf8_text(bytes).ok().map(|s| s.to_string());
                }
            }

            let Some(node) = picked else { continue };
            let Some(name) = name_text else { continue };

            let kind = match node.kind() {
                "function_definition" => {
                    if TsNodeUtils::has_ancestor(node, "class_definition") {
                        SymbolKind::Method
                    } else {
                        SymbolKind::Function
                    }
                }
                "class_definition" => SymbolKind::Class,
                _ => continue,
            };

            let parent = if kind == SymbolKind::Method {
                TsNodeUtils::find_ancestor(node, "class_definition")
                    .and_then(|c| TsNodeUtils::field_text(c, "name", bytes))
                    .map(str::to_string)
            } else {
                None
            };

            let start = node.start_position();
            let end = node.end_position();

            out.push(Symbol {
                name,
                kind,
                parent,
                start_line: start.row + 1,
                end_line: end.row + 1,
                signature: signature_line(node, bytes),
            });
        }

        Ok(out)
    }

    fn get_imports(&self, _path: &Path, content: &[u8]) -> Result<Vec<Import>> {
        let tree = self.parse(content)?;
        let bytes = content;

        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&self.import_query, tree.root_node(), bytes);

        let mut out = Vec::new();
        while let Some(m) = matches.next() {
            for cap in m.captures {
                if let Ok(text) = cap.node.utf8_text(bytes) {
                    out.push(parse_import(text));
                }
            }
        }
        Ok(out)
    }
}

fn signature_line(node: Node, bytes: &[u8]) -> String {
    let body_start =
        node.child_by_field_name("body").map(|b| b.start_byte()).unwrap_or_else(|| node.end_byte());
    let Some(text) = bytes.get(node.start_byte()..body_start) else { return String::new() };
    let Ok(text) = std::str::from_utf8(text) else { return String::new() };
    text.split('\n').next().unwrap_or("").trim_end().trim_end_matches(':').to_string()
}

fn parse_import(text: &str) -> Import {
    let t = text.trim();
    if let Some(rest) = t.strip_prefix("from ") {
        if let Some((path, names_part)) = rest.split_once(" import ") {
            let names = names_part
                .trim_start_matches('(')
                .trim_end_matches(')')
                .split(',')
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty())
                .collect();
            return Import {
                path: path.trim().to_string(),
                names,
                alias: None,
                is_local: path.trim().starts_with('.'),
            };
        }
    }
    if let Some(rest) = t.strip_prefix("import ") {
        if let Some((module, alias)) = rest.split_once(" as ") {
            return Import {
                path: module.trim().to_string(),
                names: Vec::new(),
                alias: Some(alias.trim().to_string()),
                is_local: false,
            };
        }
        return Import { path: rest.trim().to_string(), names: Vec::new(), alias: None, is_local: false };
    }
    Import { path: t.to_string(), names: Vec::new(), alias: None, is_local: false }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get<'a>(syms: &'a [Symbol], kind: SymbolKind, name: &str) -> &'a Symbol {
        syms.iter().find(|s| s.kind == kind && s.name == name).expect("symbol not found")
    }

    #[test]
    fn extracts_functions_and_classes() {
        let analyzer = PythonAnalyzer::new().unwrap();
        let src = b"def hello():\n    return 1\n\ndef _hidden():\n    return 2\n";
        let syms = analyzer.extract_symbols(Path::new("test.py"), src).unwrap();
        assert!(syms.iter().any(|s| s.kind == SymbolKind::Function && s.name == "hello"));
        assert!(syms.iter().any(|s| s.kind == SymbolKind::Function && s.name == "_hidden"));
    }

    #[test]
    fn methods_carry_immediate_class_as_parent() {
        let analyzer = PythonAnalyzer::new().unwrap();
        let src = b"class MyClass:\n    def method(self):\n        pass\n";
        let syms = analyzer.extract_symbols(Path::new("t.py"), src).unwrap();
        let m = get(&syms, SymbolKind::Method, "method");
        assert_eq!(m.parent.as_deref(), Some("MyClass"));
    }

    #[test]
    fn nested_classes_use_innermost_class_as_parent() {
        let analyzer = PythonAnalyzer::new().unwrap();
        let src = b"class Outer:\n    class Inner:\n        def m(self):\n            pass\n";
        let syms = analyzer.extract_symbols(Path::new("t.py"), src).unwrap();
        let m = get(&syms, SymbolKind::Method, "m");
        assert_eq!(m.parent.as_deref(), Some("Inner"));
    }

    #[test]
    fn imports_parse_from_and_plain_forms() {
        let analyzer = PythonAnalyzer::new().unwrap();
        let src = b"import os\nfrom collections import OrderedDict, defaultdict\n";
        let imports = analyzer.get_imports(Path::new("t.py"), src).unwrap();
        assert!(imports.iter().any(|i| i.path == "os"));
        let grouped = imports.iter().find(|i| i.path == "collections").unwrap();
        assert!(grouped.names.contains(&"OrderedDict".to_string()));
    }
}
