//! Filepath: src/parsers/rust_analyzer.rs
//! Rust symbol and import extraction via a single resilient
//! tree-sitter query, kind-disambiguated by ancestor walks.

use std::path::Path;

use tree_sitter::{Language, Node, Parser, Query, QueryCursor, StreamingIterator};

use crate::core::error::{PipelineError, Result};
use crate::core::optimize::skeleton::{Analyzer, Import, Symbol, SymbolKind};
use crate::infra::utils::TsNodeUtils;

pub struct RustAnalyzer {
    language: Language,
    items_query: Query,
    use_query: Query,
}

impl RustAnalyzer {
    pub fn new() -> Result<Self> {
        let language: Language = tree_sitter_rust::LANGUAGE.into();

        let items_query_src = r#"
            (function_item) @function
            (struct_item)   @struct
            (enum_item)     @enum
            (trait_item)    @trait
            (type_item)     @type_alias
            (const_item)    @constant
            (static_item)   @static
            (mod_item)      @module

            (impl_item
              (declaration_list (function_item) @method))
            (trait_item
              (declaration_list (function_item) @trait_method))
        "#;
        let items_query = Query::new(&language, items_query_src)
            .map_err(|e| PipelineError::Internal(format!("create Rust items query: {e}")))?;

        let use_query_src = r#"(use_declaration) @use"#;
        let use_query = Query::new(&language, use_query_src)
            .map_err(|e| PipelineError::Internal(format!("create Rust use query: {e}")))?;

        Ok(Self { language, items_query, use_query })
    }

    fn parse<'a>(&self, content: &'a [u8]) -> Result<tree_sitter::Tree> {
        let mut parser = Parser::new();
        parser
            .set_language(&self.language)
            .map_err(|e| PipelineError::Internal(format!("set language: {e}")))?;
        parser
            .parse(content, None)
            .ok_or_else(|| PipelineError::ParseFailure("failed to parse Rust source".to_string()))
    }
}

impl Analyzer for RustAnalyzer {
    fn language(&self) -> &'static str {
        "rust"
    }

    fn extract_symbols(&self, _path: &Path, content: &[u8]) -> Result<Vec<Symbol>> {
        let tree = self.parse(content)?;

        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&self.items_query, tree.root_node(), content);
        let cap_names: Vec<&str> = self.items_query.capture_names().to_vec();

        let mut out = Vec::new();

        while let Some(m) = matches.next() {
            let mut picked: Option<(&str, Node)> = None;
            for cap in m.captures {
                let cname = cap_names[cap.index as usize];
                if matches!(
                    cname,
                    "function"
                        | "struct"
                        | "enum"
                        | "trait"
                        | "type_alias"
                        | "constant"
                        | "static"
                        | "module"
                        | "method"
                        | "trait_method"
                ) {
                    picked = Some((cname, cap.node));
                    break;
                }
            }
            let Some((cname, node)) = picked else { continue };

            let is_in_impl = TsNodeUtils::has_ancestor(node, "impl_item");
            let is_in_trait = TsNodeUtils::has_ancestor(node, "trait_item");

            let kind = match (cname, is_in_impl, is_in_trait) {
                ("function", false, false) => Some(SymbolKind::Function),
                ("method" | "trait_method", ..) => Some(SymbolKind::Method),
                ("function", true, _) | ("function", _, true) => None,
                ("struct", ..) => Some(SymbolKind::Struct),
                ("enum", ..) => Some(SymbolKind::Type),
                ("trait", ..) => Some(SymbolKind::Interface),
                ("type_alias", ..) => Some(SymbolKind::Type),
                ("constant", ..) => Some(SymbolKind::Constant),
                ("static", ..) => Some(SymbolKind::Variable),
                ("module", ..) => Some(SymbolKind::Module),
                _ => None,
            };

            if let Some(kind) = kind
                && let Some(sym) = build_symbol(kind, node, content)
            {
                out.push(sym);
            }
        }

        Ok(out)
    }

    fn get_imports(&self, _path: &Path, content: &[u8]) -> Result<Vec<Import>> {
        let tree = self.parse(content)?;

        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&self.use_query, tree.root_node(), content);

        let mut out = Vec::new();
        while let Some(m) = matches.next() {
            for cap in m.captures {
                if let Ok(text) = cap.node.utf8_text(content) {
                    out.push(parse_use_declaration(text));
                }
            }
        }
        Ok(out)
    }
}

fn parse_use_declaration(text: &str) -> Import {
    let body = text.trim().trim_start_matches("use").trim().trim_end_matches(';').trim();
    if let Some((path, rest)) = body.rsplit_once("::") {
        if let Some(inner) = rest.strip_prefix('{').and_then(|r| r.strip_suffix('}')) {
            let names = inner.split(',').map(|n| n.trim().to_string()).collect();
            return Import { path: path.to_string(), names, alias: None, is_local: path.starts_with("crate") || path.starts_with("self") || path.starts_with("super") };
        }
        if rest == "*" {
            return Import { path: path.to_string(), names: vec!["*".to_string()], alias: None, is_local: path.starts_with("crate") };
        }
        if let Some((name, alias)) = rest.split_once(" as ") {
            return Import {
                path: path.to_string(),
                names: vec![name.trim().to_string()],
                alias: Some(alias.trim().to_string()),
                is_local: path.starts_with("crate") || path.starts_with("self") || path.starts_with("super"),
            };
        }
        return Import { path: path.to_string(), names: vec![rest.to_string()], alias: None, is_local: path.starts_with("crate") || path.starts_with("self") || path.starts_with("super") };
    }
    Import { path: body.to_string(), names: Vec::new(), alias: None, is_local: false }
}

fn build_symbol(kind: SymbolKind, node: Node, bytes: &[u8]) -> Option<Symbol> {
    let name = name_of(node, bytes)?;
    let parent = if kind == SymbolKind::Method { owner_of_method(node, bytes) } else { None };

    let start = node.start_position();
    let end = node.end_position();
    let signature = signature_line(node, bytes);

    Some(Symbol {
        name,
        kind,
        parent,
        start_line: start.row + 1,
        end_line: end.row + 1,
        signature,
    })
}

fn signature_line(node: Node, bytes: &[u8]) -> String {
    let body_start = node
        .child_by_field_name("body")
        .map(|b| b.start_byte())
        .unwrap_or_else(|| node.end_byte());
    let Some(text) = bytes.get(node.start_byte()..body_start) else { return String::new() };
    let Ok(text) = std::str::from_utf8(text) else { return String::new() };
    text.split('\n').next().unwrap_or("").trim_end().to_string()
}

fn first_named_child_text(node: Node, bytes: &[u8], kinds: &[&str]) -> Option<String> {
    for i in 0..node.named_child_count() {
        let c = node.named_child(i)?;
        if kinds.contains(&c.kind()) {
            return Some(c.utf8_text(bytes).ok()?.to_string());
        }
    }
    None
}

fn name_of(node: Node, bytes: &[u8]) -> Option<String> {
    if let Some(n) = node.child_by_field_name("name") {
        return n.utf8_text(bytes).ok().map(|s| s.to_string());
    }
    first_named_child_text(node, bytes, &["identifier", "type_identifier"])
}

fn owner_of_method(mut node: Node, bytes: &[u8]) -> Option<String> {
    while let Some(p) = node.parent() {
        match p.kind() {
            "impl_item" => {
                if let Some(t) = p.child_by_field_name("type") {
                    return t.utf8_text(bytes).ok().map(|s| s.to_string());
                }
                return first_named_child_text(
                    p,
                    bytes,
                    &[
                        "type_identifier",
                        "scoped_type_identifier",
                        "generic_type",
                        "primitive_type",
                        "tuple_type",
                        "reference_type",
                    ],
                );
            }
            "trait_item" => {
                if let Some(n) = p.child_by_field_name("name") {
                    return n.utf8_text(bytes).ok().map(|s| s.to_string());
                }
                return first_named_child_text(p, bytes, &["type_identifier"]);
            }
            _ => node = p,
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get<'a>(syms: &'a [Symbol], kind: SymbolKind, name: &str) -> &'a Symbol {
        syms.iter().find(|s| s.kind == kind && s.name == name).expect("symbol not found")
    }

    #[test]
    fn extracts_functions_and_struct() {
        let analyzer = RustAnalyzer::new().unwrap();
        let src = b"pub fn hello_world() {}\nfn private_fn() {}\nstruct S;\n";
        let syms = analyzer.extract_symbols(Path::new("test.rs"), src).unwrap();
        assert!(syms.iter().any(|s| s.kind == SymbolKind::Function && s.name == "hello_world"));
        assert!(syms.iter().any(|s| s.kind == SymbolKind::Struct && s.name == "S"));
    }

    #[test]
    fn maps_enum_trait_and_type_alias_to_shared_taxonomy() {
        let analyzer = RustAnalyzer::new().unwrap();
        let src = b"enum E { X }\ntrait T {}\ntype Alias = u32;\nconst C: u8 = 1;\nstatic S0: i32 = 0;\nmod m {}\n";
        let syms = analyzer.extract_symbols(Path::new("test.rs"), src).unwrap();
        assert!(syms.iter().any(|s| s.kind == SymbolKind::Type && s.name == "E"));
        assert!(syms.iter().any(|s| s.kind == SymbolKind::Interface && s.name == "T"));
        assert!(syms.iter().any(|s| s.kind == SymbolKind::Type && s.name == "Alias"));
        assert!(syms.iter().any(|s| s.kind == SymbolKind::Constant && s.name == "C"));
        assert!(syms.iter().any(|s| s.kind == SymbolKind::Variable && s.name == "S0"));
        assert!(syms.iter().any(|s| s.kind == SymbolKind::Module && s.name == "m"));
    }

    #[test]
    fn methods_carry_owner_as_parent() {
        let analyzer = RustAnalyzer::new().unwrap();
        let src = b"struct Baz;\nimpl Baz {\n    pub fn y() {}\n}\n";
        let syms = analyzer.extract_symbols(Path::new("test.rs"), src).unwrap();
        let y = get(&syms, SymbolKind::Method, "y");
        assert_eq!(y.parent.as_deref(), Some("Baz"));
    }

    #[test]
    fn imports_parse_grouped_use() {
        let analyzer = RustAnalyzer::new().unwrap();
        let src = b"use std::collections::{HashMap, HashSet};\nuse crate::core::error::Result;\n";
        let imports = analyzer.get_imports(Path::new("test.rs"), src).unwrap();
        let grouped = imports.iter().find(|i| i.names.len() == 2).unwrap();
        assert!(grouped.names.contains(&"HashMap".to_string()));
        let local = imports.iter().find(|i| i.is_local).unwrap();
        assert_eq!(local.path, "crate::core::error");
    }
}
