//! Filepath: src/core/optimize/skeleton.rs
//! Per-language outline generation: imports plus symbol shells in
//! place of full bodies. Backed by a pluggable `Analyzer` registry;
//! with no registry (or no analyzer for a file's language) skeleton
//! mode silently falls through to normal optimization.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::core::error::Result;

/// The coarse symbol taxonomy shared across every supported language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolKind {
    Package,
    Class,
    Struct,
    Interface,
    Type,
    Function,
    Method,
    Constant,
    Variable,
    Component,
    Composable,
    Module,
}

/// One extracted declaration. `parent` names the owning type for
/// methods (a receiver or enclosing class); `signature` is the
/// rendered declaration line with the body elided, when the analyzer
/// can produce one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub parent: Option<String>,
    pub start_line: usize,
    pub end_line: usize,
    pub signature: String,
}

/// One import/use declaration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Import {
    pub path: String,
    pub names: Vec<String>,
    pub alias: Option<String>,
    pub is_local: bool,
}

/// A per-language symbol/import extractor.
pub trait Analyzer: Send + Sync {
    fn language(&self) -> &'static str;
    fn extract_symbols(&self, path: &Path, content: &[u8]) -> Result<Vec<Symbol>>;
    fn get_imports(&self, path: &Path, content: &[u8]) -> Result<Vec<Import>>;
}

/// Extension-keyed lookup table of analyzers. A registry with no
/// entries disables skeleton mode transparently.
#[derive(Clone, Default)]
pub struct AnalyzerRegistry {
    analyzers: HashMap<String, Arc<dyn Analyzer>>,
}

impl AnalyzerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self { analyzers: HashMap::new() }
    }

    pub fn register(&mut self, ext: &str, analyzer: Arc<dyn Analyzer>) {
        self.analyzers.insert(ext.to_string(), analyzer);
    }

    #[must_use]
    pub fn get(&self, ext: &str) -> Option<&dyn Analyzer> {
        self.analyzers.get(ext).map(Arc::as_ref)
    }

    /// Wire up the analyzers shipped with this crate (Rust, Python).
    pub fn with_defaults() -> Result<Self> {
        let mut registry = Self::new();
        registry.register("rs", Arc::new(crate::parsers::RustAnalyzer::new()?));
        registry.register("py", Arc::new(crate::parsers::PythonAnalyzer::new()?));
        Ok(registry)
    }
}

/// Generate a skeleton for `path`/`content`. Returns an empty string
/// if the registry is unavailable, no analyzer covers this file's
/// extension, or symbol extraction fails — callers fall through to
/// normal optimization in that case.
#[must_use]
pub fn generate_skeleton(
    registry: Option<&AnalyzerRegistry>,
    path: &Path,
    content: &str,
) -> String {
    let Some(registry) = registry else { return String::new() };
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return String::new();
    };
    let Some(analyzer) = registry.get(ext) else {
        return String::new();
    };

    let bytes = content.as_bytes();
    let imports = analyzer.get_imports(path, bytes).unwrap_or_default();
    let symbols = match analyzer.extract_symbols(path, bytes) {
        Ok(s) => s,
        Err(_) => return String::new(),
    };

    render_skeleton(ext, &imports, &symbols)
}

fn of_kind<'a>(symbols: &'a [Symbol], kind: SymbolKind) -> Vec<&'a Symbol> {
    let mut v: Vec<&Symbol> = symbols.iter().filter(|s| s.kind == kind).collect();
    v.sort_by(|a, b| a.name.cmp(&b.name));
    v
}

fn shell_line(s: &Symbol, fallback: impl Fn(&str) -> String) -> String {
    if s.signature.is_empty() { fallback(&s.name) } else { s.signature.clone() }
}

fn render_skeleton(ext: &str, imports: &[Import], symbols: &[Symbol]) -> String {
    match ext {
        "go" => render_go(imports, symbols),
        "ts" | "tsx" | "js" | "jsx" | "vue" | "svelte" => render_ts(imports, symbols),
        "py" => render_python(imports, symbols),
        "java" | "kt" => render_java(imports, symbols),
        "rs" => render_rust(imports, symbols),
        "cs" => render_csharp(imports, symbols),
        _ => render_fallback(symbols),
    }
}

fn render_rust(imports: &[Import], symbols: &[Symbol]) -> String {
    let mut out = String::new();
    for imp in imports {
        out.push_str(&format!("use {};\n", rust_import_text(imp)));
    }
    if !imports.is_empty() {
        out.push('\n');
    }
    for s in of_kind(symbols, SymbolKind::Struct) {
        out.push_str(&format!("struct {} {{ /* ... */ }}\n", s.name));
    }
    for s in of_kind(symbols, SymbolKind::Interface) {
        out.push_str(&format!("trait {} {{ /* ... */ }}\n", s.name));
    }
    for s in of_kind(symbols, SymbolKind::Type) {
        out.push_str(&format!("type {} = /* ... */;\n", s.name));
    }
    for s in of_kind(symbols, SymbolKind::Constant) {
        out.push_str(&format!("const {}: /* ... */ = /* ... */;\n", s.name));
    }
    for s in of_kind(symbols, SymbolKind::Function) {
        out.push_str(&shell_line(s, |n| format!("fn {n}() {{ /* ... */ }}")));
        out.push('\n');
    }
    render_methods_by_parent(symbols, &mut out, |owner| format!("impl {owner} {{"), "}");
    out
}

fn rust_import_text(imp: &Import) -> String {
    if imp.names.is_empty() {
        imp.path.clone()
    } else if imp.names.len() == 1 {
        format!("{}::{}", imp.path, imp.names[0])
    } else {
        format!("{}::{{{}}}", imp.path, imp.names.join(", "))
    }
}

fn render_methods_by_parent(
    symbols: &[Symbol],
    out: &mut String,
    open: impl Fn(&str) -> String,
    close: &str,
) {
    let methods = of_kind(symbols, SymbolKind::Method);
    let mut by_owner: HashMap<&str, Vec<&Symbol>> = HashMap::new();
    for m in &methods {
        by_owner.entry(m.parent.as_deref().unwrap_or("?")).or_default().push(m);
    }
    let mut owners: Vec<&&str> = by_owner.keys().collect();
    owners.sort();
    for owner in owners {
        let group = &by_owner[owner];
        out.push_str(&open(owner));
        out.push('\n');
        for m in group {
            out.push_str("    ");
            out.push_str(&shell_line(m, |n| format!("fn {n}() {{ /* ... */ }}")));
            out.push('\n');
        }
        out.push_str(close);
        out.push('\n');
    }
}

fn render_go(imports: &[Import], symbols: &[Symbol]) -> String {
    let mut out = String::new();
    if let Some(pkg) = of_kind(symbols, SymbolKind::Package).first() {
        out.push_str(&format!("package {}\n\n", pkg.name));
    }
    if !imports.is_empty() {
        let paths: Vec<String> = imports.iter().map(|imp| format!("\"{}\"", imp.path)).collect();
        out.push_str(&format!("import ( {} )\n\n", paths.join("; ")));
    }
    for s in of_kind(symbols, SymbolKind::Constant) {
        out.push_str(&format!("const {} = /* ... */\n", s.name));
    }
    for s in of_kind(symbols, SymbolKind::Variable) {
        out.push_str(&format!("var {} /* ... */\n", s.name));
    }
    for s in of_kind(symbols, SymbolKind::Struct) {
        out.push_str(&format!("type {} struct {{ /* ... */ }}\n", s.name));
    }
    for s in of_kind(symbols, SymbolKind::Interface) {
        out.push_str(&format!("type {} interface {{ /* ... */ }}\n", s.name));
    }
    for s in of_kind(symbols, SymbolKind::Function) {
        out.push_str(&shell_line(s, |n| format!("func {n}() {{ /* ... */ }}")));
        out.push('\n');
    }
    render_methods_by_parent(
        symbols,
        &mut out,
        |owner| format!("// methods on {owner}"),
        "",
    );
    out
}

fn render_ts(imports: &[Import], symbols: &[Symbol]) -> String {
    let mut out = String::new();
    for imp in imports {
        let names = if imp.names.is_empty() {
            String::new()
        } else {
            format!("{{ {} }} ", imp.names.join(", "))
        };
        out.push_str(&format!("import {}from \"{}\";\n", names, imp.path));
    }
    if !imports.is_empty() {
        out.push('\n');
    }
    for s in of_kind(symbols, SymbolKind::Component) {
        out.push_str(&format!("function {}(/* ... */) {{ /* ... */ }}\n", s.name));
    }
    for s in of_kind(symbols, SymbolKind::Class) {
        out.push_str(&format!("class {} {{ /* ... */ }}\n", s.name));
    }
    for s in of_kind(symbols, SymbolKind::Interface) {
        out.push_str(&format!("interface {} {{ /* ... */ }}\n", s.name));
    }
    for s in of_kind(symbols, SymbolKind::Type) {
        out.push_str(&format!("type {} = /* ... */;\n", s.name));
    }
    for s in of_kind(symbols, SymbolKind::Function) {
        out.push_str(&shell_line(s, |n| format!("function {n}() {{ /* ... */ }}")));
        out.push('\n');
    }
    render_methods_by_parent(symbols, &mut out, |owner| format!("class {owner} {{"), "}");
    out
}

fn render_python(imports: &[Import], symbols: &[Symbol]) -> String {
    let mut out = String::new();
    for imp in imports {
        if imp.names.is_empty() {
            out.push_str(&format!("import {}\n", imp.path));
        } else {
            out.push_str(&format!("from {} import {}\n", imp.path, imp.names.join(", ")));
        }
    }
    if !imports.is_empty() {
        out.push('\n');
    }
    for s in of_kind(symbols, SymbolKind::Class) {
        out.push_str(&format!("class {}:\n    ...\n", s.name));
    }
    for s in of_kind(symbols, SymbolKind::Function) {
        out.push_str(&shell_line(s, |n| format!("def {n}(...):\n    ...")));
        out.push('\n');
    }
    render_methods_by_parent(
        symbols,
        &mut out,
        |owner| format!("class {owner}:"),
        "",
    );
    out
}

fn render_java(imports: &[Import], symbols: &[Symbol]) -> String {
    let mut out = String::new();
    for imp in imports {
        out.push_str(&format!("import {};\n", imp.path));
    }
    if !imports.is_empty() {
        out.push('\n');
    }
    for s in of_kind(symbols, SymbolKind::Class) {
        out.push_str(&format!("class {} {{ /* ... */ }}\n", s.name));
    }
    for s in of_kind(symbols, SymbolKind::Interface) {
        out.push_str(&format!("interface {} {{ /* ... */ }}\n", s.name));
    }
    render_methods_by_parent(symbols, &mut out, |owner| format!("class {owner} {{"), "}");
    out
}

fn render_csharp(imports: &[Import], symbols: &[Symbol]) -> String {
    let mut out = String::new();
    for imp in imports {
        out.push_str(&format!("using {};\n", imp.path));
    }
    if !imports.is_empty() {
        out.push('\n');
    }
    for s in of_kind(symbols, SymbolKind::Class) {
        out.push_str(&format!("class {} {{ /* ... */ }}\n", s.name));
    }
    for s in of_kind(symbols, SymbolKind::Interface) {
        out.push_str(&format!("interface {} {{ /* ... */ }}\n", s.name));
    }
    render_methods_by_parent(symbols, &mut out, |owner| format!("class {owner} {{"), "}");
    out
}

fn render_fallback(symbols: &[Symbol]) -> String {
    let mut all: Vec<&Symbol> = symbols.iter().collect();
    all.sort_by(|a, b| a.start_line.cmp(&b.start_line).then(a.name.cmp(&b.name)));
    all.iter()
        .map(|s| format!("{:?} {}", s.kind, s.name))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(name: &str, kind: SymbolKind, parent: Option<&str>) -> Symbol {
        Symbol {
            name: name.to_string(),
            kind,
            parent: parent.map(str::to_string),
            start_line: 1,
            end_line: 1,
            signature: String::new(),
        }
    }

    #[test]
    fn generate_skeleton_empty_without_registry() {
        assert_eq!(generate_skeleton(None, Path::new("a.rs"), "fn a() {}"), "");
    }

    #[test]
    fn render_rust_groups_structs_and_functions() {
        let symbols = vec![
            sym("Foo", SymbolKind::Struct, None),
            sym("bar", SymbolKind::Function, None),
        ];
        let out = render_rust(&[], &symbols);
        assert!(out.contains("struct Foo"));
        assert!(out.contains("fn bar()"));
    }

    #[test]
    fn render_rust_groups_methods_by_owner() {
        let symbols = vec![sym("new", SymbolKind::Method, Some("Foo"))];
        let out = render_rust(&[], &symbols);
        assert!(out.contains("impl Foo {"));
        assert!(out.contains("fn new()"));
    }

    #[test]
    fn render_python_emits_class_shells() {
        let symbols = vec![sym("Widget", SymbolKind::Class, None)];
        let out = render_python(&[], &symbols);
        assert!(out.contains("class Widget:"));
    }
}
