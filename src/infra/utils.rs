//! Filepath: src/infra/utils.rs
//! Tree-sitter node helpers shared by the language analyzers.

use tree_sitter::{Node, Point};

/// Common Tree-sitter node helpers
pub struct TsNodeUtils;

impl TsNodeUtils {
    /// Check if `node` has an ancestor of the given kind
    pub fn has_ancestor(mut node: Node, kind: &str) -> bool {
        while let Some(p) = node.parent() {
            if p.kind() == kind {
                return true;
            }
            node = p;
        }
        false
    }

    /// Find the first ancestor of the given kind
    pub fn find_ancestor<'a>(mut node: Node<'a>, kind: &'a str) -> Option<Node<'a>> {
        while let Some(p) = node.parent() {
            if p.kind() == kind {
                return Some(p);
            }
            node = p;
        }
        None
    }

    /// Extract text of a child field if present
    pub fn field_text<'a>(node: Node, field: &str, bytes: &'a [u8]) -> Option<&'a str> {
        let child = node.child_by_field_name(field)?;
        child.utf8_text(bytes).ok()
    }

    /// Convert node positions to 1-based line numbers
    pub fn line_range_1based(node: Node) -> (usize, usize) {
        let s: Point = node.start_position();
        let e: Point = node.end_position();
        (s.row + 1, e.row + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tree_sitter::{Language, Parser};

    fn parse_python(src: &str) -> tree_sitter::Tree {
        let mut p = Parser::new();
        let lang: Language = tree_sitter_python::LANGUAGE.into();
        p.set_language(&lang).expect("set language");
        p.parse(src, None).expect("parse")
    }

    #[test]
    fn tsnode_has_ancestor_smoke() {
        let src = "class A:\n    def m(self): pass\n";
        let tree = parse_python(src);
        let root = tree.root_node();

        fn dfs<'a>(n: Node<'a>, out: &mut Option<Node<'a>>) {
            if n.kind() == "function_definition" {
                *out = Some(n);
                return;
            }
            for i in 0..n.named_child_count() {
                if let Some(ch) = n.named_child(i) {
                    dfs(ch, out);
                    if out.is_some() {
                        return;
                    }
                }
            }
        }

        let mut method: Option<Node> = None;
        dfs(root, &mut method);
        let m = method.expect("method found");
        assert!(TsNodeUtils::has_ancestor(m, "class_definition"));
    }

    #[test]
    fn line_range_is_1_based() {
        let src = "class A:\n    pass\n";
        let tree = parse_python(src);
        let (start, _end) = TsNodeUtils::line_range_1based(tree.root_node());
        assert_eq!(start, 1);
    }
}
