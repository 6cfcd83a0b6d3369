//! Shared tree-sitter plumbing for the language analyzers.

use once_cell::sync::OnceCell;
use tree_sitter::{Language, Node, Parser, Query, QueryCursor, StreamingIterator, Tree};

use crate::ParseError;

/// A tree-sitter grammar paired with the query that selects the nodes an
/// analyzer inspects. The query is compiled on first use.
pub(crate) struct Grammar {
    name: &'static str,
    language: fn() -> Language,
    pattern: &'static str,
    query: OnceCell<Query>,
}

impl Grammar {
    pub(crate) const fn new(
        name: &'static str,
        language: fn() -> Language,
        pattern: &'static str,
    ) -> Self {
        Self {
            name,
            language,
            pattern,
            query: OnceCell::new(),
        }
    }

    fn query(&self) -> Result<&Query, ParseError> {
        self.query.get_or_try_init(|| {
            Query::new(&(self.language)(), self.pattern)
                .map_err(|e| ParseError::Grammar(format!("{}: {e}", self.name)))
        })
    }

    /// Parses `source`, rejecting trees that contain syntax errors.
    pub(crate) fn parse(&self, source: &str) -> Result<Tree, ParseError> {
        let mut parser = Parser::new();
        parser
            .set_language(&(self.language)())
            .map_err(|e| ParseError::Grammar(format!("{}: {e}", self.name)))?;

        let tree = parser
            .parse(source, None)
            .ok_or_else(|| ParseError::Grammar(format!("{}: parser produced no tree", self.name)))?;

        match error_line(tree.root_node()) {
            Some(line) => Err(ParseError::Syntax { line }),
            None => Ok(tree),
        }
    }

    /// Every captured node with its capture name, in document order.
    pub(crate) fn captures<'t>(
        &'static self,
        tree: &'t Tree,
        source: &str,
    ) -> Result<Vec<(&'static str, Node<'t>)>, ParseError> {
        let query = self.query()?;
        let names = query.capture_names();

        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(query, tree.root_node(), source.as_bytes());

        let mut captured = Vec::new();
        while let Some(m) = matches.next() {
            for cap in m.captures {
                let name = usize::try_from(cap.index)
                    .ok()
                    .and_then(|i| names.get(i))
                    .copied()
                    .unwrap_or_default();
                captured.push((name, cap.node));
            }
        }
        captured.sort_by_key(|(_, node)| node.start_byte());
        Ok(captured)
    }
}

fn error_line(node: Node<'_>) -> Option<usize> {
    if node.is_error() || node.is_missing() {
        return Some(node.start_position().row + 1);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    node.children(&mut cursor).find_map(error_line)
}

pub(crate) fn text<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    source.get(node.byte_range()).unwrap_or_default()
}

/// Contents of a string literal node without its quotes.
pub(crate) fn string_value<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    let quoted = text(node, source);
    quoted
        .get(1..quoted.len().saturating_sub(1))
        .unwrap_or_default()
}

pub(crate) fn named_child<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor).find(|c| c.kind() == kind)
}

/// Whether `node` has an anonymous `token` child, such as the `type` in
/// `import type { A } from 'a'`.
pub(crate) fn has_token(node: Node<'_>, token: &str) -> bool {
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .any(|c| !c.is_named() && c.kind() == token)
}
