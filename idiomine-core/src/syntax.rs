use serde::{Deserialize, Serialize};

use crate::span::Span;

/// Coarse syntactic category of an outline node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyntaxKind {
    /// `let` statement.
    LocalDeclaration,
    /// Expression terminated by `;`, or a statement macro.
    ExpressionStatement,
    /// Trailing expression of a block.
    TailExpression,
    Item,
    Block,
    Expression,
    MatchArm,
    Field,
    Other,
}

/// One node of a [`SyntaxOutline`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutlineNode {
    pub kind: SyntaxKind,
    pub span: Span,
    pub depth: usize,
}

/// Flat list of the statement- and expression-level nodes of a tree.
#[derive(Debug, Clone, Default)]
pub struct SyntaxOutline {
    nodes: Vec<OutlineNode>,
}

impl SyntaxOutline {
    #[must_use]
    pub fn new(nodes: Vec<OutlineNode>) -> Self {
        Self { nodes }
    }

    #[must_use]
    pub fn nodes(&self) -> &[OutlineNode] {
        &self.nodes
    }

    /// Smallest node containing `span`; among equally sized nodes the outermost.
    #[must_use]
    pub fn find_node(&self, span: Span) -> Option<&OutlineNode> {
        self.nodes
            .iter()
            .filter(|n| n.span.contains(span))
            .min_by_key(|n| (n.span.len, n.depth))
    }

    /// Kind of the node enclosing `span`, [`SyntaxKind::Other`] if none does.
    #[must_use]
    pub fn kind_at(&self, span: Span) -> SyntaxKind {
        self.find_node(span).map_or(SyntaxKind::Other, |n| n.kind)
    }
}
