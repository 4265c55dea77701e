use std::collections::HashSet;

use crate::span::{LineIndex, Span};
use crate::syntax::{SyntaxKind, SyntaxOutline};

/// Keywords and sentinels that do not make a chunk meaningful on their own.
pub const DEFAULT_KEYWORDS: &[&str] = &[
    "VAR0", "let", "mut", "LITERAL", "i32", "i64", "f32", "f64", "String", "str",
];

/// Statement kinds a chunk may consist of.
pub const DEFAULT_ALLOWED_KINDS: &[SyntaxKind] =
    &[SyntaxKind::LocalDeclaration, SyntaxKind::ExpressionStatement];

/// Acceptance rules applied to an extracted change before a record is built.
#[derive(Debug, Clone)]
pub struct EmissionGate {
    keywords: HashSet<String>,
    allowed: HashSet<SyntaxKind>,
}

impl Default for EmissionGate {
    fn default() -> Self {
        Self::new(
            DEFAULT_KEYWORDS.iter().map(|k| (*k).to_string()),
            DEFAULT_ALLOWED_KINDS.iter().copied(),
        )
    }
}

impl EmissionGate {
    pub fn new(
        keywords: impl IntoIterator<Item = String>,
        allowed: impl IntoIterator<Item = SyntaxKind>,
    ) -> Self {
        Self {
            keywords: keywords.into_iter().collect(),
            allowed: allowed.into_iter().collect(),
        }
    }

    /// A token is meaningful unless it is a keyword or pure ASCII punctuation.
    #[must_use]
    pub fn is_meaningful(&self, token: &str) -> bool {
        !self.keywords.contains(token) && !token.chars().all(|c| c.is_ascii_punctuation())
    }

    /// Both sequences are non-empty, each has a meaningful token, and they differ.
    #[must_use]
    pub fn tokens_valid<S: AsRef<str>>(&self, prev: &[S], updated: &[S]) -> bool {
        let has_meaningful = |tokens: &[S]| tokens.iter().any(|t| self.is_meaningful(t.as_ref()));
        !prev.is_empty()
            && !updated.is_empty()
            && has_meaningful(prev)
            && has_meaningful(updated)
            && !prev.iter().map(AsRef::as_ref).eq(updated.iter().map(AsRef::as_ref))
    }

    /// Every non-blank line in `first..=last` is enclosed by a node of an allowed kind.
    #[must_use]
    pub fn lines_allowed(
        &self,
        text: &str,
        lines: &LineIndex,
        outline: &SyntaxOutline,
        first: usize,
        last: usize,
    ) -> bool {
        (first..=last).all(|line| match trimmed_line_span(text, lines, line) {
            None => true,
            Some(span) => self.allowed.contains(&outline.kind_at(span)),
        })
    }
}

/// Span of a line without surrounding whitespace, `None` for blank lines.
#[must_use]
pub fn trimmed_line_span(text: &str, lines: &LineIndex, line: usize) -> Option<Span> {
    let span = lines.line_span(line);
    let content = span.slice(text)?;
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lead = content.len() - content.trim_start().len();
    Some(Span::new(span.start + lead, trimmed.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::OutlineNode;

    #[test]
    fn keywords_and_punctuation_are_not_meaningful() {
        let gate = EmissionGate::default();
        assert!(!gate.is_meaningful("let"));
        assert!(!gate.is_meaningful("VAR0"));
        assert!(!gate.is_meaningful("LITERAL"));
        assert!(!gate.is_meaningful("+="));
        assert!(!gate.is_meaningful(";"));
        assert!(gate.is_meaningful("VAR1"));
        assert!(gate.is_meaningful("push"));
    }

    #[test]
    fn token_sequences_must_differ() {
        let gate = EmissionGate::default();
        let a = ["let", "VAR1", "=", "VAR2", ";"];
        let b = ["let", "VAR1", "=", "VAR3", ";"];
        assert!(gate.tokens_valid(&a, &b));
        assert!(!gate.tokens_valid(&a, &a));
    }

    #[test]
    fn token_sequences_need_meaningful_tokens() {
        let gate = EmissionGate::default();
        let a = ["let", "VAR0", "=", "LITERAL", ";"];
        let b = ["let", "VAR0", "=", "1", ";"];
        assert!(!gate.tokens_valid(&a, &b));
        let empty: [&str; 0] = [];
        assert!(!gate.tokens_valid(&empty, &b));
    }

    #[test]
    fn trimmed_line_span_skips_indent() {
        let text = "fn f() {\n    x;\n   \n}\n";
        let lines = LineIndex::new(text);
        assert_eq!(trimmed_line_span(text, &lines, 1), Some(Span::new(13, 2)));
        assert_eq!(trimmed_line_span(text, &lines, 2), None);
    }

    #[test]
    fn lines_must_sit_in_allowed_nodes() {
        let text = "fn f() {\n    x;\n}\n";
        let lines = LineIndex::new(text);
        let outline = SyntaxOutline::new(vec![
            OutlineNode {
                kind: SyntaxKind::Item,
                span: Span::new(0, 17),
                depth: 0,
            },
            OutlineNode {
                kind: SyntaxKind::ExpressionStatement,
                span: Span::new(13, 2),
                depth: 2,
            },
        ]);
        let gate = EmissionGate::default();
        assert!(gate.lines_allowed(text, &lines, &outline, 1, 1));
        assert!(!gate.lines_allowed(text, &lines, &outline, 0, 1));
    }
}
