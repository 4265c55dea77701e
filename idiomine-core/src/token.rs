use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::span::Span;

/// Lexical class of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    Identifier,
    Keyword,
    Literal,
    Punctuation,
    Lifetime,
    OpenDelimiter,
    CloseDelimiter,
}

/// A token of a canonical source text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(text: impl Into<String>, kind: TokenKind, span: Span) -> Self {
        Self {
            text: text.into(),
            kind,
            span,
        }
    }

    #[must_use]
    pub fn is_identifier(&self) -> bool {
        self.kind == TokenKind::Identifier
    }
}

/// Ordered token stream with range lookups and an optional inverted
/// span → (token, position) index.
#[derive(Debug, Clone, Default)]
pub struct TokenIndex {
    tokens: Vec<Token>,
    by_span: Option<HashMap<Span, usize>>,
}

impl TokenIndex {
    #[must_use]
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            by_span: None,
        }
    }

    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Tokens whose span lies within `[start, end)`, in stream order.
    ///
    /// Starts at the first token beginning at or after `start` and takes tokens
    /// while they end at or before `end`. The stream is assumed to be ordered by
    /// position, which holds for every lexer-produced stream.
    #[must_use]
    pub fn tokens_in(&self, start: usize, end: usize) -> &[Token] {
        let from = self.tokens.partition_point(|t| t.span.start < start);
        let len = self.tokens[from..]
            .iter()
            .take_while(|t| t.span.end() <= end)
            .count();
        &self.tokens[from..from + len]
    }

    #[must_use]
    pub fn tokens_in_span(&self, span: Span) -> &[Token] {
        self.tokens_in(span.start, span.end())
    }

    /// Build the inverted span index. Later tokens win on duplicate spans.
    #[must_use]
    pub fn with_inverted_index(mut self) -> Self {
        let by_span = self
            .tokens
            .iter()
            .enumerate()
            .map(|(pos, t)| (t.span, pos))
            .collect();
        self.by_span = Some(by_span);
        self
    }

    /// The token with exactly this span and its sequential position.
    /// `None` when the span is unknown or the inverted index was not built.
    #[must_use]
    pub fn token_at(&self, span: Span) -> Option<(&Token, usize)> {
        let pos = *self.by_span.as_ref()?.get(&span)?;
        Some((&self.tokens[pos], pos))
    }

    /// Position of the token with exactly this span, `-1` if unknown.
    #[must_use]
    pub fn position_of(&self, span: Span) -> i64 {
        self.token_at(span)
            .and_then(|(_, pos)| i64::try_from(pos).ok())
            .unwrap_or(-1)
    }

    /// Keep only tokens whose text is a key of `renames`, substituting the mapped text.
    #[must_use]
    pub fn with_renames<S: std::hash::BuildHasher>(
        &self,
        renames: &HashMap<String, String, S>,
    ) -> TokenIndex {
        let tokens = self
            .tokens
            .iter()
            .filter_map(|t| {
                renames
                    .get(&t.text)
                    .map(|text| Token::new(text.clone(), t.kind, t.span))
            })
            .collect();
        TokenIndex::new(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tok(text: &str, start: usize) -> Token {
        Token::new(text, TokenKind::Identifier, Span::new(start, text.len()))
    }

    fn sample() -> TokenIndex {
        // "let x = y ;"
        TokenIndex::new(vec![
            tok("let", 0),
            tok("x", 4),
            tok("=", 6),
            tok("y", 8),
            tok(";", 9),
        ])
    }

    fn texts(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn range_query_returns_enclosed_tokens() {
        let idx = sample();
        assert_eq!(texts(idx.tokens_in(4, 9)), vec!["x", "=", "y"]);
        assert_eq!(texts(idx.tokens_in(0, 10)), vec!["let", "x", "=", "y", ";"]);
    }

    #[test]
    fn range_query_skips_partially_covered_tokens() {
        let idx = sample();
        // starts inside "let", ends inside nothing
        assert_eq!(texts(idx.tokens_in(1, 7)), vec!["x", "="]);
        // end bound cuts "let"
        assert!(idx.tokens_in(0, 2).is_empty());
    }

    #[test]
    fn range_query_on_empty_range() {
        let idx = sample();
        assert!(idx.tokens_in(5, 5).is_empty());
        assert!(idx.tokens_in(50, 60).is_empty());
    }

    #[test]
    fn inverted_index_needs_building() {
        let idx = sample();
        assert!(idx.token_at(Span::new(4, 1)).is_none());
        assert_eq!(idx.position_of(Span::new(4, 1)), -1);

        let idx = idx.with_inverted_index();
        let (token, pos) = idx.token_at(Span::new(4, 1)).unwrap();
        assert_eq!(token.text, "x");
        assert_eq!(pos, 1);
        assert_eq!(idx.position_of(Span::new(9, 1)), 4);
        assert_eq!(idx.position_of(Span::new(4, 2)), -1);
    }

    #[test]
    fn rename_projection_keeps_only_mapped_tokens() {
        let idx = sample();
        let renames: HashMap<String, String> = [
            ("x".to_string(), "VAR0".to_string()),
            ("y".to_string(), "VAR1".to_string()),
        ]
        .into_iter()
        .collect();
        let projected = idx.with_renames(&renames);
        assert_eq!(texts(projected.tokens()), vec!["VAR0", "VAR1"]);
        assert_eq!(projected.tokens()[0].span, Span::new(4, 1));
    }
}
