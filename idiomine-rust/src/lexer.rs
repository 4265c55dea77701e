//! Flattening of `proc_macro2` token trees into positioned [`Token`]s.
//!
//! Spans are byte offsets into the text the stream was parsed from, which
//! needs the `span-locations` feature of `proc_macro2`.

use std::iter::Peekable;

use idiomine_core::span::Span;
use idiomine_core::token::{Token, TokenKind};
use proc_macro2::{Delimiter, Spacing, TokenStream, TokenTree};

/// Strict and reserved-in-practice Rust keywords.
pub const KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
    "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move",
    "mut", "pub", "ref", "return", "self", "Self", "static", "struct", "super", "trait", "true",
    "type", "unsafe", "use", "where", "while",
];

/// Multi-character operators, longest first.
const OPERATORS: &[&str] = &[
    "<<=", ">>=", "...", "..=", "::", "->", "=>", "==", "!=", "<=", ">=", "&&", "||", "+=", "-=",
    "*=", "/=", "%=", "^=", "&=", "|=", "<<", ">>", "..",
];

fn span_of(span: proc_macro2::Span) -> Span {
    let range = span.byte_range();
    Span::from_bounds(range.start, range.end)
}

/// Tokens of `stream` in source order. Delimiters of groups become their own
/// tokens; invisible groups are flattened.
#[must_use]
pub fn flatten(stream: TokenStream) -> Vec<Token> {
    let mut out = Vec::new();
    push_stream(stream, &mut out);
    out
}

fn push_stream(stream: TokenStream, out: &mut Vec<Token>) {
    let mut iter = stream.into_iter().peekable();
    while let Some(tree) = iter.next() {
        match tree {
            TokenTree::Group(group) => {
                let delims = match group.delimiter() {
                    Delimiter::Parenthesis => Some(("(", ")")),
                    Delimiter::Brace => Some(("{", "}")),
                    Delimiter::Bracket => Some(("[", "]")),
                    Delimiter::None => None,
                };
                match delims {
                    Some((open, close)) => {
                        out.push(Token::new(
                            open,
                            TokenKind::OpenDelimiter,
                            span_of(group.span_open()),
                        ));
                        push_stream(group.stream(), out);
                        out.push(Token::new(
                            close,
                            TokenKind::CloseDelimiter,
                            span_of(group.span_close()),
                        ));
                    }
                    None => push_stream(group.stream(), out),
                }
            }
            TokenTree::Ident(ident) => {
                let text = ident.to_string();
                let kind = if KEYWORDS.contains(&text.as_str()) {
                    TokenKind::Keyword
                } else {
                    TokenKind::Identifier
                };
                out.push(Token::new(text, kind, span_of(ident.span())));
            }
            TokenTree::Literal(lit) => {
                out.push(Token::new(
                    lit.to_string(),
                    TokenKind::Literal,
                    span_of(lit.span()),
                ));
            }
            TokenTree::Punct(punct) => push_punct(punct, &mut iter, out),
        }
    }
}

fn push_punct<I>(first: proc_macro2::Punct, iter: &mut Peekable<I>, out: &mut Vec<Token>)
where
    I: Iterator<Item = TokenTree>,
{
    // 'a
    if first.as_char() == '\''
        && let Some(TokenTree::Ident(_)) = iter.peek()
        && let Some(TokenTree::Ident(ident)) = iter.next()
    {
        let span = span_of(first.span()).cover(span_of(ident.span()));
        out.push(Token::new(format!("'{ident}"), TokenKind::Lifetime, span));
        return;
    }

    // Collect a run of joined punctuation, then split it into operators.
    let mut run = vec![(first.as_char(), span_of(first.span()))];
    let mut spacing = first.spacing();
    while spacing == Spacing::Joint {
        let Some(TokenTree::Punct(next)) = iter.peek() else {
            break;
        };
        if next.as_char() == '\'' {
            break;
        }
        run.push((next.as_char(), span_of(next.span())));
        spacing = next.spacing();
        iter.next();
    }

    let chars: String = run.iter().map(|(c, _)| *c).collect();
    let mut i = 0;
    while i < run.len() {
        let len = OPERATORS
            .iter()
            .find(|op| chars[i..].starts_with(**op))
            .map_or(1, |op| op.len());
        let span = run[i].1.cover(run[i + len - 1].1);
        out.push(Token::new(&chars[i..i + len], TokenKind::Punctuation, span));
        i += len;
    }
}

/// Lex `text` into positioned tokens.
pub fn lex(text: &str) -> syn::Result<Vec<Token>> {
    Ok(flatten(syn::parse_str::<TokenStream>(text)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(code: &str) -> Vec<String> {
        lex(code).unwrap().into_iter().map(|t| t.text).collect()
    }

    #[test]
    fn groups_emit_delimiters() {
        assert_eq!(texts("f(a, [b])"), vec!["f", "(", "a", ",", "[", "b", "]", ")"]);
    }

    #[test]
    fn joint_operators_are_single_tokens() {
        assert_eq!(
            texts("a::b -> c += d >> e"),
            vec!["a", "::", "b", "->", "c", "+=", "d", ">>", "e"]
        );
    }

    #[test]
    fn glued_operators_split_at_known_boundaries() {
        assert_eq!(texts("a=-1"), vec!["a", "=", "-", "1"]);
        assert_eq!(texts("x..=y"), vec!["x", "..=", "y"]);
    }

    #[test]
    fn lifetimes_are_single_tokens() {
        let tokens = lex("&'a str").unwrap();
        assert_eq!(tokens[1].text, "'a");
        assert_eq!(tokens[1].kind, TokenKind::Lifetime);
        assert_eq!(tokens[1].span, Span::new(1, 2));
    }

    #[test]
    fn spans_are_byte_offsets_into_text() {
        let code = "let x = \"é\";\nx";
        for token in lex(code).unwrap() {
            assert_eq!(token.span.slice(code), Some(token.text.as_str()));
        }
    }

    #[test]
    fn keywords_are_marked() {
        let tokens = lex("let mut v = self").unwrap();
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Keyword,
                TokenKind::Keyword,
                TokenKind::Identifier,
                TokenKind::Punctuation,
                TokenKind::Keyword,
            ]
        );
    }
}
