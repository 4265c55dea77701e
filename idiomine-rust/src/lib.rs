//! Rust language frontend for idiomine.
//!
//! This crate provides [`RustFrontend`], which implements the
//! [`idiomine_core::frontend::LanguageFrontend`] trait using `syn` for parsing,
//! canonicalization and statement-level syntax trees.

pub mod ast;
pub mod canonical;
pub mod format;
pub mod grammar;
pub mod lexer;
pub mod outline;

use idiomine_core::ast::AstSchema;
use idiomine_core::error::BoxError;
use idiomine_core::frontend::{CanonicalSource, LanguageFrontend, ParsedChunk};
use idiomine_core::names::VariableNameMap;
use proc_macro2::TokenStream;
use syn::parse::Parser;
use tracing::trace;

/// Parse, canonicalize and pretty-print `source`.
///
/// The returned tokens and outline are positioned in the canonical text.
pub fn canonicalize_source(
    source: &str,
    seed: Option<&VariableNameMap>,
    two_pass: bool,
) -> syn::Result<CanonicalSource> {
    let file = canonical::parse_stripped(source)?;
    let (canonical, names) = canonical::canonicalize_file(&file, seed, two_pass);
    let rendered = format::render(&canonical)?;
    trace!(names = names.len(), bytes = rendered.text.len(), "canonicalized");
    Ok(CanonicalSource {
        tokens: lexer::flatten(rendered.stream),
        outline: outline::build(&rendered.file),
        text: rendered.text,
        names,
    })
}

/// Parse a statement sequence into tokens and a `Block` tree.
pub fn parse_chunk(text: &str) -> syn::Result<ParsedChunk> {
    let stream = syn::parse_str::<TokenStream>(text)?;
    let stmts = syn::Block::parse_within.parse2(stream.clone())?;
    Ok(ParsedChunk {
        tokens: lexer::flatten(stream),
        ast: ast::block_node(&stmts),
    })
}

/// Rust language frontend using syn.
pub struct RustFrontend;

impl RustFrontend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustFrontend {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageFrontend for RustFrontend {
    fn language(&self) -> &'static str {
        "rust"
    }

    fn canonicalize(
        &self,
        source: &str,
        seed: Option<&VariableNameMap>,
        two_pass: bool,
    ) -> Result<CanonicalSource, BoxError> {
        canonicalize_source(source, seed, two_pass).map_err(Into::into)
    }

    fn parse_chunk(&self, text: &str) -> Result<ParsedChunk, BoxError> {
        parse_chunk(text).map_err(Into::into)
    }

    fn schema(&self) -> AstSchema {
        grammar::schema()
    }

    /// Span locations are recorded in a thread-local source map that grows
    /// with every parse; drop it between revisions.
    fn finish_revision(&self) {
        proc_macro2::extra::invalidate_current_thread_spans();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use idiomine_core::syntax::SyntaxKind;

    #[test]
    fn rust_frontend_through_trait() {
        let frontend: &dyn LanguageFrontend = &RustFrontend::new();
        let source = "fn main() {\n    let total = 40;\n    println!(\"{}\", total);\n}\n";
        let canonical = frontend.canonicalize(source, None, false).unwrap();
        assert_eq!(
            canonical.text,
            "fn main() {\n    let VAR0 = LITERAL;\n    println!(LITERAL, VAR0);\n}\n"
        );
        assert_eq!(canonical.names.get("total"), Some("VAR0"));
        for token in &canonical.tokens {
            assert_eq!(token.span.slice(&canonical.text), Some(token.text.as_str()));
        }
        frontend.finish_revision();
    }

    #[test]
    fn outline_points_into_canonical_text() {
        let canonical = canonicalize_source("fn f() { let a = 1; }", None, false).unwrap();
        let start = canonical.text.find("let").unwrap();
        let end = canonical.text.find(';').unwrap() + 1;
        let span = idiomine_core::span::Span::from_bounds(start, end);
        assert_eq!(canonical.outline.kind_at(span), SyntaxKind::LocalDeclaration);
    }

    #[test]
    fn syntax_errors_are_reported() {
        assert!(RustFrontend.canonicalize("fn f( {", None, false).is_err());
        assert!(RustFrontend.parse_chunk("let = ;").is_err());
    }

    #[test]
    fn chunk_tokens_match_ast_leaves() {
        let chunk = parse_chunk("let VAR0 = VAR1 + 1;").unwrap();
        let texts: Vec<_> = chunk.tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["let", "VAR0", "=", "VAR1", "+", "1", ";"]);
        let leaves: Vec<_> = chunk.ast.tokens().into_iter().cloned().collect();
        assert_eq!(leaves, chunk.tokens);
    }

    #[test]
    fn schema_is_the_builtin_grammar() {
        assert!(RustFrontend.schema().contains("LocalStmt"));
    }
}
