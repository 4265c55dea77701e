use crate::ast::{AstNode, AstSchema};
use crate::error::BoxError;
use crate::names::VariableNameMap;
use crate::syntax::SyntaxOutline;
use crate::token::Token;

/// A source text after canonicalization, with everything the pipeline needs
/// to slice it.
#[derive(Debug, Clone)]
pub struct CanonicalSource {
    /// Pretty-printed canonical text.
    pub text: String,
    /// Tokens of `text`, spans relative to `text`.
    pub tokens: Vec<Token>,
    pub outline: SyntaxOutline,
    /// Names assigned while canonicalizing, including any seed entries.
    pub names: VariableNameMap,
}

/// A re-parsed statement sequence.
#[derive(Debug, Clone)]
pub struct ParsedChunk {
    /// Tokens of the chunk text, spans relative to it.
    pub tokens: Vec<Token>,
    /// Root of the chunk's syntax tree. Its token leaves carry the same spans
    /// as the matching entries of `tokens`.
    pub ast: AstNode,
}

/// Trait for language-specific parsing and canonicalization.
///
/// Implementors own everything that depends on the concrete syntax of a
/// language, letting `idiomine-core` mine changes for any language.
pub trait LanguageFrontend: Send + Sync {
    /// Language name for diagnostics.
    fn language(&self) -> &'static str;

    /// Parse and canonicalize a whole source file.
    ///
    /// With a `seed`, identifiers already present in it keep their canonical
    /// name and new ones continue its counter. `two_pass` runs the rewrite a
    /// second time over the original tree, seeded with the first pass's names.
    fn canonicalize(
        &self,
        source: &str,
        seed: Option<&VariableNameMap>,
        two_pass: bool,
    ) -> Result<CanonicalSource, BoxError>;

    /// Parse a sequence of statements.
    fn parse_chunk(&self, text: &str) -> Result<ParsedChunk, BoxError>;

    /// The built-in grammar registry of the language.
    fn schema(&self) -> AstSchema;

    /// Release per-thread parser state once a record is done.
    ///
    /// The default implementation does nothing.
    fn finish_revision(&self) {}
}
