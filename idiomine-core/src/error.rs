use std::path::PathBuf;

use crate::span::Span;

/// Boxed error returned across the [`crate::frontend::LanguageFrontend`] seam.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed revision record: {0}")]
    Record(#[from] serde_json::Error),

    #[error("{language} frontend failed on {side} file: {source}")]
    Frontend {
        language: &'static str,
        side: &'static str,
        #[source]
        source: BoxError,
    },

    #[error("span pair {before} / {after} is not part of the span map")]
    SpanNotInTiling { before: Span, after: Span },

    #[error("invalid grammar file {path}: {message}")]
    Grammar { path: PathBuf, message: String },

    #[error("invalid config file {path}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;
