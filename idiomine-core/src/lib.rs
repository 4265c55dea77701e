//! Language-neutral core of idiomine: mines before/after revision pairs for
//! small, context-isolated code changes.
//!
//! A [`frontend::LanguageFrontend`] parses and canonicalizes source files;
//! everything else (diff reconciliation, change expansion, token indexing,
//! record assembly) lives here.

pub mod ast;
pub mod change;
pub mod cli;
pub mod config;
pub mod diff;
pub mod error;
pub mod frontend;
pub mod gate;
pub mod names;
pub mod pipeline;
pub mod record;
pub mod span;
pub mod span_map;
pub mod syntax;
pub mod token;

pub use change::{ChangeAndContextSpan, ChangeSample, ExtractionLimits, changes_with_context};
pub use config::Config;
pub use error::{Error, Result};
pub use frontend::{CanonicalSource, LanguageFrontend, ParsedChunk};
pub use names::VariableNameMap;
pub use pipeline::{Miner, RunSummary};
pub use span::{LineIndex, Span};
pub use span_map::{ChangeKind, ChangeSpan, SpanMap};
pub use token::{Token, TokenIndex, TokenKind};
