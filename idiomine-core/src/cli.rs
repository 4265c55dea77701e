use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::ast::AstSchema;
use crate::change::{ChangeSample, changes_with_context};
use crate::config::Config;
use crate::frontend::LanguageFrontend;
use crate::pipeline::{Miner, RunSummary};
use crate::span::{LineIndex, Span};
use crate::span_map::SpanMap;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors returned by CLI command functions.
#[derive(Debug)]
pub enum CliError {
    /// An I/O error (exit code 2).
    Io(io::Error),
    /// Reading an input or output path failed (exit code 2).
    Path { path: PathBuf, source: io::Error },
    /// Configuration, grammar or mining failure (exit code 2).
    Mining(crate::error::Error),
}

impl CliError {
    /// Map to an appropriate process exit code.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Io(_) | Self::Path { .. } | Self::Mining(_) => 2,
        }
    }

    fn path(path: &Path) -> impl FnOnce(io::Error) -> Self + '_ {
        move |source| Self::Path {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "{e}"),
            Self::Path { path, source } => write!(f, "{}: {source}", path.display()),
            Self::Mining(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Path { source, .. } => Some(source),
            Self::Mining(e) => Some(e),
        }
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<crate::error::Error> for CliError {
    fn from(e: crate::error::Error) -> Self {
        Self::Mining(e)
    }
}

/// Result type for CLI operations.
pub type CliResult<T = ()> = Result<T, CliError>;

// ---------------------------------------------------------------------------
// Shared CLI types
// ---------------------------------------------------------------------------

/// CLI subcommands of `idiomine`.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "cli", derive(clap::Subcommand))]
pub enum Command {
    /// Mine change records from a newline-delimited JSON revision file.
    Extract {
        /// Revision entries, one JSON object per line.
        #[cfg_attr(feature = "cli", arg(long, short))]
        input: PathBuf,
        /// Where to write the change records.
        #[cfg_attr(feature = "cli", arg(long, short))]
        output: PathBuf,
        /// AST grammar file used for tree export (defaults to the built-in grammar).
        #[cfg_attr(feature = "cli", arg(long))]
        grammar: Option<PathBuf>,
        /// Maximum number of lines a change may touch.
        #[cfg_attr(feature = "cli", arg(long))]
        max_changed_lines: Option<usize>,
        /// Unchanged context lines around each change.
        #[cfg_attr(feature = "cli", arg(long))]
        context_lines: Option<usize>,
        /// Number of worker threads.
        #[cfg_attr(feature = "cli", arg(long))]
        threads: Option<usize>,
        /// Input lines per parallel batch.
        #[cfg_attr(feature = "cli", arg(long))]
        batch_size: Option<usize>,
        /// Copy each revision's commit message into its records.
        #[cfg_attr(feature = "cli", arg(long))]
        with_commit_message: bool,
    },
    /// Print the canonical form of a source file.
    Canonicalize {
        /// Source file to canonicalize.
        file: PathBuf,
        /// Run a second pass seeded with the names of the first.
        #[cfg_attr(feature = "cli", arg(long))]
        two_pass: bool,
    },
    /// Print the change samples between two versions of a file.
    Diff {
        before: PathBuf,
        after: PathBuf,
        /// Canonicalize both files before diffing.
        #[cfg_attr(feature = "cli", arg(long))]
        canonical: bool,
    },
    /// Print the built-in AST grammar as JSON.
    Grammar,
}

/// Optional CLI overrides applied on top of file-based config.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub max_changed_lines: Option<usize>,
    pub context_lines: Option<usize>,
    pub threads: Option<usize>,
    pub batch_size: Option<usize>,
    pub include_commit_message: Option<bool>,
}

// ---------------------------------------------------------------------------
// Config helpers
// ---------------------------------------------------------------------------

/// Load the config named on the command line, or `idiomine.toml` from the
/// working directory when none is named.
pub fn load_config(path: Option<&Path>) -> CliResult<Config> {
    match path {
        Some(path) => Ok(Config::from_file(path)?),
        None => {
            let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            Ok(Config::load(&cwd))
        }
    }
}

/// Apply CLI overrides to a loaded `Config`.
pub fn apply_overrides(config: &mut Config, overrides: &CliOverrides) {
    if let Some(v) = overrides.max_changed_lines {
        config.max_changed_lines = v;
    }
    if let Some(v) = overrides.context_lines {
        config.context_lines = v;
    }
    if let Some(v) = overrides.threads {
        config.threads = Some(v);
    }
    if let Some(v) = overrides.batch_size {
        config.batch_size = v;
    }
    if let Some(v) = overrides.include_commit_message {
        config.include_commit_message = v;
    }
}

// ---------------------------------------------------------------------------
// Command implementations
// ---------------------------------------------------------------------------

/// Mine `input` into `output` and print a one-line summary.
pub fn cmd_extract(
    frontend: &dyn LanguageFrontend,
    config: Config,
    input: &Path,
    output: &Path,
    grammar: Option<&Path>,
    writer: &mut impl Write,
) -> CliResult<RunSummary> {
    let mut miner = Miner::new(frontend, config);
    if let Some(grammar) = grammar {
        miner = miner.with_schema(AstSchema::load(grammar)?);
    }

    let reader = BufReader::new(File::open(input).map_err(CliError::path(input))?);
    let out = BufWriter::new(File::create(output).map_err(CliError::path(output))?);

    info!(input = %input.display(), output = %output.display(), "mining revisions");
    let summary = miner.run(reader, out)?;
    info!(
        revisions = summary.revisions,
        records = summary.records,
        failed = summary.failed,
        "done"
    );

    writeln!(
        writer,
        "Processed {} revisions: {} records written, {} revisions failed.",
        summary.revisions, summary.records, summary.failed
    )?;
    if summary.write_failures > 0 {
        writeln!(writer, "{} records could not be written.", summary.write_failures)?;
    }
    Ok(summary)
}

/// Print the canonical form of `file`.
pub fn cmd_canonicalize(
    frontend: &dyn LanguageFrontend,
    file: &Path,
    two_pass: bool,
    writer: &mut impl Write,
) -> CliResult {
    let source = std::fs::read_to_string(file).map_err(CliError::path(file))?;
    let canonical = frontend
        .canonicalize(&source, None, two_pass)
        .map_err(|source| crate::error::Error::Frontend {
            language: frontend.language(),
            side: "input",
            source,
        })?;
    frontend.finish_revision();
    write!(writer, "{}", canonical.text)?;
    if !canonical.text.ends_with('\n') {
        writeln!(writer)?;
    }
    Ok(())
}

/// Print every accepted change sample between `before` and `after`.
pub fn cmd_diff(
    frontend: &dyn LanguageFrontend,
    config: Config,
    before: &Path,
    after: &Path,
    canonical: bool,
    writer: &mut impl Write,
) -> CliResult {
    let before_src = std::fs::read_to_string(before).map_err(CliError::path(before))?;
    let after_src = std::fs::read_to_string(after).map_err(CliError::path(after))?;

    let (before_text, after_text) = if canonical {
        let miner = Miner::new(frontend, config.clone());
        let (prev, updated) = miner.canonicalize_pair(&before_src, &after_src)?;
        frontend.finish_revision();
        (prev.source.text, updated.source.text)
    } else {
        (before_src, after_src)
    };

    let before_lines = LineIndex::new(&before_text);
    let after_lines = LineIndex::new(&after_text);
    let map = SpanMap::new(&before_text, &after_text);
    let samples = changes_with_context(&map, &before_lines, &after_lines, config.limits());

    if samples.is_empty() {
        writeln!(writer, "No changes found.")?;
        return Ok(());
    }
    for (i, sample) in samples.iter().enumerate() {
        write_sample(
            writer,
            i + 1,
            sample,
            (&before_text, &before_lines),
            (&after_text, &after_lines),
        )?;
    }
    writeln!(writer, "\n{} changes.", samples.len())?;
    Ok(())
}

/// Print the frontend's built-in AST grammar.
pub fn cmd_grammar(frontend: &dyn LanguageFrontend, writer: &mut impl Write) -> CliResult {
    let json = frontend.schema().to_json();
    let text = serde_json::to_string_pretty(&json).map_err(crate::error::Error::from)?;
    writeln!(writer, "{text}")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn line_range(lines: &LineIndex, span: Span) -> String {
    let (first, last) = lines.lines_of(span);
    if first == last {
        format!("line {}", first + 1)
    } else {
        format!("lines {}-{}", first + 1, last + 1)
    }
}

fn write_sample(
    writer: &mut impl Write,
    n: usize,
    sample: &ChangeSample,
    (before_text, before_lines): (&str, &LineIndex),
    (after_text, after_lines): (&str, &LineIndex),
) -> io::Result<()> {
    writeln!(
        writer,
        "=== change {n}: before {} -> after {}",
        line_range(before_lines, sample.before.change),
        line_range(after_lines, sample.after.change),
    )?;
    writeln!(writer, "  before {}", sample.before)?;
    writeln!(writer, "  after  {}", sample.after)?;
    write_lines(writer, '-', before_text, before_lines, sample.before.change)?;
    write_lines(writer, '+', after_text, after_lines, sample.after.change)
}

/// Print the whole lines a change touches.
fn write_lines(
    writer: &mut impl Write,
    marker: char,
    text: &str,
    lines: &LineIndex,
    change: Span,
) -> io::Result<()> {
    let (first, last) = lines.lines_of(change);
    for line in first..=last {
        let content = lines.line_span(line).slice(text).unwrap_or_default();
        writeln!(writer, "{marker} {content}")?;
    }
    Ok(())
}
