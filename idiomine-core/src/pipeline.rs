//! Per-revision change mining and the parallel run loop.

use std::io::{BufRead, Write};

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::ast::{AstSchema, AstValue};
use crate::change::{ChangeSample, changes_with_context};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::frontend::{CanonicalSource, LanguageFrontend};
use crate::gate::{EmissionGate, trimmed_line_span};
use crate::names::{VariableNameMap, looks_canonical};
use crate::record::{ChangeRecord, RevisionEntry};
use crate::span::{LineIndex, Span};
use crate::span_map::SpanMap;
use crate::token::{Token, TokenIndex};

/// Counters of a finished [`Miner::run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Non-blank input lines.
    pub revisions: usize,
    /// Revisions that failed to parse or process.
    pub failed: usize,
    /// Records written.
    pub records: usize,
    /// Records that could not be serialized or written.
    pub write_failures: usize,
}

/// A canonical source with its line and token indexes.
pub struct Snapshot {
    pub source: CanonicalSource,
    pub lines: LineIndex,
    pub index: TokenIndex,
}

impl Snapshot {
    #[must_use]
    pub fn new(source: CanonicalSource) -> Self {
        let lines = LineIndex::new(&source.text);
        let index = TokenIndex::new(source.tokens.clone());
        Self {
            source,
            lines,
            index,
        }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.source.text
    }

    /// Byte range of whole lines `first..=last`, line break of the last excluded.
    #[must_use]
    pub fn line_range(&self, first: usize, last: usize) -> Span {
        Span::from_bounds(self.lines.line_start(first), self.lines.line_end(last))
    }

    /// Distinct outline nodes enclosing the non-blank lines `first..=last`,
    /// in line order.
    #[must_use]
    pub fn statements(&self, first: usize, last: usize) -> Vec<Span> {
        let mut spans: Vec<Span> = Vec::new();
        for line in first..=last {
            let Some(trimmed) = trimmed_line_span(self.text(), &self.lines, line) else {
                continue;
            };
            if let Some(node) = self.source.outline.find_node(trimmed)
                && !spans.contains(&node.span)
            {
                spans.push(node.span);
            }
        }
        spans
    }
}

/// Mines change records out of revision entries with one language frontend.
pub struct Miner<'a> {
    frontend: &'a dyn LanguageFrontend,
    schema: AstSchema,
    config: Config,
    gate: EmissionGate,
}

impl<'a> Miner<'a> {
    /// A miner exporting trees with the frontend's built-in schema.
    #[must_use]
    pub fn new(frontend: &'a dyn LanguageFrontend, config: Config) -> Self {
        let schema = frontend.schema();
        let gate = config.gate();
        Self {
            frontend,
            schema,
            config,
            gate,
        }
    }

    /// Replace the export schema, e.g. with one loaded from a grammar file.
    #[must_use]
    pub fn with_schema(mut self, schema: AstSchema) -> Self {
        self.schema = schema;
        self
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Canonicalize both files of a revision, the updated one seeded with the
    /// previous one's names.
    pub fn canonicalize_pair(&self, prev: &str, updated: &str) -> Result<(Snapshot, Snapshot)> {
        let language = self.frontend.language();
        let prev = self
            .frontend
            .canonicalize(prev, None, self.config.two_pass_before)
            .map_err(|source| Error::Frontend {
                language,
                side: "prev",
                source,
            })?;
        let updated = self
            .frontend
            .canonicalize(updated, Some(&prev.names), self.config.two_pass_after)
            .map_err(|source| Error::Frontend {
                language,
                side: "updated",
                source,
            })?;
        Ok((Snapshot::new(prev), Snapshot::new(updated)))
    }

    /// Change samples between two snapshots.
    #[must_use]
    pub fn samples(&self, prev: &Snapshot, updated: &Snapshot) -> Vec<ChangeSample> {
        let map = SpanMap::new(prev.text(), updated.text());
        changes_with_context(&map, &prev.lines, &updated.lines, self.config.limits())
    }

    /// All records of one revision, in change order.
    pub fn process_revision(&self, entry: &RevisionEntry) -> Result<Vec<ChangeRecord>> {
        let (prev, updated) = self.canonicalize_pair(&entry.prev_file, &entry.updated_file)?;
        let samples = self.samples(&prev, &updated);
        debug!(id = %entry.id, samples = samples.len(), "extracted change samples");

        let mut records = Vec::new();
        for sample in &samples {
            if let Some(record) = self.build_record(entry, &prev, &updated, sample, records.len())
            {
                records.push(record);
            }
        }
        Ok(records)
    }

    /// Parse one input line and process it.
    pub fn process_line(&self, line: &str) -> Result<Vec<ChangeRecord>> {
        let entry: RevisionEntry = serde_json::from_str(line)?;
        self.process_revision(&entry)
    }

    /// Apply the emission gate to `sample` and assemble its record.
    fn build_record(
        &self,
        entry: &RevisionEntry,
        prev: &Snapshot,
        updated: &Snapshot,
        sample: &ChangeSample,
        n: usize,
    ) -> Option<ChangeRecord> {
        let (prev_first, prev_last) = prev.lines.lines_of(sample.before.change);
        let (upd_first, upd_last) = updated.lines.lines_of(sample.after.change);
        if prev_last - prev_first != upd_last - upd_first {
            debug!(id = %entry.id, "chunk line counts differ");
            return None;
        }

        let allowed = |snap: &Snapshot, first, last| {
            self.gate
                .lines_allowed(snap.text(), &snap.lines, &snap.source.outline, first, last)
        };
        if !allowed(prev, prev_first, prev_last) || !allowed(updated, upd_first, upd_last) {
            debug!(id = %entry.id, "chunk contains disallowed statements");
            return None;
        }

        let prev_range = prev.line_range(prev_first, prev_last);
        let upd_range = updated.line_range(upd_first, upd_last);
        let texts = |tokens: &[Token]| tokens.iter().map(|t| t.text.clone()).collect::<Vec<_>>();
        let prev_tokens = texts(prev.index.tokens_in_span(prev_range));
        let upd_tokens = texts(updated.index.tokens_in_span(upd_range));
        if !self.gate.tokens_valid(&prev_tokens, &upd_tokens) {
            debug!(id = %entry.id, "chunk tokens rejected");
            return None;
        }

        let mut names = VariableNameMap::new();
        let prev_chunk = render_chunk(prev, &prev.statements(prev_first, prev_last), &mut names);
        let upd_chunk = render_chunk(
            updated,
            &updated.statements(upd_first, upd_last),
            &mut names,
        );

        let preceding = Span::from_bounds(sample.before.context.start, prev_range.start);
        let succeeding = Span::from_bounds(prev_range.end(), sample.before.context.end());
        let preceding_context = zero_index(prev.index.tokens_in_span(preceding), &mut names);
        let succeeding_context = zero_index(prev.index.tokens_in_span(succeeding), &mut names);

        let (prev_code_chunk_tokens, prev_code_ast) = self.export_chunk(entry, &prev_chunk)?;
        let (updated_code_chunk_tokens, updated_code_ast) = self.export_chunk(entry, &upd_chunk)?;

        Some(ChangeRecord {
            id: format!("{}_{n}", entry.id),
            prev_code_chunk: prev_chunk,
            updated_code_chunk: upd_chunk,
            prev_code_chunk_tokens,
            updated_code_chunk_tokens,
            prev_code_ast,
            updated_code_ast,
            preceding_context,
            succeeding_context,
            commit_message: if self.config.include_commit_message {
                entry.message.clone()
            } else {
                None
            },
        })
    }

    /// Re-parse a chunk and export its tokens and tree.
    fn export_chunk(
        &self,
        entry: &RevisionEntry,
        chunk: &str,
    ) -> Option<(Vec<String>, serde_json::Value)> {
        let parsed = match self.frontend.parse_chunk(chunk) {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!(id = %entry.id, error = %e, "chunk does not re-parse");
                return None;
            }
        };
        let tokens = parsed.tokens.iter().map(|t| t.text.clone()).collect();
        let index = TokenIndex::new(parsed.tokens).with_inverted_index();
        let ast = self.schema.export(&AstValue::Node(parsed.ast), &index);
        Some((tokens, ast))
    }

    /// Process newline-delimited revision entries from `input`, writing one
    /// record per line to `output`.
    ///
    /// Lines are processed in parallel batches of `batch_size`; records are
    /// written in input order. Failing revisions are logged and counted.
    pub fn run<R: BufRead, W: Write>(&self, input: R, mut output: W) -> Result<RunSummary> {
        let pool = match self.config.threads {
            Some(threads) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .map_err(|e| Error::Other(format!("failed to build thread pool: {e}")))?,
            ),
            None => None,
        };

        let batch_size = self.config.batch_size.max(1);
        let mut summary = RunSummary::default();
        let mut batch: Vec<(usize, String)> = Vec::with_capacity(batch_size);

        for (line_no, raw) in input.split(b'\n').enumerate() {
            let raw = match raw {
                Ok(raw) => raw,
                Err(e) => {
                    self.flush_batch(&batch, pool.as_ref(), &mut output, &mut summary);
                    output.flush()?;
                    return Err(e.into());
                }
            };
            let line = match String::from_utf8(raw) {
                Ok(line) => line,
                Err(e) => {
                    warn!(line = line_no + 1, error = %e, "skipping line that is not UTF-8");
                    summary.revisions += 1;
                    summary.failed += 1;
                    continue;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            batch.push((line_no + 1, line));
            if batch.len() >= batch_size {
                self.flush_batch(&batch, pool.as_ref(), &mut output, &mut summary);
                batch.clear();
            }
        }
        if !batch.is_empty() {
            self.flush_batch(&batch, pool.as_ref(), &mut output, &mut summary);
        }
        output.flush()?;
        Ok(summary)
    }

    fn flush_batch<W: Write>(
        &self,
        batch: &[(usize, String)],
        pool: Option<&rayon::ThreadPool>,
        output: &mut W,
        summary: &mut RunSummary,
    ) {
        let process = || {
            batch
                .par_iter()
                .map(|(_, line)| {
                    let outcome = self.process_tagged(line);
                    self.frontend.finish_revision();
                    outcome
                })
                .collect::<Vec<_>>()
        };
        let outcomes = match pool {
            Some(pool) => pool.install(process),
            None => process(),
        };
        debug!(lines = batch.len(), "processed batch");

        for ((line_no, _), outcome) in batch.iter().zip(outcomes) {
            summary.revisions += 1;
            match outcome {
                Ok(records) => {
                    for record in &records {
                        match write_record(output, record) {
                            Ok(()) => summary.records += 1,
                            Err(e) => {
                                warn!(id = %record.id, error = %e, "failed to write record");
                                summary.write_failures += 1;
                            }
                        }
                    }
                }
                Err((id, e)) => {
                    warn!(
                        line = line_no,
                        id = id.as_deref().unwrap_or("<unknown>"),
                        error = %e,
                        "skipping revision"
                    );
                    summary.failed += 1;
                }
            }
        }
    }

    /// Process a line, tagging a failure with the revision id when known.
    fn process_tagged(
        &self,
        line: &str,
    ) -> std::result::Result<Vec<ChangeRecord>, (Option<String>, Error)> {
        let entry: RevisionEntry =
            serde_json::from_str(line).map_err(|e| (None, Error::Record(e)))?;
        self.process_revision(&entry)
            .map_err(|e| (Some(entry.id.clone()), e))
    }
}

fn write_record<W: Write>(output: &mut W, record: &ChangeRecord) -> Result<()> {
    let line = serde_json::to_string(record)?;
    writeln!(output, "{line}")?;
    Ok(())
}

/// Rename a canonical identifier through the chunk-local map.
fn zero_index_token(token: &Token, names: &mut VariableNameMap) -> String {
    if token.is_identifier() && looks_canonical(&token.text) {
        names.assign(&token.text).to_string()
    } else {
        token.text.clone()
    }
}

fn zero_index(tokens: &[Token], names: &mut VariableNameMap) -> Vec<String> {
    tokens.iter().map(|t| zero_index_token(t, names)).collect()
}

/// Text of `span` with canonical identifiers zero-indexed, spacing kept.
fn render_span(snap: &Snapshot, span: Span, names: &mut VariableNameMap) -> String {
    let text = snap.text();
    let mut out = String::with_capacity(span.len);
    let mut pos = span.start;
    for token in snap.index.tokens_in_span(span) {
        out.push_str(Span::from_bounds(pos, token.span.start).slice(text).unwrap_or_default());
        out.push_str(&zero_index_token(token, names));
        pos = token.span.end();
    }
    out.push_str(Span::from_bounds(pos, span.end()).slice(text).unwrap_or_default());
    out
}

/// Statements rendered, leading spaces stripped per line, joined by newlines.
fn render_chunk(snap: &Snapshot, statements: &[Span], names: &mut VariableNameMap) -> String {
    statements
        .iter()
        .map(|&span| {
            render_span(snap, span, names)
                .lines()
                .map(|line| line.trim_start_matches(' '))
                .collect::<Vec<_>>()
                .join("\n")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
