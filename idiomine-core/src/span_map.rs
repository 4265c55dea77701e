use std::collections::HashSet;

use serde::Serialize;

use crate::change::ChangeSample;
use crate::diff::{TextEdit, text_edits};
use crate::error::{Error, Result};
use crate::span::Span;

/// Classification of one tile of a [`SpanMap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ChangeKind {
    None,
    Add,
    Delete,
    Modify,
}

/// One tile: a before span, the corresponding after span and how they relate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ChangeSpan {
    pub before: Span,
    pub after: Span,
    pub kind: ChangeKind,
}

impl ChangeSpan {
    #[must_use]
    pub fn is_change(&self) -> bool {
        self.kind != ChangeKind::None
    }
}

/// Gap-free tiling of a before text and an after text into unchanged and
/// changed regions.
///
/// Consecutive tiles are adjacent on both sides: the tiles' before spans
/// concatenate to the whole before text, and likewise for the after side.
#[derive(Debug, Clone)]
pub struct SpanMap {
    tiles: Vec<ChangeSpan>,
}

impl SpanMap {
    /// Diff two texts and reconcile the edits into a tiling.
    #[must_use]
    pub fn new(before: &str, after: &str) -> Self {
        Self::from_edits(&text_edits(before, after), before.len(), after.len())
    }

    /// Build the tiling from position-ordered edits of a text of
    /// `before_len` bytes producing one of `after_len` bytes.
    #[must_use]
    pub fn from_edits(edits: &[TextEdit], before_len: usize, after_len: usize) -> Self {
        let mut tiles = Vec::with_capacity(edits.len() * 2 + 1);
        let mut before_pos = 0;
        let mut after_pos = 0;

        for edit in edits {
            if edit.span.start > before_pos {
                let unchanged = edit.span.start - before_pos;
                tiles.push(ChangeSpan {
                    before: Span::new(before_pos, unchanged),
                    after: Span::new(after_pos, unchanged),
                    kind: ChangeKind::None,
                });
                before_pos = edit.span.start;
                after_pos += unchanged;
            }

            let kind = if edit.span.is_empty() {
                ChangeKind::Add
            } else if edit.new_len == 0 {
                ChangeKind::Delete
            } else {
                ChangeKind::Modify
            };
            tiles.push(ChangeSpan {
                before: edit.span,
                after: Span::new(after_pos, edit.new_len),
                kind,
            });
            before_pos = edit.span.end();
            after_pos += edit.new_len;
        }

        if before_pos != before_len || after_pos != after_len {
            tiles.push(ChangeSpan {
                before: Span::from_bounds(before_pos, before_len),
                after: Span::from_bounds(after_pos, after_len),
                kind: ChangeKind::None,
            });
        }

        Self { tiles }
    }

    #[must_use]
    pub fn tiles(&self) -> &[ChangeSpan] {
        &self.tiles
    }

    /// All minimal changed span pairs, in position order.
    pub fn simple_changes(&self) -> impl Iterator<Item = (Span, Span)> + '_ {
        self.tiles
            .iter()
            .filter(|t| t.is_change())
            .map(|t| (t.before, t.after))
    }

    /// Whether any context sub-span of `sample` intersects a changed span of
    /// the same side.
    #[must_use]
    pub fn context_overlaps_with_change(&self, sample: &ChangeSample) -> bool {
        let before_ctx = [
            sample.before.preceding_context(),
            sample.before.succeeding_context(),
        ];
        let after_ctx = [
            sample.after.preceding_context(),
            sample.after.succeeding_context(),
        ];
        self.tiles.iter().filter(|t| t.is_change()).any(|t| {
            before_ctx.iter().any(|c| c.overlaps(t.before))
                || after_ctx.iter().any(|c| c.overlaps(t.after))
        })
    }

    /// Grow the changed pair `(before, after)` by merging neighbouring changes.
    ///
    /// Every region the `admit` predicate accepts is yielded once. Regions the
    /// predicate rejects are not grown any further. Returns
    /// [`Error::SpanNotInTiling`] when the pair is not a tile of this map.
    pub fn expand<F>(&self, before: Span, after: Span, admit: F) -> Result<Expansion<'_, F>>
    where
        F: FnMut(Span, Span) -> bool,
    {
        let seed = self
            .tiles
            .iter()
            .position(|t| t.before == before && t.after == after)
            .ok_or(Error::SpanNotInTiling { before, after })?;
        Ok(Expansion {
            tiles: &self.tiles,
            stack: vec![(seed, seed)],
            visited: HashSet::new(),
            admit,
        })
    }
}

/// Depth-first expansion of a changed region. See [`SpanMap::expand`].
pub struct Expansion<'a, F> {
    tiles: &'a [ChangeSpan],
    stack: Vec<(usize, usize)>,
    visited: HashSet<(usize, usize)>,
    admit: F,
}

impl<F> Expansion<'_, F> {
    fn next_change(&self, index: usize) -> Option<usize> {
        (index + 1..self.tiles.len()).find(|&k| self.tiles[k].is_change())
    }

    fn previous_change(&self, index: usize) -> Option<usize> {
        (0..index).rev().find(|&k| self.tiles[k].is_change())
    }

    fn region(&self, from: usize, to: usize) -> (Span, Span) {
        let (first, last) = (&self.tiles[from], &self.tiles[to]);
        (
            Span::from_bounds(first.before.start, last.before.end()),
            Span::from_bounds(first.after.start, last.after.end()),
        )
    }
}

impl<F> Iterator for Expansion<'_, F>
where
    F: FnMut(Span, Span) -> bool,
{
    type Item = (Span, Span);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((from, to)) = self.stack.pop() {
            if !self.visited.insert((from, to)) {
                continue;
            }
            let (before, after) = self.region(from, to);
            if !(self.admit)(before, after) {
                continue;
            }

            // "next" is pushed last so it is explored first.
            if let Some(prev) = self.previous_change(from) {
                self.stack.push((prev, to));
            }
            if let Some(next) = self.next_change(to) {
                self.stack.push((from, next));
            }
            return Some((before, after));
        }
        None
    }
}
