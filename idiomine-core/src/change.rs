use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use crate::span::{LineIndex, Span};
use crate::span_map::SpanMap;

/// A changed span together with the context window around it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ChangeAndContextSpan {
    pub change: Span,
    pub context: Span,
}

impl ChangeAndContextSpan {
    #[must_use]
    pub const fn new(change: Span, context: Span) -> Self {
        Self { change, context }
    }

    /// `[context.start, change.start)`
    #[must_use]
    pub fn preceding_context(&self) -> Span {
        Span::from_bounds(self.context.start, self.change.start)
    }

    /// `[change.end, context.end)`
    #[must_use]
    pub fn succeeding_context(&self) -> Span {
        Span::from_bounds(self.change.end(), self.context.end())
    }

    /// Union of both change bounds and both context bounds.
    /// `None` when the two context windows do not overlap.
    #[must_use]
    pub fn merge(&self, other: &Self) -> Option<Self> {
        if !self.context.overlaps(other.context) {
            return None;
        }
        Some(Self {
            change: self.change.cover(other.change),
            context: self.context.cover(other.context),
        })
    }
}

impl fmt::Display for ChangeAndContextSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "change {} in context {}", self.change, self.context)
    }
}

/// A before/after pair of change-with-context spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ChangeSample {
    pub before: ChangeAndContextSpan,
    pub after: ChangeAndContextSpan,
}

impl ChangeSample {
    #[must_use]
    pub const fn new(before: ChangeAndContextSpan, after: ChangeAndContextSpan) -> Self {
        Self { before, after }
    }

    /// Merge both sides. Refused unless the contexts overlap on both sides.
    #[must_use]
    pub fn merge(&self, other: &Self) -> Option<Self> {
        Some(Self {
            before: self.before.merge(&other.before)?,
            after: self.after.merge(&other.after)?,
        })
    }
}

impl fmt::Display for ChangeSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "from {} to {}", self.before, self.after)
    }
}

/// Size limits of an extracted change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionLimits {
    /// Maximum number of lines a change may touch on either side.
    pub max_changed_lines: usize,
    /// Unchanged lines of context kept on each side of a change.
    pub context_lines: usize,
}

impl Default for ExtractionLimits {
    fn default() -> Self {
        Self {
            max_changed_lines: 5,
            context_lines: 2,
        }
    }
}

/// Context window of `change`: `context_lines` whole lines on each side,
/// clamped to the text, line break of the last line excluded.
#[must_use]
pub fn context_for(change: Span, lines: &LineIndex, context_lines: usize) -> Span {
    let (first, last) = lines.lines_of(change);
    let start = lines.line_start(first.saturating_sub(context_lines));
    let end_line = last.saturating_add(context_lines).min(lines.line_count() - 1);
    // A change may end past the end of its last line when it swallows a line break.
    let end = lines.line_end(end_line).max(change.end());
    Span::from_bounds(start, end)
}

/// Change samples of a before/after text pair.
///
/// Each minimal change is grown while both sides stay within
/// `max_changed_lines`; the first grown region whose context windows are free
/// of other changes is emitted. Regions emitted once are not emitted again.
#[must_use]
pub fn changes_with_context(
    map: &SpanMap,
    before_lines: &LineIndex,
    after_lines: &LineIndex,
    limits: ExtractionLimits,
) -> Vec<ChangeSample> {
    let fits = |b: Span, a: Span| {
        before_lines.line_count_of(b) <= limits.max_changed_lines
            && after_lines.line_count_of(a) <= limits.max_changed_lines
    };

    let mut seen: HashSet<(Span, Span)> = HashSet::new();
    let mut samples = Vec::new();

    for (before, after) in map.simple_changes() {
        // The pair comes from the map's own tiling, so expansion always finds it.
        let Ok(expansion) = map.expand(before, after, fits) else {
            continue;
        };
        for (b, a) in expansion {
            if seen.contains(&(b, a)) {
                continue;
            }
            let sample = ChangeSample::new(
                ChangeAndContextSpan::new(b, context_for(b, before_lines, limits.context_lines)),
                ChangeAndContextSpan::new(a, context_for(a, after_lines, limits.context_lines)),
            );
            if !map.context_overlaps_with_change(&sample) {
                seen.insert((b, a));
                samples.push(sample);
                break;
            }
        }
    }
    samples
}
