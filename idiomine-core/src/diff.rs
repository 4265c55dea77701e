use similar::{Algorithm, DiffTag, capture_diff_slices};

use crate::span::Span;

/// A single replacement of `span` in the old text by `new_len` bytes of the new text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextEdit {
    pub span: Span,
    pub new_len: usize,
}

/// Position-ordered edits turning `old` into `new`.
///
/// Runs a Myers diff over lexemes (word runs, whitespace runs and single other
/// characters) so that edits land on token boundaries. Delete/insert pairs at
/// the same place come back as one replacement, and edits that touch are merged.
#[must_use]
pub fn text_edits(old: &str, new: &str) -> Vec<TextEdit> {
    let (old_lex, old_offsets) = lexemes(old);
    let (new_lex, new_offsets) = lexemes(new);

    let mut edits: Vec<TextEdit> = Vec::new();
    for op in capture_diff_slices(Algorithm::Myers, &old_lex, &new_lex) {
        let (tag, old_range, new_range) = op.as_tag_tuple();
        if tag == DiffTag::Equal {
            continue;
        }
        let old_span = byte_span(&old_offsets, old.len(), old_range);
        let new_span = byte_span(&new_offsets, new.len(), new_range);

        if let Some(last) = edits.last_mut()
            && last.span.end() == old_span.start
        {
            last.span = last.span.cover(old_span);
            last.new_len += new_span.len;
            continue;
        }
        edits.push(TextEdit {
            span: old_span,
            new_len: new_span.len,
        });
    }
    edits
}

/// Split `text` into lexemes, returning them with their byte offsets.
fn lexemes(text: &str) -> (Vec<&str>, Vec<usize>) {
    #[derive(PartialEq, Clone, Copy)]
    enum Class {
        Word,
        Space,
        Other,
    }
    fn class(c: char) -> Class {
        if c.is_alphanumeric() || c == '_' {
            Class::Word
        } else if c.is_whitespace() {
            Class::Space
        } else {
            Class::Other
        }
    }

    let mut lexemes = Vec::new();
    let mut offsets = Vec::new();
    let mut start = 0;
    let mut current: Option<Class> = None;
    for (i, c) in text.char_indices() {
        let cls = class(c);
        let extends = current == Some(cls) && cls != Class::Other;
        if !extends {
            if i > start {
                lexemes.push(&text[start..i]);
                offsets.push(start);
            }
            start = i;
        }
        current = Some(cls);
    }
    if text.len() > start {
        lexemes.push(&text[start..]);
        offsets.push(start);
    }
    (lexemes, offsets)
}

/// Byte span of a lexeme index range. Empty ranges sit at the start of the
/// lexeme at `range.start`, or at the end of the text.
fn byte_span(offsets: &[usize], text_len: usize, range: std::ops::Range<usize>) -> Span {
    let at = |index: usize| offsets.get(index).copied().unwrap_or(text_len);
    Span::from_bounds(at(range.start), at(range.end))
}
