//! Text edits and the range arithmetic built on them.

use std::cmp::Ordering;

use rustc_hash::FxHashMap;
use similar::{ChangeTag, TextDiff};
use text_size::{TextRange, TextSize};

/// Replacement of `range` (in the text before the edit) with `insert`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub range: TextRange,
    pub insert: String,
}

impl TextEdit {
    pub fn new(range: TextRange, insert: impl Into<String>) -> Self {
        Self { range, insert: insert.into() }
    }

    pub fn insert(at: TextSize, text: impl Into<String>) -> Self {
        Self::new(TextRange::empty(at), text)
    }

    pub fn delete(range: TextRange) -> Self {
        Self::new(range, String::new())
    }
}

#[track_caller]
pub(crate) fn offset(len: usize) -> TextSize {
    TextSize::try_from(len).expect("source text exceeds 4 GiB")
}

fn sorted(edits: &[TextEdit]) -> Vec<&TextEdit> {
    let mut edits: Vec<_> = edits.iter().collect();
    edits.sort_by_key(|edit| (edit.range.start(), edit.range.end()));
    edits
}

/// Applies non-overlapping edits, given in any order, to `text`.
pub fn apply_text_edits(text: &str, edits: &[TextEdit]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for edit in sorted(edits) {
        let range = std::ops::Range::<usize>::from(edit.range);
        out.push_str(&text[cursor..range.start]);
        out.push_str(&edit.insert);
        cursor = range.end;
    }
    out.push_str(&text[cursor..]);
    out
}

/// A minimal set of edits turning `before` into `after`. Adjacent deletions
/// and insertions are merged into replacements.
pub fn text_change_to_edits(before: &str, after: &str) -> Vec<TextEdit> {
    let diff = TextDiff::from_chars(before, after);
    let mut edits = Vec::new();
    let mut pos = 0;
    let mut pending: Option<TextEdit> = None;

    for change in diff.iter_all_changes() {
        let value = change.value();
        match change.tag() {
            ChangeTag::Equal => {
                edits.extend(pending.take());
                pos += value.len();
            }
            ChangeTag::Delete => {
                let end = offset(pos + value.len());
                match &mut pending {
                    Some(edit) => edit.range = edit.range.cover_offset(end),
                    None => pending = Some(TextEdit::delete(TextRange::new(offset(pos), end))),
                }
                pos += value.len();
            }
            ChangeTag::Insert => match &mut pending {
                Some(edit) => edit.insert.push_str(value),
                None => pending = Some(TextEdit::insert(offset(pos), value)),
            },
        }
    }
    edits.extend(pending);
    edits
}

/// Maps spans of the text before `edits` to the text after them. A span
/// boundary inside a replaced range moves to the end of the inserted text for
/// starts, and to its start for ends. Spans that collapse are dropped.
pub fn apply_text_edits_to_spans(
    edits: &[TextEdit],
    spans: &[TextRange],
) -> Vec<(TextRange, TextRange)> {
    let edits = sorted(edits);
    let mut starts: Vec<TextSize> = spans.iter().map(|span| span.start()).collect();
    let mut ends: Vec<TextSize> = spans.iter().map(|span| span.end()).collect();
    starts.sort_unstable();
    starts.dedup();
    ends.sort_unstable();
    ends.dedup();

    let shift = |at: TextSize, by: i64| -> TextSize {
        let at = i64::from(u32::from(at)) + by;
        TextSize::from(u32::try_from(at).expect("edits move a span before the start of the text"))
    };

    let mut mapped_starts = FxHashMap::default();
    let mut mapped_ends = FxHashMap::default();
    let (mut s, mut e) = (0, 0);
    let mut delta: i64 = 0;

    for edit in edits {
        let (from, to) = (edit.range.start(), edit.range.end());
        let inserted = i64::try_from(edit.insert.len()).unwrap_or(i64::MAX);
        while let Some(&start) = starts.get(s) {
            let mapped = match start.cmp(&from) {
                Ordering::Less => shift(start, delta),
                _ if start <= to => shift(from, delta + inserted),
                _ => break,
            };
            mapped_starts.insert(start, mapped);
            s += 1;
        }
        while let Some(&end) = ends.get(e) {
            let mapped = if end <= from {
                shift(end, delta)
            } else if end <= to {
                shift(from, delta)
            } else {
                break;
            };
            mapped_ends.insert(end, mapped);
            e += 1;
        }
        delta += inserted - i64::from(u32::from(edit.range.len()));
    }
    for &start in &starts[s..] {
        mapped_starts.insert(start, shift(start, delta));
    }
    for &end in &ends[e..] {
        mapped_ends.insert(end, shift(end, delta));
    }

    spans
        .iter()
        .filter_map(|&span| {
            let start = mapped_starts[&span.start()];
            let end = mapped_ends[&span.end()];
            (end > start).then(|| (span, TextRange::new(start, end)))
        })
        .collect()
}

/// A tree of spans nested inside one another.
pub trait SpanTree: Sized {
    type Id;

    fn id(&self) -> Self::Id;
    fn span(&self) -> TextRange;
    fn children(&self) -> Vec<Self>;
}

/// Assigns each range to the innermost node of `tree` enclosing it. Ranges
/// outside the root are ignored.
pub fn enclosing_spans<T: SpanTree>(tree: &T, ranges: Vec<TextRange>) -> Vec<(T::Id, Vec<TextRange>)> {
    let mut out = Vec::new();
    collect_enclosing(tree, ranges, &mut out);
    out
}

fn collect_enclosing<T: SpanTree>(
    tree: &T,
    mut ranges: Vec<TextRange>,
    out: &mut Vec<(T::Id, Vec<TextRange>)>,
) {
    let span = tree.span();
    ranges.retain(|range| range_encloses(span, *range));
    if ranges.is_empty() {
        return;
    }
    for child in tree.children() {
        let child_span = child.span();
        let (inside, outside) =
            ranges.into_iter().partition(|range| range_encloses(child_span, *range));
        ranges = outside;
        collect_enclosing(&child, inside, out);
    }
    if !ranges.is_empty() {
        out.push((tree.id(), ranges));
    }
}

/// Drops trailing spaces from `range`.
pub fn trim_end(range: TextRange, text: &str) -> TextRange {
    let slice = &text[range];
    let trimmed = slice.trim_end_matches(' ');
    TextRange::at(range.start(), offset(trimmed.len()))
}

pub fn offset_edit(edit: TextEdit, by: TextSize) -> TextEdit {
    TextEdit { range: edit.range + by, insert: edit.insert }
}

pub fn range_encloses(outer: TextRange, inner: TextRange) -> bool {
    outer.contains_range(inner)
}

/// Whether the ranges overlap or touch.
pub fn range_intersects(a: TextRange, b: TextRange) -> bool {
    a.start() <= b.end() && b.start() <= a.end()
}
