//! Character n-gram extraction.
//!
//! A string is lowercased, its whitespace runs are collapsed to single
//! spaces, and the result is padded with one space on each side. Windows of
//! every length in the configured range are then slid over the Unicode
//! scalar values of that padded text and the union is deduplicated.

use std::ops::Range;

use crate::config::NgramRange;

/// Placeholder used when a string has no content left after normalization.
pub const EMPTY_SENTINEL: &str = " Na ";

/// Deduplicated set of n-grams of one string.
///
/// The n-grams are stored as byte spans into a single owned normalized
/// text, sorted by their content, so iteration order is deterministic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NgramSet {
    text: String,
    spans: Vec<Range<usize>>,
}

impl NgramSet {
    /// Iterate over the n-grams in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.spans.iter().map(move |r| &self.text[r.clone()])
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Normalized, padded text the n-grams were cut from.
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Lowercase, collapse whitespace and pad with a single space on each side.
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let mut out = String::with_capacity(lowered.len() + 2);
    out.push(' ');
    for (i, word) in lowered.split_whitespace().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(word);
    }
    out.push(' ');
    out
}

/// Extract the unique n-grams of `text` for every length in `range`.
///
/// Strings with no content after normalization are replaced by
/// [`EMPTY_SENTINEL`], so the result is never empty.
pub fn extract(text: &str, range: NgramRange) -> NgramSet {
    let set = extract_raw(text, range);
    if set.is_empty() {
        return extract_raw(EMPTY_SENTINEL, range);
    }
    set
}

fn extract_raw(text: &str, range: NgramRange) -> NgramSet {
    let padded = normalize(text);
    if padded.trim().is_empty() {
        return NgramSet {
            text: padded,
            spans: Vec::new(),
        };
    }

    // Byte offset of every char boundary, including the end of the text.
    let mut bounds: Vec<usize> = padded.char_indices().map(|(i, _)| i).collect();
    bounds.push(padded.len());
    let n_chars = bounds.len() - 1;

    let mut spans = Vec::new();
    for n in range.lengths() {
        if n == 0 {
            continue;
        }
        if n_chars < n {
            // Too short for a full window: the whole text is its only n-gram,
            // and the same holds for every longer n.
            spans.push(0..padded.len());
            break;
        }
        for start in 0..=(n_chars - n) {
            spans.push(bounds[start]..bounds[start + n]);
        }
    }

    spans.sort_unstable_by(|a, b| padded[a.clone()].cmp(&padded[b.clone()]));
    spans.dedup_by(|a, b| padded[a.clone()] == padded[b.clone()]);

    NgramSet {
        text: padded,
        spans,
    }
}
