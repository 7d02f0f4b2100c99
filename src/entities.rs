//! Locating hashtags, URLs, and user mentions inside tweet text.
//!
//! The API annotates each entity with a `[start, end]` offset pair, but
//! those offsets are computed against the API's own reconstruction of the
//! text and disagree with ours by a position or two often enough to matter,
//! especially around emoji and accented characters. Nothing here trusts a
//! reported offset on its own: the offsets seed a candidate, the candidate
//! is validated by its prefix character, and the final rendering-side
//! location comes from a content search near the reported window.

use std::fmt;
use std::ops::Range;

use serde_json::Value;
use tracing::debug;

use crate::payload::RawEntity;

/// A location in the UTF-16 rendering representation of a tweet's text, the
/// coordinate system styling and layout code works in. Distinct from the
/// code-point offsets used to slice the text; the two diverge whenever the
/// text contains multi-unit characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchRange {
    pub location: usize,
    pub length: usize,
}

impl SearchRange {
    /// Sentinel for "no reconciled match". Never stored in a successfully
    /// constructed [`IndexedKeyword`].
    pub const NOT_FOUND: SearchRange = SearchRange {
        location: usize::MAX,
        length: 0,
    };

    pub fn is_found(&self) -> bool {
        self.location != usize::MAX
    }
}

/// One located entity occurrence inside a tweet's text.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedKeyword {
    /// The matched substring, including its `#`/`@` prefix or the leading
    /// `h` of an URL.
    pub keyword: String,
    /// Code-point offsets into the owning tweet's text. Use these to slice.
    pub text_range: Range<usize>,
    /// UTF-16 unit offsets into the rendering representation of the same
    /// text. Use these with styling APIs, never for slicing.
    pub search_range: SearchRange,
}

impl IndexedKeyword {
    /// Decode one entity descriptor and locate it in `text`. Any
    /// inconsistency drops this one entity; the caller keeps going.
    pub fn from_json(data: &Value, text: &str, prefix: Option<&str>) -> Option<IndexedKeyword> {
        let raw = RawEntity::from_json(data)?;
        IndexedKeyword::locate(&raw, text, prefix)
    }

    /// The reconciliation itself: clamp the reported code-point span, check
    /// the prefix (with a one-left/two-short fallback for the skew the API
    /// exhibits after multi-unit characters), then confirm the candidate by
    /// searching the UTF-16 text near the reported window.
    pub fn locate(raw: &RawEntity, text: &str, prefix: Option<&str>) -> Option<IndexedKeyword> {
        let (reported_start, reported_end) = raw.reported_span()?;
        let len = text.chars().count();
        if len == 0 {
            return None;
        }

        let start = reported_start.clamp(0, len as i64 - 1) as usize;
        let end = reported_end.clamp(0, len as i64) as usize;
        if end <= start {
            debug!(reported_start, reported_end, "entity span empty after clamping, dropped");
            return None;
        }

        let mut range = start..end;
        let mut keyword = char_slice(text, range.clone())?.to_string();
        if let Some(p) = prefix {
            if !keyword.starts_with(p) && start > 0 && end > start + 1 {
                // Known skew: the reported span lands one past the prefix
                // and two past the end of the entity.
                range = start - 1..end - 2;
                keyword = char_slice(text, range.clone())?.to_string();
            }
            if !keyword.starts_with(p) {
                debug!(%keyword, prefix = %p, "entity keyword missing required prefix, dropped");
                return None;
            }
        }

        // The search window is seeded with the raw reported offsets, not the
        // clamped ones: UTF-16 positions need not line up with code points.
        let search_range = find_near(text, &keyword, reported_start, reported_end - reported_start);
        if !search_range.is_found() {
            debug!(%keyword, "entity keyword not found near reported window, dropped");
            return None;
        }

        Some(IndexedKeyword {
            keyword,
            text_range: range,
            search_range,
        })
    }
}

impl fmt::Display for IndexedKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, {})",
            self.keyword,
            self.search_range.location,
            self.search_range.location + self.search_range.length - 1
        )
    }
}

/// Slice `text` by code-point offsets. `None` when the range is empty or
/// runs past the end.
pub(crate) fn char_slice(text: &str, range: Range<usize>) -> Option<&str> {
    if range.end <= range.start || range.end > text.chars().count() {
        return None;
    }
    let mut offsets = text.char_indices().map(|(at, _)| at);
    let byte_start = offsets.nth(range.start)?;
    let byte_end = offsets
        .nth(range.end - range.start - 1)
        .unwrap_or(text.len());
    Some(&text[byte_start..byte_end])
}

/// Case-insensitive search for `needle` in the UTF-16 units of `haystack`,
/// seeded at the window `[location, location + length)`. On a miss the
/// window widens one unit left and one unit right per iteration until a
/// match turns up or the window covers the whole text.
fn find_near(haystack: &str, needle: &str, location: i64, length: i64) -> SearchRange {
    let hay: Vec<u16> = haystack.encode_utf16().map(fold_unit).collect();
    let needle: Vec<u16> = needle.encode_utf16().map(fold_unit).collect();
    if hay.is_empty() || needle.is_empty() {
        return SearchRange::NOT_FOUND;
    }

    let mut start = location.clamp(0, hay.len() as i64 - 1) as usize;
    let mut end = (location + length).clamp(0, hay.len() as i64) as usize;
    loop {
        if let Some(at) = find_in_window(&hay, &needle, start, end) {
            return SearchRange {
                location: at,
                length: needle.len(),
            };
        }
        let mut widened = false;
        if start > 0 {
            start -= 1;
            widened = true;
        }
        if end < hay.len() {
            end += 1;
            widened = true;
        }
        if !widened {
            return SearchRange::NOT_FOUND;
        }
    }
}

fn find_in_window(hay: &[u16], needle: &[u16], start: usize, end: usize) -> Option<usize> {
    if end <= start {
        return None;
    }
    let window = hay.get(start..end)?;
    window
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|at| start + at)
}

/// Simple case fold for one UTF-16 unit. Units whose lowercase form is not a
/// single BMP character (surrogate halves, ligature-style folds) compare
/// raw, which keeps window positions aligned with the unfolded text.
fn fold_unit(unit: u16) -> u16 {
    match char::from_u32(unit as u32) {
        Some(c) => {
            let mut lower = c.to_lowercase();
            match (lower.next(), lower.next()) {
                (Some(folded), None) if (folded as u32) <= u16::MAX as u32 => folded as u16,
                _ => unit,
            }
        }
        None => unit,
    }
}
