//! Length-bounded cropping of sanitized MarkdownV2 text.
//!
//! The cropper cuts at a word boundary, escapes markers left without their
//! partner and appends an escaped ellipsis. It keeps marker parity even but
//! does not restore full dialect legality; run the result through
//! [`sanitize`](crate::sanitize) again when it reports a change, or use
//! [`sanitize_and_crop`] for the whole chain.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::escape::{ELLIPSIS, ELLIPSIS_LEN, EscapeIndex, MARKERS};
use crate::sanitizer::sanitize;

/// Result of cropping a text to a budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Cropped {
    /// The (possibly) cropped text.
    pub text: String,
    /// Whether the input was cut.
    pub changed: bool,
    /// Length of `text` in chars.
    pub length: usize,
    /// The budget the text was cropped to.
    pub max: usize,
}

/// Crop sanitized `text` to at most `max` chars.
///
/// Returns the text and whether it was cut. Text that already fits comes back
/// untouched. A cut text ends with `\.\.\.`; when `max` is too small to hold
/// that ellipsis the result is empty.
///
/// ```
/// use tgmark_core::{crop, sanitize};
///
/// let text = sanitize("*bold text* trailing");
/// assert_eq!(crop(&text, 12), ("\\*bold\\.\\.\\.".to_string(), true));
/// ```
#[tracing::instrument(skip(text), fields(text_len = text.len()))]
pub fn crop(text: &str, max: usize) -> (String, bool) {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max {
        return (text.to_string(), false);
    }
    if max < ELLIPSIS_LEN {
        tracing::debug!(max, "budget cannot hold the ellipsis");
        return (String::new(), true);
    }

    let room = max - ELLIPSIS_LEN;
    let index = EscapeIndex::new(&chars);
    let mut cut = word_boundary(&chars, &index, room.min(chars.len()));
    tracing::debug!(cut, room, "crop point");

    let mut repaired = repair_markers(&chars[..cut]);
    while repaired.len() > room {
        let excess = repaired.len() - room;
        cut = drop_units(&index, cut, excess);
        repaired = repair_markers(&chars[..cut]);
    }

    let mut out: String = repaired.into_iter().collect();
    out.push_str(ELLIPSIS);
    (out, true)
}

/// Report form of [`crop`].
pub fn crop_report(text: &str, max: usize) -> Cropped {
    let (text, changed) = crop(text, max);
    let length = text.chars().count();
    Cropped {
        text,
        changed,
        length,
        max,
    }
}

/// Sanitize raw `text` and crop it to at most `max` chars.
///
/// A cut text is sanitized again, which can make it longer than the cut
/// (a code span that lost its closer gets its content escaped). When that
/// happens the crop is retried with a target reduced by the overflow until
/// the final text fits.
///
/// ```
/// use tgmark_core::crop::sanitize_and_crop;
///
/// let report = sanitize_and_crop(&("a".repeat(500) + "*"), 100);
/// assert!(report.changed);
/// assert_eq!(report.text, "\\.\\.\\.");
/// ```
#[tracing::instrument(skip(text), fields(text_len = text.len()))]
pub fn sanitize_and_crop(text: &str, max: usize) -> Cropped {
    let sanitized = sanitize(text);
    let mut out = sanitized.clone();
    let mut length = out.chars().count();
    let mut changed = false;
    let mut target = max;
    while length > max {
        let (cut, was_cut) = crop(&sanitized, target);
        changed |= was_cut;
        out = if was_cut { sanitize(&cut) } else { cut };
        length = out.chars().count();
        if length > max {
            tracing::debug!(length, max, target, "cut grew after re-sanitizing");
            target = target.saturating_sub(length - max);
        }
    }
    Cropped {
        text: out,
        changed,
        length,
        max,
    }
}

/// Walk back from `from` to the nearest space that is not an escapee.
///
/// Returns 0 when no such space exists.
fn word_boundary(chars: &[char], index: &EscapeIndex, from: usize) -> usize {
    let mut cut = from;
    while cut > 0 && (chars.get(cut) != Some(&' ') || index.is_escapee(cut)) {
        cut -= 1;
    }
    cut
}

/// Move `cut` back by at least `excess` chars without splitting a pair.
fn drop_units(index: &EscapeIndex, cut: usize, excess: usize) -> usize {
    let mut cut = cut.saturating_sub(excess);
    // The char before the cut must not be a backslash whose escapee we dropped.
    if cut > 0 && index.starts_pair(cut - 1) {
        cut -= 1;
    }
    cut
}

/// Escape the last unescaped occurrence of every marker with an odd count.
fn repair_markers(chars: &[char]) -> Vec<char> {
    let index = EscapeIndex::new(chars);
    let mut insert_before = Vec::new();

    for marker in MARKERS {
        let mut count = 0usize;
        let mut last = None;
        for (i, &c) in chars.iter().enumerate() {
            if c == marker && !index.is_escapee(i) {
                count += 1;
                last = Some(i);
            }
        }
        if count % 2 != 0
            && let Some(pos) = last
        {
            tracing::trace!(marker = %marker, pos, "escaping dangling marker");
            insert_before.push(pos);
        }
    }
    insert_before.sort_unstable();

    let mut out = Vec::with_capacity(chars.len() + insert_before.len());
    let mut pending = insert_before.iter().peekable();
    for (i, &c) in chars.iter().enumerate() {
        if pending.next_if(|&&pos| pos == i).is_some() {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
