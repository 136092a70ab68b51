//! Escaping vocabulary shared by the sanitizer and the cropper.
//!
//! Everything here works on `char` slices: an escape pair is a backslash plus
//! exactly one following `char`, and the pair is never split.

use serde::Serialize;

/// Characters MarkdownV2 reserves outside of recognized entities.
pub const RESERVED: &[char] = &[
    '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
];

/// Paired formatting markers whose unescaped count must stay even after a crop.
pub const MARKERS: [char; 5] = ['*', '_', '~', '|', '`'];

/// Escaped ellipsis appended to cropped text.
pub const ELLIPSIS: &str = "\\.\\.\\.";

/// Length of [`ELLIPSIS`] in chars.
pub const ELLIPSIS_LEN: usize = 6;

/// Returns `true` if `c` must be escaped when it is not part of an entity.
pub fn is_reserved(c: char) -> bool {
    RESERVED.contains(&c)
}

/// Returns `true` if a backslash followed by `c` is kept as an escape pair.
///
/// The backslash itself is accepted so that `\\` survives a second pass.
pub fn is_escapable(c: char) -> bool {
    c == '\\' || is_reserved(c)
}

/// Escape-pair boundaries of a char slice, computed in one forward pass.
///
/// A backslash that is not itself escaped starts a pair with the next char.
/// A trailing backslash with nothing after it starts no pair.
#[derive(Debug, Clone)]
pub struct EscapeIndex {
    escapee: Vec<bool>,
}

impl EscapeIndex {
    /// Build the index for `chars`.
    pub fn new(chars: &[char]) -> Self {
        let mut escapee = vec![false; chars.len()];
        let mut i = 0;
        while i < chars.len() {
            if chars[i] == '\\' && i + 1 < chars.len() {
                escapee[i + 1] = true;
                i += 2;
            } else {
                i += 1;
            }
        }
        Self { escapee }
    }

    /// The char at `i` is the second half of an escape pair.
    pub fn is_escapee(&self, i: usize) -> bool {
        self.escapee.get(i).copied().unwrap_or(false)
    }

    /// The char at `i` is the backslash opening an escape pair.
    pub fn starts_pair(&self, i: usize) -> bool {
        self.is_escapee(i + 1)
    }
}

/// Escape a link target: only `(`, `)` and `\` are prefixed with a backslash.
///
/// ```
/// assert_eq!(
///     tgmark_core::escape::escape_url("https://example.com/a(b)"),
///     "https://example.com/a\\(b\\)",
/// );
/// ```
pub fn escape_url(url: &str) -> String {
    let mut out = String::with_capacity(url.len() + 8);
    for c in url.chars() {
        if matches!(c, '(' | ')' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Like [`escape_url`], but keeps escape pairs that are already present.
///
/// Used for the URL part of a recognized link so that sanitized output can be
/// sanitized again without doubling its backslashes. Any `\` followed by an
/// escapable char counts as a pair, so a marker escaped by the cropper stays
/// escaped.
pub(crate) fn escape_url_chars(chars: &[char], out: &mut String) {
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == '\\' && i + 1 < chars.len() && is_escapable(chars[i + 1]) {
            out.push('\\');
            out.push(chars[i + 1]);
            i += 2;
            continue;
        }
        if matches!(c, '(' | ')' | '\\') {
            out.push('\\');
        }
        out.push(c);
        i += 1;
    }
}

/// Count occurrences of `marker` in `text` that are not escapees.
pub fn count_unescaped(text: &str, marker: char) -> usize {
    let chars: Vec<char> = text.chars().collect();
    let index = EscapeIndex::new(&chars);
    chars
        .iter()
        .enumerate()
        .filter(|&(i, &c)| c == marker && !index.is_escapee(i))
        .count()
}

/// A marker whose unescaped occurrences do not pair up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UnbalancedMarker {
    /// The marker character.
    pub marker: char,
    /// How many unescaped occurrences the text contains.
    pub count: usize,
}

/// Report every marker in [`MARKERS`] with an odd unescaped count.
pub fn unbalanced_markers(text: &str) -> Vec<UnbalancedMarker> {
    MARKERS
        .iter()
        .map(|&marker| UnbalancedMarker {
            marker,
            count: count_unescaped(text, marker),
        })
        .filter(|m| m.count % 2 != 0)
        .collect()
}
