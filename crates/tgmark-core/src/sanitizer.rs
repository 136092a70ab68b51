//! Telegram MarkdownV2 sanitizer.
//!
//! Escapes arbitrary text so Telegram accepts it under `parse_mode=MarkdownV2`
//! while keeping the entities the dialect supports: bold, italic, underline,
//! strikethrough, spoiler, inline and fenced code, block quotes, inline links,
//! user mentions and custom emoji. Anything that does not form a complete
//! entity is escaped as a literal, so the scan never fails.
//!
//! The scan is a single left-to-right pass. Each position is classified by a
//! short lookahead into a [`Construct`], and the matching handler writes its
//! output and reports how many chars it consumed. Closer searches skip escape
//! pairs, and searches that come up empty are remembered so a run of
//! unmatched openers stays linear.

use std::collections::HashMap;

use crate::escape::{self, EscapeIndex, is_escapable, is_reserved};

/// Escapes text for a restricted markdown dialect.
pub trait Sanitizer: Send + Sync {
    /// Escape `text` so every reserved char outside a recognized entity is
    /// preceded by a backslash.
    fn sanitize(&self, text: &str) -> String;

    /// Escape a link target for use inside `[text](...)`.
    fn escape_url(&self, url: &str) -> String;
}

/// [`Sanitizer`] for Telegram's MarkdownV2 parse mode.
#[derive(Debug, Clone, Copy, Default)]
pub struct TgMarkdownV2Sanitizer;

impl TgMarkdownV2Sanitizer {
    /// Create a new sanitizer.
    pub const fn new() -> Self {
        Self
    }
}

impl Sanitizer for TgMarkdownV2Sanitizer {
    fn sanitize(&self, text: &str) -> String {
        sanitize(text)
    }

    fn escape_url(&self, url: &str) -> String {
        escape::escape_url(url)
    }
}

/// Sanitize `text` for MarkdownV2.
///
/// Total: empty, unbalanced or truncated markup falls back to literal
/// escaping. Sanitizing the output again returns it unchanged.
///
/// ```
/// use tgmark_core::sanitize;
///
/// assert_eq!(sanitize("*bold* costs 1.5$!"), "*bold* costs 1\\.5$\\!");
/// ```
#[tracing::instrument(skip_all, fields(input_len = text.len()))]
pub fn sanitize(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + text.len() / 8 + 8);
    let mut scanner = Scanner::new(&chars);
    scanner.scan(0, chars.len(), Context::Root, &mut out);
    out
}

/// Paired formatting markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    Bold,
    Italic,
    Underline,
    Strike,
    Spoiler,
}

impl Marker {
    const fn symbol(self) -> char {
        match self {
            Self::Bold => '*',
            Self::Italic | Self::Underline => '_',
            Self::Strike => '~',
            Self::Spoiler => '|',
        }
    }

    const fn width(self) -> usize {
        match self {
            Self::Underline | Self::Spoiler => 2,
            Self::Bold | Self::Italic | Self::Strike => 1,
        }
    }

    const fn search(self) -> Search {
        match self {
            Self::Bold => Search::Bold,
            Self::Italic => Search::Italic,
            Self::Underline => Search::Underline,
            Self::Strike => Search::Strike,
            Self::Spoiler => Search::Spoiler,
        }
    }
}

/// What the char at the cursor starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Construct {
    Escape,
    FencedCode,
    InlineCode,
    Paired(Marker),
    Link,
    CustomEmoji,
    Quote,
    Reserved,
    Plain,
}

/// Where a range of text sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    /// Top level: every entity is recognized.
    Root,
    /// Text of a link or custom emoji: no block quotes.
    LinkText,
    /// Inside a paired marker: only code spans and escape pairs.
    SpanContent,
}

/// Closer searches whose misses are remembered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Search {
    Bold,
    Italic,
    Underline,
    Strike,
    Spoiler,
    Backtick,
    Fence,
}

const SEARCH_KINDS: usize = 7;

/// Char ranges of a recognized `[text](url)`.
#[derive(Debug, Clone, Copy)]
struct LinkParts {
    text_start: usize,
    text_end: usize,
    url_start: usize,
    url_end: usize,
    /// First char after the closing parenthesis.
    next: usize,
}

struct Scanner<'a> {
    chars: &'a [char],
    index: EscapeIndex,
    /// Unescaped `[` to its matching `]`.
    brackets: HashMap<usize, usize>,
    /// Unescaped `(` to its matching `)`.
    parens: HashMap<usize, usize>,
    /// `(from, end)` of the last search of each kind that found nothing.
    misses: [Option<(usize, usize)>; SEARCH_KINDS],
}

impl<'a> Scanner<'a> {
    fn new(chars: &'a [char]) -> Self {
        let index = EscapeIndex::new(chars);
        let brackets = match_pairs(chars, &index, '[', ']');
        let parens = match_pairs(chars, &index, '(', ')');
        Self {
            chars,
            index,
            brackets,
            parens,
            misses: [None; SEARCH_KINDS],
        }
    }

    fn scan(&mut self, start: usize, end: usize, ctx: Context, out: &mut String) {
        let mut i = start;
        while i < end {
            i += self.step(i, start, end, ctx, out);
        }
    }

    /// Handle the construct at `i` and return how many chars it consumed.
    fn step(&mut self, i: usize, start: usize, end: usize, ctx: Context, out: &mut String) -> usize {
        let c = self.chars[i];
        match self.classify(i, end, ctx) {
            Construct::Escape => self.escape_pair(i, end, out),
            Construct::FencedCode => self.fenced_code(i, end, out),
            Construct::InlineCode => self.inline_code(i, end, out),
            Construct::Paired(marker) => self.paired(marker, i, end, out),
            Construct::Link => self.link(i, end, out),
            Construct::CustomEmoji => self.custom_emoji(i, end, out),
            Construct::Quote => self.quote(i, start, out),
            Construct::Reserved => {
                out.push('\\');
                out.push(c);
                1
            }
            Construct::Plain => {
                out.push(c);
                1
            }
        }
    }

    fn classify(&self, i: usize, end: usize, ctx: Context) -> Construct {
        let at = |k: usize| (k < end).then(|| self.chars[k]);
        let construct = match self.chars[i] {
            '\\' => Construct::Escape,
            '`' if at(i + 1) == Some('`') && at(i + 2) == Some('`') => Construct::FencedCode,
            '`' => Construct::InlineCode,
            '*' => Construct::Paired(Marker::Bold),
            '~' => Construct::Paired(Marker::Strike),
            '_' if at(i + 1) == Some('_') => Construct::Paired(Marker::Underline),
            '_' => Construct::Paired(Marker::Italic),
            '|' if at(i + 1) == Some('|') => Construct::Paired(Marker::Spoiler),
            '[' => Construct::Link,
            '!' if at(i + 1) == Some('[') => Construct::CustomEmoji,
            '>' => Construct::Quote,
            c if is_reserved(c) => Construct::Reserved,
            _ => Construct::Plain,
        };

        match (ctx, construct) {
            (
                Context::SpanContent,
                Construct::Paired(_) | Construct::Link | Construct::CustomEmoji | Construct::Quote,
            )
            | (Context::LinkText, Construct::Quote) => Construct::Reserved,
            _ => construct,
        }
    }

    fn escape_pair(&self, i: usize, end: usize, out: &mut String) -> usize {
        match self.chars.get(i + 1) {
            Some(&next) if i + 1 < end && is_escapable(next) => {
                out.push('\\');
                out.push(next);
                2
            }
            _ => {
                out.push_str("\\\\");
                1
            }
        }
    }

    fn inline_code(&mut self, i: usize, end: usize, out: &mut String) -> usize {
        let Some(close) = self.find(Search::Backtick, i + 1, end) else {
            tracing::trace!(at = i, "unterminated inline code");
            out.push_str("\\`");
            return 1;
        };
        out.push('`');
        self.code_content(i + 1, close, out);
        out.push('`');
        close + 1 - i
    }

    /// Fenced block. The language tag on the opening line cannot contain a
    /// backslash or backtick, so the content rule leaves it verbatim.
    fn fenced_code(&mut self, i: usize, end: usize, out: &mut String) -> usize {
        let Some(close) = self.find(Search::Fence, i + 3, end) else {
            tracing::trace!(at = i, "unterminated fenced code");
            out.push_str("\\`\\`\\`");
            return 3;
        };
        out.push_str("```");
        self.code_content(i + 3, close, out);
        out.push_str("```");
        close + 3 - i
    }

    /// Inside code only `\` and `` ` `` are escaped. An existing escape pair
    /// is kept whole, so a marker escaped by the cropper stays escaped.
    fn code_content(&self, start: usize, end: usize, out: &mut String) {
        let mut k = start;
        while k < end {
            let c = self.chars[k];
            if c == '\\' && k + 1 < end && is_escapable(self.chars[k + 1]) {
                out.push('\\');
                out.push(self.chars[k + 1]);
                k += 2;
                continue;
            }
            if matches!(c, '\\' | '`') {
                out.push('\\');
            }
            out.push(c);
            k += 1;
        }
    }

    fn paired(&mut self, marker: Marker, i: usize, end: usize, out: &mut String) -> usize {
        let width = marker.width();
        let Some(close) = self.find(marker.search(), i + width, end) else {
            tracing::trace!(at = i, marker = %marker.symbol(), "unmatched marker");
            for _ in 0..width {
                out.push('\\');
                out.push(marker.symbol());
            }
            return width;
        };
        for _ in 0..width {
            out.push(marker.symbol());
        }
        self.scan(i + width, close, Context::SpanContent, out);
        for _ in 0..width {
            out.push(marker.symbol());
        }
        close + width - i
    }

    fn link(&mut self, i: usize, end: usize, out: &mut String) -> usize {
        let Some(parts) = self.link_parts(i, end) else {
            out.push_str("\\[");
            return 1;
        };
        self.emit_link(parts, out);
        parts.next - i
    }

    fn custom_emoji(&mut self, i: usize, end: usize, out: &mut String) -> usize {
        match self.link_parts(i + 1, end) {
            Some(parts) if self.starts_with(parts.url_start, parts.url_end, "tg://") => {
                out.push('!');
                self.emit_link(parts, out);
                parts.next - i
            }
            _ => {
                out.push_str("\\!");
                1
            }
        }
    }

    fn emit_link(&mut self, parts: LinkParts, out: &mut String) {
        out.push('[');
        self.scan(parts.text_start, parts.text_end, Context::LinkText, out);
        out.push_str("](");
        escape::escape_url_chars(&self.chars[parts.url_start..parts.url_end], out);
        out.push(')');
    }

    /// `[` at `i`, its matching `]`, then `(` and a matching `)`.
    fn link_parts(&self, i: usize, end: usize) -> Option<LinkParts> {
        let close = *self.brackets.get(&i)?;
        let open_paren = close + 1;
        if open_paren >= end || self.chars[open_paren] != '(' {
            return None;
        }
        let url_end = *self.parens.get(&open_paren)?;
        if url_end >= end {
            return None;
        }
        Some(LinkParts {
            text_start: i + 1,
            text_end: close,
            url_start: open_paren + 1,
            url_end,
            next: url_end + 1,
        })
    }

    /// `>` is a live quote marker only when nothing but format markers and
    /// escape pairs sit between it and the start of its line.
    fn quote(&self, i: usize, start: usize, out: &mut String) -> usize {
        let mut j = i;
        let live = loop {
            if j == start {
                break true;
            }
            let prev = j - 1;
            match self.chars[prev] {
                '\n' => break true,
                c if self.index.is_escapee(prev) && is_escapable(c) => j = prev - 1,
                '*' | '_' | '~' | '|' => j = prev,
                _ => break false,
            }
        };
        if !live {
            out.push('\\');
        }
        out.push('>');
        1
    }

    fn starts_with(&self, start: usize, end: usize, prefix: &str) -> bool {
        let mut k = start;
        for p in prefix.chars() {
            if k >= end || self.chars[k] != p {
                return false;
            }
            k += 1;
        }
        true
    }

    /// First closer of `kind` in `from..end`, skipping escape pairs.
    fn find(&mut self, kind: Search, from: usize, end: usize) -> Option<usize> {
        let slot = kind as usize;
        if let Some((missed_from, missed_end)) = self.misses[slot]
            && missed_end == end
            && from >= missed_from
        {
            return None;
        }

        let found = self.search(kind, from, end);
        if found.is_none() {
            self.misses[slot] = Some((from, end));
        }
        found
    }

    fn search(&self, kind: Search, from: usize, end: usize) -> Option<usize> {
        let chars = self.chars;
        let is = |k: usize, c: char| k < end && chars[k] == c;
        let mut k = from;
        while k < end {
            if self.index.starts_pair(k) {
                k += 2;
                continue;
            }
            match kind {
                Search::Bold if chars[k] == '*' => return Some(k),
                Search::Strike if chars[k] == '~' => return Some(k),
                Search::Backtick if chars[k] == '`' => return Some(k),
                Search::Fence if is(k, '`') && is(k + 1, '`') && is(k + 2, '`') => {
                    return Some(k);
                }
                Search::Underline if is(k, '_') && is(k + 1, '_') => return Some(k),
                Search::Spoiler if is(k, '|') && is(k + 1, '|') => return Some(k),
                // A single `_` never closes on half of a `__`.
                Search::Italic if chars[k] == '_' => {
                    if is(k + 1, '_') {
                        k += 2;
                        continue;
                    }
                    return Some(k);
                }
                _ => {}
            }
            k += 1;
        }
        None
    }
}

/// Match unescaped `open`/`close` chars by nesting depth.
fn match_pairs(
    chars: &[char],
    index: &EscapeIndex,
    open: char,
    close: char,
) -> HashMap<usize, usize> {
    let mut matches = HashMap::new();
    let mut stack = Vec::new();
    for (i, &c) in chars.iter().enumerate() {
        if index.is_escapee(i) {
            continue;
        }
        if c == open {
            stack.push(i);
        } else if c == close
            && let Some(start) = stack.pop()
        {
            matches.insert(start, i);
        }
    }
    matches
}
