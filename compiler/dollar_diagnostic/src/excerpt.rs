//! Source excerpts for error messages.
//!
//! The offending token is delimited by ` → ` and ` ← `; surrounding context
//! is cut to the token's line(s) and at most [`MAX_CONTEXT_CHARS`] characters
//! on each side. The token itself is shortened past twice that width.

use std::fmt;

use dollar_ir::SourceSegment;

use crate::LineOffsetTable;

/// Context characters kept on each side of the token.
pub const MAX_CONTEXT_CHARS: usize = 40;

const UNKNOWN_LOCATION: &str = "<unknown location>";
const ANONYMOUS_FILE: &str = "<script>";

/// Where a segment starts: file, 1-based line, 0-based column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Location {
    pub file: Option<String>,
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}:{})",
            self.file.as_deref().unwrap_or(ANONYMOUS_FILE),
            self.line,
            self.column
        )
    }
}

/// Resolve a segment to its location, or `None` for synthetic segments.
pub fn locate(segment: &SourceSegment) -> Option<Location> {
    if !segment.is_known() {
        return None;
    }
    let source = segment.source()?;
    let table = LineOffsetTable::build(source.text());
    let (line, column) = table.offset_to_line_col(source.text(), segment.span().start);
    Some(Location {
        file: source.file().map(str::to_string),
        line,
        column,
    })
}

struct Parts<'a> {
    before: &'a str,
    token: String,
    after: &'a str,
    location: Location,
}

fn split(segment: &SourceSegment) -> Option<Parts<'_>> {
    let location = locate(segment)?;
    let source = segment.source()?;
    let text = source.text();
    let table = LineOffsetTable::build(text);
    let span = segment.span();

    let line_start = table.line_start(location.line).unwrap_or(0) as usize;
    let line_end = table.line_end(text, span.end.max(span.start)) as usize;
    let start = span.start as usize;
    let end = span.end as usize;

    let before = text.get(line_start..start).unwrap_or("");
    let after = text.get(end..line_end.max(end)).unwrap_or("");
    Some(Parts {
        before: tail_chars(before, MAX_CONTEXT_CHARS),
        token: bounded_token(segment.segment()),
        after: head_chars(after, MAX_CONTEXT_CHARS),
        location,
    })
}

fn tail_chars(s: &str, n: usize) -> &str {
    match s.char_indices().rev().nth(n.saturating_sub(1)) {
        Some((idx, _)) if s.chars().count() > n => &s[idx..],
        _ => s,
    }
}

fn head_chars(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

fn bounded_token(token: &str) -> String {
    let limit = MAX_CONTEXT_CHARS * 2;
    if token.chars().count() <= limit {
        return token.to_string();
    }
    let mut out: String = token.chars().take(limit).collect();
    out.push('…');
    out
}

/// Multi-line rendering used for top-level error reports.
///
/// ```text
///
///     x := 1 → + ← "a"
///
/// see demo.ds(1:7)
/// ```
pub fn source_message(segment: &SourceSegment) -> String {
    let Some(parts) = split(segment) else {
        return UNKNOWN_LOCATION.to_string();
    };
    format!(
        "\n    {} → {} ← {}\n\nsee {}\n",
        parts.before,
        parts.token.replace('\n', "\n    "),
        parts.after,
        parts.location
    )
}

/// Single-line rendering used inside nested error causes.
pub fn short_source_message(segment: &SourceSegment) -> String {
    let Some(parts) = split(segment) else {
        return UNKNOWN_LOCATION.to_string();
    };
    let token = parts
        .token
        .split('\n')
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    format!(
        " {} → {} ← {} {}",
        parts.before, token, parts.after, parts.location
    )
}
