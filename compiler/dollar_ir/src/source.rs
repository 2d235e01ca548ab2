//! Script source text and the source windows the front end attaches to
//! every operator token.

use std::fmt;
use std::hash::Hasher;
use std::sync::Arc;

use rustc_hash::FxHasher;

use crate::Span;

/// A complete script source, shared by every segment cut from it.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct SourceText {
    file: Option<String>,
    text: String,
    fingerprint: u64,
}

impl SourceText {
    /// Create a source with an optional originating file name.
    pub fn new(file: Option<String>, text: impl Into<String>) -> Arc<Self> {
        let text = text.into();
        let mut hasher = FxHasher::default();
        hasher.write(text.as_bytes());
        Arc::new(SourceText {
            file,
            text,
            fingerprint: hasher.finish(),
        })
    }

    /// Create a source that did not come from a file (REPL, tests).
    pub fn anonymous(text: impl Into<String>) -> Arc<Self> {
        Self::new(None, text)
    }

    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Short base-36 hash of the source, used to label nodes in traces.
    pub fn short_hash(&self) -> String {
        to_base36(self.fingerprint & 0xFFFF_FFFF)
    }
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

/// A window into a [`SourceText`]: the location of one operator token.
///
/// Segments without a source (runtime-synthesized nodes) render as
/// `<unknown location>`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SourceSegment {
    source: Option<Arc<SourceText>>,
    span: Span,
}

impl SourceSegment {
    pub fn new(source: Arc<SourceText>, span: Span) -> Self {
        SourceSegment {
            source: Some(source),
            span,
        }
    }

    /// Segment for nodes the runtime builds on its own.
    pub fn unknown() -> Self {
        SourceSegment {
            source: None,
            span: Span::DUMMY,
        }
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn source(&self) -> Option<&Arc<SourceText>> {
        self.source.as_ref()
    }

    pub fn file(&self) -> Option<&str> {
        self.source.as_ref().and_then(|s| s.file())
    }

    /// Whether this segment points into real source text.
    pub fn is_known(&self) -> bool {
        self.source
            .as_ref()
            .is_some_and(|s| self.span.end as usize <= s.text().len())
    }

    /// The exact text of the token, or `""` when the span does not fit the source.
    pub fn segment(&self) -> &str {
        match &self.source {
            Some(source) => source.text().get(self.span.to_range()).unwrap_or(""),
            None => "",
        }
    }
}

impl fmt::Debug for SourceSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.file() {
            Some(file) => write!(f, "{file}@{:?}", self.span),
            None if self.source.is_some() => write!(f, "<script>@{:?}", self.span),
            None => f.write_str("<unknown location>"),
        }
    }
}

impl Default for SourceSegment {
    fn default() -> Self {
        Self::unknown()
    }
}
