//! Diagnostics for the sift generator.
//!
//! Every failing phase produces a [`Diagnostic`]: a category, an optional
//! source span, and a message. The driver renders them against a
//! [`SourceMap`] as `<file>:<line>:<col>: <message>` and aborts - there is
//! no recovery at generation time, only at checker runtime.

use sift_ir::Span;
use std::fmt;
use thiserror::Error;

/// What class of failure a diagnostic reports.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Category {
    /// Malformed source text.
    Syntax,
    /// Unknown symbol, or a symbol of the wrong kind.
    Resolution,
    /// Ill-typed construct, or non-constant where a constant is required.
    Type,
    /// Structurally valid and typed, but breaking a language rule.
    Semantic,
    /// File system failure.
    Io,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Syntax => write!(f, "syntax error"),
            Category::Resolution => write!(f, "resolution error"),
            Category::Type => write!(f, "type error"),
            Category::Semantic => write!(f, "semantic error"),
            Category::Io => write!(f, "I/O error"),
        }
    }
}

/// A located, categorized error.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{message}")]
#[must_use = "diagnostics should be reported or returned, not silently dropped"]
pub struct Diagnostic {
    pub category: Category,
    /// Absent for errors with no source position (most I/O failures).
    pub span: Option<Span>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(category: Category, span: Span, message: impl Into<String>) -> Self {
        Diagnostic {
            category,
            span: Some(span),
            message: message.into(),
        }
    }

    pub fn syntax(span: Span, message: impl Into<String>) -> Self {
        Self::new(Category::Syntax, span, message)
    }

    pub fn resolution(span: Span, message: impl Into<String>) -> Self {
        Self::new(Category::Resolution, span, message)
    }

    pub fn type_error(span: Span, message: impl Into<String>) -> Self {
        Self::new(Category::Type, span, message)
    }

    pub fn semantic(span: Span, message: impl Into<String>) -> Self {
        Self::new(Category::Semantic, span, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Diagnostic {
            category: Category::Io,
            span: None,
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for Diagnostic {
    fn from(err: std::io::Error) -> Self {
        Diagnostic::io(err.to_string())
    }
}

/// Shorthand for fallible generator phases.
pub type Result<T> = std::result::Result<T, Diagnostic>;

/// Maps byte offsets back to 1-based line/column pairs for rendering.
pub struct SourceMap {
    name: String,
    line_starts: Vec<u32>,
}

impl SourceMap {
    pub fn new(name: impl Into<String>, text: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i as u32 + 1);
            }
        }
        SourceMap {
            name: name.into(),
            line_starts,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 1-based (line, column) of a byte offset.
    pub fn location(&self, offset: u32) -> (u32, u32) {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        (line as u32 + 1, offset - self.line_starts[line] + 1)
    }

    /// Render a diagnostic as `<file>:<line>:<col>: <message>`.
    pub fn render(&self, diagnostic: &Diagnostic) -> String {
        match diagnostic.span {
            Some(span) => {
                let (line, col) = self.location(span.start);
                format!("{}:{}:{}: {}", self.name, line, col, diagnostic.message)
            }
            None => format!("{}: {}", self.name, diagnostic.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn locations_are_one_based() {
        let map = SourceMap::new("m.m", "var\n  x: 0..1;\n");
        assert_eq!(map.location(0), (1, 1));
        assert_eq!(map.location(2), (1, 3));
        assert_eq!(map.location(4), (2, 1));
        assert_eq!(map.location(6), (2, 3));
    }

    #[test]
    fn render_includes_file_line_col() {
        let map = SourceMap::new("counter.m", "var x: 0..1;\n");
        let d = Diagnostic::type_error(Span::new(4, 5), "undefined symbol");
        assert_eq!(map.render(&d), "counter.m:1:5: undefined symbol");
    }

    #[test]
    fn render_without_span() {
        let map = SourceMap::new("counter.m", "");
        let d = Diagnostic::io("failed to open");
        assert_eq!(map.render(&d), "counter.m: failed to open");
    }

    #[test]
    fn location_at_line_start() {
        let map = SourceMap::new("m", "a\nb\nc\n");
        assert_eq!(map.location(2), (2, 1));
        assert_eq!(map.location(4), (3, 1));
    }
}
