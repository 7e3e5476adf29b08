//! Unified, `miette`-based diagnostics for the commodore file format.
//!
//! Every failure produced while reading, tokenizing, parsing or resolving the
//! argument types of a command file is represented by [`CommodoreError`]. There
//! are exactly three kinds:
//!
//! - **Lex**: malformed input at the character level (unknown characters,
//!   read failures, invalid UTF-8).
//! - **Parse**: wrong token where a specific kind was required, a root node
//!   that is not a literal, trailing input, duplicate siblings, nesting depth.
//! - **Type**: an argument type that cannot be interpreted (unknown string
//!   kind, malformed numeric bound, unknown or failing extension type).
//!
//! All of them carry the 1-based line the problem was detected on and an
//! [`ErrorContext`] with the byte span, so they render with a code frame once
//! the source text has been attached with [`CommodoreError::with_source`].
//!
//! # Error Construction
//!
//! Use [`err_at!`](crate::err_at) inside the lexer, parser and resolvers:
//!
//! ```rust
//! use commodore::err_at;
//! use commodore::syntax::Span;
//!
//! let span = Span::new(4, 9, 2);
//! let error = err_at!(Parse, span, "expected node name, found {}", "'{'");
//! assert_eq!(error.line(), 2);
//! ```

use std::fmt;
use std::sync::Arc;

use miette::{Diagnostic, LabeledSpan, NamedSource, SourceCode};
use thiserror::Error;

use crate::syntax::Span;

// Type aliases for clarity and brevity
pub type SourceArc = Arc<NamedSource<String>>;
pub type BoxedCause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Type-safe error classification that corresponds to [`CommodoreError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    /// Character-level problems and read failures
    Lex,
    /// Grammar and tree-structure problems
    Parse,
    /// Argument type resolution problems
    Type,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::Lex => "Lex",
            ErrorType::Parse => "Parse",
            ErrorType::Type => "Type",
        }
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single additional label for multi-span diagnostics.
///
/// Related labels always point into the same source as the primary span.
#[derive(Debug, Clone, PartialEq)]
pub struct RelatedLabel {
    pub span: Span,
    pub label: String,
}

/// Minimal, composable error context for diagnostics.
#[derive(Debug, Default)]
pub struct ErrorContext {
    /// The source text the spans point into (attached at the public boundary).
    pub source: Option<SourceArc>,
    /// The primary span for this error (if any).
    pub span: Option<Span>,
    /// An optional help message.
    pub help: Option<String>,
    /// Additional labeled spans for multi-label diagnostics.
    pub related: Vec<RelatedLabel>,
}

impl ErrorContext {
    /// Returns an empty error context (no source, span, or help).
    pub fn none() -> Self {
        Self::default()
    }

    /// Creates a context with only a span.
    pub fn with_span(span: Span) -> Self {
        Self {
            span: Some(span),
            ..Self::default()
        }
    }
}

/// The single error type for lexing, parsing and argument type resolution.
#[derive(Debug, Error)]
pub enum CommodoreError {
    #[error("Lex error: {message} (at line {line})")]
    Lex {
        message: String,
        line: usize,
        ctx: ErrorContext,
        #[source]
        source: Option<BoxedCause>,
    },
    #[error("Parse error: {message} (at line {line})")]
    Parse {
        message: String,
        line: usize,
        ctx: ErrorContext,
        #[source]
        source: Option<BoxedCause>,
    },
    #[error("Type error: {message} (at line {line})")]
    Type {
        message: String,
        line: usize,
        ctx: ErrorContext,
        #[source]
        source: Option<BoxedCause>,
    },
}

impl CommodoreError {
    /// Wraps a failure of the underlying character source.
    pub fn read_failure(cause: std::io::Error, span: Span) -> Self {
        let message = match cause.kind() {
            std::io::ErrorKind::InvalidData => "source is not valid UTF-8".to_string(),
            _ => "failed to read source".to_string(),
        };
        CommodoreError::Lex {
            message,
            line: span.line,
            ctx: ErrorContext::with_span(span),
            source: Some(Box::new(cause)),
        }
    }

    /// Returns the type-safe error classification for this error.
    pub fn error_type(&self) -> ErrorType {
        match self {
            CommodoreError::Lex { .. } => ErrorType::Lex,
            CommodoreError::Parse { .. } => ErrorType::Parse,
            CommodoreError::Type { .. } => ErrorType::Type,
        }
    }

    /// The 1-based line at which the problem was detected.
    pub fn line(&self) -> usize {
        match self {
            CommodoreError::Lex { line, .. }
            | CommodoreError::Parse { line, .. }
            | CommodoreError::Type { line, .. } => *line,
        }
    }

    /// The human-readable description, without the kind prefix or line suffix.
    pub fn message(&self) -> &str {
        match self {
            CommodoreError::Lex { message, .. }
            | CommodoreError::Parse { message, .. }
            | CommodoreError::Type { message, .. } => message,
        }
    }

    pub fn ctx(&self) -> &ErrorContext {
        match self {
            CommodoreError::Lex { ctx, .. }
            | CommodoreError::Parse { ctx, .. }
            | CommodoreError::Type { ctx, .. } => ctx,
        }
    }

    fn ctx_mut(&mut self) -> &mut ErrorContext {
        match self {
            CommodoreError::Lex { ctx, .. }
            | CommodoreError::Parse { ctx, .. }
            | CommodoreError::Type { ctx, .. } => ctx,
        }
    }

    /// Attaches the source text so the diagnostic can render a code frame.
    ///
    /// An already attached source is kept.
    pub fn with_source(mut self, name: impl AsRef<str>, text: impl Into<String>) -> Self {
        let ctx = self.ctx_mut();
        if ctx.source.is_none() {
            ctx.source = Some(Arc::new(NamedSource::new(name.as_ref(), text.into())));
        }
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.ctx_mut().help = Some(help.into());
        self
    }

    pub fn with_related(mut self, span: Span, label: impl Into<String>) -> Self {
        self.ctx_mut().related.push(RelatedLabel {
            span,
            label: label.into(),
        });
        self
    }

    /// Records the underlying cause, replacing any previous one.
    pub fn with_cause(mut self, cause: impl Into<BoxedCause>) -> Self {
        match &mut self {
            CommodoreError::Lex { source, .. }
            | CommodoreError::Parse { source, .. }
            | CommodoreError::Type { source, .. } => *source = Some(cause.into()),
        }
        self
    }
}

impl Diagnostic for CommodoreError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match self {
            CommodoreError::Lex { .. } => "commodore::lex",
            CommodoreError::Parse { .. } => "commodore::parse",
            CommodoreError::Type { .. } => "commodore::type",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.ctx()
            .help
            .as_ref()
            .map(|h| Box::new(h) as Box<dyn fmt::Display + 'a>)
    }

    fn source_code(&self) -> Option<&dyn SourceCode> {
        self.ctx()
            .source
            .as_ref()
            .map(|s| s.as_ref() as &dyn SourceCode)
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        let ctx = self.ctx();
        // Spans are meaningless without the text they point into.
        let text = ctx.source.as_ref()?.inner();

        let mut labels = Vec::new();
        if let Some(span) = ctx.span {
            let (offset, len) = label_range(span, text);
            labels.push(LabeledSpan::new(Some(self.message().to_string()), offset, len));
        }
        for rel in &ctx.related {
            let (offset, len) = label_range(rel.span, text);
            labels.push(LabeledSpan::new(Some(rel.label.clone()), offset, len));
        }
        if labels.is_empty() {
            None
        } else {
            Some(Box::new(labels.into_iter()))
        }
    }
}

/// Byte range of a label for `span`, kept inside `text`.
///
/// An empty span covers the character it sits on. At the end of the text it
/// moves back onto the last visible character, since a label past the end is
/// not drawn.
fn label_range(span: Span, text: &str) -> (usize, usize) {
    let start = span.start.min(text.len());
    if !span.is_empty() {
        return (start, span.len().min(text.len() - start));
    }
    if let Some(next) = text.get(start..).and_then(|rest| rest.chars().next()) {
        return (start, next.len_utf8());
    }
    let visible = text.get(..start).unwrap_or_default().trim_end();
    match visible.chars().next_back() {
        Some(last) => (visible.len() - last.len_utf8(), last.len_utf8()),
        None => (start, 0),
    }
}

/// Constructs a [`CommodoreError`] variant at a source span with a formatted message.
///
/// The span's line becomes the error's line number.
#[macro_export]
macro_rules! err_at {
    ($variant:ident, $span:expr, $($arg:tt)+) => {{
        let span: $crate::syntax::Span = $span;
        $crate::CommodoreError::$variant {
            message: format!($($arg)+),
            line: span.line,
            ctx: $crate::ErrorContext::with_span(span),
            source: None,
        }
    }};
}

#[cfg(test)]
mod diagnostics_tests {
    use miette::Report;

    use super::*;

    #[test]
    fn test_display_includes_kind_and_line() {
        let err = err_at!(Parse, Span::new(0, 1, 7), "expected node name, found '{}'", ";");
        assert_eq!(
            err.to_string(),
            "Parse error: expected node name, found ';' (at line 7)"
        );
        assert_eq!(err.error_type(), ErrorType::Parse);
        assert_eq!(err.line(), 7);
    }

    #[test]
    fn test_multilabel_diagnostics() {
        let err = err_at!(Parse, Span::new(6, 6, 2), "expected '}}'")
            .with_related(Span::new(5, 6, 1), "scope opened here")
            .with_help("close every '{' with a matching '}'")
            .with_source("test.commodore", "root {\n");
        let output = format!("{:?}", Report::new(err));
        assert!(output.contains("scope opened here"));
        assert!(output.contains("close every"));
        assert!(output.contains("commodore::parse"));
    }

    #[test]
    fn test_end_of_input_label_is_drawn() {
        let text = "root {\n  child;\n";
        let err = err_at!(Parse, Span::new(text.len(), text.len(), 3), "unclosed")
            .with_related(Span::new(5, 6, 1), "scope opened here")
            .with_source("test.commodore", text);

        let labels: Vec<LabeledSpan> = err.labels().expect("labels").collect();
        assert_eq!(labels[0].label(), Some("unclosed"));
        // Moved back onto the `;` ending line 2.
        assert_eq!((labels[0].offset(), labels[0].len()), (text.len() - 2, 1));

        let output = format!("{:?}", Report::new(err));
        assert!(output.contains("scope opened here"));
        // Once in the header, once as the label.
        assert!(output.matches("unclosed").count() >= 2, "{}", output);
    }

    #[test]
    fn test_label_ranges() {
        assert_eq!(label_range(Span::new(1, 3, 1), "abcd"), (1, 2));
        assert_eq!(label_range(Span::new(2, 9, 1), "abcd"), (2, 2));
        assert_eq!(label_range(Span::new(1, 1, 1), "a\u{e9}b"), (1, 2));
        assert_eq!(label_range(Span::new(0, 0, 1), ""), (0, 0));
    }

    #[test]
    fn test_error_chaining() {
        let cause = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let err = CommodoreError::read_failure(cause, Span::new(0, 0, 3));
        assert_eq!(err.error_type(), ErrorType::Lex);
        let source = std::error::Error::source(&err).expect("cause is kept");
        assert!(source.to_string().contains("disk on fire"));
        let output = format!("{:?}", Report::new(err));
        assert!(output.contains("failed to read source"));
    }

    #[test]
    fn test_source_is_attached_once() {
        let err = err_at!(Type, Span::new(0, 3, 1), "unknown")
            .with_source("first", "abc")
            .with_source("second", "xyz");
        let source = err.ctx().source.as_ref().expect("source attached");
        assert_eq!(source.name(), "first");
    }
}
