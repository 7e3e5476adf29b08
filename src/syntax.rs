//! Syntax module for the commodore file format
//!
//! This module provides source location types shared by the reader, the lexer
//! and the parser, along with those three stages themselves.

use serde::{Deserialize, Serialize};

pub mod lexer;
pub mod parser;
pub mod reader;

/// Represents a span in the source code.
///
/// `start` and `end` are byte offsets into the decoded text; `line` is the
/// 1-based line on which the span starts.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
}

impl Span {
    pub fn new(start: usize, end: usize, line: usize) -> Self {
        Self { start, end, line }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Wrapper for carrying source span information with any value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spanned<T> {
    pub value: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(value: T, span: Span) -> Self {
        Self { value, span }
    }
}

/// Helper to check if a span is valid for a given source string.
pub fn assert_valid_span(span: Span, source: &str) {
    debug_assert!(
        span.start <= span.end && span.end <= source.len(),
        "Invalid span: {{start: {}, end: {}}} for source of length {}",
        span.start,
        span.end,
        source.len()
    );
}
