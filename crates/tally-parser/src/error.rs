//! Parse error types for the Tally parser.

use std::fmt;

use tally_common::span::Span;

/// What went wrong while parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Input ended before the `)` closing a group.
    UnclosedGroup,
    /// Input ended inside an operator form before its closing `)`.
    UnterminatedOperator,
    /// An operator head (`+`, `-`, `*`) with no operands.
    MissingOperand,
    /// A `)` with no group open.
    UnexpectedCloseParen,
}

/// A parse error with its location and an optional related span, e.g. the
/// opening paren of a group that never closed.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
    pub related: Option<(String, Span)>,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, span: Span) -> Self {
        Self {
            kind,
            span,
            related: None,
        }
    }

    pub fn with_related(
        kind: ParseErrorKind,
        span: Span,
        related_message: impl Into<String>,
        related_span: Span,
    ) -> Self {
        Self {
            kind,
            span,
            related: Some((related_message.into(), related_span)),
        }
    }

    pub fn message(&self) -> &'static str {
        match self.kind {
            ParseErrorKind::UnclosedGroup => "unexpected end of input: expected `)`",
            ParseErrorKind::UnterminatedOperator => {
                "unexpected end of input: operator form is missing its `)`"
            }
            ParseErrorKind::MissingOperand => "operator needs at least one operand",
            ParseErrorKind::UnexpectedCloseParen => "unexpected `)`",
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ParseError {}
