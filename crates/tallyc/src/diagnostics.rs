//! Ariadne-based rendering of compile errors.
//!
//! Every error gets a code (`T0001`…), its message, and labels pointing at
//! the source spans it carries. Output is colorless so it can be compared
//! in tests. `to_json` gives the same information as one JSON object.

use std::ops::Range;

use ariadne::{Config, Label, Report, ReportKind, Source};
use tally_codegen::{CodegenError, LowerError, ResolveError};
use tally_common::span::Span;
use tally_parser::ParseErrorKind;
use tally_typeck::{DesugarError, ExtractError, TypeError};

use crate::session::CompileError;

// ── Error Codes ──────────────────────────────────────────────────────

pub fn error_code(err: &CompileError) -> &'static str {
    match err {
        CompileError::Parse(e) => match e.kind {
            ParseErrorKind::UnclosedGroup => "T0001",
            ParseErrorKind::UnterminatedOperator => "T0002",
            ParseErrorKind::MissingOperand => "T0003",
            ParseErrorKind::UnexpectedCloseParen => "T0004",
        },
        CompileError::Desugar(e) => match e {
            DesugarError::MalformedDeclaration { .. } => "T0005",
            DesugarError::InvalidParameter { .. } => "T0006",
            DesugarError::IncompleteNode { .. } => "T0007",
        },
        CompileError::Extract(e) => match e {
            ExtractError::DuplicateParameter { .. } => "T0008",
            ExtractError::DuplicateFunction { .. } => "T0009",
        },
        CompileError::Type(e) => match e {
            TypeError::BaseConflict { .. } => "T0010",
            TypeError::ShapeMismatch { .. } => "T0011",
            TypeError::ArityMismatch { .. } => "T0012",
            TypeError::InfiniteType { .. } => "T0013",
            TypeError::Unresolved { .. } => "T0014",
            TypeError::UnknownEntry { .. } => "T0015",
            TypeError::NotAFunction { .. } => "T0016",
        },
        CompileError::Lower(e) => match e {
            LowerError::MissingType { .. } => "T0017",
            LowerError::NonScalar { .. } => "T0018",
            LowerError::UnsupportedShape { .. } => "T0019",
        },
        CompileError::Resolve(e) => match e {
            ResolveError::UnknownFunction { .. } => "T0020",
            ResolveError::ArityMismatch { .. } => "T0021",
            ResolveError::MissingEntry { .. } => "T0022",
        },
        CompileError::Codegen(e) => match e {
            CodegenError::UnboundVariable { .. } => "T0023",
            CodegenError::VoidOperand { .. } => "T0024",
            CodegenError::RecursiveCall { .. } => "T0025",
            CodegenError::UnresolvedCallee { .. } => "T0026",
        },
    }
}

// ── Labels ───────────────────────────────────────────────────────────

/// The labelled spans of an error, primary first.
fn labels(err: &CompileError) -> Vec<(Span, String)> {
    let mut labels = Vec::new();
    match err {
        CompileError::Parse(e) => {
            labels.push((e.span, e.message().to_string()));
            if let Some((message, span)) = &e.related {
                labels.push((*span, message.clone()));
            }
        }
        CompileError::Extract(ExtractError::DuplicateFunction { span, first, .. }) => {
            labels.push((*span, "defined again here".to_string()));
            labels.push((*first, "first defined here".to_string()));
        }
        CompileError::Type(e) => {
            if let (Some(span), Some(origin)) = (e.span(), e.origin()) {
                labels.push((span, origin.describe()));
            } else if let Some(span) = e.span() {
                labels.push((span, err.to_string()));
            }
        }
        _ => {
            if let Some(span) = err.span() {
                labels.push((span, err.to_string()));
            }
        }
    }
    labels
}

fn help(err: &CompileError) -> Option<&'static str> {
    match err {
        CompileError::Type(TypeError::Unresolved { .. }) => {
            Some("every reachable parameter and return type must be int, float or void")
        }
        CompileError::Codegen(CodegenError::RecursiveCall { .. }) => {
            Some("functions cannot call themselves, directly or indirectly")
        }
        CompileError::Resolve(ResolveError::UnknownFunction { .. }) => {
            Some("define it with `defun` or add it to the primitive table")
        }
        _ => None,
    }
}

// ── Rendering ────────────────────────────────────────────────────────

/// Render `err` against `source` as a colorless report.
pub fn render_diagnostic(err: &CompileError, source: &str) -> String {
    let config = Config::default().with_color(false);
    let source_len = source.len();

    // Ariadne needs a non-empty span within the source.
    let clamp = |span: Span| -> Range<usize> {
        let range = span.to_range();
        let s = range.start.min(source_len);
        let e = range.end.min(source_len).max(s);
        if s == e {
            s..e.saturating_add(1).min(source_len)
        } else {
            s..e
        }
    };

    let code = error_code(err);
    let labels = labels(err);
    let primary = labels
        .first()
        .map(|(span, _)| clamp(*span))
        .unwrap_or(0..0);

    let mut builder = Report::build(ReportKind::Error, primary)
        .with_code(code)
        .with_message(err.to_string())
        .with_config(config);
    for (span, message) in labels {
        builder.add_label(Label::new(clamp(span)).with_message(message));
    }
    if let Some(help) = help(err) {
        builder.set_help(help);
    }

    let mut buf = Vec::new();
    match builder.finish().write(Source::from(source), &mut buf) {
        Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
        Err(_) => format!("[{code}] Error: {err}\n"),
    }
}

/// One JSON object per error, for machine consumption.
pub fn to_json(err: &CompileError, file: &str) -> serde_json::Value {
    let spans: Vec<serde_json::Value> = labels(err)
        .into_iter()
        .map(|(span, label)| {
            serde_json::json!({
                "start": span.start,
                "end": span.end,
                "label": label,
            })
        })
        .collect();
    serde_json::json!({
        "code": error_code(err),
        "severity": "error",
        "message": err.to_string(),
        "file": file,
        "spans": spans,
    })
}
