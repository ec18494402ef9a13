//! Grammar for Tally forms.
//!
//! ```text
//! source   = form*
//! form     = group | operator | NUMBER | IDENT
//! group    = '(' form* ')'
//! operator = ('+' | '*' | '-') form+
//! ```
//!
//! An operator token is consumed into whatever node is currently open
//! (normally the surrounding group) and its operands are folded into binary
//! `ADD_EXPR` / `MUL_EXPR` nodes. `-` folds with `ADD_EXPR` and wraps every
//! operand after the first in `NEG_EXPR`. A lone operand is left unwrapped,
//! so `(- 5)` parses to the literal `5`.

use tally_common::ensure_sufficient_stack;

use super::{MarkClosed, Parser};
use crate::error::ParseErrorKind;
use crate::syntax_kind::SyntaxKind;

pub(crate) fn source_file(p: &mut Parser) {
    let root = p.open();
    while !p.has_error() && !p.at(SyntaxKind::EOF) {
        if p.at(SyntaxKind::R_PAREN) {
            p.error(ParseErrorKind::UnexpectedCloseParen);
            break;
        }
        form(p);
    }
    p.close(root, SyntaxKind::SOURCE_FILE);
}

/// Parse one form. Returns `None` when nothing was produced, in which case
/// an error has been recorded.
fn form(p: &mut Parser) -> Option<MarkClosed> {
    ensure_sufficient_stack(|| form_inner(p))
}

fn form_inner(p: &mut Parser) -> Option<MarkClosed> {
    match p.current() {
        SyntaxKind::L_PAREN => Some(group(p)),
        SyntaxKind::PLUS => operator(p, SyntaxKind::ADD_EXPR, false),
        SyntaxKind::STAR => operator(p, SyntaxKind::MUL_EXPR, false),
        SyntaxKind::MINUS => operator(p, SyntaxKind::ADD_EXPR, true),
        SyntaxKind::NUMBER => Some(leaf(p, SyntaxKind::LITERAL)),
        SyntaxKind::IDENT => Some(leaf(p, SyntaxKind::NAME)),
        SyntaxKind::R_PAREN => {
            p.error(ParseErrorKind::UnexpectedCloseParen);
            None
        }
        _ => {
            p.error(ParseErrorKind::UnclosedGroup);
            None
        }
    }
}

fn leaf(p: &mut Parser, kind: SyntaxKind) -> MarkClosed {
    let m = p.open();
    p.advance();
    p.close(m, kind)
}

fn group(p: &mut Parser) -> MarkClosed {
    let opened_at = p.current_span();
    let m = p.open();
    p.advance(); // (

    loop {
        if p.at(SyntaxKind::R_PAREN) {
            p.advance();
            break;
        }
        if p.at(SyntaxKind::EOF) {
            p.error_with_related(ParseErrorKind::UnclosedGroup, opened_at, "group opened here");
            break;
        }
        form(p);
        if p.has_error() {
            break;
        }
    }

    p.close(m, SyntaxKind::GROUP)
}

fn operator(p: &mut Parser, kind: SyntaxKind, negate_rest: bool) -> Option<MarkClosed> {
    let op_span = p.current_span();
    p.advance();

    if p.at(SyntaxKind::R_PAREN) {
        p.error_with_related(ParseErrorKind::MissingOperand, op_span, "operator here");
        return None;
    }
    if p.at(SyntaxKind::EOF) {
        p.error_with_related(
            ParseErrorKind::UnterminatedOperator,
            op_span,
            "operator form starts here",
        );
        return None;
    }

    let mut acc = form(p)?;
    while !p.has_error() && !p.at(SyntaxKind::R_PAREN) {
        if p.at(SyntaxKind::EOF) {
            p.error_with_related(
                ParseErrorKind::UnterminatedOperator,
                op_span,
                "operator form starts here",
            );
            break;
        }
        let wrap = p.open_before(acc);
        if negate_rest {
            let neg = p.open();
            form(p);
            p.close(neg, SyntaxKind::NEG_EXPR);
        } else {
            form(p);
        }
        acc = p.close(wrap, kind);
    }
    Some(acc)
}
