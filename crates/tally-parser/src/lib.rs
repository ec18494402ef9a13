//! Tally parser: turns the token stream into a rowan CST.
//!
//! Operator forms are folded into binary nodes while parsing, so the tree
//! the desugarer sees already has `ADD_EXPR`, `MUL_EXPR` and `NEG_EXPR`
//! nodes instead of flat operator lists.

pub mod ast;
pub mod cst;
pub mod error;
mod parser;
pub mod syntax_kind;

use std::fmt::Write;

use tally_lexer::Lexer;

pub use ast::{AstNode, Form, SourceFile};
pub use cst::{SyntaxElement, SyntaxNode, SyntaxToken};
pub use error::{ParseError, ParseErrorKind};
pub use syntax_kind::SyntaxKind;

/// Result of parsing a Tally source file.
///
/// With the first-error-only strategy `errors` holds at most one error.
/// The tree is still built on error and contains everything parsed up to
/// the failure point.
pub struct Parse {
    green: rowan::GreenNode,
    errors: Vec<ParseError>,
}

impl Parse {
    pub fn syntax(&self) -> SyntaxNode {
        SyntaxNode::new_root(self.green.clone())
    }

    pub fn tree(&self) -> SourceFile {
        SourceFile {
            syntax: self.syntax(),
        }
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// The first error, if parsing failed.
    pub fn into_result(self) -> Result<SourceFile, ParseError> {
        match self.errors.into_iter().next() {
            Some(err) => Err(err),
            None => Ok(SourceFile {
                syntax: SyntaxNode::new_root(self.green),
            }),
        }
    }
}

/// Parse a Tally source file into a CST.
#[tracing::instrument(level = "debug", skip_all, fields(len = source.len()))]
pub fn parse(source: &str) -> Parse {
    let tokens = Lexer::tokenize(source);
    let mut p = parser::Parser::new(tokens, source);
    parser::forms::source_file(&mut p);
    let (green, errors) = p.build_tree();
    if let Some(err) = errors.first() {
        tracing::debug!(error = %err, span = ?err.span, "parse failed");
    }
    Parse { green, errors }
}

/// Render a syntax tree as an indented outline, one element per line.
/// Whitespace tokens are omitted.
pub fn debug_tree(node: &SyntaxNode) -> String {
    let mut out = String::new();
    let mut depth = 0usize;
    for event in node.preorder_with_tokens() {
        match event {
            rowan::WalkEvent::Enter(element) => {
                match &element {
                    rowan::NodeOrToken::Node(n) => {
                        let _ = writeln!(
                            out,
                            "{:indent$}{:?}@{:?}",
                            "",
                            n.kind(),
                            n.text_range(),
                            indent = depth * 2
                        );
                    }
                    rowan::NodeOrToken::Token(t) if t.kind() != SyntaxKind::WHITESPACE => {
                        let _ = writeln!(
                            out,
                            "{:indent$}{:?}@{:?} {:?}",
                            "",
                            t.kind(),
                            t.text_range(),
                            t.text(),
                            indent = depth * 2
                        );
                    }
                    rowan::NodeOrToken::Token(_) => {}
                }
                depth += 1;
            }
            rowan::WalkEvent::Leave(_) => depth -= 1,
        }
    }
    out.truncate(out.trim_end().len());
    out
}
