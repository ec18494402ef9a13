//! Typed AST layer on top of the rowan CST.
//!
//! Each wrapper is a newtype around `SyntaxNode` with accessors that walk the
//! children by kind. [`Form`] is the closed set of wrappers that can appear
//! where a form is expected.

use tally_common::span::Span;

use crate::cst::{SyntaxNode, SyntaxToken};
use crate::syntax_kind::SyntaxKind;

/// A typed view of a `SyntaxNode`.
pub trait AstNode: Sized {
    /// Returns `Some` if the node's kind matches this wrapper.
    fn cast(node: SyntaxNode) -> Option<Self>;

    fn syntax(&self) -> &SyntaxNode;

    /// Source span of the node.
    fn span(&self) -> Span {
        let range = self.syntax().text_range();
        Span::new(range.start().into(), range.end().into())
    }
}

macro_rules! ast_node {
    ($name:ident, $kind:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name {
            pub(crate) syntax: SyntaxNode,
        }

        impl AstNode for $name {
            fn cast(node: SyntaxNode) -> Option<Self> {
                if node.kind() == SyntaxKind::$kind {
                    Some(Self { syntax: node })
                } else {
                    None
                }
            }

            fn syntax(&self) -> &SyntaxNode {
                &self.syntax
            }
        }
    };
}

ast_node!(SourceFile, SOURCE_FILE);
ast_node!(Group, GROUP);
ast_node!(AddExpr, ADD_EXPR);
ast_node!(MulExpr, MUL_EXPR);
ast_node!(NegExpr, NEG_EXPR);
ast_node!(Literal, LITERAL);
ast_node!(Name, NAME);

/// Find the first child token of the given kind.
fn child_token(parent: &SyntaxNode, kind: SyntaxKind) -> Option<SyntaxToken> {
    parent
        .children_with_tokens()
        .filter_map(|it| it.into_token())
        .find(|tok| tok.kind() == kind)
}

fn child_forms(parent: &SyntaxNode) -> impl Iterator<Item = Form> + '_ {
    parent.children().filter_map(Form::cast)
}

impl SourceFile {
    /// Top-level forms in source order.
    pub fn forms(&self) -> impl Iterator<Item = Form> + '_ {
        child_forms(&self.syntax)
    }
}

impl Group {
    pub fn forms(&self) -> impl Iterator<Item = Form> + '_ {
        child_forms(&self.syntax)
    }

    /// The operator token (`+`, `*`, `-`) heading this group, if any.
    pub fn operator(&self) -> Option<SyntaxToken> {
        self.syntax
            .children_with_tokens()
            .filter_map(|it| it.into_token())
            .find(|tok| {
                matches!(
                    tok.kind(),
                    SyntaxKind::PLUS | SyntaxKind::STAR | SyntaxKind::MINUS
                )
            })
    }

    /// Span of the opening parenthesis.
    pub fn l_paren_span(&self) -> Option<Span> {
        child_token(&self.syntax, SyntaxKind::L_PAREN).map(|tok| {
            let range = tok.text_range();
            Span::new(range.start().into(), range.end().into())
        })
    }
}

impl AddExpr {
    pub fn lhs(&self) -> Option<Form> {
        child_forms(&self.syntax).next()
    }

    pub fn rhs(&self) -> Option<Form> {
        child_forms(&self.syntax).nth(1)
    }
}

impl MulExpr {
    pub fn lhs(&self) -> Option<Form> {
        child_forms(&self.syntax).next()
    }

    pub fn rhs(&self) -> Option<Form> {
        child_forms(&self.syntax).nth(1)
    }
}

impl NegExpr {
    pub fn operand(&self) -> Option<Form> {
        child_forms(&self.syntax).next()
    }
}

impl Literal {
    pub fn token(&self) -> Option<SyntaxToken> {
        child_token(&self.syntax, SyntaxKind::NUMBER)
    }

    /// The literal's source text, e.g. `"30.0"`.
    pub fn text(&self) -> String {
        self.token().map(|t| t.text().to_string()).unwrap_or_default()
    }
}

impl Name {
    pub fn text(&self) -> String {
        child_token(&self.syntax, SyntaxKind::IDENT)
            .map(|t| t.text().to_string())
            .unwrap_or_default()
    }
}

/// Any node that can stand where a form is expected.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Form {
    Group(Group),
    Add(AddExpr),
    Mul(MulExpr),
    Neg(NegExpr),
    Literal(Literal),
    Name(Name),
}

impl Form {
    pub fn cast(node: SyntaxNode) -> Option<Self> {
        let form = match node.kind() {
            SyntaxKind::GROUP => Form::Group(Group { syntax: node }),
            SyntaxKind::ADD_EXPR => Form::Add(AddExpr { syntax: node }),
            SyntaxKind::MUL_EXPR => Form::Mul(MulExpr { syntax: node }),
            SyntaxKind::NEG_EXPR => Form::Neg(NegExpr { syntax: node }),
            SyntaxKind::LITERAL => Form::Literal(Literal { syntax: node }),
            SyntaxKind::NAME => Form::Name(Name { syntax: node }),
            _ => return None,
        };
        Some(form)
    }

    pub fn syntax(&self) -> &SyntaxNode {
        match self {
            Form::Group(it) => it.syntax(),
            Form::Add(it) => it.syntax(),
            Form::Mul(it) => it.syntax(),
            Form::Neg(it) => it.syntax(),
            Form::Literal(it) => it.syntax(),
            Form::Name(it) => it.syntax(),
        }
    }

    pub fn span(&self) -> Span {
        let range = self.syntax().text_range();
        Span::new(range.start().into(), range.end().into())
    }

    /// The identifier text if this form is a bare name.
    pub fn as_name(&self) -> Option<String> {
        match self {
            Form::Name(name) => Some(name.text()),
            _ => None,
        }
    }
}
