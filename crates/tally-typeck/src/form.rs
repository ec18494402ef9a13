//! The desugared tree.
//!
//! `Form` is what the later stages work on: declarations are explicit
//! `FnDecl` nodes, operators are binary, and redundant groupings are gone.
//! Every node owns its children.

use std::fmt;

use tally_common::span::Span;
use tally_common::{ensure_sufficient_stack, NumberForm};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinOp {
    Add,
    Mul,
}

impl BinOp {
    /// The global name the operator's signature is looked up under.
    pub fn operator_name(self) -> &'static str {
        match self {
            BinOp::Add => "Operator+",
            BinOp::Mul => "Operator*",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Mul => "*",
        }
    }
}

/// Name of the primitive implementing unary negation.
pub const NEGATE_OPERATOR: &str = "Operator-";

#[derive(Clone, Debug, PartialEq)]
pub struct NumLit {
    pub text: String,
    pub form: NumberForm,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Group {
    pub forms: Vec<Form>,
    pub span: Span,
}

impl Group {
    /// The callee name when the group is headed by an identifier.
    pub fn head_name(&self) -> Option<&Ident> {
        match self.forms.first() {
            Some(Form::Ident(ident)) => Some(ident),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FnDecl {
    pub name: String,
    pub params: Vec<Ident>,
    pub body: Box<Form>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Form {
    Number(NumLit),
    Ident(Ident),
    Binary {
        op: BinOp,
        lhs: Box<Form>,
        rhs: Box<Form>,
        span: Span,
    },
    Neg {
        operand: Box<Form>,
        span: Span,
    },
    Group(Group),
    FnDecl(FnDecl),
    Module(Vec<Form>),
}

impl Form {
    pub fn span(&self) -> Span {
        match self {
            Form::Number(lit) => lit.span,
            Form::Ident(ident) => ident.span,
            Form::Binary { span, .. } | Form::Neg { span, .. } => *span,
            Form::Group(group) => group.span,
            Form::FnDecl(decl) => decl.span,
            Form::Module(forms) => match (forms.first(), forms.last()) {
                (Some(first), Some(last)) => first.span().merge(last.span()),
                _ => Span::default(),
            },
        }
    }
}

/// S-expression rendering; declarations print as `defun`.
impl fmt::Display for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        ensure_sufficient_stack(|| self.write_sexpr(f))
    }
}

impl Form {
    fn write_sexpr(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Form::Number(lit) => f.write_str(&lit.text),
            Form::Ident(ident) => f.write_str(&ident.name),
            Form::Binary { op, lhs, rhs, .. } => write!(f, "({} {lhs} {rhs})", op.symbol()),
            Form::Neg { operand, .. } => write!(f, "(- {operand})"),
            Form::Group(group) => {
                write!(f, "(")?;
                for (i, form) in group.forms.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{form}")?;
                }
                write!(f, ")")
            }
            Form::FnDecl(decl) => {
                let params: Vec<&str> = decl.params.iter().map(|p| p.name.as_str()).collect();
                write!(f, "(defun {} ({}) {})", decl.name, params.join(" "), decl.body)
            }
            Form::Module(forms) => {
                for (i, form) in forms.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{form}")?;
                }
                Ok(())
            }
        }
    }
}
