//! Error types for desugaring, extraction and type inference.
//!
//! Type errors carry a `ConstraintOrigin` recording where the failing
//! equality was generated, so diagnostics can point at the call or operator
//! that introduced it.

use std::fmt;

use tally_common::span::Span;

use crate::ty::{BaseTy, Ty, TyVar};

/// Where a type constraint came from.
#[derive(Clone, Debug, PartialEq)]
pub enum ConstraintOrigin {
    /// `(callee args...)` must match the callee's signature.
    Call { callee: String, span: Span },
    /// A folded `+` or `*` node.
    BinOp { op: &'static str, span: Span },
    /// Operand of a negation must be an integer.
    Negate { span: Span },
    /// A function's declared shape `(params..., body)`.
    Signature { function: String, span: Span },
    /// A row of the primitive table.
    Primitive { name: String },
    /// The concrete invocation an entry function is specialized against.
    Invocation { entry: String, span: Span },
    /// Combining one function's substitution into another's.
    Merge { function: String, span: Span },
}

impl ConstraintOrigin {
    pub fn span(&self) -> Option<Span> {
        match self {
            ConstraintOrigin::Call { span, .. }
            | ConstraintOrigin::BinOp { span, .. }
            | ConstraintOrigin::Negate { span }
            | ConstraintOrigin::Signature { span, .. }
            | ConstraintOrigin::Invocation { span, .. }
            | ConstraintOrigin::Merge { span, .. } => Some(*span),
            ConstraintOrigin::Primitive { .. } => None,
        }
    }

    /// Short description used as a diagnostic label.
    pub fn describe(&self) -> String {
        match self {
            ConstraintOrigin::Call { callee, .. } => format!("in this call to `{callee}`"),
            ConstraintOrigin::BinOp { op, .. } => format!("in this `{op}` expression"),
            ConstraintOrigin::Negate { .. } => "negation requires an `int` operand".to_string(),
            ConstraintOrigin::Signature { function, .. } => {
                format!("from the definition of `{function}`")
            }
            ConstraintOrigin::Primitive { name } => format!("from the primitive `{name}`"),
            ConstraintOrigin::Invocation { entry, .. } => {
                format!("when specializing `{entry}`")
            }
            ConstraintOrigin::Merge { function, .. } => {
                format!("while combining the types of `{function}`")
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum TypeError {
    /// Two different base types were required to be equal.
    BaseConflict {
        expected: BaseTy,
        found: BaseTy,
        origin: ConstraintOrigin,
    },
    /// A base type met a tuple.
    ShapeMismatch {
        expected: Ty,
        found: Ty,
        origin: ConstraintOrigin,
    },
    /// Two tuples of different length.
    ArityMismatch {
        expected: usize,
        found: usize,
        origin: ConstraintOrigin,
    },
    /// A variable would have to contain itself.
    InfiniteType {
        var: TyVar,
        ty: Ty,
        origin: ConstraintOrigin,
    },
    /// A type that must be concrete still contains variables.
    Unresolved {
        name: String,
        ty: String,
        span: Option<Span>,
    },
    /// The requested entry function is not defined.
    UnknownEntry { name: String },
    /// The entry's type did not resolve to a signature tuple.
    NotAFunction { name: String, ty: String },
}

impl TypeError {
    pub fn span(&self) -> Option<Span> {
        match self {
            TypeError::BaseConflict { origin, .. }
            | TypeError::ShapeMismatch { origin, .. }
            | TypeError::ArityMismatch { origin, .. }
            | TypeError::InfiniteType { origin, .. } => origin.span(),
            TypeError::Unresolved { span, .. } => *span,
            TypeError::UnknownEntry { .. } | TypeError::NotAFunction { .. } => None,
        }
    }

    pub fn origin(&self) -> Option<&ConstraintOrigin> {
        match self {
            TypeError::BaseConflict { origin, .. }
            | TypeError::ShapeMismatch { origin, .. }
            | TypeError::ArityMismatch { origin, .. }
            | TypeError::InfiniteType { origin, .. } => Some(origin),
            _ => None,
        }
    }
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeError::BaseConflict {
                expected, found, ..
            } => {
                write!(
                    f,
                    "primitive types don't match: expected `{expected}`, found `{found}`"
                )
            }
            TypeError::ShapeMismatch {
                expected, found, ..
            } => {
                write!(f, "type shape mismatch: expected `{expected}`, found `{found}`")
            }
            TypeError::ArityMismatch {
                expected, found, ..
            } => {
                write!(
                    f,
                    "arity mismatch: expected {expected} slots, found {found}"
                )
            }
            TypeError::InfiniteType { var, ty, .. } => {
                write!(f, "infinite type: `?{}` occurs in `{}`", var.0, ty)
            }
            TypeError::Unresolved { name, ty, .. } => {
                write!(f, "type must be fully resolved: `{name}` is `{ty}`")
            }
            TypeError::UnknownEntry { name } => {
                write!(f, "entry function `{name}` is not defined")
            }
            TypeError::NotAFunction { name, ty } => {
                write!(f, "`{name}` has type `{ty}`, which is not a function signature")
            }
        }
    }
}

impl std::error::Error for TypeError {}

/// A `lambda` or `defun` form that does not have the expected shape.
#[derive(Clone, Debug, PartialEq)]
pub enum DesugarError {
    /// `(defun name (params) body)` / `(lambda (params) body)` shape violated.
    MalformedDeclaration { keyword: &'static str, span: Span },
    /// A parameter list entry that is not a bare identifier.
    InvalidParameter { keyword: &'static str, span: Span },
    /// A syntax node missing a child it always has after a clean parse.
    IncompleteNode { span: Span },
}

impl DesugarError {
    pub fn span(&self) -> Span {
        match self {
            DesugarError::MalformedDeclaration { span, .. }
            | DesugarError::InvalidParameter { span, .. }
            | DesugarError::IncompleteNode { span } => *span,
        }
    }
}

impl fmt::Display for DesugarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DesugarError::MalformedDeclaration { keyword: "defun", .. } => {
                write!(f, "malformed `defun`: expected `(defun name (params...) body)`")
            }
            DesugarError::MalformedDeclaration { keyword, .. } => {
                write!(f, "malformed `{keyword}`: expected `({keyword} (params...) body)`")
            }
            DesugarError::InvalidParameter { keyword, .. } => {
                write!(f, "`{keyword}` parameters must be identifiers")
            }
            DesugarError::IncompleteNode { .. } => write!(f, "incomplete syntax node"),
        }
    }
}

impl std::error::Error for DesugarError {}

#[derive(Clone, Debug, PartialEq)]
pub enum ExtractError {
    DuplicateParameter {
        function: String,
        name: String,
        span: Span,
    },
    DuplicateFunction {
        name: String,
        span: Span,
        first: Span,
    },
}

impl ExtractError {
    pub fn span(&self) -> Span {
        match self {
            ExtractError::DuplicateParameter { span, .. }
            | ExtractError::DuplicateFunction { span, .. } => *span,
        }
    }
}

impl fmt::Display for ExtractError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractError::DuplicateParameter { function, name, .. } => {
                write!(f, "parameter `{name}` appears twice in `{function}`")
            }
            ExtractError::DuplicateFunction { name, .. } => {
                write!(f, "function `{name}` is defined more than once")
            }
        }
    }
}

impl std::error::Error for ExtractError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_conflict_message() {
        let err = TypeError::BaseConflict {
            expected: BaseTy::Int,
            found: BaseTy::Float,
            origin: ConstraintOrigin::Negate {
                span: Span::new(3, 8),
            },
        };
        assert_eq!(
            err.to_string(),
            "primitive types don't match: expected `int`, found `float`"
        );
        assert_eq!(err.span(), Some(Span::new(3, 8)));
    }

    #[test]
    fn primitive_origin_has_no_span() {
        let err = TypeError::ArityMismatch {
            expected: 2,
            found: 3,
            origin: ConstraintOrigin::Primitive {
                name: "sqrt".into(),
            },
        };
        assert_eq!(err.span(), None);
        assert_eq!(err.to_string(), "arity mismatch: expected 2 slots, found 3");
    }

    #[test]
    fn defun_and_lambda_messages_differ() {
        let defun = DesugarError::MalformedDeclaration {
            keyword: "defun",
            span: Span::default(),
        };
        let lambda = DesugarError::MalformedDeclaration {
            keyword: "lambda",
            span: Span::default(),
        };
        assert!(defun.to_string().contains("defun name"));
        assert!(lambda.to_string().contains("(lambda (params...) body)"));
    }
}
