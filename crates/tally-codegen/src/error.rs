//! Errors from lowering, call resolution and code generation.

use std::fmt;

use tally_common::span::Span;

#[derive(Debug, Clone, PartialEq)]
pub enum LowerError {
    /// No type was inferred for a parameter or function.
    MissingType { name: String, span: Span },
    /// A parameter or return type resolved to something other than a single
    /// base type, e.g. a signature tuple.
    NonScalar { name: String, ty: String, span: Span },
    /// A form with no MIR counterpart.
    UnsupportedShape {
        function: String,
        form: String,
        span: Span,
    },
}

impl LowerError {
    pub fn span(&self) -> Span {
        match self {
            LowerError::MissingType { span, .. }
            | LowerError::NonScalar { span, .. }
            | LowerError::UnsupportedShape { span, .. } => *span,
        }
    }
}

impl fmt::Display for LowerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LowerError::MissingType { name, .. } => {
                write!(f, "no type was inferred for `{name}`")
            }
            LowerError::NonScalar { name, ty, .. } => {
                write!(f, "`{name}` has type `{ty}`, expected int, float or void")
            }
            LowerError::UnsupportedShape { function, form, .. } => {
                write!(f, "cannot lower `{form}` in `{function}`")
            }
        }
    }
}

impl std::error::Error for LowerError {}

#[derive(Debug, Clone, PartialEq)]
pub enum ResolveError {
    UnknownFunction { name: String, caller: String },
    ArityMismatch {
        callee: String,
        expected: usize,
        found: usize,
        caller: String,
    },
    MissingEntry { name: String },
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::UnknownFunction { name, caller } => {
                write!(f, "call to unknown function `{name}` in `{caller}`")
            }
            ResolveError::ArityMismatch {
                callee,
                expected,
                found,
                caller,
            } => write!(
                f,
                "`{callee}` takes {expected} arguments but {found} were given in `{caller}`"
            ),
            ResolveError::MissingEntry { name } => {
                write!(f, "entry function `{name}` was not lowered")
            }
        }
    }
}

impl std::error::Error for ResolveError {}

#[derive(Debug, Clone, PartialEq)]
pub enum CodegenError {
    UnboundVariable { name: String, function: String },
    /// A `void` result used where a value is needed.
    VoidOperand { function: String },
    /// A function reached again while its own body is being generated.
    RecursiveCall { function: String },
    /// A call whose callee was never linked by resolution.
    UnresolvedCallee { name: String, function: String },
}

impl fmt::Display for CodegenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodegenError::UnboundVariable { name, function } => write!(
                f,
                "`{name}` doesn't exist in the variable namespace of `{function}`"
            ),
            CodegenError::VoidOperand { function } => {
                write!(f, "a `void` result is used as a value in `{function}`")
            }
            CodegenError::RecursiveCall { function } => {
                write!(f, "recursive call to `{function}` is not supported")
            }
            CodegenError::UnresolvedCallee { name, function } => {
                write!(f, "call to `{name}` in `{function}` was never resolved")
            }
        }
    }
}

impl std::error::Error for CodegenError {}
