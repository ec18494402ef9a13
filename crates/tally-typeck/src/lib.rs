//! Tally front-end analysis: desugaring, function extraction and type
//! inference.
//!
//! # Architecture
//!
//! - [`desugar`]: CST to [`form::Form`], normalizing `defun` / `lambda`
//! - [`extract`]: pulls declarations out into [`extract::FunctionStub`]s
//! - [`ty`]: types, type variables and the per-compilation [`ty::TypeVars`]
//! - [`unify`]: union-find substitutions, merging and simplification
//! - [`infer`]: per-function constraint generation
//! - [`primitives`]: the table of callable primitives and their signatures
//! - [`solve`]: whole-program merge and entry specialization
//! - [`error`]: error types with provenance

pub mod desugar;
pub mod error;
pub mod extract;
pub mod form;
pub mod infer;
pub mod primitives;
pub mod solve;
pub mod ty;
pub mod unify;

pub use desugar::Desugarer;
pub use error::{ConstraintOrigin, DesugarError, ExtractError, TypeError};
pub use extract::{extract_functions, Extracted, FunctionStub};
pub use primitives::{Intrinsic, Primitive, Primitives};
pub use solve::{check_program, specialize, TypeChecker, TypedProgram};
pub use ty::{BaseTy, Ty, TyVar, TypeVars, VarName};
pub use unify::{Solution, Substitution};
