//! Tally code generation: typed programs to MIR to instructions.
//!
//! Transforms the output of the type checker into backend instructions:
//!
//! 1. **Lowering** ([`mir::lower`]): reachable function stubs with their
//!    resolved types become [`mir::MirFunction`]s.
//! 2. **Call resolution** ([`mir::resolve`]): calls by name become direct
//!    references to functions or primitive externs.
//! 3. **Generation** ([`codegen`]): the entry function and its callees are
//!    emitted through an [`codegen::InstrBuilder`].

pub mod codegen;
pub mod error;
pub mod mir;

use tally_typeck::{Primitives, TypeVars, TypedProgram};

pub use codegen::{CodeGen, InstrBuilder, TextBuilder};
pub use error::{CodegenError, LowerError, ResolveError};
pub use mir::lower::{lower_program, LiteralTagging};
pub use mir::resolve::resolve_calls;
pub use mir::{MirModule, MirType};

/// Either stage that turns a typed program into a module can fail.
#[derive(Debug, Clone, PartialEq)]
pub enum MirError {
    Lower(LowerError),
    Resolve(ResolveError),
}

impl std::fmt::Display for MirError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MirError::Lower(e) => e.fmt(f),
            MirError::Resolve(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for MirError {}

impl From<LowerError> for MirError {
    fn from(e: LowerError) -> Self {
        MirError::Lower(e)
    }
}

impl From<ResolveError> for MirError {
    fn from(e: ResolveError) -> Self {
        MirError::Resolve(e)
    }
}

/// Lower a typed program and resolve its calls into a closed module.
pub fn lower_to_mir_module(
    program: &TypedProgram,
    vars: &TypeVars,
    primitives: &Primitives,
    tagging: LiteralTagging,
) -> Result<MirModule, MirError> {
    let functions = lower_program(program, vars, tagging)?;
    let entry = program.entry_function().name.as_str();
    Ok(resolve_calls(functions, primitives, entry)?)
}

/// Generate `module` into a fresh [`TextBuilder`] and return its listing.
pub fn emit_text(module: &MirModule) -> Result<String, CodegenError> {
    let mut builder = TextBuilder::new();
    CodeGen::generate(module, &mut builder)?;
    Ok(builder.listing())
}
