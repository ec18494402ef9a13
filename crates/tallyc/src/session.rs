//! One compilation from source text to an SSA listing.

use std::fmt;

use tally_codegen::{
    emit_text, lower_to_mir_module, CodegenError, LiteralTagging, LowerError, MirError, MirModule,
    ResolveError,
};
use tally_common::span::Span;
use tally_parser::ParseError;
use tally_typeck::{
    check_program, extract_functions, DesugarError, Desugarer, ExtractError, Primitives, Ty,
    TypeError, TypeVars, TypedProgram,
};

use crate::config::{parse_signature, ConfigError};

// ── Options ──────────────────────────────────────────────────────────

/// What to compile and how.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Name of the function to specialize and generate.
    pub entry: String,
    /// Signature tuple the entry is called with, `(params..., ret)`.
    pub invocation: Ty,
    pub primitives: Primitives,
    pub literal_tagging: LiteralTagging,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            entry: "main".to_string(),
            invocation: Ty::Tuple(vec![Ty::void()]),
            primitives: Primitives::standard(),
            literal_tagging: LiteralTagging::Lexical,
        }
    }
}

impl CompileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(mut self, entry: impl Into<String>) -> Self {
        self.entry = entry.into();
        self
    }

    pub fn invocation(mut self, invocation: Ty) -> Self {
        self.invocation = invocation;
        self
    }

    /// Set the invocation from text such as `(float, float) -> float`.
    pub fn invoke(self, signature: &str) -> Result<Self, ConfigError> {
        Ok(self.invocation(parse_signature(signature)?))
    }

    pub fn primitives(mut self, primitives: Primitives) -> Self {
        self.primitives = primitives;
        self
    }

    pub fn literal_tagging(mut self, tagging: LiteralTagging) -> Self {
        self.literal_tagging = tagging;
        self
    }
}

// ── Errors ───────────────────────────────────────────────────────────

/// The first error any stage reported.
#[derive(Debug, Clone, PartialEq)]
pub enum CompileError {
    Parse(ParseError),
    Desugar(DesugarError),
    Extract(ExtractError),
    Type(TypeError),
    Lower(LowerError),
    Resolve(ResolveError),
    Codegen(CodegenError),
}

impl CompileError {
    /// The primary source location, when the error has one.
    pub fn span(&self) -> Option<Span> {
        match self {
            CompileError::Parse(e) => Some(e.span),
            CompileError::Desugar(e) => Some(e.span()),
            CompileError::Extract(e) => Some(e.span()),
            CompileError::Type(e) => e.span(),
            CompileError::Lower(e) => Some(e.span()),
            CompileError::Resolve(_) | CompileError::Codegen(_) => None,
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::Parse(e) => e.fmt(f),
            CompileError::Desugar(e) => e.fmt(f),
            CompileError::Extract(e) => e.fmt(f),
            CompileError::Type(e) => e.fmt(f),
            CompileError::Lower(e) => e.fmt(f),
            CompileError::Resolve(e) => e.fmt(f),
            CompileError::Codegen(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for CompileError {}

macro_rules! from_stage_error {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for CompileError {
                fn from(e: $ty) -> Self {
                    CompileError::$variant(e)
                }
            }
        )*
    };
}

from_stage_error! {
    Parse(ParseError),
    Desugar(DesugarError),
    Extract(ExtractError),
    Type(TypeError),
    Lower(LowerError),
    Resolve(ResolveError),
    Codegen(CodegenError),
}

impl From<MirError> for CompileError {
    fn from(e: MirError) -> Self {
        match e {
            MirError::Lower(e) => CompileError::Lower(e),
            MirError::Resolve(e) => CompileError::Resolve(e),
        }
    }
}

// ── Session ──────────────────────────────────────────────────────────

/// State owned by a single compilation: the lambda counter lives in the
/// desugarer and the type variable interner in `vars`.
pub struct Session<'o> {
    options: &'o CompileOptions,
    desugarer: Desugarer,
    vars: TypeVars,
}

/// A type-checked program with the variables its types refer to.
pub struct Checked {
    pub program: TypedProgram,
    pub vars: TypeVars,
}

impl Checked {
    /// `name: (params) -> ret` for every reachable function, entry first.
    pub fn signatures(&self) -> Vec<String> {
        self.program
            .reachable_functions()
            .map(|f| self.program.describe(f, &self.vars))
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct Compilation {
    pub module: MirModule,
    pub listing: String,
}

impl<'o> Session<'o> {
    pub fn new(options: &'o CompileOptions) -> Self {
        Session {
            options,
            desugarer: Desugarer::new(),
            vars: TypeVars::new(),
        }
    }

    /// Parse, desugar, extract and type check `source`.
    #[tracing::instrument(level = "debug", skip_all, fields(entry = %self.options.entry, len = source.len()))]
    pub fn check(mut self, source: &str) -> Result<Checked, CompileError> {
        let file = tally_parser::parse(source).into_result()?;
        let module = self.desugarer.desugar(&file)?;
        let extracted = extract_functions(module)?;
        let program = check_program(
            extracted,
            &self.options.entry,
            &self.options.invocation,
            &self.options.primitives,
            &mut self.vars,
        )?;
        Ok(Checked {
            program,
            vars: self.vars,
        })
    }

    /// Run the whole pipeline and render the entry's SSA listing.
    pub fn compile(self, source: &str) -> Result<Compilation, CompileError> {
        let options = self.options;
        let checked = self.check(source)?;
        let module = lower_to_mir_module(
            &checked.program,
            &checked.vars,
            &options.primitives,
            options.literal_tagging,
        )?;
        let listing = emit_text(&module)?;
        tracing::debug!(functions = module.functions.len(), "compiled");
        Ok(Compilation { module, listing })
    }
}

/// Type check `source` in a fresh session.
pub fn check(source: &str, options: &CompileOptions) -> Result<Checked, CompileError> {
    Session::new(options).check(source)
}

/// Compile `source` in a fresh session.
pub fn compile(source: &str, options: &CompileOptions) -> Result<Compilation, CompileError> {
    Session::new(options).compile(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options() {
        let options = CompileOptions::default();
        assert_eq!(options.entry, "main");
        assert_eq!(options.invocation, Ty::Tuple(vec![Ty::void()]));
        assert_eq!(options.literal_tagging, LiteralTagging::Lexical);
        assert!(options.primitives.get("sqrt").is_some());
    }

    #[test]
    fn builder_setters() {
        let options = CompileOptions::new()
            .entry("norm")
            .invoke("(float, float, float) -> float")
            .unwrap()
            .literal_tagging(LiteralTagging::Integer);
        assert_eq!(options.entry, "norm");
        assert_eq!(
            options.invocation,
            Ty::signature([Ty::float(), Ty::float(), Ty::float()], Ty::float())
        );
        assert_eq!(options.literal_tagging, LiteralTagging::Integer);
    }

    #[test]
    fn each_stage_error_converts() {
        let options = CompileOptions::default();
        assert!(matches!(check("(main", &options), Err(CompileError::Parse(_))));
        assert!(matches!(
            check("(defun)", &options),
            Err(CompileError::Desugar(_))
        ));
        assert!(matches!(
            check("(defun main () (print 1 2 3)) (defun main () (print 1 2 3))", &options),
            Err(CompileError::Extract(_))
        ));
        assert!(matches!(
            check("(defun f () 1)", &options),
            Err(CompileError::Type(TypeError::UnknownEntry { .. }))
        ));
        assert!(matches!(
            compile("(defun main () ((nowhere) (print 1 2 3)))", &options),
            Err(CompileError::Resolve(_))
        ));
    }

    #[test]
    fn negation_must_agree_with_the_primitive_table() {
        let primitives = crate::config::parse_primitives(
            r#"
[[primitive]]
name = "Operator+"
params = ["int", "int"]
ret = "int"
intrinsic = "add"

[[primitive]]
name = "Operator-"
params = ["float"]
ret = "float"
intrinsic = "neg"
"#,
        )
        .unwrap();
        let options = CompileOptions::new().primitives(primitives);
        assert!(matches!(
            compile("(defun main () (print (- 5 1) 2 3))", &options),
            Err(CompileError::Type(TypeError::BaseConflict { .. }))
        ));
    }

    #[test]
    fn lambda_names_restart_per_compilation() {
        let source = "(defun main () ((lambda (q) (print q 2 3)) 1))";
        let options = CompileOptions::default();
        for _ in 0..2 {
            let checked = check(source, &options).unwrap();
            assert!(checked.program.function("Lambda-1").is_some());
        }
    }
}
