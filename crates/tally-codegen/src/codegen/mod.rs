//! Instruction generation from MIR.
//!
//! This module walks a resolved [`MirModule`] from its entry function and
//! drives an [`InstrBuilder`], the seam to whatever backend emits the final
//! code.
//!
//! ## Architecture
//!
//! - [`InstrBuilder`]: the backend interface (functions, constants,
//!   arithmetic, calls, returns)
//! - [`CodeGen`]: per-module generation state, generating callees on demand
//! - [`expr`]: expression generation against an explicit [`Env`]
//! - [`text`]: a builder that renders a textual SSA listing

pub mod expr;
pub mod text;

use rustc_hash::FxHashMap;

use crate::error::CodegenError;
use crate::mir::{ExternId, FnId, MirModule, MirType};

pub use text::{TextBuilder, TextFunction, TextValue};

// ── Builder interface ────────────────────────────────────────────────

/// The operations code generation needs from a backend.
///
/// Handles are opaque to the generator. Instructions are appended to the
/// function most recently begun or positioned at.
pub trait InstrBuilder {
    type Value: Clone;
    type Function: Clone;

    /// Start a function body and position at its end.
    fn begin_function(&mut self, name: &str, params: &[MirType], ret: MirType) -> Self::Function;

    /// Continue appending to a function begun earlier.
    fn position_at_end(&mut self, function: &Self::Function);

    /// The value bound to parameter `index` of `function`.
    fn param(&mut self, function: &Self::Function, index: usize) -> Self::Value;

    /// Declare a function defined outside the program.
    fn declare_extern(&mut self, name: &str, params: &[MirType], ret: MirType) -> Self::Function;

    /// A constant of type `ty` written as `text` in the source.
    fn const_value(&mut self, ty: MirType, text: &str) -> Self::Value;

    fn add(&mut self, ty: MirType, lhs: Self::Value, rhs: Self::Value) -> Self::Value;

    fn mul(&mut self, ty: MirType, lhs: Self::Value, rhs: Self::Value) -> Self::Value;

    fn neg(&mut self, ty: MirType, operand: Self::Value) -> Self::Value;

    /// Call `callee`; `None` when it returns `void`.
    fn call(
        &mut self,
        callee: &Self::Function,
        ret: MirType,
        args: Vec<Self::Value>,
    ) -> Option<Self::Value>;

    /// Return from the current function, without a value for `void`.
    fn ret(&mut self, value: Option<Self::Value>);
}

// ── Environment ──────────────────────────────────────────────────────

/// Name bindings of the function being generated. Later bindings shadow
/// earlier ones.
#[derive(Debug, Clone)]
pub struct Env<V> {
    bindings: Vec<(String, V)>,
}

impl<V> Env<V> {
    pub fn new() -> Self {
        Env {
            bindings: Vec::new(),
        }
    }

    pub fn bind(&mut self, name: impl Into<String>, value: V) {
        self.bindings.push((name.into(), value));
    }

    pub fn lookup(&self, name: &str) -> Option<&V> {
        self.bindings
            .iter()
            .rev()
            .find(|(bound, _)| bound == name)
            .map(|(_, value)| value)
    }
}

impl<V> Default for Env<V> {
    fn default() -> Self {
        Env::new()
    }
}

// ── CodeGen ──────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum FnState<F> {
    NotGenerated,
    InProgress,
    Generated(F),
}

/// Generation state for one module.
pub struct CodeGen<'a, B: InstrBuilder> {
    pub(crate) module: &'a MirModule,
    pub(crate) builder: &'a mut B,
    states: Vec<FnState<B::Function>>,
    /// Non-intrinsic externs declared so far.
    pub(crate) externs: FxHashMap<ExternId, B::Function>,
}

impl<'a, B: InstrBuilder> CodeGen<'a, B> {
    pub fn new(module: &'a MirModule, builder: &'a mut B) -> Self {
        CodeGen {
            module,
            builder,
            states: vec![FnState::NotGenerated; module.functions.len()],
            externs: FxHashMap::default(),
        }
    }

    /// Generate the entry function and everything it calls.
    #[tracing::instrument(level = "debug", skip_all, fields(functions = module.functions.len()))]
    pub fn generate(module: &'a MirModule, builder: &'a mut B) -> Result<B::Function, CodegenError> {
        let mut codegen = CodeGen::new(module, builder);
        let entry = codegen.function(module.entry)?;
        let generated = codegen
            .states
            .iter()
            .filter(|s| matches!(s, FnState::Generated(_)))
            .count();
        tracing::debug!(generated, externs = codegen.externs.len(), "generated");
        Ok(entry)
    }

    /// The handle for `id`, generating its body on first use.
    pub(crate) fn function(&mut self, id: FnId) -> Result<B::Function, CodegenError> {
        let index = id.0 as usize;
        let module = self.module;
        match &self.states[index] {
            FnState::Generated(handle) => return Ok(handle.clone()),
            FnState::InProgress => {
                return Err(CodegenError::RecursiveCall {
                    function: module.function(id).name.clone(),
                })
            }
            FnState::NotGenerated => {}
        }

        let function = module.function(id);
        let handle = self
            .builder
            .begin_function(&function.name, &function.param_types(), function.ret);
        self.states[index] = FnState::InProgress;

        let mut env = Env::new();
        for (i, (name, _)) in function.params.iter().enumerate() {
            let value = self.builder.param(&handle, i);
            env.bind(name.as_str(), value);
        }

        let frame = expr::Frame {
            name: &function.name,
            handle: &handle,
        };
        let result = self.expr(&function.body, &env, &frame)?;
        match function.ret {
            MirType::Void => self.builder.ret(None),
            _ => {
                let value = result.ok_or_else(|| CodegenError::VoidOperand {
                    function: function.name.clone(),
                })?;
                self.builder.ret(Some(value));
            }
        }

        tracing::trace!(function = %function.name, "function generated");
        self.states[index] = FnState::Generated(handle.clone());
        Ok(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_bindings_shadow_earlier_ones() {
        let mut env = Env::new();
        env.bind("x", 1);
        env.bind("y", 2);
        env.bind("x", 3);
        assert_eq!(env.lookup("x"), Some(&3));
        assert_eq!(env.lookup("y"), Some(&2));
        assert_eq!(env.lookup("z"), None);
    }
}
