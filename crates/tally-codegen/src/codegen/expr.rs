//! Expression generation.
//!
//! Each expression yields `Some(value)`, or `None` when it produces `void`.
//! Arguments are generated left to right before the call itself.

use tally_common::ensure_sufficient_stack;
use tally_typeck::Intrinsic;

use super::{CodeGen, Env, InstrBuilder};
use crate::error::CodegenError;
use crate::mir::{Callee, ExternId, MirExpr};

/// The function whose body is being generated.
pub(crate) struct Frame<'f, F> {
    pub(crate) name: &'f str,
    pub(crate) handle: &'f F,
}

impl<B: InstrBuilder> CodeGen<'_, B> {
    pub(crate) fn expr(
        &mut self,
        expr: &MirExpr,
        env: &Env<B::Value>,
        frame: &Frame<'_, B::Function>,
    ) -> Result<Option<B::Value>, CodegenError> {
        ensure_sufficient_stack(|| self.expr_inner(expr, env, frame))
    }

    fn expr_inner(
        &mut self,
        expr: &MirExpr,
        env: &Env<B::Value>,
        frame: &Frame<'_, B::Function>,
    ) -> Result<Option<B::Value>, CodegenError> {
        match expr {
            MirExpr::Const { ty, value } => Ok(Some(self.builder.const_value(*ty, value))),

            MirExpr::Var(name) => match env.lookup(name) {
                Some(value) => Ok(Some(value.clone())),
                None => Err(CodegenError::UnboundVariable {
                    name: name.clone(),
                    function: frame.name.to_string(),
                }),
            },

            MirExpr::Seq(exprs) => {
                let mut last = None;
                for expr in exprs {
                    last = self.expr(expr, env, frame)?;
                }
                Ok(last)
            }

            MirExpr::Call { callee, args } => {
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    let value = self.expr(arg, env, frame)?.ok_or_else(|| {
                        CodegenError::VoidOperand {
                            function: frame.name.to_string(),
                        }
                    })?;
                    values.push(value);
                }
                self.call(callee, values, frame)
            }
        }
    }

    fn call(
        &mut self,
        callee: &Callee,
        args: Vec<B::Value>,
        frame: &Frame<'_, B::Function>,
    ) -> Result<Option<B::Value>, CodegenError> {
        match callee {
            Callee::Function(id) => {
                let target = self.function(*id)?;
                // Generating the callee may have moved the insertion point.
                self.builder.position_at_end(frame.handle);
                let ret = self.module.function(*id).ret;
                Ok(self.builder.call(&target, ret, args))
            }
            Callee::Extern(id) => Ok(self.extern_call(*id, args)),
            Callee::Unresolved(name) => Err(CodegenError::UnresolvedCallee {
                name: name.clone(),
                function: frame.name.to_string(),
            }),
        }
    }

    fn extern_call(&mut self, id: ExternId, args: Vec<B::Value>) -> Option<B::Value> {
        let module = self.module;
        let ext = module.extern_fn(id);
        let ret = ext.ret;

        // Intrinsics with a matching operand count become inline arithmetic.
        let args = match (ext.intrinsic, <[B::Value; 2]>::try_from(args)) {
            (Some(Intrinsic::Add), Ok([lhs, rhs])) => return Some(self.builder.add(ret, lhs, rhs)),
            (Some(Intrinsic::Mul), Ok([lhs, rhs])) => return Some(self.builder.mul(ret, lhs, rhs)),
            (_, Ok(pair)) => Vec::from(pair),
            (_, Err(args)) => args,
        };
        let args = match (ext.intrinsic, <[B::Value; 1]>::try_from(args)) {
            (Some(Intrinsic::Neg), Ok([operand])) => return Some(self.builder.neg(ret, operand)),
            (_, Ok(single)) => Vec::from(single),
            (_, Err(args)) => args,
        };

        let declared = match self.externs.get(&id) {
            Some(handle) => handle.clone(),
            None => {
                let handle = self.builder.declare_extern(&ext.name, &ext.params, ret);
                self.externs.insert(id, handle.clone());
                handle
            }
        };
        self.builder.call(&declared, ret, args)
    }
}
