//! Call resolution: closes the call graph.
//!
//! Every `Callee::Unresolved(name)` becomes a direct reference to a lowered
//! function or to a primitive extern. User definitions shadow primitives of
//! the same name. Externs are added to the module the first time they are
//! referenced, so the module only carries externs it calls.

use rustc_hash::FxHashMap;
use tally_common::ensure_sufficient_stack;
use tally_typeck::Primitives;

use super::{Callee, ExternId, FnId, MirExpr, MirExtern, MirFunction, MirModule, MirType};
use crate::error::ResolveError;

/// Resolve every call in `functions` and assemble the module.
#[tracing::instrument(level = "debug", skip_all, fields(entry = entry, functions = functions.len()))]
pub fn resolve_calls(
    functions: Vec<MirFunction>,
    primitives: &Primitives,
    entry: &str,
) -> Result<MirModule, ResolveError> {
    let by_name: FxHashMap<String, (FnId, usize)> = functions
        .iter()
        .enumerate()
        .map(|(i, f)| (f.name.clone(), (FnId(i as u32), f.params.len())))
        .collect();
    let entry = by_name
        .get(entry)
        .map(|&(id, _)| id)
        .ok_or_else(|| ResolveError::MissingEntry {
            name: entry.to_string(),
        })?;

    let mut resolver = Resolver {
        by_name,
        primitives,
        externs: Vec::new(),
        extern_ids: FxHashMap::default(),
    };

    let mut resolved = Vec::with_capacity(functions.len());
    for mut function in functions {
        resolver.resolve_expr(&mut function.body, &function.name)?;
        resolved.push(function);
    }

    tracing::debug!(externs = resolver.externs.len(), "calls resolved");
    Ok(MirModule {
        functions: resolved,
        externs: resolver.externs,
        entry,
    })
}

struct Resolver<'a> {
    by_name: FxHashMap<String, (FnId, usize)>,
    primitives: &'a Primitives,
    externs: Vec<MirExtern>,
    extern_ids: FxHashMap<String, ExternId>,
}

impl Resolver<'_> {
    fn resolve_expr(&mut self, expr: &mut MirExpr, caller: &str) -> Result<(), ResolveError> {
        ensure_sufficient_stack(|| self.resolve_expr_inner(expr, caller))
    }

    fn resolve_expr_inner(
        &mut self,
        expr: &mut MirExpr,
        caller: &str,
    ) -> Result<(), ResolveError> {
        match expr {
            MirExpr::Const { .. } | MirExpr::Var(_) => Ok(()),
            MirExpr::Seq(exprs) => {
                for expr in exprs {
                    self.resolve_expr(expr, caller)?;
                }
                Ok(())
            }
            MirExpr::Call { callee, args } => {
                for arg in args.iter_mut() {
                    self.resolve_expr(arg, caller)?;
                }
                if let Callee::Unresolved(name) = callee {
                    let (target, arity) = self.lookup(name, caller)?;
                    if arity != args.len() {
                        return Err(ResolveError::ArityMismatch {
                            callee: name.clone(),
                            expected: arity,
                            found: args.len(),
                            caller: caller.to_string(),
                        });
                    }
                    *callee = target;
                }
                Ok(())
            }
        }
    }

    fn lookup(&mut self, name: &str, caller: &str) -> Result<(Callee, usize), ResolveError> {
        if let Some(&(id, arity)) = self.by_name.get(name) {
            return Ok((Callee::Function(id), arity));
        }
        if let Some(&id) = self.extern_ids.get(name) {
            let arity = self.externs[id.0 as usize].params.len();
            return Ok((Callee::Extern(id), arity));
        }
        let primitive = self
            .primitives
            .get(name)
            .ok_or_else(|| ResolveError::UnknownFunction {
                name: name.to_string(),
                caller: caller.to_string(),
            })?;
        let id = ExternId(self.externs.len() as u32);
        self.externs.push(MirExtern {
            name: primitive.name.clone(),
            params: primitive.params.iter().map(|&p| MirType::from(p)).collect(),
            ret: MirType::from(primitive.ret),
            intrinsic: primitive.intrinsic,
        });
        self.extern_ids.insert(name.to_string(), id);
        Ok((Callee::Extern(id), primitive.params.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_common::span::Span;
    use tally_typeck::{BaseTy, Primitive};

    fn function(name: &str, params: &[&str], body: MirExpr) -> MirFunction {
        MirFunction {
            name: name.to_string(),
            params: params
                .iter()
                .map(|p| (p.to_string(), MirType::Float))
                .collect(),
            body,
            ret: MirType::Float,
            span: Span::default(),
        }
    }

    fn call(name: &str, args: Vec<MirExpr>) -> MirExpr {
        MirExpr::Call {
            callee: Callee::Unresolved(name.to_string()),
            args,
        }
    }

    fn var(name: &str) -> MirExpr {
        MirExpr::Var(name.to_string())
    }

    #[test]
    fn functions_and_externs_are_linked() {
        let module = resolve_calls(
            vec![
                function("main", &[], call("sq", vec![call("sqrt", vec![])])),
                function("sq", &["v"], call("Operator*", vec![var("v"), var("v")])),
            ],
            &Primitives::standard(),
            "main",
        );
        // `sqrt` takes one argument.
        assert!(matches!(
            module,
            Err(ResolveError::ArityMismatch { ref callee, expected: 1, found: 0, .. }) if callee == "sqrt"
        ));

        let module = resolve_calls(
            vec![
                function("main", &[], call("sq", vec![var("k")])),
                function("sq", &["v"], call("Operator*", vec![var("v"), var("v")])),
            ],
            &Primitives::standard(),
            "main",
        )
        .unwrap();
        assert_eq!(module.entry, FnId(0));
        assert_eq!(
            module.functions[0].body,
            MirExpr::Call {
                callee: Callee::Function(FnId(1)),
                args: vec![var("k")],
            }
        );
        assert_eq!(module.externs.len(), 1);
        assert_eq!(module.externs[0].name, "Operator*");
        assert_eq!(
            module.externs[0].intrinsic,
            Some(tally_typeck::Intrinsic::Mul)
        );
    }

    #[test]
    fn unknown_function() {
        let err = resolve_calls(
            vec![function("main", &[], call("nowhere", vec![]))],
            &Primitives::standard(),
            "main",
        )
        .unwrap_err();
        assert_eq!(
            err,
            ResolveError::UnknownFunction {
                name: "nowhere".to_string(),
                caller: "main".to_string(),
            }
        );
        assert_eq!(err.to_string(), "call to unknown function `nowhere` in `main`");
    }

    #[test]
    fn user_definitions_shadow_primitives() {
        let module = resolve_calls(
            vec![
                function("main", &[], call("sqrt", vec![var("a"), var("b")])),
                function("sqrt", &["x", "y"], var("x")),
            ],
            &Primitives::standard(),
            "main",
        )
        .unwrap();
        assert!(module.externs.is_empty());
        assert!(matches!(
            module.functions[0].body,
            MirExpr::Call {
                callee: Callee::Function(FnId(1)),
                ..
            }
        ));
    }

    #[test]
    fn externs_are_shared_between_call_sites() {
        let mut primitives = Primitives::new();
        primitives.insert(Primitive::new("emit", vec![BaseTy::Float], BaseTy::Void));
        let module = resolve_calls(
            vec![function(
                "main",
                &[],
                MirExpr::Seq(vec![
                    call("emit", vec![var("a")]),
                    call("emit", vec![var("b")]),
                ]),
            )],
            &primitives,
            "main",
        )
        .unwrap();
        assert_eq!(module.externs.len(), 1);
        let MirExpr::Seq(calls) = &module.functions[0].body else {
            panic!("expected a sequence");
        };
        for call in calls {
            assert!(matches!(
                call,
                MirExpr::Call {
                    callee: Callee::Extern(ExternId(0)),
                    ..
                }
            ));
        }
    }

    #[test]
    fn entry_must_have_been_lowered() {
        let err = resolve_calls(Vec::new(), &Primitives::standard(), "main").unwrap_err();
        assert_eq!(
            err,
            ResolveError::MissingEntry {
                name: "main".to_string()
            }
        );
    }
}
