//! Whole-program solving: merge every function's substitution with the
//! primitive table, then specialize the entry function against a concrete
//! invocation.

use std::collections::VecDeque;

use rustc_hash::FxHashMap;

use crate::error::{ConstraintOrigin, TypeError};
use crate::extract::{Extracted, FunctionStub};
use crate::infer::{annotate_function, referenced_names};
use crate::primitives::Primitives;
use crate::ty::{Ty, TypeVars, VarName};
use crate::unify::{Solution, Substitution};

/// The result of type checking a program for one entry point.
#[derive(Debug)]
pub struct TypedProgram {
    pub functions: Vec<FunctionStub>,
    pub solution: Solution,
    /// Indices into `functions` reachable from the entry, entry first.
    pub reachable: Vec<usize>,
    pub entry: usize,
    /// The entry's resolved return type.
    pub entry_type: Ty,
    /// Top-level forms outside any function, kept for diagnostics.
    pub script: Option<crate::form::Form>,
}

impl TypedProgram {
    pub fn entry_function(&self) -> &FunctionStub {
        &self.functions[self.entry]
    }

    pub fn function(&self, name: &str) -> Option<&FunctionStub> {
        self.functions.iter().find(|f| f.name == name)
    }

    pub fn reachable_functions(&self) -> impl Iterator<Item = &FunctionStub> {
        self.reachable.iter().map(|&i| &self.functions[i])
    }

    /// The resolved signature tuple of a function.
    pub fn signature(&self, stub: &FunctionStub, vars: &TypeVars) -> Option<Ty> {
        vars.get(&stub.var_name())
            .map(|var| self.solution.apply(&Ty::Var(var)))
    }

    /// `name: (params) -> ret` for a reachable function.
    pub fn describe(&self, stub: &FunctionStub, vars: &TypeVars) -> String {
        match self.signature(stub, vars) {
            Some(sig) => match sig.split_signature() {
                Some((params, ret)) => {
                    let params: Vec<String> = params.iter().map(|p| vars.display(p)).collect();
                    format!("{}: ({}) -> {}", stub.name, params.join(", "), vars.display(ret))
                }
                None => format!("{}: {}", stub.name, vars.display(&sig)),
            },
            None => format!("{}: ?", stub.name),
        }
    }
}

/// Runs annotation, merging and specialization over one program.
pub struct TypeChecker<'a> {
    vars: &'a mut TypeVars,
    primitives: &'a Primitives,
}

impl<'a> TypeChecker<'a> {
    pub fn new(vars: &'a mut TypeVars, primitives: &'a Primitives) -> Self {
        TypeChecker { vars, primitives }
    }

    #[tracing::instrument(level = "debug", skip_all, fields(entry = entry, functions = extracted.functions.len()))]
    pub fn check(
        self,
        extracted: Extracted,
        entry: &str,
        invocation: &Ty,
    ) -> Result<TypedProgram, TypeError> {
        let Extracted {
            mut functions,
            script,
        } = extracted;

        for stub in &mut functions {
            annotate_function(stub, self.vars)?;
        }

        let entry_index = functions
            .iter()
            .position(|f| f.name == entry)
            .ok_or_else(|| TypeError::UnknownEntry {
                name: entry.to_string(),
            })?;

        let primitive_subst = self.primitives.substitution(self.vars)?;
        let parts = std::iter::once((
            &primitive_subst,
            ConstraintOrigin::Primitive {
                name: "primitive table".to_string(),
            },
        ))
        .chain(functions.iter().map(|f| {
            (
                &f.substitution,
                ConstraintOrigin::Merge {
                    function: f.name.clone(),
                    span: f.span,
                },
            )
        }));
        let mut merged = Substitution::merge_all(parts)?;

        let (solution, entry_type) =
            specialize(&mut merged, &functions[entry_index], invocation, self.vars)?;

        let reachable = reachable_from(&functions, entry_index);
        for &index in &reachable {
            require_resolved(&functions[index], &solution, self.vars)?;
        }

        tracing::debug!(
            reachable = reachable.len(),
            entry_type = %entry_type,
            "specialized"
        );

        Ok(TypedProgram {
            functions,
            solution,
            reachable,
            entry: entry_index,
            entry_type,
            script,
        })
    }
}

/// Type check `extracted` for `entry` called with the signature `invocation`.
pub fn check_program(
    extracted: Extracted,
    entry: &str,
    invocation: &Ty,
    primitives: &Primitives,
    vars: &mut TypeVars,
) -> Result<TypedProgram, TypeError> {
    TypeChecker::new(vars, primitives).check(extracted, entry, invocation)
}

/// Unify the entry's signature with `invocation` and return the solved
/// table along with the entry's return type.
pub fn specialize(
    merged: &mut Substitution,
    entry: &FunctionStub,
    invocation: &Ty,
    vars: &mut TypeVars,
) -> Result<(Solution, Ty), TypeError> {
    let origin = ConstraintOrigin::Invocation {
        entry: entry.name.clone(),
        span: entry.span,
    };
    let var = vars.global(&entry.name);
    let declared = merged.resolve(&Ty::Var(var));
    let Ty::Tuple(slots) = &declared else {
        return Err(TypeError::NotAFunction {
            name: entry.name.clone(),
            ty: vars.display(&declared),
        });
    };
    if let Ty::Tuple(args) = invocation {
        if args.len() != slots.len() {
            return Err(TypeError::ArityMismatch {
                expected: slots.len(),
                found: args.len(),
                origin,
            });
        }
    }

    merged.unify(&declared, invocation, &origin)?;
    let solution = merged.simplify();
    let resolved = solution.apply(&declared);
    let ret = match resolved.split_signature() {
        Some((_, ret)) => ret.clone(),
        None => resolved.clone(),
    };
    Ok((solution, ret))
}

/// Functions reachable from `entry` through the bodies' references,
/// breadth first, entry first.
fn reachable_from(functions: &[FunctionStub], entry: usize) -> Vec<usize> {
    let by_name: FxHashMap<&str, usize> = functions
        .iter()
        .enumerate()
        .map(|(i, f)| (f.name.as_str(), i))
        .collect();

    let mut seen = vec![false; functions.len()];
    let mut order = Vec::new();
    let mut queue = VecDeque::from([entry]);
    seen[entry] = true;

    while let Some(index) = queue.pop_front() {
        order.push(index);
        for name in referenced_names(&functions[index]) {
            if let Some(&callee) = by_name.get(name.as_str()) {
                if !seen[callee] {
                    seen[callee] = true;
                    queue.push_back(callee);
                }
            }
        }
    }
    order
}

fn require_resolved(stub: &FunctionStub, solution: &Solution, vars: &TypeVars) -> Result<(), TypeError> {
    for param in &stub.params {
        if let Some(var) = vars.get(&VarName::param(stub.name.as_str(), param.name.as_str())) {
            solution.require_base(var, vars, Some(param.span))?;
        }
    }
    if let Some(var) = vars.get(&stub.var_name()) {
        solution.require_base(var, vars, Some(stub.span))?;
    }
    Ok(())
}
