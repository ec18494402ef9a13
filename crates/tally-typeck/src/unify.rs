//! Substitutions: union-find tables from type variables to their types.
//!
//! A `Substitution` wraps `ena`'s unification table. Each function gets its
//! own table while its constraints are solved; the per-function tables are
//! then merged into one for the whole program. Variable ids come from the
//! shared `TypeVars` interner, so the same id means the same variable in
//! every table and tables grow lazily to cover the ids they see.

use std::fmt;

use ena::unify::InPlaceUnificationTable;
use rustc_hash::FxHashMap;

use crate::error::{ConstraintOrigin, TypeError};
use crate::ty::{Ty, TyVar, TypeVars};

/// Resolution stops following bindings after this many steps.
pub const MAX_RESOLVE_DEPTH: usize = 64;

#[derive(Clone)]
pub struct Substitution {
    table: InPlaceUnificationTable<TyVar>,
}

impl Substitution {
    pub fn new() -> Self {
        Substitution {
            table: InPlaceUnificationTable::new(),
        }
    }

    /// Number of variables the table currently covers.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.len() == 0
    }

    fn ensure(&mut self, var: TyVar) {
        while self.table.len() <= var.0 as usize {
            self.table.new_key(None);
        }
    }

    fn find(&mut self, var: TyVar) -> TyVar {
        self.ensure(var);
        self.table.find(var)
    }

    /// The type directly bound to `var`'s class, if any.
    pub fn probe(&mut self, var: TyVar) -> Option<Ty> {
        self.ensure(var);
        self.table.probe_value(var)
    }

    /// Follow one level of indirection: a variable becomes its bound type,
    /// or its class representative when unbound.
    fn shallow_resolve(&mut self, ty: Ty) -> Ty {
        match ty {
            Ty::Var(v) => match self.probe(v) {
                Some(bound) => bound,
                None => Ty::Var(self.find(v)),
            },
            other => other,
        }
    }

    /// Fully resolve a type through the table.
    pub fn resolve(&mut self, ty: &Ty) -> Ty {
        self.resolve_bounded(ty, 0)
    }

    fn resolve_bounded(&mut self, ty: &Ty, depth: usize) -> Ty {
        if depth >= MAX_RESOLVE_DEPTH {
            return ty.clone();
        }
        match ty {
            Ty::Base(_) => ty.clone(),
            Ty::Var(_) => match self.shallow_resolve(ty.clone()) {
                Ty::Var(root) => Ty::Var(root),
                bound => self.resolve_bounded(&bound, depth + 1),
            },
            Ty::Tuple(elems) => Ty::Tuple(
                elems
                    .iter()
                    .map(|e| self.resolve_bounded(e, depth + 1))
                    .collect(),
            ),
        }
    }

    fn occurs_in(&mut self, var: TyVar, ty: &Ty) -> bool {
        match ty {
            Ty::Base(_) => false,
            Ty::Var(v) => {
                if self.find(*v) == var {
                    return true;
                }
                match self.probe(*v) {
                    Some(inner) => self.occurs_in(var, &inner),
                    None => false,
                }
            }
            Ty::Tuple(elems) => elems.iter().any(|e| self.occurs_in(var, e)),
        }
    }

    /// Make `a` and `b` equal, recording bindings in the table.
    pub fn unify(&mut self, a: &Ty, b: &Ty, origin: &ConstraintOrigin) -> Result<(), TypeError> {
        let a = self.shallow_resolve(a.clone());
        let b = self.shallow_resolve(b.clone());

        match (a, b) {
            (Ty::Var(v1), Ty::Var(v2)) if v1 == v2 => Ok(()),

            (Ty::Var(v1), Ty::Var(v2)) => {
                tracing::trace!(lhs = v1.0, rhs = v2.0, "union");
                self.table
                    .unify_var_var(v1, v2)
                    .map_err(|(x, y)| conflict(x, y, origin))
            }

            (Ty::Var(v), ty) | (ty, Ty::Var(v)) => {
                if self.occurs_in(v, &ty) {
                    return Err(TypeError::InfiniteType {
                        var: v,
                        ty,
                        origin: origin.clone(),
                    });
                }
                tracing::trace!(var = v.0, ty = %ty, "bind");
                self.table
                    .unify_var_value(v, Some(ty))
                    .map_err(|(x, y)| conflict(x, y, origin))
            }

            (Ty::Base(x), Ty::Base(y)) => {
                if x == y {
                    Ok(())
                } else {
                    Err(TypeError::BaseConflict {
                        expected: x,
                        found: y,
                        origin: origin.clone(),
                    })
                }
            }

            (Ty::Tuple(xs), Ty::Tuple(ys)) => {
                if xs.len() != ys.len() {
                    return Err(TypeError::ArityMismatch {
                        expected: xs.len(),
                        found: ys.len(),
                        origin: origin.clone(),
                    });
                }
                for (x, y) in xs.iter().zip(ys.iter()) {
                    self.unify(x, y, origin)?;
                }
                Ok(())
            }

            (x, y) => Err(TypeError::ShapeMismatch {
                expected: x,
                found: y,
                origin: origin.clone(),
            }),
        }
    }

    /// A new table holding every binding and union of `self` and `other`.
    ///
    /// `self` is left untouched. Variables known to only one side pass
    /// through as they are.
    pub fn merge(&self, other: &Substitution, origin: &ConstraintOrigin) -> Result<Substitution, TypeError> {
        let mut merged = self.clone();
        let mut other = other.clone();
        for index in 0..other.len() {
            let var = TyVar(index as u32);
            let root = other.find(var);
            if root != var {
                merged.unify(&Ty::Var(var), &Ty::Var(root), origin)?;
            } else if let Some(bound) = other.probe(var) {
                merged.unify(&Ty::Var(var), &bound, origin)?;
            }
        }
        Ok(merged)
    }

    /// Fold several tables into one, left to right.
    pub fn merge_all<'a>(
        parts: impl IntoIterator<Item = (&'a Substitution, ConstraintOrigin)>,
    ) -> Result<Substitution, TypeError> {
        let mut acc = Substitution::new();
        for (part, origin) in parts {
            acc = acc.merge(part, &origin)?;
        }
        Ok(acc)
    }

    /// Resolve every variable in the table.
    pub fn simplify(&mut self) -> Solution {
        let mut types = FxHashMap::default();
        // Resolution can grow the table, so re-check the length each step.
        let mut index = 0;
        while index < self.len() {
            let var = TyVar(index as u32);
            let resolved = self.resolve(&Ty::Var(var));
            types.insert(var, resolved);
            index += 1;
        }
        Solution { types }
    }
}

impl Default for Substitution {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Substitution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Substitution")
            .field("vars", &self.table.len())
            .finish()
    }
}

fn conflict(a: Ty, b: Ty, origin: &ConstraintOrigin) -> TypeError {
    match (a, b) {
        (Ty::Base(x), Ty::Base(y)) => TypeError::BaseConflict {
            expected: x,
            found: y,
            origin: origin.clone(),
        },
        (Ty::Tuple(xs), Ty::Tuple(ys)) if xs.len() != ys.len() => TypeError::ArityMismatch {
            expected: xs.len(),
            found: ys.len(),
            origin: origin.clone(),
        },
        (x, y) => TypeError::ShapeMismatch {
            expected: x,
            found: y,
            origin: origin.clone(),
        },
    }
}

/// Every variable of a substitution mapped to its fully resolved type.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Solution {
    types: FxHashMap<TyVar, Ty>,
}

impl Solution {
    pub fn get(&self, var: TyVar) -> Option<&Ty> {
        self.types.get(&var)
    }

    /// Substitute resolved types for the variables in `ty`.
    pub fn apply(&self, ty: &Ty) -> Ty {
        match ty {
            Ty::Base(_) => ty.clone(),
            Ty::Var(v) => match self.types.get(v) {
                Some(Ty::Var(root)) if root == v => ty.clone(),
                Some(resolved) => resolved.clone(),
                None => ty.clone(),
            },
            Ty::Tuple(elems) => Ty::Tuple(elems.iter().map(|e| self.apply(e)).collect()),
        }
    }

    /// The resolved type of `var`, which must contain no variables.
    pub fn require_base(
        &self,
        var: TyVar,
        vars: &TypeVars,
        span: Option<tally_common::span::Span>,
    ) -> Result<Ty, TypeError> {
        let ty = self.apply(&Ty::Var(var));
        if ty.is_base() {
            Ok(ty)
        } else {
            Err(TypeError::Unresolved {
                name: vars
                    .name_of(var)
                    .map_or_else(|| format!("?{}", var.0), ToString::to_string),
                ty: vars.display(&ty),
                span,
            })
        }
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
