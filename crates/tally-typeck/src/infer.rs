//! Constraint generation for function bodies.
//!
//! Each function is annotated on its own: every subexpression gets a type
//! (often a fresh variable), and every place two types must agree produces a
//! `Constraint`. Solving the constraints in order yields the function's local
//! substitution. Calls do not look at the callee's definition; they only
//! constrain the callee's global variable, which is how information flows
//! between functions once the substitutions are merged.

use rustc_hash::FxHashSet;
use tally_common::{ensure_sufficient_stack, NumberForm};

use crate::error::{ConstraintOrigin, TypeError};
use crate::extract::FunctionStub;
use crate::form::{Form, NEGATE_OPERATOR};
use crate::ty::{Ty, TypeVars};
use crate::unify::Substitution;

/// An equality between two types, with where it came from.
#[derive(Clone, Debug, PartialEq)]
pub struct Constraint {
    pub lhs: Ty,
    pub rhs: Ty,
    pub origin: ConstraintOrigin,
}

struct Annotator<'a> {
    vars: &'a mut TypeVars,
    function: &'a str,
    params: FxHashSet<&'a str>,
    constraints: Vec<Constraint>,
}

impl Annotator<'_> {
    fn constrain(&mut self, lhs: Ty, rhs: Ty, origin: ConstraintOrigin) {
        self.constraints.push(Constraint { lhs, rhs, origin });
    }

    fn name_type(&mut self, name: &str) -> Ty {
        if self.params.contains(name) {
            Ty::Var(self.vars.param(self.function, name))
        } else {
            Ty::Var(self.vars.global(name))
        }
    }

    fn annotate(&mut self, form: &Form) -> Ty {
        ensure_sufficient_stack(|| self.annotate_inner(form))
    }

    fn annotate_inner(&mut self, form: &Form) -> Ty {
        match form {
            Form::Number(lit) => match lit.form {
                NumberForm::Integer => Ty::int(),
                NumberForm::Float => Ty::float(),
            },
            Form::Ident(ident) => self.name_type(&ident.name),
            Form::Binary { op, lhs, rhs, span } => {
                let lhs = self.annotate(lhs);
                let rhs = self.annotate(rhs);
                let result = Ty::Var(self.vars.fresh());
                let operator = Ty::Var(self.vars.global(op.operator_name()));
                self.constrain(
                    operator,
                    Ty::Tuple(vec![lhs, rhs, result.clone()]),
                    ConstraintOrigin::BinOp {
                        op: op.symbol(),
                        span: *span,
                    },
                );
                result
            }
            Form::Neg { operand, span } => {
                let operand = self.annotate(operand);
                self.constrain(
                    operand.clone(),
                    Ty::int(),
                    ConstraintOrigin::Negate { span: *span },
                );
                // Negation calls `Operator-`, so the table entry must agree.
                let operator = Ty::Var(self.vars.global(NEGATE_OPERATOR));
                self.constrain(
                    operator,
                    Ty::signature([operand.clone()], operand.clone()),
                    ConstraintOrigin::Negate { span: *span },
                );
                operand
            }
            Form::Group(group) => match group.head_name() {
                Some(head) => {
                    let args: Vec<Ty> = group.forms[1..].iter().map(|a| self.annotate(a)).collect();
                    let result = Ty::Var(self.vars.fresh());
                    let callee = Ty::Var(self.vars.global(&head.name));
                    self.constrain(
                        callee,
                        Ty::signature(args, result.clone()),
                        ConstraintOrigin::Call {
                            callee: head.name.clone(),
                            span: group.span,
                        },
                    );
                    result
                }
                None => self.sequence(&group.forms),
            },
            Form::FnDecl(decl) => Ty::Var(self.vars.global(&decl.name)),
            Form::Module(forms) => self.sequence(forms),
        }
    }

    /// A sequence has the type of its last element, `void` when empty.
    fn sequence(&mut self, forms: &[Form]) -> Ty {
        let mut last = Ty::void();
        for form in forms {
            last = self.annotate(form);
        }
        last
    }
}

/// Generate constraints for one function without solving them.
pub fn function_constraints(stub: &FunctionStub, vars: &mut TypeVars) -> (Ty, Vec<Constraint>) {
    let mut annotator = Annotator {
        vars,
        function: &stub.name,
        params: stub.param_names().collect(),
        constraints: Vec::new(),
    };
    let params: Vec<Ty> = stub
        .param_names()
        .map(|p| Ty::Var(annotator.vars.param(&stub.name, p)))
        .collect();
    let body = annotator.annotate(&stub.body);
    let signature = Ty::signature(params, body);
    let own = Ty::Var(annotator.vars.global(&stub.name));
    annotator.constrain(
        own,
        signature.clone(),
        ConstraintOrigin::Signature {
            function: stub.name.clone(),
            span: stub.span,
        },
    );
    (signature, annotator.constraints)
}

/// Annotate a function and solve its constraints into its local
/// substitution.
#[tracing::instrument(level = "debug", skip_all, fields(function = %stub.name))]
pub fn annotate_function(stub: &mut FunctionStub, vars: &mut TypeVars) -> Result<(), TypeError> {
    let (signature, constraints) = function_constraints(stub, vars);
    let mut subst = Substitution::new();
    for constraint in &constraints {
        subst.unify(&constraint.lhs, &constraint.rhs, &constraint.origin)?;
    }
    tracing::debug!(
        constraints = constraints.len(),
        signature = %vars.display(&signature),
        "annotated"
    );
    stub.signature = Some(signature);
    stub.substitution = subst;
    Ok(())
}

/// Names a function body refers to: callees, operator primitives and bare
/// identifiers that are not parameters.
pub fn referenced_names(stub: &FunctionStub) -> Vec<String> {
    fn walk(form: &Form, params: &FxHashSet<&str>, out: &mut Vec<String>) {
        ensure_sufficient_stack(|| walk_inner(form, params, out))
    }

    fn walk_inner(form: &Form, params: &FxHashSet<&str>, out: &mut Vec<String>) {
        match form {
            Form::Number(_) => {}
            Form::Ident(ident) => {
                if !params.contains(ident.name.as_str()) {
                    out.push(ident.name.clone());
                }
            }
            Form::Binary { op, lhs, rhs, .. } => {
                out.push(op.operator_name().to_string());
                walk(lhs, params, out);
                walk(rhs, params, out);
            }
            Form::Neg { operand, .. } => {
                out.push(NEGATE_OPERATOR.to_string());
                walk(operand, params, out);
            }
            Form::Group(group) => {
                if let Some(head) = group.head_name() {
                    out.push(head.name.clone());
                }
                for child in group.forms.iter().skip(usize::from(group.head_name().is_some())) {
                    walk(child, params, out);
                }
            }
            Form::FnDecl(decl) => out.push(decl.name.clone()),
            Form::Module(forms) => {
                for child in forms {
                    walk(child, params, out);
                }
            }
        }
    }

    let params: FxHashSet<&str> = stub.param_names().collect();
    let mut out = Vec::new();
    walk(&stub.body, &params, &mut out);
    out
}
