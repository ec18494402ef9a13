//! Lowering from typed function stubs to MIR.
//!
//! Only functions reachable from the entry are lowered. Parameter types are
//! read back from the solution under the same `VarName::Param` identity the
//! inference engine used; the return type is the last slot of the function's
//! own resolved signature. Calls stay `Callee::Unresolved` until
//! [`super::resolve`] runs.

use tally_common::{ensure_sufficient_stack, NumberForm};
use tally_typeck::form::{Form, Group, NumLit, NEGATE_OPERATOR};
use tally_typeck::{FunctionStub, Ty, TypeVars, TypedProgram, VarName};

use super::types::{resolve_type, MirType};
use super::{Callee, MirExpr, MirFunction};
use crate::error::LowerError;

/// How numeric literals are typed in the MIR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LiteralTagging {
    /// `int` or `float` by the literal's lexical form, matching inference.
    #[default]
    Lexical,
    /// Every literal is an `int` constant, whatever its form.
    Integer,
}

/// Lower every reachable function of `program`, entry first.
#[tracing::instrument(level = "debug", skip_all, fields(reachable = program.reachable.len()))]
pub fn lower_program(
    program: &TypedProgram,
    vars: &TypeVars,
    tagging: LiteralTagging,
) -> Result<Vec<MirFunction>, LowerError> {
    let lowerer = Lowerer {
        program,
        vars,
        tagging,
    };
    let functions = program
        .reachable_functions()
        .map(|stub| lowerer.lower_function(stub))
        .collect::<Result<Vec<_>, _>>()?;
    tracing::debug!(functions = functions.len(), "lowered");
    Ok(functions)
}

struct Lowerer<'a> {
    program: &'a TypedProgram,
    vars: &'a TypeVars,
    tagging: LiteralTagging,
}

impl Lowerer<'_> {
    fn lower_function(&self, stub: &FunctionStub) -> Result<MirFunction, LowerError> {
        let params = stub
            .params
            .iter()
            .map(|param| {
                let var_name = VarName::param(stub.name.as_str(), param.name.as_str());
                let ty = self.scalar_of(&var_name, param.span)?;
                Ok((param.name.clone(), ty))
            })
            .collect::<Result<Vec<_>, LowerError>>()?;

        let ret = self.return_type(stub)?;
        let body = self.lower_form(stub, &stub.body)?;

        Ok(MirFunction {
            name: stub.name.clone(),
            params,
            body,
            ret,
            span: stub.span,
        })
    }

    fn scalar_of(&self, name: &VarName, span: tally_common::span::Span) -> Result<MirType, LowerError> {
        let var = self.vars.get(name).ok_or_else(|| LowerError::MissingType {
            name: name.to_string(),
            span,
        })?;
        let ty = self.program.solution.apply(&Ty::Var(var));
        resolve_type(&ty).ok_or_else(|| LowerError::NonScalar {
            name: name.to_string(),
            ty: self.vars.display(&ty),
            span,
        })
    }

    fn return_type(&self, stub: &FunctionStub) -> Result<MirType, LowerError> {
        let signature = self
            .program
            .signature(stub, self.vars)
            .ok_or_else(|| LowerError::MissingType {
                name: stub.name.clone(),
                span: stub.span,
            })?;
        let ret = match signature.split_signature() {
            Some((_, ret)) => ret,
            None => &signature,
        };
        resolve_type(ret).ok_or_else(|| LowerError::NonScalar {
            name: stub.name.clone(),
            ty: self.vars.display(ret),
            span: stub.span,
        })
    }

    fn lower_form(&self, stub: &FunctionStub, form: &Form) -> Result<MirExpr, LowerError> {
        ensure_sufficient_stack(|| self.lower_form_inner(stub, form))
    }

    fn lower_form_inner(
        &self,
        stub: &FunctionStub,
        form: &Form,
    ) -> Result<MirExpr, LowerError> {
        match form {
            Form::Number(lit) => Ok(self.lower_literal(lit)),
            Form::Ident(ident) => Ok(MirExpr::Var(ident.name.clone())),
            Form::Binary { op, lhs, rhs, .. } => Ok(MirExpr::Call {
                callee: Callee::Unresolved(op.operator_name().to_string()),
                args: vec![self.lower_form(stub, lhs)?, self.lower_form(stub, rhs)?],
            }),
            Form::Neg { operand, .. } => Ok(MirExpr::Call {
                callee: Callee::Unresolved(NEGATE_OPERATOR.to_string()),
                args: vec![self.lower_form(stub, operand)?],
            }),
            Form::Group(group) => self.lower_group(stub, group),
            Form::FnDecl(_) | Form::Module(_) => Err(self.unsupported(stub, form)),
        }
    }

    fn lower_literal(&self, lit: &NumLit) -> MirExpr {
        let ty = match (self.tagging, lit.form) {
            (LiteralTagging::Integer, _) | (LiteralTagging::Lexical, NumberForm::Integer) => {
                MirType::Int
            }
            (LiteralTagging::Lexical, NumberForm::Float) => MirType::Float,
        };
        MirExpr::Const {
            ty,
            value: lit.text.clone(),
        }
    }

    fn lower_group(&self, stub: &FunctionStub, group: &Group) -> Result<MirExpr, LowerError> {
        if let Some(head) = group.head_name() {
            let args = group.forms[1..]
                .iter()
                .map(|arg| self.lower_form(stub, arg))
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(MirExpr::Call {
                callee: Callee::Unresolved(head.name.clone()),
                args,
            });
        }

        // Anything else must be a sequence of compound forms.
        let mut exprs = Vec::with_capacity(group.forms.len());
        for form in &group.forms {
            match form {
                Form::Group(_) | Form::Binary { .. } | Form::Neg { .. } => {
                    exprs.push(self.lower_form(stub, form)?);
                }
                _ => return Err(self.unsupported(stub, form)),
            }
        }
        Ok(MirExpr::Seq(exprs))
    }

    fn unsupported(&self, stub: &FunctionStub, form: &Form) -> LowerError {
        LowerError::UnsupportedShape {
            function: stub.name.clone(),
            form: form.to_string(),
            span: form.span(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_typeck::{
        check_program, extract_functions, BaseTy, Desugarer, Intrinsic, Primitive, Primitives,
    };

    fn lower(source: &str, tagging: LiteralTagging) -> Result<Vec<MirFunction>, LowerError> {
        lower_with(source, &Primitives::standard(), tagging)
    }

    fn lower_with(
        source: &str,
        primitives: &Primitives,
        tagging: LiteralTagging,
    ) -> Result<Vec<MirFunction>, LowerError> {
        let parse = tally_parser::parse(source);
        assert!(parse.ok(), "{:?}", parse.errors());
        let module = Desugarer::new().desugar(&parse.tree()).unwrap();
        let extracted = extract_functions(module).unwrap();
        let mut vars = TypeVars::new();
        let program = check_program(
            extracted,
            "main",
            &Ty::Tuple(vec![Ty::void()]),
            primitives,
            &mut vars,
        )
        .unwrap();
        lower_program(&program, &vars, tagging)
    }

    fn call(name: &str, args: Vec<MirExpr>) -> MirExpr {
        MirExpr::Call {
            callee: Callee::Unresolved(name.to_string()),
            args,
        }
    }

    fn constant(ty: MirType, value: &str) -> MirExpr {
        MirExpr::Const {
            ty,
            value: value.to_string(),
        }
    }

    #[test]
    fn reachable_functions_are_lowered_entry_first() {
        let functions = lower(
            "(defun unused (a) a)
             (defun twice (v) (* v 2.0))
             (defun main () ((twice 1.5) (print 1 2 3)))",
            LiteralTagging::Lexical,
        )
        .unwrap();
        let names: Vec<&str> = functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["main", "twice"]);

        let twice = &functions[1];
        assert_eq!(twice.params, vec![("v".to_string(), MirType::Float)]);
        assert_eq!(twice.ret, MirType::Float);
        assert_eq!(
            twice.body,
            call(
                "Operator*",
                vec![MirExpr::Var("v".to_string()), constant(MirType::Float, "2.0")]
            )
        );
    }

    #[test]
    fn sequence_of_groups_becomes_seq() {
        let functions = lower(
            "(defun main () ((print 1 2 3) (print 4 5 6)))",
            LiteralTagging::Lexical,
        )
        .unwrap();
        let main = &functions[0];
        assert_eq!(main.ret, MirType::Void);
        let MirExpr::Seq(exprs) = &main.body else {
            panic!("expected a sequence, got {:?}", main.body);
        };
        assert_eq!(exprs.len(), 2);
        assert_eq!(
            exprs[1],
            call(
                "print",
                vec![
                    constant(MirType::Int, "4"),
                    constant(MirType::Int, "5"),
                    constant(MirType::Int, "6"),
                ]
            )
        );
    }

    #[test]
    fn subtraction_lowers_to_add_and_negate() {
        let mut primitives = Primitives::standard();
        primitives.insert(
            Primitive::new("Operator+", vec![BaseTy::Int, BaseTy::Int], BaseTy::Int)
                .with_intrinsic(Intrinsic::Add),
        );
        let functions = lower_with(
            "(defun main () (print (- 5 1) 2 3))",
            &primitives,
            LiteralTagging::Lexical,
        )
        .unwrap();
        assert_eq!(
            functions[0].body,
            call(
                "print",
                vec![
                    call(
                        "Operator+",
                        vec![
                            constant(MirType::Int, "5"),
                            call("Operator-", vec![constant(MirType::Int, "1")]),
                        ]
                    ),
                    constant(MirType::Int, "2"),
                    constant(MirType::Int, "3"),
                ]
            )
        );
    }

    #[test]
    fn integer_tagging_ignores_lexical_form() {
        let functions = lower(
            "(defun half (v) (* v 0.5)) (defun main () ((half 3.0) (print 1 2 3)))",
            LiteralTagging::Integer,
        )
        .unwrap();
        let half = &functions[1];
        assert_eq!(
            half.body,
            call(
                "Operator*",
                vec![MirExpr::Var("v".to_string()), constant(MirType::Int, "0.5")]
            )
        );
        // Types still come from inference.
        assert_eq!(half.ret, MirType::Float);
    }

    #[test]
    fn leaf_in_sequence_is_unsupported() {
        let err = lower(
            "(defun main () ((print 1 2 3) 7 (print 4 5 6)))",
            LiteralTagging::Lexical,
        );
        assert!(matches!(
            err,
            Err(LowerError::UnsupportedShape { ref function, ref form, .. })
                if function == "main" && form == "7"
        ));
    }

    #[test]
    fn function_valued_parameter_is_not_scalar() {
        let err = lower(
            "(defun ignore (y) (print 1 2 3)) (defun main () (ignore print))",
            LiteralTagging::Lexical,
        );
        assert!(matches!(
            err,
            Err(LowerError::NonScalar { ref name, .. }) if name == "ignore.y"
        ));
    }
}
