//! CST to `Form` conversion.
//!
//! Normalizes `defun` and `lambda` into `FnDecl`, drops the grouping around
//! operator forms and lone non-identifier forms, and keeps every other group
//! as-is. `(x)` is a zero-argument call and is therefore not unwrapped.

use tally_common::{classify_number, ensure_sufficient_stack};
use tally_parser::ast::{self, AstNode};

use crate::error::DesugarError;
use crate::form::{BinOp, FnDecl, Form, Group, Ident, NumLit};

/// Converts parsed source files into `Form` trees.
///
/// Anonymous functions are named `Lambda-1`, `Lambda-2`, ... in the order
/// they are encountered; the counter lives here so each compilation starts
/// from 1.
#[derive(Debug, Default)]
pub struct Desugarer {
    lambda_counter: u32,
}

impl Desugarer {
    pub fn new() -> Self {
        Self::default()
    }

    #[tracing::instrument(level = "debug", skip_all)]
    pub fn desugar(&mut self, file: &ast::SourceFile) -> Result<Form, DesugarError> {
        let forms = file
            .forms()
            .map(|form| self.desugar_form(&form))
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(forms = forms.len(), lambdas = self.lambda_counter, "desugared");
        Ok(Form::Module(forms))
    }

    fn fresh_lambda_name(&mut self) -> String {
        self.lambda_counter += 1;
        format!("Lambda-{}", self.lambda_counter)
    }

    fn desugar_form(&mut self, form: &ast::Form) -> Result<Form, DesugarError> {
        ensure_sufficient_stack(|| self.desugar_form_inner(form))
    }

    fn desugar_form_inner(&mut self, form: &ast::Form) -> Result<Form, DesugarError> {
        let span = form.span();
        match form {
            ast::Form::Literal(lit) => {
                let text = lit.text();
                let form = classify_number(&text).ok_or(DesugarError::IncompleteNode { span })?;
                Ok(Form::Number(NumLit { text, form, span }))
            }
            ast::Form::Name(name) => Ok(Form::Ident(Ident {
                name: name.text(),
                span,
            })),
            ast::Form::Add(add) => self.binary(BinOp::Add, add.lhs(), add.rhs(), span),
            ast::Form::Mul(mul) => self.binary(BinOp::Mul, mul.lhs(), mul.rhs(), span),
            ast::Form::Neg(neg) => {
                let operand = neg.operand().ok_or(DesugarError::IncompleteNode { span })?;
                Ok(Form::Neg {
                    operand: Box::new(self.desugar_form(&operand)?),
                    span,
                })
            }
            ast::Form::Group(group) => self.group(group),
        }
    }

    fn binary(
        &mut self,
        op: BinOp,
        lhs: Option<ast::Form>,
        rhs: Option<ast::Form>,
        span: tally_common::span::Span,
    ) -> Result<Form, DesugarError> {
        let (Some(lhs), Some(rhs)) = (lhs, rhs) else {
            return Err(DesugarError::IncompleteNode { span });
        };
        Ok(Form::Binary {
            op,
            lhs: Box::new(self.desugar_form(&lhs)?),
            rhs: Box::new(self.desugar_form(&rhs)?),
            span,
        })
    }

    fn group(&mut self, group: &ast::Group) -> Result<Form, DesugarError> {
        let span = group.span();
        let children: Vec<ast::Form> = group.forms().collect();

        match children.first().and_then(ast::Form::as_name).as_deref() {
            Some("defun") => return self.defun(&children, span),
            Some("lambda") => return self.lambda(&children, span),
            _ => {}
        }

        if let [only] = children.as_slice() {
            if !matches!(only, ast::Form::Name(_)) || group.operator().is_some() {
                return self.desugar_form(only);
            }
        }

        let forms = children
            .iter()
            .map(|child| self.desugar_form(child))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Form::Group(Group { forms, span }))
    }

    /// `(defun name (params...) body)`
    fn defun(
        &mut self,
        children: &[ast::Form],
        span: tally_common::span::Span,
    ) -> Result<Form, DesugarError> {
        const KEYWORD: &str = "defun";
        let [_, ast::Form::Name(name), ast::Form::Group(params), body] = children else {
            return Err(DesugarError::MalformedDeclaration {
                keyword: KEYWORD,
                span,
            });
        };
        let params = parameter_list(params, KEYWORD)?;
        let body = self.desugar_form(body)?;
        Ok(Form::FnDecl(FnDecl {
            name: name.text(),
            params,
            body: Box::new(body),
            span,
        }))
    }

    /// `(lambda (params...) body)`
    fn lambda(
        &mut self,
        children: &[ast::Form],
        span: tally_common::span::Span,
    ) -> Result<Form, DesugarError> {
        const KEYWORD: &str = "lambda";
        let [_, ast::Form::Group(params), body] = children else {
            return Err(DesugarError::MalformedDeclaration {
                keyword: KEYWORD,
                span,
            });
        };
        let name = self.fresh_lambda_name();
        let params = parameter_list(params, KEYWORD)?;
        let body = self.desugar_form(body)?;
        Ok(Form::FnDecl(FnDecl {
            name,
            params,
            body: Box::new(body),
            span,
        }))
    }
}

fn parameter_list(group: &ast::Group, keyword: &'static str) -> Result<Vec<Ident>, DesugarError> {
    if let Some(op) = group.operator() {
        let range = op.text_range();
        return Err(DesugarError::InvalidParameter {
            keyword,
            span: tally_common::span::Span::new(range.start().into(), range.end().into()),
        });
    }
    group
        .forms()
        .map(|param| match &param {
            ast::Form::Name(name) => Ok(Ident {
                name: name.text(),
                span: name.span(),
            }),
            other => Err(DesugarError::InvalidParameter {
                keyword,
                span: other.span(),
            }),
        })
        .collect()
}
