//! Function extraction.
//!
//! Pulls every `FnDecl` out of the desugared tree into a `FunctionStub`.
//! Top-level declarations disappear from the tree; declarations nested in a
//! function body are lifted into their own stub and replaced by an
//! identifier naming them. Lifted functions do not capture anything from the
//! enclosing function.

use rustc_hash::{FxHashMap, FxHashSet};
use tally_common::ensure_sufficient_stack;
use tally_common::span::Span;

use crate::error::ExtractError;
use crate::form::{FnDecl, Form, Group, Ident};
use crate::ty::{Ty, VarName};
use crate::unify::Substitution;

/// A named function awaiting type inference.
#[derive(Clone, Debug)]
pub struct FunctionStub {
    pub name: String,
    pub params: Vec<Ident>,
    pub body: Form,
    pub span: Span,
    /// `(params..., body)` as built during annotation.
    pub signature: Option<Ty>,
    /// Bindings produced by this function's own constraints.
    pub substitution: Substitution,
}

impl FunctionStub {
    /// The variable identity under which the function's type is recorded.
    pub fn var_name(&self) -> VarName {
        VarName::global(self.name.as_str())
    }

    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(|p| p.name.as_str())
    }
}

#[derive(Debug)]
pub struct Extracted {
    pub functions: Vec<FunctionStub>,
    /// Whatever is left once declarations are removed; `None` if nothing.
    pub script: Option<Form>,
}

impl Extracted {
    pub fn function(&self, name: &str) -> Option<&FunctionStub> {
        self.functions.iter().find(|f| f.name == name)
    }
}

#[tracing::instrument(level = "debug", skip_all)]
pub fn extract_functions(module: Form) -> Result<Extracted, ExtractError> {
    let mut extractor = Extractor::default();
    let script = extractor.top_level(module)?.filter(|form| match form {
        Form::Module(forms) => !forms.is_empty(),
        _ => true,
    });
    tracing::debug!(
        functions = extractor.functions.len(),
        script = script.is_some(),
        "extracted"
    );
    Ok(Extracted {
        functions: extractor.functions,
        script,
    })
}

#[derive(Default)]
struct Extractor {
    functions: Vec<FunctionStub>,
    defined: FxHashMap<String, Span>,
}

impl Extractor {
    fn top_level(&mut self, form: Form) -> Result<Option<Form>, ExtractError> {
        match form {
            Form::FnDecl(decl) => {
                self.add(decl)?;
                Ok(None)
            }
            Form::Module(forms) => Ok(Some(Form::Module(self.top_level_all(forms)?))),
            Form::Group(group) => {
                let had_children = !group.forms.is_empty();
                let forms = self.top_level_all(group.forms)?;
                if had_children && forms.is_empty() {
                    return Ok(None);
                }
                Ok(Some(Form::Group(Group {
                    forms,
                    span: group.span,
                })))
            }
            terminal => Ok(Some(terminal)),
        }
    }

    fn top_level_all(&mut self, forms: Vec<Form>) -> Result<Vec<Form>, ExtractError> {
        let mut kept = Vec::with_capacity(forms.len());
        for form in forms {
            if let Some(form) = self.top_level(form)? {
                kept.push(form);
            }
        }
        Ok(kept)
    }

    fn add(&mut self, decl: FnDecl) -> Result<(), ExtractError> {
        if let Some(first) = self.defined.get(&decl.name) {
            return Err(ExtractError::DuplicateFunction {
                name: decl.name,
                span: decl.span,
                first: *first,
            });
        }
        let mut seen = FxHashSet::default();
        for param in &decl.params {
            if !seen.insert(param.name.as_str()) {
                return Err(ExtractError::DuplicateParameter {
                    function: decl.name.clone(),
                    name: param.name.clone(),
                    span: param.span,
                });
            }
        }
        self.defined.insert(decl.name.clone(), decl.span);

        let body = self.lift(*decl.body)?;
        self.functions.push(FunctionStub {
            name: decl.name,
            params: decl.params,
            body,
            span: decl.span,
            signature: None,
            substitution: Substitution::new(),
        });
        Ok(())
    }

    /// Replace nested declarations in a body by references to lifted stubs.
    fn lift(&mut self, form: Form) -> Result<Form, ExtractError> {
        ensure_sufficient_stack(|| self.lift_inner(form))
    }

    fn lift_inner(&mut self, form: Form) -> Result<Form, ExtractError> {
        Ok(match form {
            Form::FnDecl(decl) => {
                let reference = Ident {
                    name: decl.name.clone(),
                    span: decl.span,
                };
                self.add(decl)?;
                Form::Ident(reference)
            }
            Form::Binary { op, lhs, rhs, span } => Form::Binary {
                op,
                lhs: Box::new(self.lift(*lhs)?),
                rhs: Box::new(self.lift(*rhs)?),
                span,
            },
            Form::Neg { operand, span } => Form::Neg {
                operand: Box::new(self.lift(*operand)?),
                span,
            },
            Form::Group(group) => Form::Group(Group {
                forms: group
                    .forms
                    .into_iter()
                    .map(|f| self.lift(f))
                    .collect::<Result<_, _>>()?,
                span: group.span,
            }),
            Form::Module(forms) => Form::Module(
                forms
                    .into_iter()
                    .map(|f| self.lift(f))
                    .collect::<Result<_, _>>()?,
            ),
            leaf @ (Form::Number(_) | Form::Ident(_)) => leaf,
        })
    }
}
