//! The primitive signature table.
//!
//! Primitives are functions the program can call without defining them:
//! the arithmetic operators the parser desugars into, plus a few externs.
//! Their signatures are concrete and enter inference as one more
//! substitution merged with the user functions'.

use std::fmt;

use crate::error::{ConstraintOrigin, TypeError};
use crate::form::{BinOp, NEGATE_OPERATOR};
use crate::ty::{BaseTy, Ty, TypeVars};
use crate::unify::Substitution;

/// An arithmetic operation a primitive stands for, emitted inline by the
/// code generator instead of a call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Intrinsic {
    Add,
    Mul,
    Neg,
}

impl Intrinsic {
    pub fn from_name(name: &str) -> Option<Intrinsic> {
        match name {
            "add" => Some(Intrinsic::Add),
            "mul" => Some(Intrinsic::Mul),
            "neg" => Some(Intrinsic::Neg),
            _ => None,
        }
    }

    /// Number of operands the operation takes.
    pub fn arity(self) -> usize {
        match self {
            Intrinsic::Add | Intrinsic::Mul => 2,
            Intrinsic::Neg => 1,
        }
    }
}

impl fmt::Display for Intrinsic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Intrinsic::Add => "add",
            Intrinsic::Mul => "mul",
            Intrinsic::Neg => "neg",
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Primitive {
    pub name: String,
    pub params: Vec<BaseTy>,
    pub ret: BaseTy,
    pub intrinsic: Option<Intrinsic>,
}

impl Primitive {
    pub fn new(name: impl Into<String>, params: Vec<BaseTy>, ret: BaseTy) -> Self {
        Primitive {
            name: name.into(),
            params,
            ret,
            intrinsic: None,
        }
    }

    pub fn with_intrinsic(mut self, intrinsic: Intrinsic) -> Self {
        self.intrinsic = Some(intrinsic);
        self
    }

    /// The signature tuple `(params..., ret)`.
    pub fn signature(&self) -> Ty {
        Ty::signature(self.params.iter().map(|b| Ty::Base(*b)), Ty::Base(self.ret))
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Primitives {
    entries: Vec<Primitive>,
}

impl Primitives {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Operators over `float` (negation over `int`), `sqrt`, `pow` and a
    /// three-argument integer `print`.
    pub fn standard() -> Self {
        use BaseTy::{Float, Int, Void};

        let mut table = Primitives::new();
        table.insert(
            Primitive::new(BinOp::Add.operator_name(), vec![Float, Float], Float)
                .with_intrinsic(Intrinsic::Add),
        );
        table.insert(
            Primitive::new(BinOp::Mul.operator_name(), vec![Float, Float], Float)
                .with_intrinsic(Intrinsic::Mul),
        );
        table.insert(
            Primitive::new(NEGATE_OPERATOR, vec![Int], Int).with_intrinsic(Intrinsic::Neg),
        );
        table.insert(Primitive::new("sqrt", vec![Float], Float));
        table.insert(Primitive::new("pow", vec![Float, Float], Float));
        table.insert(Primitive::new("print", vec![Int, Int, Int], Void));
        table
    }

    /// Add a primitive, replacing any existing one with the same name.
    pub fn insert(&mut self, primitive: Primitive) {
        match self.entries.iter_mut().find(|p| p.name == primitive.name) {
            Some(slot) => *slot = primitive,
            None => self.entries.push(primitive),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Primitive> {
        self.entries.iter().find(|p| p.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Primitive> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bind each primitive's global variable to its signature.
    pub fn substitution(&self, vars: &mut TypeVars) -> Result<Substitution, TypeError> {
        let mut subst = Substitution::new();
        for primitive in &self.entries {
            let var = vars.global(&primitive.name);
            let origin = ConstraintOrigin::Primitive {
                name: primitive.name.clone(),
            };
            subst.unify(&Ty::Var(var), &primitive.signature(), &origin)?;
        }
        Ok(subst)
    }
}
