//! Mid-level IR (MIR) definitions.
//!
//! The MIR is the typed, name-resolved form of the program the code
//! generator walks. Every function has concrete parameter and return types;
//! after call resolution every call points at a function or extern by index.

pub mod lower;
pub mod resolve;
pub mod types;

use std::fmt;

use tally_common::ensure_sufficient_stack;
use tally_common::span::Span;
use tally_typeck::Intrinsic;

pub use types::MirType;

/// Index of a function in `MirModule::functions`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FnId(pub u32);

/// Index of an extern in `MirModule::externs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExternId(pub u32);

/// The target of a call.
#[derive(Debug, Clone, PartialEq)]
pub enum Callee {
    /// Not yet resolved; only present between lowering and resolution.
    Unresolved(String),
    Function(FnId),
    Extern(ExternId),
}

#[derive(Debug, Clone, PartialEq)]
pub enum MirExpr {
    /// A numeric literal; `value` is the literal's source text.
    Const { ty: MirType, value: String },
    /// A parameter reference.
    Var(String),
    Call { callee: Callee, args: Vec<MirExpr> },
    /// Evaluate each in order; the value is the last one's.
    Seq(Vec<MirExpr>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MirFunction {
    pub name: String,
    pub params: Vec<(String, MirType)>,
    pub body: MirExpr,
    pub ret: MirType,
    pub span: Span,
}

impl MirFunction {
    pub fn param_types(&self) -> Vec<MirType> {
        self.params.iter().map(|(_, ty)| *ty).collect()
    }
}

/// A primitive with a fixed signature, possibly an arithmetic intrinsic.
#[derive(Debug, Clone, PartialEq)]
pub struct MirExtern {
    pub name: String,
    pub params: Vec<MirType>,
    pub ret: MirType,
    pub intrinsic: Option<Intrinsic>,
}

/// A closed program: every callee resolved, entry known.
#[derive(Debug, Clone, PartialEq)]
pub struct MirModule {
    pub functions: Vec<MirFunction>,
    pub externs: Vec<MirExtern>,
    pub entry: FnId,
}

impl MirModule {
    pub fn function(&self, id: FnId) -> &MirFunction {
        &self.functions[id.0 as usize]
    }

    pub fn extern_fn(&self, id: ExternId) -> &MirExtern {
        &self.externs[id.0 as usize]
    }

    pub fn entry_function(&self) -> &MirFunction {
        self.function(self.entry)
    }

    fn callee_name<'a>(&'a self, callee: &'a Callee) -> &'a str {
        match callee {
            Callee::Unresolved(name) => name,
            Callee::Function(id) => &self.function(*id).name,
            Callee::Extern(id) => &self.extern_fn(*id).name,
        }
    }

    fn fmt_expr(&self, f: &mut fmt::Formatter<'_>, expr: &MirExpr) -> fmt::Result {
        ensure_sufficient_stack(|| self.fmt_expr_inner(f, expr))
    }

    fn fmt_expr_inner(&self, f: &mut fmt::Formatter<'_>, expr: &MirExpr) -> fmt::Result {
        match expr {
            MirExpr::Const { value, .. } => f.write_str(value),
            MirExpr::Var(name) => f.write_str(name),
            MirExpr::Call { callee, args } => {
                write!(f, "({}", self.callee_name(callee))?;
                for arg in args {
                    write!(f, " ")?;
                    self.fmt_expr(f, arg)?;
                }
                write!(f, ")")
            }
            MirExpr::Seq(exprs) => {
                write!(f, "(seq")?;
                for expr in exprs {
                    write!(f, " ")?;
                    self.fmt_expr(f, expr)?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Readable listing of externs and functions, one per line.
impl fmt::Display for MirModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for ext in &self.externs {
            let params: Vec<String> = ext.params.iter().map(ToString::to_string).collect();
            write!(f, "extern {}({}) -> {}", ext.name, params.join(", "), ext.ret)?;
            if let Some(intrinsic) = ext.intrinsic {
                write!(f, " [{intrinsic}]")?;
            }
            writeln!(f)?;
        }
        for (i, func) in self.functions.iter().enumerate() {
            let params: Vec<String> = func
                .params
                .iter()
                .map(|(name, ty)| format!("{name}: {ty}"))
                .collect();
            let marker = if i as u32 == self.entry.0 { " [entry]" } else { "" };
            write!(
                f,
                "fn {}({}) -> {}{} = ",
                func.name,
                params.join(", "),
                func.ret,
                marker
            )?;
            self.fmt_expr(f, &func.body)?;
            writeln!(f)?;
        }
        Ok(())
    }
}
