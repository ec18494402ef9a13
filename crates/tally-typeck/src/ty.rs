//! Type representation for Tally.
//!
//! A type is a base type (`int`, `float`, `void`), an inference variable, or
//! a tuple. Function signatures are tuples whose last slot is the return
//! type: `(float, float) -> float` is `(float, float, float)`.

use std::fmt;

use rustc_hash::FxHashMap;

/// A type variable, identified by its index in the unification table.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TyVar(pub u32);

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BaseTy {
    Int,
    Float,
    Void,
}

impl BaseTy {
    pub fn from_name(name: &str) -> Option<BaseTy> {
        match name {
            "int" => Some(BaseTy::Int),
            "float" => Some(BaseTy::Float),
            "void" => Some(BaseTy::Void),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BaseTy::Int => "int",
            BaseTy::Float => "float",
            BaseTy::Void => "void",
        }
    }
}

impl fmt::Display for BaseTy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Ty {
    Base(BaseTy),
    Var(TyVar),
    Tuple(Vec<Ty>),
}

impl Ty {
    pub fn int() -> Ty {
        Ty::Base(BaseTy::Int)
    }

    pub fn float() -> Ty {
        Ty::Base(BaseTy::Float)
    }

    pub fn void() -> Ty {
        Ty::Base(BaseTy::Void)
    }

    /// Signature tuple `(params..., ret)`.
    pub fn signature(params: impl IntoIterator<Item = Ty>, ret: Ty) -> Ty {
        let mut slots: Vec<Ty> = params.into_iter().collect();
        slots.push(ret);
        Ty::Tuple(slots)
    }

    /// True when no type variable occurs anywhere in the type.
    pub fn is_base(&self) -> bool {
        match self {
            Ty::Base(_) => true,
            Ty::Var(_) => false,
            Ty::Tuple(elems) => elems.iter().all(Ty::is_base),
        }
    }

    pub fn as_base(&self) -> Option<BaseTy> {
        match self {
            Ty::Base(b) => Some(*b),
            _ => None,
        }
    }

    /// Split a signature tuple into its parameters and return slot.
    pub fn split_signature(&self) -> Option<(&[Ty], &Ty)> {
        match self {
            Ty::Tuple(slots) => slots.split_last().map(|(ret, params)| (params, ret)),
            _ => None,
        }
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Base(b) => write!(f, "{b}"),
            Ty::Var(v) => write!(f, "?{}", v.0),
            Ty::Tuple(elems) => {
                write!(f, "(")?;
                for (i, e) in elems.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{e}")?;
                }
                write!(f, ")")
            }
        }
    }
}

/// The identity a type variable was created for.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum VarName {
    /// An anonymous intermediate result.
    Fresh(u32),
    /// A parameter, scoped by the function that declares it.
    Param { function: String, name: String },
    /// A function, operator or primitive name shared by the whole program.
    Global(String),
}

impl VarName {
    pub fn param(function: impl Into<String>, name: impl Into<String>) -> Self {
        VarName::Param {
            function: function.into(),
            name: name.into(),
        }
    }

    pub fn global(name: impl Into<String>) -> Self {
        VarName::Global(name.into())
    }
}

impl fmt::Display for VarName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VarName::Fresh(n) => write!(f, "Unknown-{n}"),
            VarName::Param { function, name } => write!(f, "{function}.{name}"),
            VarName::Global(name) => f.write_str(name),
        }
    }
}

/// Interner handing out one `TyVar` per `VarName`, per compilation.
///
/// Asking twice for the same name yields the same variable, which is how
/// a call site in one function and the definition in another end up
/// constraining the same type.
#[derive(Debug, Default)]
pub struct TypeVars {
    by_name: FxHashMap<VarName, TyVar>,
    names: Vec<VarName>,
    fresh_counter: u32,
}

impl TypeVars {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, name: VarName) -> TyVar {
        if let Some(var) = self.by_name.get(&name) {
            return *var;
        }
        let var = TyVar(self.names.len() as u32);
        self.names.push(name.clone());
        self.by_name.insert(name, var);
        var
    }

    /// A new anonymous variable.
    pub fn fresh(&mut self) -> TyVar {
        self.fresh_counter += 1;
        self.intern(VarName::Fresh(self.fresh_counter))
    }

    pub fn param(&mut self, function: &str, name: &str) -> TyVar {
        self.intern(VarName::param(function, name))
    }

    pub fn global(&mut self, name: &str) -> TyVar {
        self.intern(VarName::global(name))
    }

    /// Look up a variable without creating it.
    pub fn get(&self, name: &VarName) -> Option<TyVar> {
        self.by_name.get(name).copied()
    }

    pub fn name_of(&self, var: TyVar) -> Option<&VarName> {
        self.names.get(var.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Render a type with variables replaced by their names.
    pub fn display(&self, ty: &Ty) -> String {
        match ty {
            Ty::Base(b) => b.to_string(),
            Ty::Var(v) => match self.name_of(*v) {
                Some(name) => name.to_string(),
                None => format!("?{}", v.0),
            },
            Ty::Tuple(elems) => {
                let inner: Vec<String> = elems.iter().map(|e| self.display(e)).collect();
                format!("({})", inner.join(", "))
            }
        }
    }
}

// ── ena trait implementations ──────────────────────────────────────────

impl ena::unify::UnifyKey for TyVar {
    type Value = Option<Ty>;

    fn index(&self) -> u32 {
        self.0
    }

    fn from_index(u: u32) -> Self {
        TyVar(u)
    }

    fn tag() -> &'static str {
        "TyVar"
    }
}

impl ena::unify::EqUnifyValue for Ty {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tuple_is_base_only_when_every_slot_is() {
        assert!(Ty::signature([Ty::float(), Ty::int()], Ty::void()).is_base());
        assert!(!Ty::Tuple(vec![Ty::float(), Ty::Var(TyVar(0))]).is_base());
        assert!(Ty::Tuple(vec![]).is_base());
        assert!(!Ty::Var(TyVar(3)).is_base());
    }

    #[test]
    fn interner_memoizes_names() {
        let mut vars = TypeVars::new();
        let a = vars.global("norm");
        let b = vars.param("norm", "x");
        let c = vars.param("main", "x");
        assert_eq!(vars.global("norm"), a);
        assert_ne!(b, c);
        assert_ne!(vars.fresh(), vars.fresh());
    }

    #[test]
    fn variable_names_render() {
        let mut vars = TypeVars::new();
        let x = vars.param("norm", "x");
        let u = vars.fresh();
        let ty = Ty::signature([Ty::Var(x)], Ty::Var(u));
        assert_eq!(vars.display(&ty), "(norm.x, Unknown-1)");
        assert_eq!(ty.to_string(), "(?0, ?1)");
    }

    #[test]
    fn split_signature_separates_return_slot() {
        let sig = Ty::signature([Ty::int(), Ty::float()], Ty::void());
        let (params, ret) = sig.split_signature().unwrap();
        assert_eq!(params, &[Ty::int(), Ty::float()]);
        assert_eq!(ret, &Ty::void());
        assert!(Ty::int().split_signature().is_none());
    }
}
