//! Type resolution: Ty -> MirType conversion.
//!
//! Only base types exist at the MIR level. Signature tuples and unresolved
//! variables have no MIR counterpart; callers turn `None` into an error.

use std::fmt;

use tally_typeck::{BaseTy, Ty};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MirType {
    Int,
    Float,
    Void,
}

impl From<BaseTy> for MirType {
    fn from(base: BaseTy) -> Self {
        match base {
            BaseTy::Int => MirType::Int,
            BaseTy::Float => MirType::Float,
            BaseTy::Void => MirType::Void,
        }
    }
}

impl fmt::Display for MirType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MirType::Int => "int",
            MirType::Float => "float",
            MirType::Void => "void",
        })
    }
}

/// Convert a resolved type to a `MirType`, if it is a single base type.
pub fn resolve_type(ty: &Ty) -> Option<MirType> {
    ty.as_base().map(MirType::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_types_convert() {
        assert_eq!(resolve_type(&Ty::float()), Some(MirType::Float));
        assert_eq!(resolve_type(&Ty::void()), Some(MirType::Void));
    }

    #[test]
    fn tuples_and_variables_do_not() {
        assert_eq!(resolve_type(&Ty::Tuple(vec![Ty::int()])), None);
        assert_eq!(resolve_type(&Ty::Var(tally_typeck::TyVar(0))), None);
    }
}
