//! Compiler configuration: invocation signatures and primitive tables.
//!
//! A primitive table is a TOML file of `[[primitive]]` entries:
//!
//! ```toml
//! # Start from the standard table (the default) or from nothing.
//! standard = true
//!
//! [[primitive]]
//! name = "Operator+"
//! params = ["int", "int"]
//! ret = "int"
//! intrinsic = "add"
//! ```
//!
//! Entries replace standard primitives of the same name.

use std::fmt;
use std::path::Path;

use serde::Deserialize;
use tally_typeck::{BaseTy, Intrinsic, Primitive, Primitives, Ty};

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    Io { path: String, message: String },
    Toml(String),
    UnknownType { primitive: String, name: String },
    UnknownIntrinsic { primitive: String, name: String },
    IntrinsicArity {
        primitive: String,
        intrinsic: Intrinsic,
        found: usize,
    },
    InvalidSignature { text: String, reason: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, message } => write!(f, "failed to read {path}: {message}"),
            ConfigError::Toml(message) => write!(f, "failed to parse primitive table: {message}"),
            ConfigError::UnknownType { primitive, name } => {
                write!(f, "primitive `{primitive}` uses unknown type `{name}`")
            }
            ConfigError::UnknownIntrinsic { primitive, name } => {
                write!(f, "primitive `{primitive}` names unknown intrinsic `{name}`")
            }
            ConfigError::IntrinsicArity {
                primitive,
                intrinsic,
                found,
            } => write!(
                f,
                "primitive `{primitive}` is `{intrinsic}`, which takes {} operands, but declares {found}",
                intrinsic.arity()
            ),
            ConfigError::InvalidSignature { text, reason } => {
                write!(f, "invalid signature `{text}`: {reason}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ── Primitive tables ─────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PrimitiveFile {
    #[serde(default = "default_true")]
    standard: bool,
    #[serde(default)]
    primitive: Vec<PrimitiveEntry>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PrimitiveEntry {
    name: String,
    #[serde(default)]
    params: Vec<String>,
    ret: String,
    #[serde(default)]
    intrinsic: Option<String>,
}

impl PrimitiveEntry {
    fn into_primitive(self) -> Result<Primitive, ConfigError> {
        let base = |name: &str| {
            BaseTy::from_name(name).ok_or_else(|| ConfigError::UnknownType {
                primitive: self.name.clone(),
                name: name.to_string(),
            })
        };
        let params = self
            .params
            .iter()
            .map(|p| base(p.as_str()))
            .collect::<Result<Vec<_>, _>>()?;
        let ret = base(self.ret.as_str())?;

        let mut primitive = Primitive::new(self.name.clone(), params, ret);
        if let Some(name) = &self.intrinsic {
            let intrinsic =
                Intrinsic::from_name(name).ok_or_else(|| ConfigError::UnknownIntrinsic {
                    primitive: self.name.clone(),
                    name: name.clone(),
                })?;
            if intrinsic.arity() != primitive.params.len() {
                return Err(ConfigError::IntrinsicArity {
                    primitive: self.name.clone(),
                    intrinsic,
                    found: primitive.params.len(),
                });
            }
            primitive = primitive.with_intrinsic(intrinsic);
        }
        Ok(primitive)
    }
}

/// Parse a primitive table from TOML text.
pub fn parse_primitives(content: &str) -> Result<Primitives, ConfigError> {
    let file: PrimitiveFile =
        toml::from_str(content).map_err(|e| ConfigError::Toml(e.to_string()))?;
    let mut table = if file.standard {
        Primitives::standard()
    } else {
        Primitives::new()
    };
    for entry in file.primitive {
        table.insert(entry.into_primitive()?);
    }
    Ok(table)
}

/// Read and parse a primitive table file.
pub fn load_primitives(path: &Path) -> Result<Primitives, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    parse_primitives(&content)
}

// ── Signatures ───────────────────────────────────────────────────────

/// Parse `(t1, t2, ...) -> ret` into the signature tuple `(t1, t2, ..., ret)`.
pub fn parse_signature(text: &str) -> Result<Ty, ConfigError> {
    let invalid = |reason| ConfigError::InvalidSignature {
        text: text.to_string(),
        reason,
    };

    let (params, ret) = text
        .split_once("->")
        .ok_or_else(|| invalid("expected `(params) -> ret`"))?;
    let params = params
        .trim()
        .strip_prefix('(')
        .and_then(|p| p.strip_suffix(')'))
        .ok_or_else(|| invalid("parameters must be parenthesized"))?;

    let base = |name: &str| {
        BaseTy::from_name(name.trim())
            .map(Ty::Base)
            .ok_or_else(|| invalid("types are `int`, `float` or `void`"))
    };

    let mut slots = Vec::new();
    if !params.trim().is_empty() {
        for param in params.split(',') {
            slots.push(base(param)?);
        }
    }
    slots.push(base(ret)?);
    Ok(Ty::Tuple(slots))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signatures() {
        assert_eq!(
            parse_signature("() -> void").unwrap(),
            Ty::Tuple(vec![Ty::void()])
        );
        assert_eq!(
            parse_signature("(float, float) -> float").unwrap(),
            Ty::signature([Ty::float(), Ty::float()], Ty::float())
        );
        assert_eq!(
            parse_signature(" ( int ) ->int ").unwrap(),
            Ty::signature([Ty::int()], Ty::int())
        );
    }

    #[test]
    fn bad_signatures() {
        assert!(matches!(
            parse_signature("float -> float"),
            Err(ConfigError::InvalidSignature { .. })
        ));
        assert!(matches!(
            parse_signature("(float)"),
            Err(ConfigError::InvalidSignature { .. })
        ));
        let err = parse_signature("(bool) -> void").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid signature `(bool) -> void`: types are `int`, `float` or `void`"
        );
        assert!(parse_signature("(float,) -> void").is_err());
    }

    #[test]
    fn table_extends_standard() {
        let table = parse_primitives(
            r#"
[[primitive]]
name = "Operator+"
params = ["int", "int"]
ret = "int"
intrinsic = "add"

[[primitive]]
name = "emit"
params = ["float"]
ret = "void"
"#,
        )
        .unwrap();
        let add = table.get("Operator+").unwrap();
        assert_eq!(add.params, vec![BaseTy::Int, BaseTy::Int]);
        assert_eq!(add.intrinsic, Some(Intrinsic::Add));
        assert!(table.get("sqrt").is_some());
        assert_eq!(table.get("emit").unwrap().ret, BaseTy::Void);
    }

    #[test]
    fn table_from_scratch() {
        let table = parse_primitives(
            r#"
standard = false

[[primitive]]
name = "tick"
ret = "void"
"#,
        )
        .unwrap();
        assert_eq!(table.len(), 1);
        assert!(table.get("tick").unwrap().params.is_empty());
    }

    #[test]
    fn table_errors() {
        let err = parse_primitives(
            r#"
[[primitive]]
name = "half"
params = ["double"]
ret = "float"
"#,
        )
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnknownType {
                primitive: "half".to_string(),
                name: "double".to_string(),
            }
        );

        let err = parse_primitives(
            r#"
[[primitive]]
name = "Operator-"
params = ["int", "int"]
ret = "int"
intrinsic = "neg"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::IntrinsicArity { found: 2, .. }));

        let err = parse_primitives(
            r#"
[[primitive]]
name = "x"
ret = "int"
intrinsic = "div"
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownIntrinsic { .. }));

        assert!(matches!(
            parse_primitives("[[primitive]]\nname = 3"),
            Err(ConfigError::Toml(_))
        ));
    }
}
