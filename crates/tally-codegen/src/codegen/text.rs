//! A textual SSA backend.
//!
//! `TextBuilder` implements [`InstrBuilder`] by writing one line per
//! instruction. Values are numbered per function: parameters take `%0`
//! upwards and every instruction result takes the next number. Constants
//! are written inline.
//!
//! ```text
//! declare sqrt(float) -> float
//!
//! fn root(%0: float) -> float {
//!   %1 = call float @sqrt(%0)
//!   ret float %1
//! }
//! ```

use std::fmt;

use super::InstrBuilder;
use crate::mir::MirType;

/// An operand: a numbered value or an inline constant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextValue(String);

impl fmt::Display for TextValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A function handle. Externs have no body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextFunction {
    name: String,
    body: Option<usize>,
}

impl TextFunction {
    pub fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug)]
struct Body {
    header: String,
    lines: Vec<String>,
    ret: MirType,
    next_value: usize,
}

#[derive(Debug, Default)]
pub struct TextBuilder {
    declarations: Vec<String>,
    bodies: Vec<Body>,
    current: usize,
}

impl TextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declarations first, then function bodies in the order they were begun.
    pub fn listing(&self) -> String {
        let mut out = String::new();
        for declaration in &self.declarations {
            out.push_str(declaration);
            out.push('\n');
        }
        for (i, body) in self.bodies.iter().enumerate() {
            if i > 0 || !self.declarations.is_empty() {
                out.push('\n');
            }
            out.push_str(&body.header);
            out.push_str(" {\n");
            for line in &body.lines {
                out.push_str("  ");
                out.push_str(line);
                out.push('\n');
            }
            out.push_str("}\n");
        }
        out
    }

    fn body(&mut self) -> &mut Body {
        &mut self.bodies[self.current]
    }

    fn fresh(&mut self) -> TextValue {
        let body = self.body();
        let value = TextValue(format!("%{}", body.next_value));
        body.next_value += 1;
        value
    }

    fn emit(&mut self, line: String) {
        self.body().lines.push(line);
    }

    fn binary(&mut self, op: &str, ty: MirType, lhs: TextValue, rhs: TextValue) -> TextValue {
        let result = self.fresh();
        self.emit(format!("{result} = {op} {ty} {lhs}, {rhs}"));
        result
    }
}

fn join_types(params: &[MirType]) -> String {
    params
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl InstrBuilder for TextBuilder {
    type Value = TextValue;
    type Function = TextFunction;

    fn begin_function(&mut self, name: &str, params: &[MirType], ret: MirType) -> TextFunction {
        let params_text = params
            .iter()
            .enumerate()
            .map(|(i, ty)| format!("%{i}: {ty}"))
            .collect::<Vec<_>>()
            .join(", ");
        self.bodies.push(Body {
            header: format!("fn {name}({params_text}) -> {ret}"),
            lines: Vec::new(),
            ret,
            next_value: params.len(),
        });
        self.current = self.bodies.len() - 1;
        TextFunction {
            name: name.to_string(),
            body: Some(self.current),
        }
    }

    fn position_at_end(&mut self, function: &TextFunction) {
        if let Some(index) = function.body {
            self.current = index;
        }
    }

    fn param(&mut self, _function: &TextFunction, index: usize) -> TextValue {
        TextValue(format!("%{index}"))
    }

    fn declare_extern(&mut self, name: &str, params: &[MirType], ret: MirType) -> TextFunction {
        self.declarations
            .push(format!("declare {name}({}) -> {ret}", join_types(params)));
        TextFunction {
            name: name.to_string(),
            body: None,
        }
    }

    fn const_value(&mut self, _ty: MirType, text: &str) -> TextValue {
        TextValue(text.to_string())
    }

    fn add(&mut self, ty: MirType, lhs: TextValue, rhs: TextValue) -> TextValue {
        self.binary("add", ty, lhs, rhs)
    }

    fn mul(&mut self, ty: MirType, lhs: TextValue, rhs: TextValue) -> TextValue {
        self.binary("mul", ty, lhs, rhs)
    }

    fn neg(&mut self, ty: MirType, operand: TextValue) -> TextValue {
        let result = self.fresh();
        self.emit(format!("{result} = neg {ty} {operand}"));
        result
    }

    fn call(&mut self, callee: &TextFunction, ret: MirType, args: Vec<TextValue>) -> Option<TextValue> {
        let args = args
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        if ret == MirType::Void {
            self.emit(format!("call void @{}({args})", callee.name));
            return None;
        }
        let result = self.fresh();
        self.emit(format!("{result} = call {ret} @{}({args})", callee.name));
        Some(result)
    }

    fn ret(&mut self, value: Option<TextValue>) {
        let line = match value {
            Some(value) => format!("ret {} {value}", self.body().ret),
            None => "ret void".to_string(),
        };
        self.emit(line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    #[test]
    fn values_are_numbered_after_parameters() {
        let mut b = TextBuilder::new();
        let f = b.begin_function("scale", &[MirType::Int, MirType::Int], MirType::Int);
        let x = b.param(&f, 0);
        let y = b.param(&f, 1);
        let two = b.const_value(MirType::Int, "2");
        let sum = b.add(MirType::Int, x, y);
        let product = b.mul(MirType::Int, sum, two);
        let negated = b.neg(MirType::Int, product);
        b.ret(Some(negated));

        assert_snapshot!(b.listing(), @r###"
        fn scale(%0: int, %1: int) -> int {
          %2 = add int %0, %1
          %3 = mul int %2, 2
          %4 = neg int %3
          ret int %4
        }
        "###);
    }

    #[test]
    fn interleaved_functions_keep_their_own_lines() {
        let mut b = TextBuilder::new();
        let outer = b.begin_function("outer", &[], MirType::Void);
        let log = b.declare_extern("log", &[MirType::Float], MirType::Void);
        let inner = b.begin_function("inner", &[], MirType::Float);
        let one = b.const_value(MirType::Float, "1.0");
        b.ret(Some(one));
        b.position_at_end(&outer);
        let value = b.call(&inner, MirType::Float, vec![]);
        assert_eq!(value, Some(TextValue("%0".to_string())));
        assert_eq!(b.call(&log, MirType::Void, value.into_iter().collect()), None);
        b.ret(None);

        assert_snapshot!(b.listing(), @r###"
        declare log(float) -> void

        fn outer() -> void {
          %0 = call float @inner()
          call void @log(%0)
          ret void
        }

        fn inner() -> float {
          ret float 1.0
        }
        "###);
    }
}
