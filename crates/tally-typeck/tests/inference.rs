//! End-to-end type inference over whole programs.

use insta::assert_snapshot;
use tally_typeck::{
    check_program, extract_functions, ConstraintOrigin, Desugarer, Primitives, Ty, TypeError,
    TypeVars, TypedProgram,
};

const NORM: &str = "
(defun norm (x y z) (sqrt (+ (* x x) (* y y) (* z z))))
(defun main () ((norm 30.0 20.0 50.0) (print 1 2 3)))
";

fn main_invocation() -> Ty {
    Ty::Tuple(vec![Ty::void()])
}

fn check_with(
    source: &str,
    entry: &str,
    invocation: Ty,
    primitives: &Primitives,
) -> (Result<TypedProgram, TypeError>, TypeVars) {
    let parse = tally_parser::parse(source);
    assert!(parse.ok(), "{:?}", parse.errors());
    let module = Desugarer::new().desugar(&parse.tree()).unwrap();
    let extracted = extract_functions(module).unwrap();
    let mut vars = TypeVars::new();
    let result = check_program(extracted, entry, &invocation, primitives, &mut vars);
    (result, vars)
}

fn check(source: &str) -> (Result<TypedProgram, TypeError>, TypeVars) {
    check_with(source, "main", main_invocation(), &Primitives::standard())
}

fn signatures(program: &TypedProgram, vars: &TypeVars) -> String {
    program
        .reachable_functions()
        .map(|f| program.describe(f, vars))
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn norm_resolves_to_floats() {
    let (result, vars) = check(NORM);
    let program = result.unwrap();
    assert_eq!(program.entry_type, Ty::void());
    assert_snapshot!(signatures(&program, &vars), @r###"
    main: () -> void
    norm: (float, float, float) -> float
    "###);
}

#[test]
fn every_reachable_slot_is_base() {
    let (result, vars) = check(NORM);
    let program = result.unwrap();
    for stub in program.reachable_functions() {
        let sig = program.signature(stub, &vars).unwrap();
        assert!(sig.is_base(), "{} is {}", stub.name, sig);
    }
}

#[test]
fn lambda_called_by_name() {
    let (result, vars) = check(
        "(defun main () ((apply-twice 2.0) (print 1 2 3)))
         (defun apply-twice (v) (* v (sq v)))
         (defun sq (w) ((lambda (q) q) (* w w)))",
    );
    let program = result.unwrap();
    assert_snapshot!(signatures(&program, &vars), @r###"
    main: () -> void
    apply-twice: (float) -> float
    sq: (float) -> float
    Lambda-1: (float) -> float
    "###);
}

#[test]
fn float_where_int_is_required() {
    let (result, _) = check("(defun main () (print 1 2.0 3))");
    let err = result.unwrap_err();
    assert!(
        matches!(err, TypeError::BaseConflict { .. }),
        "unexpected error: {err}"
    );
    assert!(err.to_string().starts_with("primitive types don't match"));
}

#[test]
fn wrong_argument_count_for_primitive() {
    let (result, _) = check("(defun main () ((sqrt 1.0 2.0) (print 1 2 3)))");
    let err = result.unwrap_err();
    assert!(matches!(
        err,
        TypeError::ArityMismatch {
            expected: 2,
            found: 3,
            origin: ConstraintOrigin::Merge { .. },
        }
    ));
}

#[test]
fn integer_addition_conflicts_with_float_operator() {
    let (result, _) = check("(defun main () ((+ 1 2) (print 1 2 3)))");
    assert!(matches!(result, Err(TypeError::BaseConflict { .. })));
}

#[test]
fn custom_primitive_table() {
    let mut primitives = Primitives::new();
    primitives.insert(tally_typeck::Primitive::new(
        "Operator+",
        vec![tally_typeck::BaseTy::Int, tally_typeck::BaseTy::Int],
        tally_typeck::BaseTy::Int,
    ));
    let (result, vars) = check_with(
        "(defun inc (n) (+ n 1))",
        "inc",
        Ty::signature([Ty::int()], Ty::int()),
        &primitives,
    );
    let program = result.unwrap();
    assert_eq!(signatures(&program, &vars), "inc: (int) -> int");
}

#[test]
fn unresolved_type_is_reported_with_its_name() {
    let (result, _) = check("(defun main () ((mystery 1) (print 1 2 3))) (defun mystery (a) (helper a))");
    let err = result.unwrap_err();
    assert!(matches!(err, TypeError::Unresolved { ref name, .. } if name == "mystery"));
    assert!(
        err.to_string()
            .starts_with("type must be fully resolved: `mystery` is `(int, Unknown-"),
        "{err}"
    );
}

#[test]
fn invocation_mismatch() {
    let (result, _) = check_with(
        NORM,
        "main",
        Ty::Tuple(vec![Ty::int()]),
        &Primitives::standard(),
    );
    assert!(matches!(
        result,
        Err(TypeError::BaseConflict {
            origin: ConstraintOrigin::Invocation { .. },
            ..
        })
    ));
}
