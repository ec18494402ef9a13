//! Parser integration tests: CST shape snapshots and error reporting.

use insta::assert_snapshot;
use proptest::prelude::*;
use tally_common::span::Span;
use tally_parser::ast::Form;
use tally_parser::{debug_tree, parse, AstNode, ParseErrorKind};

fn tree(source: &str) -> String {
    let parse = parse(source);
    assert!(parse.ok(), "unexpected errors: {:?}", parse.errors());
    debug_tree(&parse.syntax())
}

fn first_error(source: &str) -> (ParseErrorKind, Span, Option<Span>) {
    let parse = parse(source);
    let err = parse.errors().first().cloned().expect("expected a parse error");
    (err.kind, err.span, err.related.map(|(_, span)| span))
}

// ── Tree shapes ──────────────────────────────────────────────────────────

#[test]
fn binary_add() {
    assert_snapshot!(tree("(+ 1 2)"), @r###"
    SOURCE_FILE@0..7
      GROUP@0..7
        L_PAREN@0..1 "("
        PLUS@1..2 "+"
        ADD_EXPR@3..6
          LITERAL@3..4
            NUMBER@3..4 "1"
          LITERAL@5..6
            NUMBER@5..6 "2"
        R_PAREN@6..7 ")"
    "###);
}

#[test]
fn three_operand_sum_is_left_nested() {
    assert_snapshot!(tree("(+ 1 2 3)"), @r###"
    SOURCE_FILE@0..9
      GROUP@0..9
        L_PAREN@0..1 "("
        PLUS@1..2 "+"
        ADD_EXPR@3..8
          ADD_EXPR@3..6
            LITERAL@3..4
              NUMBER@3..4 "1"
            LITERAL@5..6
              NUMBER@5..6 "2"
          LITERAL@7..8
            NUMBER@7..8 "3"
        R_PAREN@8..9 ")"
    "###);
}

#[test]
fn subtraction_folds_left_with_negated_tail() {
    assert_snapshot!(tree("(- 5 1 1)"), @r###"
    SOURCE_FILE@0..9
      GROUP@0..9
        L_PAREN@0..1 "("
        MINUS@1..2 "-"
        ADD_EXPR@3..8
          ADD_EXPR@3..6
            LITERAL@3..4
              NUMBER@3..4 "5"
            NEG_EXPR@5..6
              LITERAL@5..6
                NUMBER@5..6 "1"
          NEG_EXPR@7..8
            LITERAL@7..8
              NUMBER@7..8 "1"
        R_PAREN@8..9 ")"
    "###);
}

#[test]
fn call_with_nested_product() {
    assert_snapshot!(tree("(f (* x 2.5))"), @r###"
    SOURCE_FILE@0..13
      GROUP@0..13
        L_PAREN@0..1 "("
        NAME@1..2
          IDENT@1..2 "f"
        GROUP@3..12
          L_PAREN@3..4 "("
          STAR@4..5 "*"
          MUL_EXPR@6..11
            NAME@6..7
              IDENT@6..7 "x"
            LITERAL@8..11
              NUMBER@8..11 "2.5"
          R_PAREN@11..12 ")"
        R_PAREN@12..13 ")"
    "###);
}

#[test]
fn single_operand_is_not_wrapped() {
    assert_snapshot!(tree("(- 5)"), @r###"
    SOURCE_FILE@0..5
      GROUP@0..5
        L_PAREN@0..1 "("
        MINUS@1..2 "-"
        LITERAL@3..4
          NUMBER@3..4 "5"
        R_PAREN@4..5 ")"
    "###);
}

#[test]
fn three_operand_product_is_left_nested() {
    let parse = parse("(* a b c)");
    let file = parse.tree();
    let Some(Form::Group(group)) = file.forms().next() else {
        panic!("expected a group");
    };
    let Some(Form::Mul(outer)) = group.forms().next() else {
        panic!("expected a product");
    };
    assert!(matches!(outer.lhs(), Some(Form::Mul(_))));
    assert_eq!(outer.rhs().and_then(|f| f.as_name()), Some("c".to_string()));
}

#[test]
fn deeply_nested_groups_parse() {
    let depth = 2_000;
    let source = format!("{}x{}", "(".repeat(depth), ")".repeat(depth));
    let parse = parse(&source);
    assert!(parse.ok(), "{:?}", parse.errors());
    assert_eq!(usize::from(parse.syntax().text_range().len()), source.len());
}

#[test]
fn typed_accessors_report_source_spans() {
    let parse = parse("  (norm 30.0)");
    let file = parse.tree();
    let group = match file.forms().next() {
        Some(Form::Group(g)) => g,
        other => panic!("expected a group, got {other:?}"),
    };
    assert_eq!(group.span(), Span::new(2, 13));
    assert_eq!(group.l_paren_span(), Some(Span::new(2, 3)));
    let forms: Vec<Form> = group.forms().collect();
    assert_eq!(forms.len(), 2);
    assert_eq!(forms[0].as_name().as_deref(), Some("norm"));
    match &forms[1] {
        Form::Literal(lit) => {
            assert_eq!(lit.text(), "30.0");
            assert_eq!(lit.span(), Span::new(8, 12));
        }
        other => panic!("expected a literal, got {other:?}"),
    }
}

#[test]
fn several_top_level_forms() {
    let parse = parse("(defun f (x) x)\n(f 1)\n");
    assert!(parse.ok());
    assert_eq!(parse.tree().forms().count(), 2);
}

#[test]
fn empty_source_is_an_empty_module() {
    let parse = parse("");
    assert!(parse.ok());
    assert_eq!(parse.tree().forms().count(), 0);
}

// ── Errors ───────────────────────────────────────────────────────────────

#[test]
fn unclosed_group_points_at_open_paren() {
    let (kind, span, related) = first_error("(f 1");
    assert_eq!(kind, ParseErrorKind::UnclosedGroup);
    assert_eq!(span, Span::new(4, 4));
    assert_eq!(related, Some(Span::new(0, 1)));
}

#[test]
fn operator_running_into_eof() {
    let (kind, span, related) = first_error("(+ 1 2");
    assert_eq!(kind, ParseErrorKind::UnterminatedOperator);
    assert_eq!(span, Span::new(6, 6));
    assert_eq!(related, Some(Span::new(1, 2)));
}

#[test]
fn operator_without_operands() {
    let (kind, span, _) = first_error("(+)");
    assert_eq!(kind, ParseErrorKind::MissingOperand);
    assert_eq!(span, Span::new(2, 3));
}

#[test]
fn stray_close_paren() {
    let (kind, span, _) = first_error("(f))");
    assert_eq!(kind, ParseErrorKind::UnexpectedCloseParen);
    assert_eq!(span, Span::new(3, 4));
}

#[test]
fn only_the_first_error_is_reported() {
    let parse = parse(") (+");
    assert_eq!(parse.errors().len(), 1);
    assert_eq!(parse.errors()[0].kind, ParseErrorKind::UnexpectedCloseParen);
}

#[test]
fn tree_is_built_up_to_the_error() {
    let parse = parse("(f 1");
    assert!(!parse.ok());
    assert_eq!(parse.syntax().to_string(), "(f 1");
}

// ── Properties ───────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn successful_parse_is_lossless(
        pieces in proptest::collection::vec(
            prop_oneof![
                Just("("), Just(")"), Just(" "), Just("\n"),
                Just("x"), Just("1.5"), Just("+"), Just("-"), Just("*"),
            ],
            0..30,
        )
    ) {
        let source = pieces.concat();
        let parse = parse(&source);
        prop_assert!(parse.errors().len() <= 1);
        if parse.ok() {
            prop_assert_eq!(parse.syntax().to_string(), source);
        }
    }
}
