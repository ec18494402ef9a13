use insta::assert_snapshot;
use proptest::prelude::*;
use tally_lexer::Lexer;

/// One line per token: kind, text and span.
fn tokenize_snapshot(source: &str) -> String {
    Lexer::tokenize(source)
        .into_iter()
        .map(|tok| {
            format!(
                "{:?} {:?} {}..{}",
                tok.kind,
                tok.text(source),
                tok.span.start,
                tok.span.end
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn texts(source: &str) -> Vec<String> {
    Lexer::tokenize(source)
        .iter()
        .map(|tok| tok.text(source).to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

// ── Inline tests ─────────────────────────────────────────────────────────

#[test]
fn test_defun_form() {
    assert_snapshot!(tokenize_snapshot("(defun f (x) (+ x 1))"), @r###"
    LParen "(" 0..1
    Ident "defun" 1..6
    Ident "f" 7..8
    LParen "(" 9..10
    Ident "x" 10..11
    RParen ")" 11..12
    LParen "(" 13..14
    Plus "+" 14..15
    Ident "x" 16..17
    Number "1" 18..19
    RParen ")" 19..20
    RParen ")" 20..21
    Eof "" 21..21
    "###);
}

#[test]
fn test_operators_and_numbers() {
    assert_snapshot!(tokenize_snapshot("- * 0.5 1.2.3 Operator+"), @r###"
    Minus "-" 0..1
    Star "*" 2..3
    Number "0.5" 4..7
    Number "1.2.3" 8..13
    Ident "Operator+" 14..23
    Eof "" 23..23
    "###);
}

#[test]
fn test_newlines_and_tabs_are_whitespace() {
    assert_eq!(texts("(norm\n\t30.0  20.0)"), vec!["(", "norm", "30.0", "20.0", ")"]);
}

#[test]
fn test_glued_parens() {
    assert_eq!(
        texts("(defun main()((norm 1)))"),
        vec!["(", "defun", "main", "(", ")", "(", "(", "norm", "1", ")", ")", ")"]
    );
}

// ── Properties ───────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn lexing_is_total(source in any::<String>()) {
        let tokens = Lexer::tokenize(&source);
        prop_assert!(!tokens.is_empty());
        prop_assert_eq!(tokens.last().map(|t| t.kind), Some(tally_common::TokenKind::Eof));
    }

    #[test]
    fn rejoined_tokens_relex_identically(
        source in proptest::collection::vec(
            prop_oneof![
                Just("(".to_string()),
                Just(")".to_string()),
                Just(" ".to_string()),
                Just("\n".to_string()),
                "[a-z+*.0-9-]{1,4}",
            ],
            0..40,
        )
    ) {
        let source = source.concat();
        let first = texts(&source);
        let rejoined = first.join(" ");
        prop_assert_eq!(texts(&rejoined), first);
    }
}
