use serde::Serialize;

use crate::literal::classify_number;
use crate::span::Span;

/// A token produced by the Tally lexer.
///
/// Tokens do not own their text; slice the source with [`Token::text`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, start: u32, end: u32) -> Self {
        Self {
            kind,
            span: Span::new(start, end),
        }
    }

    /// The slice of `source` this token covers.
    pub fn text<'src>(&self, source: &'src str) -> &'src str {
        &source[self.span.to_range()]
    }
}

/// Every kind of token in Tally.
///
/// The language only knows parentheses and bare words. Words are classified
/// up front so the parser can dispatch on the kind alone: the three operator
/// heads, numeric literals, and everything else as identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// The word `+`.
    Plus,
    /// The word `-`.
    Minus,
    /// The word `*`.
    Star,
    /// A word made only of digits and `.`.
    Number,
    /// Any other word.
    Ident,
    /// End of input. Always the last token.
    Eof,
}

impl TokenKind {
    /// Classify a bare word (never a parenthesis, never empty).
    pub fn of_word(word: &str) -> TokenKind {
        match word {
            "+" => TokenKind::Plus,
            "-" => TokenKind::Minus,
            "*" => TokenKind::Star,
            w if classify_number(w).is_some() => TokenKind::Number,
            _ => TokenKind::Ident,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_words() {
        assert_eq!(TokenKind::of_word("+"), TokenKind::Plus);
        assert_eq!(TokenKind::of_word("-"), TokenKind::Minus);
        assert_eq!(TokenKind::of_word("*"), TokenKind::Star);
        assert_eq!(TokenKind::of_word("++"), TokenKind::Ident);
    }

    #[test]
    fn number_words() {
        assert_eq!(TokenKind::of_word("42"), TokenKind::Number);
        assert_eq!(TokenKind::of_word("0.5"), TokenKind::Number);
        assert_eq!(TokenKind::of_word("1.2.3"), TokenKind::Number);
        assert_eq!(TokenKind::of_word("x1"), TokenKind::Ident);
        assert_eq!(TokenKind::of_word("-1"), TokenKind::Ident);
    }

    #[test]
    fn token_text_slices_source() {
        let src = "(sqrt x)";
        let tok = Token::new(TokenKind::Ident, 1, 5);
        assert_eq!(tok.text(src), "sqrt");
    }
}
