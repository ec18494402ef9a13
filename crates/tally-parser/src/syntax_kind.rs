//! SyntaxKind enum for the Tally CST.
//!
//! Token kinds are mapped 1:1 from [`TokenKind`]; node kinds are the
//! composite shapes the parser produces.

use tally_common::token::TokenKind;

/// Every kind of syntax element in the Tally CST.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
#[allow(non_camel_case_types)]
pub enum SyntaxKind {
    // ── Sentinels ──────────────────────────────────────────────────────
    /// Placeholder kind for events that were opened but never closed.
    TOMBSTONE = 0,
    /// Wrapper for tokens that couldn't be parsed.
    ERROR_NODE,

    // ── Tokens ─────────────────────────────────────────────────────────
    L_PAREN,
    R_PAREN,
    PLUS,
    MINUS,
    STAR,
    NUMBER,
    IDENT,
    EOF,
    /// Source text between tokens. Never produced by the lexer; the tree
    /// builder fills gaps with it so node ranges match source offsets.
    WHITESPACE,

    // ── Nodes ──────────────────────────────────────────────────────────
    /// Root node: the module holding every top-level form.
    SOURCE_FILE,
    /// `( form* )` -- a call, a sequence, or a declaration before desugaring.
    GROUP,
    /// Binary addition produced by folding `+` (and `-`) operands.
    ADD_EXPR,
    /// Binary multiplication produced by folding `*` operands.
    MUL_EXPR,
    /// Unary negation of a `-` operand after the first.
    NEG_EXPR,
    /// Numeric literal wrapping a `NUMBER` token.
    LITERAL,
    /// Identifier wrapping an `IDENT` token.
    NAME,

    #[doc(hidden)]
    __LAST,
}

impl SyntaxKind {
    pub fn is_token(self) -> bool {
        matches!(
            self,
            SyntaxKind::L_PAREN
                | SyntaxKind::R_PAREN
                | SyntaxKind::PLUS
                | SyntaxKind::MINUS
                | SyntaxKind::STAR
                | SyntaxKind::NUMBER
                | SyntaxKind::IDENT
                | SyntaxKind::EOF
                | SyntaxKind::WHITESPACE
        )
    }
}

impl From<TokenKind> for SyntaxKind {
    fn from(kind: TokenKind) -> Self {
        match kind {
            TokenKind::LParen => SyntaxKind::L_PAREN,
            TokenKind::RParen => SyntaxKind::R_PAREN,
            TokenKind::Plus => SyntaxKind::PLUS,
            TokenKind::Minus => SyntaxKind::MINUS,
            TokenKind::Star => SyntaxKind::STAR,
            TokenKind::Number => SyntaxKind::NUMBER,
            TokenKind::Ident => SyntaxKind::IDENT,
            TokenKind::Eof => SyntaxKind::EOF,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_kinds_map_to_token_syntax_kinds() {
        for kind in [
            TokenKind::LParen,
            TokenKind::RParen,
            TokenKind::Plus,
            TokenKind::Minus,
            TokenKind::Star,
            TokenKind::Number,
            TokenKind::Ident,
            TokenKind::Eof,
        ] {
            assert!(SyntaxKind::from(kind).is_token(), "{kind:?}");
        }
    }

    #[test]
    fn node_kinds_are_not_tokens() {
        assert!(!SyntaxKind::GROUP.is_token());
        assert!(!SyntaxKind::ADD_EXPR.is_token());
        assert!(!SyntaxKind::SOURCE_FILE.is_token());
    }
}
