// Tally lexer -- splits source text into parentheses and bare words.

mod cursor;

use cursor::Cursor;
use tally_common::token::{Token, TokenKind};

/// The Tally lexer. Converts source text into a stream of tokens.
///
/// Whitespace separates words; `(` and `)` are always tokens of their own,
/// even when glued to a word (`main()` is three tokens). There are no
/// comments, escapes or string literals, so lexing never fails: every input
/// produces a token sequence ending in [`TokenKind::Eof`].
pub struct Lexer<'src> {
    cursor: Cursor<'src>,
    emitted_eof: bool,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            cursor: Cursor::new(source),
            emitted_eof: false,
        }
    }

    /// Tokenize the entire source. The result always ends with `Eof`.
    pub fn tokenize(source: &str) -> Vec<Token> {
        Lexer::new(source).collect()
    }

    fn next_token(&mut self) -> Token {
        self.cursor.eat_while(char::is_whitespace);
        let start = self.cursor.pos();

        let Some(c) = self.cursor.peek() else {
            return Token::new(TokenKind::Eof, start, start);
        };

        match c {
            '(' => self.single_char_token(TokenKind::LParen, start),
            ')' => self.single_char_token(TokenKind::RParen, start),
            _ => self.lex_word(start),
        }
    }

    fn single_char_token(&mut self, kind: TokenKind, start: u32) -> Token {
        self.cursor.advance();
        Token::new(kind, start, self.cursor.pos())
    }

    /// A word runs until whitespace or a parenthesis.
    fn lex_word(&mut self, start: u32) -> Token {
        self.cursor
            .eat_while(|c| !c.is_whitespace() && c != '(' && c != ')');
        let end = self.cursor.pos();
        let kind = TokenKind::of_word(self.cursor.slice(start, end));
        Token::new(kind, start, end)
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if self.emitted_eof {
            return None;
        }
        let token = self.next_token();
        if token.kind == TokenKind::Eof {
            self.emitted_eof = true;
        }
        Some(token)
    }
}
