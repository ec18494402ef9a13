//! Shared types for the Tally compiler: byte spans, tokens, the lexical
//! classification of numeric literals, and stack growth for the recursive
//! passes.

pub mod literal;
pub mod span;
pub mod stack;
pub mod token;

pub use literal::{classify_number, NumberForm};
pub use span::Span;
pub use stack::ensure_sufficient_stack;
pub use token::{Token, TokenKind};
