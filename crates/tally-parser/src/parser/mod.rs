//! Event-based parser for Tally.
//!
//! Parse functions call `open()` to start a node, `advance()` to consume a
//! token and `close()` to finish a node with its kind. Events are collected
//! into a flat list and turned into a rowan green tree by `build_tree()`.
//!
//! `open_before()` wraps an already completed node in a new parent using a
//! forward-parent link. Operator forms rely on it to fold their operands
//! left-to-right: `(+ a b c)` becomes `ADD_EXPR(ADD_EXPR(a, b), c)` without
//! knowing the operand count up front.
//!
//! Errors follow a first-error-only strategy: once an error is recorded,
//! parse functions stop consuming tokens and unwind, closing every node they
//! opened so the event list stays balanced.

pub(crate) mod forms;

use tally_common::span::Span;
use tally_common::token::Token;

use crate::error::{ParseError, ParseErrorKind};
use crate::syntax_kind::SyntaxKind;

#[derive(Debug)]
enum Event {
    /// Start a node. `kind` is TOMBSTONE until `close()` patches it.
    Open {
        kind: SyntaxKind,
        forward_parent: Option<usize>,
    },
    Close,
    /// Consume the next token.
    Advance,
}

/// A started but not yet closed node.
#[derive(Debug, Clone, Copy)]
pub(crate) struct MarkOpened {
    index: usize,
}

/// A completed node, which `open_before()` can wrap.
#[derive(Debug, Clone, Copy)]
pub(crate) struct MarkClosed {
    index: usize,
}

pub(crate) struct Parser<'src> {
    /// All tokens from the lexer, ending with `Eof`.
    tokens: Vec<Token>,
    pos: usize,
    events: Vec<Event>,
    source: &'src str,
    errors: Vec<ParseError>,
}

impl<'src> Parser<'src> {
    pub(crate) fn new(tokens: Vec<Token>, source: &'src str) -> Self {
        Self {
            tokens,
            pos: 0,
            events: Vec::new(),
            source,
            errors: Vec::new(),
        }
    }

    // ── Lookahead ──────────────────────────────────────────────────────

    pub(crate) fn current(&self) -> SyntaxKind {
        self.tokens
            .get(self.pos)
            .map_or(SyntaxKind::EOF, |tok| SyntaxKind::from(tok.kind))
    }

    pub(crate) fn at(&self, kind: SyntaxKind) -> bool {
        self.current() == kind
    }

    pub(crate) fn current_span(&self) -> Span {
        match self.tokens.get(self.pos) {
            Some(tok) => tok.span,
            None => Span::empty_at(self.source.len() as u32),
        }
    }

    // ── Node management ────────────────────────────────────────────────

    pub(crate) fn open(&mut self) -> MarkOpened {
        let mark = MarkOpened {
            index: self.events.len(),
        };
        self.events.push(Event::Open {
            kind: SyntaxKind::TOMBSTONE,
            forward_parent: None,
        });
        mark
    }

    /// Start a node that will become the parent of `completed`.
    pub(crate) fn open_before(&mut self, completed: MarkClosed) -> MarkOpened {
        let mark = self.open();
        if let Event::Open { forward_parent, .. } = &mut self.events[completed.index] {
            *forward_parent = Some(mark.index);
        }
        mark
    }

    pub(crate) fn close(&mut self, m: MarkOpened, kind: SyntaxKind) -> MarkClosed {
        if let Event::Open {
            kind: slot_kind, ..
        } = &mut self.events[m.index]
        {
            *slot_kind = kind;
        }
        self.events.push(Event::Close);
        MarkClosed { index: m.index }
    }

    /// Consume the current token. `Eof` is never consumed.
    pub(crate) fn advance(&mut self) {
        if !self.at(SyntaxKind::EOF) {
            self.events.push(Event::Advance);
            self.pos += 1;
        }
    }

    // ── Errors ─────────────────────────────────────────────────────────

    pub(crate) fn error(&mut self, kind: ParseErrorKind) {
        let span = self.current_span();
        self.errors.push(ParseError::new(kind, span));
    }

    pub(crate) fn error_with_related(
        &mut self,
        kind: ParseErrorKind,
        related_span: Span,
        related_msg: &str,
    ) {
        let span = self.current_span();
        self.errors
            .push(ParseError::with_related(kind, span, related_msg, related_span));
    }

    pub(crate) fn has_error(&self) -> bool {
        !self.errors.is_empty()
    }

    // ── Tree building ──────────────────────────────────────────────────

    /// Convert the collected events into a green tree.
    ///
    /// An Open event with a forward parent starts the whole chain of
    /// wrappers first (outermost first), then the node itself. The wrapper
    /// events are turned into tombstones so they are skipped when reached.
    ///
    /// Gaps between tokens become `WHITESPACE` tokens placed before any node
    /// that starts at the following token, so every node's text range is its
    /// source span.
    pub(crate) fn build_tree(mut self) -> (rowan::GreenNode, Vec<ParseError>) {
        let mut builder = rowan::GreenNodeBuilder::new();
        let mut token_pos = 0usize;
        let mut text_pos = 0usize;
        let mut depth = 0usize;
        let mut chain: Vec<SyntaxKind> = Vec::new();

        for i in 0..self.events.len() {
            match std::mem::replace(&mut self.events[i], Event::Close) {
                Event::Open {
                    kind,
                    forward_parent,
                } => {
                    chain.clear();
                    chain.push(kind);
                    let mut next = forward_parent;
                    while let Some(idx) = next {
                        let Event::Open {
                            kind: parent_kind,
                            forward_parent: parent_fp,
                        } = self.events[idx]
                        else {
                            unreachable!("forward parent must point at an Open event");
                        };
                        chain.push(parent_kind);
                        self.events[idx] = Event::Open {
                            kind: SyntaxKind::TOMBSTONE,
                            forward_parent: None,
                        };
                        next = parent_fp;
                    }
                    if depth > 0 {
                        self.whitespace_until(&mut builder, &mut text_pos, token_pos);
                    }
                    for kind in chain.iter().rev() {
                        if *kind != SyntaxKind::TOMBSTONE {
                            builder.start_node(rowan::SyntaxKind(*kind as u16));
                            depth += 1;
                        }
                    }
                }
                Event::Close => {
                    if depth == 1 {
                        self.whitespace_until(&mut builder, &mut text_pos, token_pos);
                    }
                    builder.finish_node();
                    depth = depth.saturating_sub(1);
                }
                Event::Advance => {
                    self.whitespace_until(&mut builder, &mut text_pos, token_pos);
                    let token = &self.tokens[token_pos];
                    let kind = SyntaxKind::from(token.kind);
                    builder.token(rowan::SyntaxKind(kind as u16), token.text(self.source));
                    text_pos = token.span.end as usize;
                    token_pos += 1;
                }
            }
        }

        (builder.finish(), self.errors)
    }

    /// Emit the source text between `text_pos` and the start of the token at
    /// `token_pos` as a `WHITESPACE` token.
    fn whitespace_until(
        &self,
        builder: &mut rowan::GreenNodeBuilder<'static>,
        text_pos: &mut usize,
        token_pos: usize,
    ) {
        let next_start = self
            .tokens
            .get(token_pos)
            .map_or(self.source.len(), |tok| tok.span.start as usize);
        if next_start > *text_pos {
            builder.token(
                rowan::SyntaxKind(SyntaxKind::WHITESPACE as u16),
                &self.source[*text_pos..next_start],
            );
            *text_pos = next_start;
        }
    }
}
