/// Character cursor over the source text with byte-offset tracking.
///
/// Positions are byte offsets into the original UTF-8 source, so they can
/// be stored in a [`tally_common::Span`] directly.
pub(crate) struct Cursor<'src> {
    source: &'src str,
    pos: u32,
    chars: std::str::Chars<'src>,
}

impl<'src> Cursor<'src> {
    pub(crate) fn new(source: &'src str) -> Self {
        Self {
            source,
            pos: 0,
            chars: source.chars(),
        }
    }

    /// The current character, without consuming it.
    pub(crate) fn peek(&self) -> Option<char> {
        self.chars.clone().next()
    }

    /// Consume the current character.
    pub(crate) fn advance(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        self.pos += c.len_utf8() as u32;
        Some(c)
    }

    pub(crate) fn pos(&self) -> u32 {
        self.pos
    }

    /// Advance while `predicate` holds for the current character.
    pub(crate) fn eat_while(&mut self, predicate: impl Fn(char) -> bool) {
        while let Some(c) = self.peek() {
            if !predicate(c) {
                break;
            }
            self.advance();
        }
    }

    /// Slice of the source between two byte offsets on char boundaries.
    pub(crate) fn slice(&self, start: u32, end: u32) -> &'src str {
        &self.source[start as usize..end as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_tracks_byte_offsets() {
        let mut cursor = Cursor::new("aé(");
        assert_eq!(cursor.advance(), Some('a'));
        assert_eq!(cursor.pos(), 1);
        assert_eq!(cursor.advance(), Some('é'));
        assert_eq!(cursor.pos(), 3);
        assert_eq!(cursor.peek(), Some('('));
    }

    #[test]
    fn eat_while_stops_at_predicate_failure() {
        let mut cursor = Cursor::new("abc def");
        cursor.eat_while(|c| c.is_alphabetic());
        assert_eq!(cursor.pos(), 3);
        assert_eq!(cursor.slice(0, 3), "abc");
        assert_eq!(cursor.peek(), Some(' '));
    }

    #[test]
    fn empty_source_is_exhausted() {
        let mut cursor = Cursor::new("");
        assert_eq!(cursor.peek(), None);
        assert_eq!(cursor.advance(), None);
    }
}
