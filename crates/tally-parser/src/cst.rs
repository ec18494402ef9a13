//! Rowan-based concrete syntax tree types for Tally.

use crate::syntax_kind::SyntaxKind;

/// Marker type connecting [`SyntaxKind`] to rowan's generic tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TallyLanguage {}

impl rowan::Language for TallyLanguage {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        assert!(raw.0 < SyntaxKind::__LAST as u16);
        // Safety: SyntaxKind is #[repr(u16)] with contiguous discriminants and
        // the bound was checked above. Rowan only stores kinds we handed it.
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        rowan::SyntaxKind(kind as u16)
    }
}

pub type SyntaxNode = rowan::SyntaxNode<TallyLanguage>;
pub type SyntaxToken = rowan::SyntaxToken<TallyLanguage>;
pub type SyntaxElement = rowan::SyntaxElement<TallyLanguage>;
