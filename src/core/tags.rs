//! Tag kinds and their delimiter patterns
//!
//! The tokenizer recognizes six markup shapes. Each kind pairs an opening
//! pattern with the terminating pattern that closes its body. Opening
//! patterns share prefixes (`<`, `<!`, `<!--`, `<![CDATA[`), so the
//! opening scan races a single cursor across all of them and commits the
//! most recently matching kind once the next byte fits none.

/// The six markup shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    /// `<name ...>`
    ElementOpen,
    /// `</name>`
    ElementClose,
    /// `<?target ...?>`
    ProcessingInstruction,
    /// `<!DOCTYPE ...>` and any other bare declaration
    Declaration,
    /// `<!-- ... -->`
    Comment,
    /// `<![CDATA[ ... ]]>`
    CData,
}

/// Scan order; earlier entries win when several kinds match at a cursor
/// position, later entries win overall because a longer match replaces
/// the recorded kind.
pub(crate) const SCAN_ORDER: [TagKind; 6] = [
    TagKind::ElementOpen,
    TagKind::ElementClose,
    TagKind::ProcessingInstruction,
    TagKind::Declaration,
    TagKind::Comment,
    TagKind::CData,
];

impl TagKind {
    /// Opening delimiter pattern
    pub fn open(self) -> &'static [u8] {
        match self {
            TagKind::ElementOpen => b"<",
            TagKind::ElementClose => b"</",
            TagKind::ProcessingInstruction => b"<?",
            TagKind::Declaration => b"<!",
            TagKind::Comment => b"<!--",
            TagKind::CData => b"<![CDATA[",
        }
    }

    /// Terminating delimiter pattern
    pub fn close(self) -> &'static [u8] {
        match self {
            TagKind::ElementOpen | TagKind::ElementClose | TagKind::Declaration => b">",
            TagKind::ProcessingInstruction => b"?>",
            TagKind::Comment => b"-->",
            TagKind::CData => b"]]>",
        }
    }

    /// First kind in scan order whose opening pattern continues with `b`
    /// at position `cursor`, if any.
    pub(crate) fn match_open(cursor: usize, b: u8) -> Option<TagKind> {
        SCAN_ORDER
            .iter()
            .copied()
            .find(|kind| kind.open().get(cursor) == Some(&b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_scan_prefers_table_order() {
        // '<' opens every pattern; the element-open entry wins the scan
        assert_eq!(TagKind::match_open(0, b'<'), Some(TagKind::ElementOpen));
        // "<!" is claimed by the declaration before the comment
        assert_eq!(TagKind::match_open(1, b'!'), Some(TagKind::Declaration));
    }

    #[test]
    fn test_longer_patterns_take_over() {
        // after "<!", only the comment continues with '-'
        assert_eq!(TagKind::match_open(2, b'-'), Some(TagKind::Comment));
        // and only CDATA continues with '['
        assert_eq!(TagKind::match_open(2, b'['), Some(TagKind::CData));
        assert_eq!(TagKind::match_open(2, b'D'), None);
    }

    #[test]
    fn test_close_patterns() {
        assert_eq!(TagKind::Comment.close(), b"-->");
        assert_eq!(TagKind::CData.close(), b"]]>");
        assert_eq!(TagKind::ElementClose.close(), b">");
    }
}
