//! Element and attribute records
//!
//! Nodes live in the document arena and reference each other through
//! `NodeId` indices, so parent back-links never own their target.
//! Attribute names and values are spans into the owning element's raw
//! key buffer rather than copies.

use crate::core::buffer::StrBuf;

/// Compact node identifier (index into the document arena)
pub type NodeId = u32;

/// A span into an element's raw key buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// Byte offset into the raw buffer
    pub start: u32,
    /// Length in bytes
    pub len: u32,
}

impl Span {
    /// Create a new span
    #[inline]
    pub const fn new(start: usize, len: usize) -> Self {
        Span {
            start: start as u32,
            len: len as u32,
        }
    }

    /// Extract the referenced bytes
    #[inline]
    pub fn slice<'a>(&self, buf: &'a [u8]) -> &'a [u8] {
        let start = self.start as usize;
        let end = start + self.len as usize;
        if end <= buf.len() {
            &buf[start..end]
        } else {
            &[]
        }
    }
}

/// An attribute of a tag-originated element.
///
/// `value` is `None` for bare attributes such as `<input disabled>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attribute {
    pub name: Span,
    pub value: Option<Span>,
}

/// Resolved view of an attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttrRef<'a> {
    pub name: &'a [u8],
    pub value: Option<&'a [u8]>,
}

impl<'a> AttrRef<'a> {
    /// Attribute name as UTF-8
    pub fn name_str(&self) -> Option<&'a str> {
        std::str::from_utf8(self.name).ok()
    }

    /// Attribute value as UTF-8
    pub fn value_str(&self) -> Option<&'a str> {
        self.value.and_then(|v| std::str::from_utf8(v).ok())
    }
}

/// A node in the parsed tree.
///
/// Three shapes share this record: the synthetic root (no key, no
/// value), tag-originated elements (key, maybe attributes), and text
/// islands (value only).
#[derive(Debug, Default, Clone)]
pub struct Element {
    pub(crate) key: Option<StrBuf>,
    pub(crate) value: Option<StrBuf>,
    pub(crate) attributes: Vec<Attribute>,
    pub parent: Option<NodeId>,
    pub first_child: Option<NodeId>,
    pub last_child: Option<NodeId>,
    pub next_sibling: Option<NodeId>,
}

impl Element {
    /// Create a detached zero-initialized element
    pub(crate) fn new(parent: Option<NodeId>) -> Self {
        Element {
            parent,
            ..Element::default()
        }
    }

    /// Tag name for open elements, raw inner text for other tag kinds,
    /// `None` for the root and for text islands.
    #[inline]
    pub fn key(&self) -> Option<&[u8]> {
        self.key.as_ref().map(|k| k.as_bytes())
    }

    /// Key as UTF-8
    pub fn key_str(&self) -> Option<&str> {
        std::str::from_utf8(self.key()?).ok()
    }

    /// Character data, present only on text islands
    #[inline]
    pub fn value(&self) -> Option<&[u8]> {
        self.value.as_ref().map(|v| v.as_bytes())
    }

    /// Value as UTF-8
    pub fn value_str(&self) -> Option<&str> {
        std::str::from_utf8(self.value()?).ok()
    }

    /// Check if this node is a text island
    #[inline]
    pub fn is_text(&self) -> bool {
        self.value.is_some()
    }

    /// Iterate attributes in document order
    pub fn attributes(&self) -> Attrs<'_> {
        Attrs {
            element: self,
            index: 0,
        }
    }

    /// First attribute whose name equals `name` ASCII case-insensitively
    pub fn find_attribute(&self, name: &str) -> Option<AttrRef<'_>> {
        self.attributes()
            .find(|a| a.name.eq_ignore_ascii_case(name.as_bytes()))
    }

    /// Stored attribute records; resolve spans with [`Element::resolve`]
    pub fn raw_attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Resolve an attribute's spans against this element's key buffer
    pub fn resolve(&self, attr: &Attribute) -> AttrRef<'_> {
        let raw = self.key.as_ref().map(|k| k.raw()).unwrap_or(&[]);
        AttrRef {
            name: attr.name.slice(raw),
            value: attr.value.map(|v| v.slice(raw)),
        }
    }

    pub(crate) fn add_attribute(&mut self, attr: Attribute) {
        self.attributes.push(attr);
    }
}

/// Iterator over an element's attributes
pub struct Attrs<'a> {
    element: &'a Element,
    index: usize,
}

impl<'a> Iterator for Attrs<'a> {
    type Item = AttrRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let attr = self.element.attributes.get(self.index)?;
        self.index += 1;
        Some(self.element.resolve(attr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_slice() {
        let buf = b"name attr=value";
        assert_eq!(Span::new(5, 4).slice(buf), b"attr");
        assert_eq!(Span::new(12, 10).slice(buf), b"");
    }

    #[test]
    fn test_attribute_resolution() {
        let mut e = Element::new(None);
        let mut key = StrBuf::new();
        key.append(b"a x=1");
        key.set_len(1);
        e.key = Some(key);
        e.add_attribute(Attribute {
            name: Span::new(2, 1),
            value: Some(Span::new(4, 1)),
        });

        assert_eq!(e.key(), Some(b"a" as &[u8]));
        let attr = e.find_attribute("X").expect("case-insensitive lookup");
        assert_eq!(attr.name, b"x");
        assert_eq!(attr.value, Some(b"1" as &[u8]));
        assert!(e.find_attribute("y").is_none());
    }

    #[test]
    fn test_bare_attribute() {
        let mut e = Element::new(None);
        let mut key = StrBuf::new();
        key.append(b"input disabled");
        key.set_len(5);
        e.key = Some(key);
        e.add_attribute(Attribute {
            name: Span::new(6, 8),
            value: None,
        });

        let attr = e.attributes().next().unwrap();
        assert_eq!(attr.name, b"disabled");
        assert_eq!(attr.value, None);
    }
}
