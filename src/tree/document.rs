//! Arena-backed document tree
//!
//! All elements of a parse live in one `Vec`, addressed by `NodeId`.
//! Index 0 is the synthetic root whose children are the document's
//! top-level elements and text islands. Dropping the document releases
//! the whole tree; nothing else owns nodes.

use super::node::{AttrRef, Element, NodeId};

/// A parsed element tree
#[derive(Debug)]
pub struct Document {
    nodes: Vec<Element>,
}

impl Default for Document {
    fn default() -> Self {
        Document::new()
    }
}

impl Document {
    /// Create a document holding only the synthetic root
    pub fn new() -> Self {
        Document {
            nodes: vec![Element::new(None)],
        }
    }

    /// The synthetic root element
    #[inline]
    pub fn root(&self) -> NodeId {
        0
    }

    /// Look up an element
    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&Element> {
        self.nodes.get(id as usize)
    }

    /// Number of elements including the root
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub(crate) fn node(&self, id: NodeId) -> &Element {
        &self.nodes[id as usize]
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Element {
        &mut self.nodes[id as usize]
    }

    /// Allocate a zero-initialized element, linked as the last child of
    /// `parent` when given.
    pub(crate) fn create_element(&mut self, parent: Option<NodeId>) -> NodeId {
        let id = self.nodes.len() as NodeId;
        self.nodes.push(Element::new(parent));
        if let Some(p) = parent {
            self.link_child(p, id);
        }
        id
    }

    fn link_child(&mut self, parent: NodeId, child: NodeId) {
        let p = self.node_mut(parent);
        match p.last_child {
            Some(last) => {
                p.last_child = Some(child);
                self.node_mut(last).next_sibling = Some(child);
            }
            None => {
                p.first_child = Some(child);
                p.last_child = Some(child);
            }
        }
    }

    /// Key of an element, see [`Element::key`]
    #[inline]
    pub fn key(&self, id: NodeId) -> Option<&[u8]> {
        self.node(id).key()
    }

    /// Value of an element, see [`Element::value`]
    #[inline]
    pub fn value(&self, id: NodeId) -> Option<&[u8]> {
        self.node(id).value()
    }

    /// First attribute of `id` matching `name` ASCII case-insensitively
    pub fn find_attribute(&self, id: NodeId, name: &str) -> Option<AttrRef<'_>> {
        self.node(id).find_attribute(name)
    }

    /// Iterate the children of `id` in document order
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            doc: self,
            next: self.node(id).first_child,
        }
    }

    /// Iterate all descendants of `id` in document order (pre-order,
    /// left to right)
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let mut stack: Vec<NodeId> = self.children(id).collect();
        stack.reverse();
        Descendants { doc: self, stack }
    }

    /// Concatenated text of every descendant text island of `id` in
    /// document order, or `None` when the subtree holds no text.
    ///
    /// The length is computed in a first pass so the result is copied
    /// into an exactly-sized buffer.
    pub fn content(&self, id: NodeId) -> Option<Vec<u8>> {
        let len = self.content_len(id);
        if len == 0 {
            return None;
        }
        let mut out = Vec::with_capacity(len);
        self.content_copy(id, &mut out);
        Some(out)
    }

    /// `content` of the first element matching `path`, see
    /// [`Document::find`]
    pub fn content_find(&self, from: NodeId, path: &str) -> Option<Vec<u8>> {
        self.content(self.find(from, path)?)
    }

    /// `content` as an owned UTF-8 string
    pub fn content_string(&self, id: NodeId) -> Option<String> {
        String::from_utf8(self.content(id)?).ok()
    }

    fn content_len(&self, id: NodeId) -> usize {
        let mut total = 0;
        for child in self.children(id) {
            match self.node(child).value() {
                Some(v) => total += v.len(),
                None => total += self.content_len(child),
            }
        }
        total
    }

    fn content_copy(&self, id: NodeId, out: &mut Vec<u8>) {
        for child in self.children(id) {
            match self.node(child).value() {
                Some(v) => out.extend_from_slice(v),
                None => self.content_copy(child, out),
            }
        }
    }

    /// Re-emit the markup of `id` and its subtree.
    ///
    /// Text islands print their value. Keyed elements print the key
    /// verbatim, so comment, CDATA, declaration, and processing
    /// instruction keys round-trip through their original sigils and are
    /// closed by a bare `>`. Childless elements become self-closing.
    pub fn write_xml(&self, id: NodeId, out: &mut Vec<u8>) {
        let e = self.node(id);

        if let Some(value) = e.value() {
            out.extend_from_slice(value);
            return;
        }

        if let Some(key) = e.key() {
            out.push(b'<');
            out.extend_from_slice(key);
            for attr in e.attributes() {
                out.push(b' ');
                out.extend_from_slice(attr.name);
                if let Some(value) = attr.value {
                    out.extend_from_slice(b"=\"");
                    out.extend_from_slice(value);
                    out.push(b'"');
                }
            }
            if matches!(key.first(), Some(b'?') | Some(b'!')) {
                out.push(b'>');
                return;
            }
            if e.first_child.is_none() {
                out.extend_from_slice(b"/>");
                return;
            }
            out.push(b'>');
        }

        for child in self.children(id) {
            self.write_xml(child, out);
        }

        if let Some(key) = e.key() {
            out.extend_from_slice(b"</");
            out.extend_from_slice(key);
            out.push(b'>');
        }
    }

    /// `write_xml` into a fresh buffer
    pub fn to_xml(&self, id: NodeId) -> Vec<u8> {
        let mut out = Vec::new();
        self.write_xml(id, &mut out);
        out
    }
}

/// Iterator over the children of one element
pub struct Children<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl<'a> Iterator for Children<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.doc.node(current).next_sibling;
        Some(current)
    }
}

/// Iterator over all descendants of one element
pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        let first = self.stack.len();
        self.stack.extend(self.doc.children(current));
        self.stack[first..].reverse();
        Some(current)
    }
}
