//! Streaming tokenizer - chunk-fed tag recognition state machine
//!
//! The parser consumes byte chunks of arbitrary size and builds the
//! element tree as it goes. Three sub-parsers hand control to each
//! other:
//! - content: character data up to the next `<`
//! - tag opening: races the delimiter cursor across every opening
//!   pattern that still matches; the most recently matching pattern wins
//! - tag body: accumulates the key until the kind's terminating pattern
//!   completes, flushing false partial matches back as literal bytes
//!
//! Chunk boundaries may fall anywhere, including inside a delimiter
//! pattern; the cursor keeps the progress between calls.

use memchr::memchr;

use crate::core::attributes::{is_whitespace, parse_attributes};
use crate::core::buffer::StrBuf;
use crate::core::tags::TagKind;
use crate::tree::{Document, NodeId};

/// Parse failure.
///
/// The only failure the machine can signal is a tag opening that matches
/// no known pattern. After an error the parser state is unspecified and
/// should be dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("no tag pattern matches input at byte {offset}")]
pub struct ParseError {
    /// Absolute offset of the offending byte
    pub offset: usize,
}

/// Which sub-parser consumes the next byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Content,
    TagOpening,
    TagBody(TagKind),
}

/// Incremental parser state.
///
/// Feed any partition of the input through [`Parser::parse_chunk`]; the
/// resulting tree is independent of where the chunks were cut. The tree
/// is recovered with [`Parser::into_document`].
#[derive(Debug)]
pub struct Parser {
    doc: Document,
    /// element that receives text and child tags
    current: NodeId,
    mode: Mode,
    /// latest matching opening pattern while a tag opening is scanned
    tag: Option<TagKind>,
    /// bytes accumulated into the current key or text run
    length: usize,
    /// progress into the opening or terminating delimiter pattern
    cursor: usize,
    /// a trailing `/` was seen in the open tag
    empty: bool,
    /// absolute offset of the current chunk's first byte
    offset: usize,
}

impl Parser {
    /// Create a parser holding an empty tree
    pub fn new() -> Self {
        let doc = Document::new();
        Parser {
            current: doc.root(),
            doc,
            mode: Mode::Content,
            tag: None,
            length: 0,
            cursor: 0,
            empty: false,
            offset: 0,
        }
    }

    /// Consume the next chunk of the document
    pub fn parse_chunk(&mut self, chunk: &[u8]) -> Result<(), ParseError> {
        let mut pos = 0;
        while pos < chunk.len() {
            pos = match self.mode {
                Mode::Content => self.parse_content(chunk, pos),
                Mode::TagOpening => self.parse_tag_opening(chunk, pos)?,
                Mode::TagBody(kind) => self.parse_tag_body(kind, chunk, pos),
            };
        }
        self.offset += chunk.len();
        Ok(())
    }

    /// The tree built so far
    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Finish parsing and hand the tree to the caller.
    ///
    /// Input that ends inside a tag or with unclosed elements is not an
    /// error; the tree reflects everything completed so far.
    pub fn into_document(self) -> Document {
        self.doc
    }

    /// Character data up to the next `<`
    fn parse_content(&mut self, chunk: &[u8], pos: usize) -> usize {
        let end = match memchr(b'<', &chunk[pos..]) {
            Some(i) => pos + i,
            None => chunk.len(),
        };
        if end > pos {
            self.value_append(&chunk[pos..end]);
        }
        if end < chunk.len() {
            self.mode = Mode::TagOpening;
        }
        end
    }

    /// Determine the tag kind by racing the cursor across the opening
    /// patterns. The byte that matches no pattern is left unconsumed for
    /// the tag body.
    fn parse_tag_opening(&mut self, chunk: &[u8], mut pos: usize) -> Result<usize, ParseError> {
        while pos < chunk.len() {
            match TagKind::match_open(self.cursor, chunk[pos]) {
                Some(kind) => {
                    self.tag = Some(kind);
                    self.cursor += 1;
                    pos += 1;
                }
                None => {
                    let kind = self.tag.take().ok_or(ParseError {
                        offset: self.offset + pos,
                    })?;

                    // a pending text run ends at the tag
                    if self.length > 0 {
                        self.close_element();
                    }
                    self.length = 0;
                    self.cursor = 0;
                    self.mode = Mode::TagBody(kind);

                    if kind != TagKind::ElementClose {
                        self.current = self.doc.create_element(Some(self.current));
                    }
                    return Ok(pos);
                }
            }
        }
        Ok(pos)
    }

    /// Accumulate the key until the terminating pattern completes
    fn parse_tag_body(&mut self, kind: TagKind, chunk: &[u8], mut pos: usize) -> usize {
        let close = kind.close();
        while pos < chunk.len() {
            if self.cursor == 0 {
                match memchr(close[0], &chunk[pos..]) {
                    Some(i) => {
                        self.key_append(kind, &chunk[pos..pos + i]);
                        pos += i + 1;
                        self.cursor = 1;
                        if self.cursor == close.len() {
                            self.finish_tag(kind);
                            return pos;
                        }
                    }
                    None => {
                        self.key_append(kind, &chunk[pos..]);
                        return chunk.len();
                    }
                }
            } else if chunk[pos] == close[self.cursor] {
                pos += 1;
                self.cursor += 1;
                if self.cursor == close.len() {
                    self.finish_tag(kind);
                    return pos;
                }
            } else {
                // the partial close match turned out to be literal data
                self.key_append(kind, &close[..self.cursor]);
                self.cursor = 0;
            }
        }
        pos
    }

    /// The terminating pattern just completed
    fn finish_tag(&mut self, kind: TagKind) {
        let close = kind.close();

        // everything before the final byte of a multi-byte terminator
        // belongs to the raw key (`<!-- hi -->` keeps its trailing `--`)
        if close.len() > 1 {
            self.key_append_raw(&close[..close.len() - 1]);
        }

        if kind == TagKind::ElementOpen {
            self.finalize_element_open();
        }

        if kind != TagKind::ElementOpen || self.empty {
            self.close_element();
        }

        self.length = 0;
        self.cursor = 0;
        self.empty = false;
        self.mode = Mode::Content;
    }

    /// Strip the empty-element marker, split the name from the attribute
    /// text, and parse attributes into spans over the key buffer.
    fn finalize_element_open(&mut self) {
        let id = self.current;
        let e = self.doc.node_mut(id);
        let Some(key) = e.key.as_mut() else {
            // nothing was captured between the angle brackets
            return;
        };

        // trailing '/' (ignoring whitespace after it) marks an empty element
        let mut cut = None;
        {
            let bytes = key.as_bytes();
            let mut i = bytes.len();
            while i > 0 {
                i -= 1;
                match bytes[i] {
                    b' ' | b'\t' | b'\r' | b'\n' => continue,
                    b'/' => cut = Some(i),
                    _ => {}
                }
                break;
            }
        }
        let empty = cut.is_some();
        if let Some(at) = cut {
            key.truncate(at);
        }

        // the key ends at the first whitespace; the rest is attribute text
        let name_len = key
            .as_bytes()
            .iter()
            .position(|&b| is_whitespace(b))
            .unwrap_or(key.len());
        let attrs = if name_len < key.len() {
            let end = key.len();
            key.set_len(name_len);
            let raw = key.raw_mut();
            let mut from = name_len + 1;
            while from < end && is_whitespace(raw[from]) {
                from += 1;
            }
            parse_attributes(raw, from)
        } else {
            Vec::new()
        };

        if empty {
            self.empty = true;
        }
        for attr in attrs {
            self.doc.node_mut(id).add_attribute(attr);
        }
    }

    /// Append character data, opening a fresh text island at the start
    /// of each run
    fn value_append(&mut self, data: &[u8]) {
        if self.length == 0 {
            self.current = self.doc.create_element(Some(self.current));
        }
        self.doc
            .node_mut(self.current)
            .value
            .get_or_insert_with(StrBuf::new)
            .append(data);
        self.length += data.len();
    }

    /// Append tag bytes to the current key. Close tags keep no key; the
    /// first append also injects the opening pattern's remainder, so a
    /// comment key starts with `!--`.
    fn key_append(&mut self, kind: TagKind, data: &[u8]) {
        if kind == TagKind::ElementClose {
            return;
        }
        let open = kind.open();
        if self.length == 0 && open.len() > 1 {
            self.key_append_raw(&open[1..]);
        }
        self.key_append_raw(data);
    }

    fn key_append_raw(&mut self, data: &[u8]) {
        if data.is_empty() {
            return;
        }
        self.doc
            .node_mut(self.current)
            .key
            .get_or_insert_with(StrBuf::new)
            .append(data);
        self.length += data.len();
    }

    /// Pop back to the parent; over-closing saturates at the root
    fn close_element(&mut self) {
        if let Some(parent) = self.doc.node(self.current).parent {
            self.current = parent;
        }
    }
}

impl Default for Parser {
    fn default() -> Self {
        Parser::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &[u8]) -> Document {
        let mut parser = Parser::new();
        parser.parse_chunk(input).expect("parse");
        parser.into_document()
    }

    fn keys_of_children(doc: &Document, id: NodeId) -> Vec<Option<Vec<u8>>> {
        doc.children(id)
            .map(|c| doc.key(c).map(|k| k.to_vec()))
            .collect()
    }

    #[test]
    fn test_nested_elements() {
        let doc = parse(b"<a><b>hi</b></a>");
        let a = doc.children(doc.root()).next().unwrap();
        assert_eq!(doc.key(a), Some(b"a" as &[u8]));
        let b = doc.children(a).next().unwrap();
        assert_eq!(doc.key(b), Some(b"b" as &[u8]));
        let text = doc.children(b).next().unwrap();
        assert_eq!(doc.key(text), None);
        assert_eq!(doc.value(text), Some(b"hi" as &[u8]));
    }

    #[test]
    fn test_text_islands_between_tags() {
        let doc = parse(b"<p>one<br/>two</p>");
        let p = doc.children(doc.root()).next().unwrap();
        let kids = keys_of_children(&doc, p);
        assert_eq!(kids, vec![None, Some(b"br".to_vec()), None]);
        let values: Vec<_> = doc.children(p).map(|c| doc.value(c)).collect();
        assert_eq!(values[0], Some(b"one" as &[u8]));
        assert_eq!(values[2], Some(b"two" as &[u8]));
    }

    #[test]
    fn test_comment_key() {
        let doc = parse(b"<!-- hi -->");
        let c = doc.children(doc.root()).next().unwrap();
        assert_eq!(doc.key(c), Some(b"!-- hi --" as &[u8]));
        assert_eq!(doc.children(c).count(), 0);
    }

    #[test]
    fn test_doctype_key() {
        let doc = parse(b"<!DOCTYPE html><r/>");
        let kids = keys_of_children(&doc, doc.root());
        assert_eq!(
            kids,
            vec![Some(b"!DOCTYPE html".to_vec()), Some(b"r".to_vec())]
        );
    }

    #[test]
    fn test_processing_instruction_key() {
        let doc = parse(b"<?xml version=\"1.0\"?><r/>");
        let pi = doc.children(doc.root()).next().unwrap();
        assert_eq!(doc.key(pi), Some(b"?xml version=\"1.0\"?" as &[u8]));
    }

    #[test]
    fn test_cdata_key() {
        let doc = parse(b"<x><![CDATA[a < b]]></x>");
        let x = doc.children(doc.root()).next().unwrap();
        let cd = doc.children(x).next().unwrap();
        assert_eq!(doc.key(cd), Some(b"![CDATA[a < b]]" as &[u8]));
    }

    #[test]
    fn test_self_closing() {
        let doc = parse(b"<x/>");
        let x = doc.children(doc.root()).next().unwrap();
        assert_eq!(doc.key(x), Some(b"x" as &[u8]));
        assert_eq!(doc.children(x).count(), 0);
    }

    #[test]
    fn test_self_closing_with_whitespace() {
        let doc = parse(b"<r><x  /><y/></r>");
        let r = doc.children(doc.root()).next().unwrap();
        let kids = keys_of_children(&doc, r);
        assert_eq!(kids, vec![Some(b"x".to_vec()), Some(b"y".to_vec())]);
    }

    #[test]
    fn test_attributes_on_open_tag() {
        let doc = parse(b"<a href=\"/x\" id=main>t</a>");
        let a = doc.children(doc.root()).next().unwrap();
        assert_eq!(doc.key(a), Some(b"a" as &[u8]));
        let href = doc.find_attribute(a, "href").unwrap();
        assert_eq!(href.value, Some(b"/x" as &[u8]));
        let id = doc.find_attribute(a, "ID").unwrap();
        assert_eq!(id.value, Some(b"main" as &[u8]));
    }

    #[test]
    fn test_chunk_split_inside_tag_name() {
        let mut parser = Parser::new();
        parser.parse_chunk(b"<a><b").unwrap();
        parser.parse_chunk(b"></b></a>").unwrap();
        let doc = parser.into_document();
        assert_eq!(doc.to_xml(doc.root()), parse(b"<a><b></b></a>").to_xml(0));
    }

    #[test]
    fn test_chunk_split_inside_close_pattern() {
        let mut parser = Parser::new();
        parser.parse_chunk(b"<x><!-- note -").unwrap();
        parser.parse_chunk(b"-></x>").unwrap();
        let doc = parser.into_document();
        let x = doc.children(doc.root()).next().unwrap();
        let c = doc.children(x).next().unwrap();
        assert_eq!(doc.key(c), Some(b"!-- note --" as &[u8]));
    }

    #[test]
    fn test_false_close_prefix_is_flushed_to_key() {
        let doc = parse(b"<!-- a-b --x-->");
        let c = doc.children(doc.root()).next().unwrap();
        assert_eq!(doc.key(c), Some(b"!-- a-b --x--" as &[u8]));
    }

    #[test]
    fn test_unclosed_elements_keep_partial_tree() {
        let doc = parse(b"<a><b>text");
        let a = doc.children(doc.root()).next().unwrap();
        let b = doc.children(a).next().unwrap();
        assert_eq!(doc.key(b), Some(b"b" as &[u8]));
        assert_eq!(doc.content(b), Some(b"text".to_vec()));
    }

    #[test]
    fn test_input_ending_inside_tag_keeps_partial_key() {
        let doc = parse(b"<a><b");
        let a = doc.children(doc.root()).next().unwrap();
        // the tag never terminated; its element holds what was captured
        assert_eq!(doc.children(a).count(), 1);
        let b = doc.children(a).next().unwrap();
        assert_eq!(doc.key(b), Some(b"b" as &[u8]));
    }

    #[test]
    fn test_overclosing_saturates_at_root() {
        let doc = parse(b"<a></a></a><b/>");
        let kids = keys_of_children(&doc, doc.root());
        assert_eq!(kids, vec![Some(b"a".to_vec()), Some(b"b".to_vec())]);
    }

    #[test]
    fn test_empty_input_keeps_bare_root() {
        let doc = parse(b"");
        assert_eq!(doc.len(), 1);
        assert_eq!(doc.children(doc.root()).count(), 0);
    }

    #[test]
    fn test_attribute_spans_stay_inside_key_buffer() {
        let doc = parse(b"<a x='it\\'s' y=bare z w=\"\"/>");
        let a = doc.children(doc.root()).next().unwrap();
        let e = doc.get(a).unwrap();
        let raw_len = e.key.as_ref().unwrap().raw().len();
        assert_eq!(e.raw_attributes().len(), 4);
        for attr in e.raw_attributes() {
            let name_end = (attr.name.start + attr.name.len) as usize;
            assert!(name_end <= raw_len);
            if let Some(v) = attr.value {
                assert!((v.start + v.len) as usize <= raw_len);
            }
        }
    }

    #[test]
    fn test_mismatched_close_is_tolerated() {
        let doc = parse(b"<a><b>t</c></a>");
        let a = doc.children(doc.root()).next().unwrap();
        let b = doc.children(a).next().unwrap();
        // </c> closed <b>; the tree is best-effort
        assert_eq!(doc.key(b), Some(b"b" as &[u8]));
        assert_eq!(doc.content(a), Some(b"t".to_vec()));
    }
}
