//! laxml - permissive, incremental XML reader
//!
//! A streaming tag-recognition state machine that turns byte chunks into
//! an element tree, plus a slash-separated path language for querying
//! it. The reader is built for documents of unknown cleanliness: it
//! delimits tags and nothing more. No entity decoding, no namespaces, no
//! validation; unquoted attribute values and stray declaration text are
//! accepted as-is.
//!
//! ```
//! let doc = laxml::parse(b"<r><x k=\"1\"/><x k=\"2\">hi</x></r>").unwrap();
//! let x = doc.find(doc.root(), "r/x?k=2").unwrap();
//! assert_eq!(doc.content(x), Some(b"hi".to_vec()));
//! ```
//!
//! For input that arrives in pieces, feed a [`Parser`] chunk by chunk;
//! the resulting tree does not depend on where the chunks were cut:
//!
//! ```
//! use laxml::Parser;
//!
//! let mut parser = Parser::new();
//! parser.parse_chunk(b"<a><b").unwrap();
//! parser.parse_chunk(b"></b></a>").unwrap();
//! let doc = parser.into_document();
//! assert!(doc.find(doc.root(), "a/b").is_some());
//! ```

pub mod core;
pub mod path;
pub mod tree;

pub use crate::core::buffer::StrBuf;
pub use crate::core::tags::TagKind;
pub use crate::core::tokenizer::{ParseError, Parser};
pub use crate::path::FindAll;
pub use crate::tree::{
    AttrRef, Attribute, Attrs, Children, Descendants, Document, Element, NodeId, Span,
};

/// Parse a whole document in one call.
///
/// The empty input yields a document holding only the synthetic root.
/// Unclosed elements and other loose markup are tolerated; the result is
/// a best-effort tree.
pub fn parse(input: impl AsRef<[u8]>) -> Result<Document, ParseError> {
    let mut parser = Parser::new();
    parser.parse_chunk(input.as_ref())?;
    Ok(parser.into_document())
}
