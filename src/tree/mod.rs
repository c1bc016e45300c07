//! Tree model
//!
//! Arena-based element tree: the [`Document`] owns every node, nodes
//! address each other through [`NodeId`] indices, and attribute
//! key/value data lives as spans inside the owning element's key buffer.

pub mod document;
pub mod node;

pub use document::{Children, Descendants, Document};
pub use node::{AttrRef, Attribute, Attrs, Element, NodeId, Span};
