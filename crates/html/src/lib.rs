#![allow(
    clippy::missing_docs_in_private_items,
    reason = "Internal implementation details don't need public documentation"
)]
#![allow(
    clippy::missing_inline_in_public_items,
    reason = "Inlining decisions left to compiler for this crate"
)]
#![allow(
    clippy::module_name_repetitions,
    reason = "DOM type names mirror the web platform"
)]

//! In-memory DOM for print hosts: documents, elements, text, inline styles and
//! the clone/import primitives needed to move content between documents.

pub mod dom;

pub use dom::{Attributes, DOMNode, DomError, Document, NodeKind, OwnedNode, StyleDeclarations};
pub use indextree::NodeId;
