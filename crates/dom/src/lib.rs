//! In-memory DOM Library
//!
//! Arena-backed document tree that behaves like the subset of the browser
//! DOM a renderer mutates: node creation, insertion and removal, sibling
//! navigation, attributes, text, markup parsing via `innerHTML`,
//! serialization and document-level selector queries.
//!
//! ## Core Design
//!
//! ```text
//! markup → tokenize → parse_into → DomArena (owned) → serialize
//!                                      ↓
//!                               NodeId (u32)
//! ```

pub mod arena;
pub mod document;
pub mod entities;
pub mod error;
pub mod parser;
pub mod selector;
pub mod serializer;
pub mod types;

pub use arena::DomArena;
pub use document::{Document, DocumentConfig};
pub use error::{DomError, Result};
pub use serializer::NodeSnapshot;
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_starts_with_root() {
        let doc = Document::new();
        let root = doc.node(doc.root()).unwrap();
        assert_eq!(root.node_type, NodeType::Document);
        assert!(root.children_ids.is_empty());
        assert_eq!(doc.arena().len(), 1);
    }
}
