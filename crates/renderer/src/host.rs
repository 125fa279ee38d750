//! Host tree interface
//!
//! Everything the renderer needs from the document it mutates. Handles are
//! small `Copy` values owned by the host; the renderer never keeps one past
//! a single operation, except its parsing container.
//!
//! Every call is fallible and host errors are surfaced untouched.

use crate::trusted::Markup;
use dom::{Document, DomError, NodeId};
use std::fmt;

pub trait HostTree {
    type Node: Copy + Eq + fmt::Debug;
    type Error: std::error::Error;

    /// Plain element, optionally a customized built-in (`is`)
    fn create_element(&mut self, tag: &str, is: Option<&str>) -> Result<Self::Node, Self::Error>;

    fn create_element_ns(
        &mut self,
        namespace_uri: &str,
        tag: &str,
    ) -> Result<Self::Node, Self::Error>;

    fn create_text(&mut self, text: &str) -> Result<Self::Node, Self::Error>;

    fn create_comment(&mut self, text: &str) -> Result<Self::Node, Self::Error>;

    /// Detached `<template>` used as an off-tree parsing surface
    fn create_template(&mut self) -> Result<Self::Node, Self::Error>;

    /// Fragment holding what the template's markup parsed into
    fn template_content(&self, template: Self::Node) -> Result<Self::Node, Self::Error>;

    /// Raw markup sink (`innerHTML`)
    fn set_inner_html(&mut self, element: Self::Node, markup: &Markup) -> Result<(), Self::Error>;

    /// Insert before `anchor`, or append when `None`; fragments move their children
    fn insert_before(
        &mut self,
        parent: Self::Node,
        child: Self::Node,
        anchor: Option<Self::Node>,
    ) -> Result<(), Self::Error>;

    fn append_child(&mut self, parent: Self::Node, child: Self::Node) -> Result<(), Self::Error> {
        self.insert_before(parent, child, None)
    }

    fn remove_child(&mut self, parent: Self::Node, child: Self::Node) -> Result<(), Self::Error>;

    fn parent_node(&self, node: Self::Node) -> Result<Option<Self::Node>, Self::Error>;

    fn first_child(&self, node: Self::Node) -> Result<Option<Self::Node>, Self::Error>;

    fn last_child(&self, node: Self::Node) -> Result<Option<Self::Node>, Self::Error>;

    fn next_sibling(&self, node: Self::Node) -> Result<Option<Self::Node>, Self::Error>;

    fn previous_sibling(&self, node: Self::Node) -> Result<Option<Self::Node>, Self::Error>;

    fn clone_node(&mut self, node: Self::Node, deep: bool) -> Result<Self::Node, Self::Error>;

    fn set_attribute(
        &mut self,
        element: Self::Node,
        name: &str,
        value: &str,
    ) -> Result<(), Self::Error>;

    /// `nodeValue` setter
    fn set_node_value(&mut self, node: Self::Node, value: &str) -> Result<(), Self::Error>;

    /// `textContent` setter
    fn set_text_content(&mut self, node: Self::Node, text: &str) -> Result<(), Self::Error>;

    /// Document-level query, not scoped to any subtree
    fn query_selector(&self, selector: &str) -> Result<Option<Self::Node>, Self::Error>;
}

impl HostTree for Document {
    type Node = NodeId;
    type Error = DomError;

    fn create_element(&mut self, tag: &str, is: Option<&str>) -> Result<NodeId, DomError> {
        self.create_element_with_is(tag, is)
    }

    fn create_element_ns(&mut self, namespace_uri: &str, tag: &str) -> Result<NodeId, DomError> {
        Document::create_element_ns(self, namespace_uri, tag)
    }

    fn create_text(&mut self, text: &str) -> Result<NodeId, DomError> {
        Ok(Document::create_text(self, text))
    }

    fn create_comment(&mut self, text: &str) -> Result<NodeId, DomError> {
        Ok(Document::create_comment(self, text))
    }

    fn create_template(&mut self) -> Result<NodeId, DomError> {
        Document::create_template(self)
    }

    fn template_content(&self, template: NodeId) -> Result<NodeId, DomError> {
        Document::template_content(self, template)
    }

    fn set_inner_html(&mut self, element: NodeId, markup: &Markup) -> Result<(), DomError> {
        if self.requires_trusted_types() && !markup.is_trusted() {
            return Err(DomError::TrustedTypesRequired);
        }
        Document::set_inner_html(self, element, markup.as_str())
    }

    fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        anchor: Option<NodeId>,
    ) -> Result<(), DomError> {
        Document::insert_before(self, parent, child, anchor)
    }

    fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        Document::remove_child(self, parent, child)
    }

    fn parent_node(&self, node: NodeId) -> Result<Option<NodeId>, DomError> {
        Document::parent_node(self, node)
    }

    fn first_child(&self, node: NodeId) -> Result<Option<NodeId>, DomError> {
        Document::first_child(self, node)
    }

    fn last_child(&self, node: NodeId) -> Result<Option<NodeId>, DomError> {
        Document::last_child(self, node)
    }

    fn next_sibling(&self, node: NodeId) -> Result<Option<NodeId>, DomError> {
        Document::next_sibling(self, node)
    }

    fn previous_sibling(&self, node: NodeId) -> Result<Option<NodeId>, DomError> {
        Document::previous_sibling(self, node)
    }

    fn clone_node(&mut self, node: NodeId, deep: bool) -> Result<NodeId, DomError> {
        Document::clone_node(self, node, deep)
    }

    fn set_attribute(&mut self, element: NodeId, name: &str, value: &str) -> Result<(), DomError> {
        Document::set_attribute(self, element, name, value)
    }

    fn set_node_value(&mut self, node: NodeId, value: &str) -> Result<(), DomError> {
        Document::set_node_value(self, node, value)
    }

    fn set_text_content(&mut self, node: NodeId, text: &str) -> Result<(), DomError> {
        Document::set_text_content(self, node, text)
    }

    fn query_selector(&self, selector: &str) -> Result<Option<NodeId>, DomError> {
        Document::query_selector(self, selector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trusted::TrustedHtml;
    use dom::DocumentConfig;

    #[test]
    fn test_strict_document_rejects_raw_markup() {
        let mut doc = Document::with_config(DocumentConfig {
            require_trusted_types: true,
        });
        let template = HostTree::create_template(&mut doc).unwrap();

        let raw = Markup::Raw("<p>x</p>".to_string());
        assert!(matches!(
            HostTree::set_inner_html(&mut doc, template, &raw),
            Err(DomError::TrustedTypesRequired)
        ));

        let trusted = Markup::Trusted(TrustedHtml::new("<p>x</p>".to_string()));
        HostTree::set_inner_html(&mut doc, template, &trusted).unwrap();
        assert_eq!(doc.inner_html(template).unwrap(), "<p>x</p>");
    }

    #[test]
    fn test_default_document_accepts_both() {
        let mut doc = Document::new();
        let template = HostTree::create_template(&mut doc).unwrap();
        HostTree::set_inner_html(&mut doc, template, &Markup::Raw("<b>1</b>".to_string()))
            .unwrap();
        assert_eq!(doc.inner_html(template).unwrap(), "<b>1</b>");
    }
}
