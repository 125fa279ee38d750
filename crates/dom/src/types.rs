//! Core type definitions for the in-memory document
//!
//! Key design principles:
//! 1. Use u32 for indices (4 bytes vs 8 bytes pointer)
//! 2. Use SmallVec for small arrays (avoid heap allocation)
//! 3. Parent links are navigational only, the arena owns every node

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Node identifier (index into arena)
pub type NodeId = u32;

pub const HTML_NS: &str = "http://www.w3.org/1999/xhtml";
pub const SVG_NS: &str = "http://www.w3.org/2000/svg";
pub const MATHML_NS: &str = "http://www.w3.org/1998/Math/MathML";

/// Node type matching DOM specification numbering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum NodeType {
    Element = 1,
    Text = 3,
    Comment = 8,
    Document = 9,
    DocumentFragment = 11,
}

impl NodeType {
    /// Whether nodes of this type may hold children
    pub fn is_container(self) -> bool {
        matches!(
            self,
            NodeType::Element | NodeType::Document | NodeType::DocumentFragment
        )
    }

    /// Whether nodes of this type carry character data
    pub fn is_character_data(self) -> bool {
        matches!(self, NodeType::Text | NodeType::Comment)
    }
}

/// Element namespace
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Namespace {
    #[default]
    Html,
    Svg,
    MathMl,
}

impl Namespace {
    pub fn uri(self) -> &'static str {
        match self {
            Namespace::Html => HTML_NS,
            Namespace::Svg => SVG_NS,
            Namespace::MathMl => MATHML_NS,
        }
    }

    pub fn from_uri(uri: &str) -> Option<Self> {
        match uri {
            HTML_NS => Some(Namespace::Html),
            SVG_NS => Some(Namespace::Svg),
            MATHML_NS => Some(Namespace::MathMl),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// The main DOM tree node structure
///
/// Layout:
/// - Small fixed-size fields first (better packing)
/// - Use indices instead of pointers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomNode {
    pub node_id: NodeId,
    pub node_type: NodeType,
    pub namespace: Namespace,

    // Navigation indices
    pub parent_id: Option<NodeId>,
    pub children_ids: SmallVec<[NodeId; 4]>, // Most nodes have <4 children

    /// Tag name for elements, `#text`/`#comment`/... otherwise
    pub node_name: String,
    pub node_value: String,
    /// Insertion order is preserved so markup round-trips
    pub attributes: SmallVec<[Attribute; 4]>,

    /// Customized built-in element name (`is` option of createElement)
    pub is_value: Option<String>,
    /// Content fragment for `<template>` elements
    pub template_content: Option<NodeId>,
}

impl DomNode {
    pub fn new(node_id: NodeId, node_type: NodeType, node_name: impl Into<String>) -> Self {
        Self {
            node_id,
            node_type,
            namespace: Namespace::Html,
            parent_id: None,
            children_ids: SmallVec::new(),
            node_name: node_name.into(),
            node_value: String::new(),
            attributes: SmallVec::new(),
            is_value: None,
            template_content: None,
        }
    }

    /// Detached, empty document fragment
    pub fn fragment() -> Self {
        Self::new(0, NodeType::DocumentFragment, "#document-fragment")
    }

    /// Get tag name for element nodes
    pub fn tag_name(&self) -> Option<&str> {
        if self.node_type == NodeType::Element {
            Some(&self.node_name)
        } else {
            None
        }
    }

    pub fn is_element(&self) -> bool {
        self.node_type == NodeType::Element
    }

    pub fn is_text(&self) -> bool {
        self.node_type == NodeType::Text
    }

    /// Element whose tag name matches `name` (ASCII case-insensitive for HTML)
    pub fn is_html_element(&self, name: &str) -> bool {
        self.is_element()
            && self.namespace == Namespace::Html
            && self.node_name.eq_ignore_ascii_case(name)
    }

    /// Get attribute value
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Set or replace an attribute, keeping its original position
    pub fn set_attr(&mut self, name: &str, value: &str) {
        match self.attributes.iter_mut().find(|a| a.name == name) {
            Some(existing) => existing.value = value.to_string(),
            None => self.attributes.push(Attribute {
                name: name.to_string(),
                value: value.to_string(),
            }),
        }
    }

    /// Whitespace-separated class list contains `class`
    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .map(|c| c.split_ascii_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }
}

/// HTML elements that never have content or an end tag
pub fn is_void_element(name: &str) -> bool {
    matches!(
        name,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_attr_keeps_position() {
        let mut node = DomNode::new(0, NodeType::Element, "div");
        node.set_attr("id", "a");
        node.set_attr("class", "x y");
        node.set_attr("id", "b");

        let names: Vec<_> = node.attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["id", "class"]);
        assert_eq!(node.attr("id"), Some("b"));
        assert!(node.has_class("y"));
        assert!(!node.has_class("x y"));
    }

    #[test]
    fn test_namespace_uri_roundtrip() {
        for ns in [Namespace::Html, Namespace::Svg, Namespace::MathMl] {
            assert_eq!(Namespace::from_uri(ns.uri()), Some(ns));
        }
        assert_eq!(Namespace::from_uri("urn:unknown"), None);
    }
}
