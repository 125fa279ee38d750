//! Markup serializer
//!
//! This module handles:
//! - HTML serialization of a node or its children (outerHTML / innerHTML)
//! - Structural snapshots for comparing subtrees without node identity

use crate::arena::DomArena;
use crate::entities::{escape_attribute, escape_text};
use crate::error::Result;
use crate::types::*;
use serde::{Deserialize, Serialize};

/// Serialize the children of `node_id` (template content for templates)
pub fn inner_html(arena: &DomArena, node_id: NodeId) -> Result<String> {
    let mut output = String::with_capacity(256);
    serialize_children(arena, node_id, &mut output)?;
    Ok(output)
}

/// Serialize `node_id` itself including its subtree
pub fn outer_html(arena: &DomArena, node_id: NodeId) -> Result<String> {
    let mut output = String::with_capacity(256);
    serialize_node(arena, node_id, &mut output)?;
    Ok(output)
}

fn serialize_children(arena: &DomArena, node_id: NodeId, output: &mut String) -> Result<()> {
    let node = arena.get(node_id)?;
    let source = node.template_content.unwrap_or(node_id);
    let raw = node.is_html_element("script") || node.is_html_element("style");

    for &child_id in &arena.get(source)?.children_ids {
        let child = arena.get(child_id)?;
        if raw && child.is_text() {
            output.push_str(&child.node_value);
        } else {
            serialize_node(arena, child_id, output)?;
        }
    }
    Ok(())
}

fn serialize_node(arena: &DomArena, node_id: NodeId, output: &mut String) -> Result<()> {
    let node = arena.get(node_id)?;

    match node.node_type {
        NodeType::Element => {
            output.push('<');
            output.push_str(&node.node_name);
            for attr in &node.attributes {
                output.push(' ');
                output.push_str(&attr.name);
                output.push_str("=\"");
                escape_attribute(&attr.value, output);
                output.push('"');
            }
            output.push('>');

            if node.namespace == Namespace::Html && is_void_element(&node.node_name) {
                return Ok(());
            }

            serialize_children(arena, node_id, output)?;

            output.push_str("</");
            output.push_str(&node.node_name);
            output.push('>');
        }
        NodeType::Text => escape_text(&node.node_value, output),
        NodeType::Comment => {
            output.push_str("<!--");
            output.push_str(&node.node_value);
            output.push_str("-->");
        }
        NodeType::Document | NodeType::DocumentFragment => {
            serialize_children(arena, node_id, output)?;
        }
    }

    Ok(())
}

/// Identity-free structural copy of a subtree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub node_type: NodeType,
    pub namespace: Namespace,
    pub node_name: String,
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub node_value: String,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub attributes: Vec<Attribute>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub children: Vec<NodeSnapshot>,
}

impl NodeSnapshot {
    pub fn capture(arena: &DomArena, node_id: NodeId) -> Result<Self> {
        let node = arena.get(node_id)?;
        let source = node.template_content.unwrap_or(node_id);
        let children = arena
            .get(source)?
            .children_ids
            .iter()
            .map(|&child| Self::capture(arena, child))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            node_type: node.node_type,
            namespace: node.namespace,
            node_name: node.node_name.clone(),
            node_value: node.node_value.clone(),
            attributes: node.attributes.to_vec(),
            children,
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_into;

    fn parsed(markup: &str) -> (DomArena, NodeId) {
        let mut arena = DomArena::new();
        let root = arena.add_node(DomNode::fragment());
        parse_into(&mut arena, root, markup).unwrap();
        (arena, root)
    }

    #[test]
    fn test_roundtrip_html() {
        for markup in [
            "<p>hi</p><p>bye</p>",
            "<div id=\"a\" class=\"x y\"><br><img src=\"a.png\"></div>",
            "<!--c--><span>a &amp; b &lt;</span>",
            "<script>if (a < b) {}</script>",
            "<svg viewBox=\"0 0 1 1\"><circle r=\"1\"></circle></svg>",
        ] {
            let (arena, root) = parsed(markup);
            assert_eq!(inner_html(&arena, root).unwrap(), markup);
        }
    }

    #[test]
    fn test_attribute_escaping() {
        let (arena, root) = parsed("<a title='say \"hi\"'>x</a>");
        assert_eq!(
            inner_html(&arena, root).unwrap(),
            "<a title=\"say &quot;hi&quot;\">x</a>"
        );
    }

    #[test]
    fn test_snapshot_ignores_identity() {
        let (first, first_root) = parsed("<ul><li class=\"a\">1</li></ul>");
        let (second, second_root) = parsed("<!--pad--><ul><li class=\"a\">1</li></ul>");

        let first = NodeSnapshot::capture(&first, first_root).unwrap();
        let second = NodeSnapshot::capture(&second, second_root).unwrap();
        assert_eq!(first.children[0], second.children[1]);

        let json = first.to_json().unwrap();
        assert!(json.contains("\"node_name\":\"li\""), "got {json}");
    }
}
