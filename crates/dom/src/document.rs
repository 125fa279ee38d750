//! Document - Main entry point for tree operations
//!
//! This handles:
//! - Node creation (plain, namespaced, customized built-in, template)
//! - Tree mutation with DOM semantics (fragments move their children,
//!   attached nodes are moved, hierarchy checks)
//! - Navigation (parent / first / last / next / previous)
//! - Markup assignment and serialization
//! - Document-level selector queries

use crate::arena::DomArena;
use crate::error::{DomError, Result};
use crate::parser;
use crate::selector::SelectorList;
use crate::serializer;
use crate::types::*;
use ahash::AHashMap;

/// Configuration for a document
#[derive(Debug, Clone, Default)]
pub struct DocumentConfig {
    /// Reject raw string markup assignment, modelling the CSP directive
    /// `require-trusted-types-for 'script'`
    pub require_trusted_types: bool,
}

/// In-memory document tree
pub struct Document {
    config: DocumentConfig,
    arena: DomArena,
    root: NodeId,
    markup_parses: usize,
}

impl Document {
    pub fn new() -> Self {
        Self::with_config(DocumentConfig::default())
    }

    pub fn with_config(config: DocumentConfig) -> Self {
        let mut arena = DomArena::new();
        let root = arena.add_node(DomNode::new(0, NodeType::Document, "#document"));
        Self {
            config,
            arena,
            root,
            markup_parses: 0,
        }
    }

    pub fn config(&self) -> &DocumentConfig {
        &self.config
    }

    /// Get reference to internal arena
    pub fn arena(&self) -> &DomArena {
        &self.arena
    }

    /// The document node
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, node_id: NodeId) -> Result<&DomNode> {
        self.arena.get(node_id)
    }

    /// Number of markup strings parsed so far (innerHTML assignments)
    pub fn markup_parses(&self) -> usize {
        self.markup_parses
    }

    pub fn requires_trusted_types(&self) -> bool {
        self.config.require_trusted_types
    }

    // ---- creation ----------------------------------------------------

    /// Create an HTML element; the tag name is lowercased
    pub fn create_element(&mut self, tag: &str) -> Result<NodeId> {
        self.create_element_with_is(tag, None)
    }

    /// Create an HTML element, optionally as a customized built-in (`is`)
    pub fn create_element_with_is(&mut self, tag: &str, is: Option<&str>) -> Result<NodeId> {
        validate_name(tag)?;
        let mut node = DomNode::new(0, NodeType::Element, tag.to_ascii_lowercase());
        node.is_value = is.map(str::to_string);
        Ok(self.add_element(node))
    }

    /// Create an element in the namespace identified by `namespace_uri`
    pub fn create_element_ns(&mut self, namespace_uri: &str, tag: &str) -> Result<NodeId> {
        validate_name(tag)?;
        let namespace = Namespace::from_uri(namespace_uri).ok_or_else(|| {
            DomError::InvalidNodeType {
                expected: "HTML, SVG or MathML namespace".to_string(),
                actual: namespace_uri.to_string(),
            }
        })?;
        let mut node = DomNode::new(0, NodeType::Element, tag);
        node.namespace = namespace;
        Ok(self.add_element(node))
    }

    fn add_element(&mut self, node: DomNode) -> NodeId {
        let is_template = node.is_html_element("template");
        let id = self.arena.add_node(node);
        if is_template {
            let content = self.create_document_fragment();
            if let Ok(node) = self.arena.get_mut(id) {
                node.template_content = Some(content);
            }
        }
        id
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        let mut node = DomNode::new(0, NodeType::Text, "#text");
        node.node_value = text.to_string();
        self.arena.add_node(node)
    }

    pub fn create_comment(&mut self, text: &str) -> NodeId {
        let mut node = DomNode::new(0, NodeType::Comment, "#comment");
        node.node_value = text.to_string();
        self.arena.add_node(node)
    }

    pub fn create_document_fragment(&mut self) -> NodeId {
        self.arena.add_node(DomNode::fragment())
    }

    /// Create a detached `<template>` element
    pub fn create_template(&mut self) -> Result<NodeId> {
        self.create_element("template")
    }

    /// Content fragment of a `<template>` element
    pub fn template_content(&self, template: NodeId) -> Result<NodeId> {
        let node = self.arena.get(template)?;
        node.template_content
            .ok_or_else(|| DomError::InvalidNodeType {
                expected: "template".to_string(),
                actual: node.node_name.clone(),
            })
    }

    // ---- navigation --------------------------------------------------

    pub fn parent_node(&self, node: NodeId) -> Result<Option<NodeId>> {
        Ok(self.arena.get(node)?.parent_id)
    }

    pub fn first_child(&self, node: NodeId) -> Result<Option<NodeId>> {
        Ok(self.arena.get(node)?.children_ids.first().copied())
    }

    pub fn last_child(&self, node: NodeId) -> Result<Option<NodeId>> {
        Ok(self.arena.get(node)?.children_ids.last().copied())
    }

    pub fn next_sibling(&self, node: NodeId) -> Result<Option<NodeId>> {
        self.sibling_at(node, |index| index.checked_add(1))
    }

    pub fn previous_sibling(&self, node: NodeId) -> Result<Option<NodeId>> {
        self.sibling_at(node, |index| index.checked_sub(1))
    }

    fn sibling_at(
        &self,
        node: NodeId,
        step: impl Fn(usize) -> Option<usize>,
    ) -> Result<Option<NodeId>> {
        let Some(parent_id) = self.arena.get(node)?.parent_id else {
            return Ok(None);
        };
        let siblings = &self.arena.get(parent_id)?.children_ids;
        Ok(siblings
            .iter()
            .position(|&id| id == node)
            .and_then(step)
            .and_then(|index| siblings.get(index).copied()))
    }

    pub fn children(&self, node: NodeId) -> Result<Vec<NodeId>> {
        Ok(self.arena.get(node)?.children_ids.to_vec())
    }

    // ---- mutation ----------------------------------------------------

    /// Insert `child` into `parent` before `anchor`, or append when `anchor` is `None`
    ///
    /// A document fragment is emptied into `parent` in order. An attached
    /// `child` is first removed from its current parent.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        anchor: Option<NodeId>,
    ) -> Result<()> {
        let parent_node = self.arena.get(parent)?;
        if !parent_node.node_type.is_container() {
            return Err(DomError::HierarchyRequest(format!(
                "{} cannot have children",
                parent_node.node_name
            )));
        }
        if let Some(anchor) = anchor {
            if self.arena.get(anchor)?.parent_id != Some(parent) {
                return Err(DomError::NotFound {
                    parent,
                    child: anchor,
                });
            }
        }
        let child_node = self.arena.get(child)?;
        if child_node.node_type == NodeType::Document {
            return Err(DomError::HierarchyRequest(
                "a document cannot be inserted".to_string(),
            ));
        }
        if self.arena.is_inclusive_ancestor(child, parent)? {
            return Err(DomError::HierarchyRequest(
                "a node cannot be inserted into itself or its descendants".to_string(),
            ));
        }

        let nodes: Vec<NodeId> = if child_node.node_type == NodeType::DocumentFragment {
            child_node.children_ids.to_vec()
        } else {
            vec![child]
        };

        // An anchor equal to the moved node degrades to its next sibling
        let anchor = match anchor {
            Some(a) if nodes.contains(&a) => {
                let mut next = self.next_sibling(a)?;
                while let Some(n) = next.filter(|n| nodes.contains(n)) {
                    next = self.next_sibling(n)?;
                }
                next
            }
            other => other,
        };

        for &node in &nodes {
            self.detach(node)?;
        }

        let index = match anchor {
            Some(anchor) => self
                .arena
                .index_in_parent(anchor)?
                .ok_or(DomError::NotFound {
                    parent,
                    child: anchor,
                })?,
            None => self.arena.get(parent)?.children_ids.len(),
        };

        for (offset, &node) in nodes.iter().enumerate() {
            self.arena.get_mut(node)?.parent_id = Some(parent);
            self.arena
                .get_mut(parent)?
                .children_ids
                .insert(index + offset, node);
        }

        Ok(())
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.insert_before(parent, child, None)
    }

    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        if self.arena.get(child)?.parent_id != Some(parent) {
            return Err(DomError::NotFound { parent, child });
        }
        self.detach(child)
    }

    fn detach(&mut self, node: NodeId) -> Result<()> {
        let Some(parent) = self.arena.get(node)?.parent_id else {
            return Ok(());
        };
        self.arena
            .get_mut(parent)?
            .children_ids
            .retain(|id| *id != node);
        self.arena.get_mut(node)?.parent_id = None;
        Ok(())
    }

    fn clear_children(&mut self, node: NodeId) -> Result<()> {
        let children = std::mem::take(&mut self.arena.get_mut(node)?.children_ids);
        for child in children {
            self.arena.get_mut(child)?.parent_id = None;
        }
        Ok(())
    }

    /// Copy a node; with `deep` its subtree (and template content) too
    ///
    /// The copy is detached.
    pub fn clone_node(&mut self, node: NodeId, deep: bool) -> Result<NodeId> {
        let mut copies: AHashMap<NodeId, NodeId> = AHashMap::new();
        let root = self.copy_one(node, &mut copies)?;
        if !deep {
            if self.arena.get(node)?.template_content.is_some() {
                // Shallow template copies still get their own (empty) content
                let fresh = self.create_document_fragment();
                self.arena.get_mut(root)?.template_content = Some(fresh);
            }
            return Ok(root);
        }

        let mut stack = vec![node];
        while let Some(original) = stack.pop() {
            let copy = copies
                .get(&original)
                .copied()
                .ok_or(DomError::NodeNotFound(original))?;
            let source = self.arena.get(original)?;
            let children = source.children_ids.to_vec();
            let content = source.template_content;

            for child in children.iter().copied() {
                let child_copy = self.copy_one(child, &mut copies)?;
                self.arena.get_mut(child_copy)?.parent_id = Some(copy);
                self.arena.get_mut(copy)?.children_ids.push(child_copy);
            }
            stack.extend(children.into_iter().rev());

            if let Some(content) = content {
                let content_copy = self.copy_one(content, &mut copies)?;
                self.arena.get_mut(copy)?.template_content = Some(content_copy);
                stack.push(content);
            }
        }

        Ok(root)
    }

    fn copy_one(&mut self, node: NodeId, copies: &mut AHashMap<NodeId, NodeId>) -> Result<NodeId> {
        let source = self.arena.get(node)?;
        let mut copy = DomNode::new(0, source.node_type, source.node_name.clone());
        copy.namespace = source.namespace;
        copy.node_value = source.node_value.clone();
        copy.attributes = source.attributes.clone();
        copy.is_value = source.is_value.clone();
        let id = self.arena.add_node(copy);
        copies.insert(node, id);
        Ok(id)
    }

    // ---- attributes and text -----------------------------------------

    pub fn set_attribute(&mut self, element: NodeId, name: &str, value: &str) -> Result<()> {
        validate_name(name)?;
        let node = self.arena.get_mut(element)?;
        if !node.is_element() {
            return Err(DomError::InvalidNodeType {
                expected: "element".to_string(),
                actual: node.node_name.clone(),
            });
        }
        // HTML attribute names are case-insensitive and stored lowercased
        if node.namespace == Namespace::Html {
            node.set_attr(&name.to_ascii_lowercase(), value);
        } else {
            node.set_attr(name, value);
        }
        Ok(())
    }

    pub fn get_attribute(&self, element: NodeId, name: &str) -> Result<Option<&str>> {
        Ok(self.arena.get(element)?.attr(name))
    }

    /// `nodeValue` setter: only character data nodes are affected
    pub fn set_node_value(&mut self, node: NodeId, value: &str) -> Result<()> {
        let node = self.arena.get_mut(node)?;
        if node.node_type.is_character_data() {
            node.node_value = value.to_string();
        }
        Ok(())
    }

    /// `textContent` setter: replaces all children with a single text node
    pub fn set_text_content(&mut self, node: NodeId, text: &str) -> Result<()> {
        let node_type = self.arena.get(node)?.node_type;
        match node_type {
            NodeType::Text | NodeType::Comment => self.set_node_value(node, text),
            NodeType::Element | NodeType::DocumentFragment => {
                self.clear_children(node)?;
                if !text.is_empty() {
                    let text_node = self.create_text(text);
                    self.append_child(node, text_node)?;
                }
                Ok(())
            }
            NodeType::Document => Ok(()),
        }
    }

    pub fn text_content(&self, node: NodeId) -> Result<String> {
        let start = self.arena.get(node)?;
        if start.node_type.is_character_data() {
            return Ok(start.node_value.clone());
        }
        let mut text = String::new();
        self.arena.traverse_df(node, |n| {
            if n.is_text() {
                text.push_str(&n.node_value);
            }
            Ok(())
        })?;
        Ok(text)
    }

    // ---- markup ------------------------------------------------------

    /// `innerHTML` setter: replace the children of `node` (the content of a
    /// template) with the parsed `markup`
    pub fn set_inner_html(&mut self, node: NodeId, markup: &str) -> Result<()> {
        let target = {
            let n = self.arena.get(node)?;
            if !n.node_type.is_container() || n.node_type == NodeType::Document {
                return Err(DomError::InvalidNodeType {
                    expected: "element or fragment".to_string(),
                    actual: n.node_name.clone(),
                });
            }
            n.template_content.unwrap_or(node)
        };

        self.clear_children(target)?;
        parser::parse_into(&mut self.arena, target, markup)?;
        self.markup_parses += 1;
        tracing::trace!("[Document] Parsed {} bytes of markup into node {}", markup.len(), target);
        Ok(())
    }

    pub fn inner_html(&self, node: NodeId) -> Result<String> {
        serializer::inner_html(&self.arena, node)
    }

    pub fn outer_html(&self, node: NodeId) -> Result<String> {
        serializer::outer_html(&self.arena, node)
    }

    // ---- queries -----------------------------------------------------

    /// First element in document order matching `selector`
    pub fn query_selector(&self, selector: &str) -> Result<Option<NodeId>> {
        let selectors = SelectorList::parse(selector)?;
        self.arena
            .find_in_subtree(self.root, |node| selectors.matches(&self.arena, node))
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Reject names the DOM would throw `InvalidCharacterError` for
fn validate_name(name: &str) -> Result<()> {
    let invalid = name.is_empty()
        || name
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '<' | '>' | '"' | '\'' | '/' | '=' | '\0'));
    if invalid {
        return Err(DomError::InvalidCharacter(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_with_container() -> (Document, NodeId) {
        let mut doc = Document::new();
        let div = doc.create_element("div").unwrap();
        doc.append_child(doc.root(), div).unwrap();
        (doc, div)
    }

    #[test]
    fn test_insert_and_navigate() {
        let (mut doc, div) = doc_with_container();
        let a = doc.create_text("a");
        let b = doc.create_text("b");
        let c = doc.create_comment("c");

        doc.append_child(div, a).unwrap();
        doc.append_child(div, c).unwrap();
        doc.insert_before(div, b, Some(c)).unwrap();

        assert_eq!(doc.children(div).unwrap(), vec![a, b, c]);
        assert_eq!(doc.next_sibling(a).unwrap(), Some(b));
        assert_eq!(doc.previous_sibling(a).unwrap(), None);
        assert_eq!(doc.previous_sibling(c).unwrap(), Some(b));
        assert_eq!(doc.first_child(div).unwrap(), Some(a));
        assert_eq!(doc.last_child(div).unwrap(), Some(c));
        assert_eq!(doc.inner_html(div).unwrap(), "ab<!--c-->");
    }

    #[test]
    fn test_insert_moves_attached_node() {
        let (mut doc, div) = doc_with_container();
        let a = doc.create_text("a");
        let b = doc.create_text("b");
        doc.append_child(div, a).unwrap();
        doc.append_child(div, b).unwrap();

        doc.insert_before(div, b, Some(a)).unwrap();
        assert_eq!(doc.children(div).unwrap(), vec![b, a]);

        // Inserting a node before itself leaves it in place
        doc.insert_before(div, b, Some(b)).unwrap();
        assert_eq!(doc.children(div).unwrap(), vec![b, a]);
    }

    #[test]
    fn test_insert_fragment_moves_children() {
        let (mut doc, div) = doc_with_container();
        let anchor = doc.create_comment("anchor");
        doc.append_child(div, anchor).unwrap();

        let fragment = doc.create_document_fragment();
        doc.set_inner_html(fragment, "<i>1</i><b>2</b>").unwrap();
        doc.insert_before(div, fragment, Some(anchor)).unwrap();

        assert_eq!(doc.inner_html(div).unwrap(), "<i>1</i><b>2</b><!--anchor-->");
        assert!(doc.children(fragment).unwrap().is_empty());
    }

    #[test]
    fn test_hierarchy_errors() {
        let (mut doc, div) = doc_with_container();
        let span = doc.create_element("span").unwrap();
        doc.append_child(div, span).unwrap();
        let text = doc.create_text("t");
        let stranger = doc.create_text("s");

        assert!(matches!(
            doc.append_child(span, div),
            Err(DomError::HierarchyRequest(_))
        ));
        assert!(matches!(
            doc.append_child(text, span),
            Err(DomError::HierarchyRequest(_))
        ));
        assert!(matches!(
            doc.insert_before(div, text, Some(stranger)),
            Err(DomError::NotFound { .. })
        ));
        assert!(matches!(
            doc.remove_child(div, stranger),
            Err(DomError::NotFound { .. })
        ));
    }

    #[test]
    fn test_remove_child_detaches() {
        let (mut doc, div) = doc_with_container();
        let a = doc.create_text("a");
        let b = doc.create_text("b");
        doc.append_child(div, a).unwrap();
        doc.append_child(div, b).unwrap();

        doc.remove_child(div, a).unwrap();
        assert_eq!(doc.parent_node(a).unwrap(), None);
        assert_eq!(doc.next_sibling(a).unwrap(), None);
        assert_eq!(doc.children(div).unwrap(), vec![b]);
    }

    #[test]
    fn test_clone_node_deep_and_shallow() {
        let (mut doc, div) = doc_with_container();
        doc.set_inner_html(div, "<ul class=\"a\"><li>1</li><li>2</li></ul>")
            .unwrap();
        let ul = doc.first_child(div).unwrap().unwrap();

        let deep = doc.clone_node(ul, true).unwrap();
        assert_ne!(deep, ul);
        assert_eq!(doc.parent_node(deep).unwrap(), None);
        assert_eq!(doc.outer_html(deep).unwrap(), doc.outer_html(ul).unwrap());

        let shallow = doc.clone_node(ul, false).unwrap();
        assert_eq!(doc.outer_html(shallow).unwrap(), "<ul class=\"a\"></ul>");
    }

    #[test]
    fn test_clone_template_copies_content() {
        let mut doc = Document::new();
        let template = doc.create_template().unwrap();
        doc.set_inner_html(template, "<p>x</p>").unwrap();

        let copy = doc.clone_node(template, true).unwrap();
        let content = doc.template_content(copy).unwrap();
        assert_ne!(content, doc.template_content(template).unwrap());
        assert_eq!(doc.inner_html(copy).unwrap(), "<p>x</p>");
    }

    #[test]
    fn test_template_inner_html_targets_content() {
        let mut doc = Document::new();
        let template = doc.create_template().unwrap();
        doc.set_inner_html(template, "<p>a</p>").unwrap();
        doc.set_inner_html(template, "<p>b</p><p>c</p>").unwrap();

        assert!(doc.children(template).unwrap().is_empty());
        let content = doc.template_content(template).unwrap();
        assert_eq!(doc.children(content).unwrap().len(), 2);
        assert_eq!(doc.markup_parses(), 2);
    }

    #[test]
    fn test_attributes_and_text() {
        let (mut doc, div) = doc_with_container();
        doc.set_attribute(div, "data-v-123", "").unwrap();
        doc.set_attribute(div, "ID", "main").unwrap();
        assert_eq!(doc.get_attribute(div, "data-v-123").unwrap(), Some(""));
        assert_eq!(doc.get_attribute(div, "id").unwrap(), Some("main"));
        assert!(matches!(
            doc.set_attribute(div, "bad name", ""),
            Err(DomError::InvalidCharacter(_))
        ));

        doc.set_inner_html(div, "<b>old</b><i>x</i>").unwrap();
        doc.set_text_content(div, "new").unwrap();
        assert_eq!(doc.inner_html(div).unwrap(), "new");
        assert_eq!(doc.text_content(div).unwrap(), "new");

        let text = doc.first_child(div).unwrap().unwrap();
        doc.set_node_value(text, "newer").unwrap();
        assert_eq!(doc.text_content(div).unwrap(), "newer");

        // nodeValue on elements is a no-op
        doc.set_node_value(div, "ignored").unwrap();
        assert_eq!(doc.inner_html(div).unwrap(), "newer");
    }

    #[test]
    fn test_create_element_variants() {
        let mut doc = Document::new();
        let button = doc.create_element_with_is("BUTTON", Some("fancy-button")).unwrap();
        let node = doc.node(button).unwrap();
        assert_eq!(node.node_name, "button");
        assert_eq!(node.is_value.as_deref(), Some("fancy-button"));

        let circle = doc.create_element_ns(SVG_NS, "circle").unwrap();
        assert_eq!(doc.node(circle).unwrap().namespace, Namespace::Svg);

        assert!(doc.create_element_ns("urn:nope", "x").is_err());
        assert!(matches!(
            doc.create_element("<p>"),
            Err(DomError::InvalidCharacter(_))
        ));
    }

    #[test]
    fn test_query_selector_document_order() {
        let (mut doc, div) = doc_with_container();
        doc.set_inner_html(
            div,
            "<section><p class=\"x\">1</p></section><p class=\"x\" id=\"two\">2</p>",
        )
        .unwrap();

        let first = doc.query_selector("p.x").unwrap().unwrap();
        assert_eq!(doc.text_content(first).unwrap(), "1");
        let second = doc.query_selector("div > p").unwrap().unwrap();
        assert_eq!(doc.get_attribute(second, "id").unwrap(), Some("two"));
        assert_eq!(doc.query_selector("table").unwrap(), None);
        assert!(matches!(
            doc.query_selector("p >"),
            Err(DomError::InvalidSelector(_))
        ));
    }

    #[test]
    fn test_query_selector_skips_detached_nodes() {
        let mut doc = Document::new();
        let orphan = doc.create_element("aside").unwrap();
        doc.set_attribute(orphan, "id", "lost").unwrap();
        assert_eq!(doc.query_selector("#lost").unwrap(), None);
    }
}
