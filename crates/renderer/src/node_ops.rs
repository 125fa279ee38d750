//! Node operations table
//!
//! [`RendererOptions`] is the contract a virtual-DOM renderer drives.
//! [`NodeOps`] implements it over any [`HostTree`], passing almost every
//! call straight through.

use crate::host::HostTree;
use crate::namespace::Namespace;
use crate::static_content::{self, StaticRange, TemplateContainer};
use crate::trusted::TrustedGate;
use serde_json::Value;
use std::rc::Rc;

/// Dynamic element props as the renderer passes them
pub type Props = serde_json::Map<String, Value>;

/// Primitive tree operations exposed to the renderer
pub trait RendererOptions {
    type Node: Copy + Eq;
    type Error;

    /// Insert before `anchor`, or append
    fn insert(
        &mut self,
        child: Self::Node,
        parent: Self::Node,
        anchor: Option<Self::Node>,
    ) -> Result<(), Self::Error>;

    /// Detach `child`; no-op when it has no parent
    fn remove(&mut self, child: Self::Node) -> Result<(), Self::Error>;

    fn create_element(
        &mut self,
        tag: &str,
        namespace: Namespace,
        is: Option<&str>,
        props: Option<&Props>,
    ) -> Result<Self::Node, Self::Error>;

    fn create_text(&mut self, text: &str) -> Result<Self::Node, Self::Error>;

    fn create_comment(&mut self, text: &str) -> Result<Self::Node, Self::Error>;

    fn set_text(&mut self, node: Self::Node, text: &str) -> Result<(), Self::Error>;

    fn set_element_text(&mut self, el: Self::Node, text: &str) -> Result<(), Self::Error>;

    fn parent_node(&self, node: Self::Node) -> Result<Option<Self::Node>, Self::Error>;

    fn next_sibling(&self, node: Self::Node) -> Result<Option<Self::Node>, Self::Error>;

    fn query_selector(&self, selector: &str) -> Result<Option<Self::Node>, Self::Error>;

    /// Mark `el` with the style scope attribute `id`
    fn set_scope_id(&mut self, el: Self::Node, id: &str) -> Result<(), Self::Error>;

    /// Insert static markup; `cache` is the `(first, last)` of an earlier
    /// insertion of the same block
    fn insert_static_content(
        &mut self,
        content: &str,
        parent: Self::Node,
        anchor: Option<Self::Node>,
        namespace: Namespace,
        cache: Option<(Self::Node, Self::Node)>,
    ) -> Result<StaticRange<Self::Node>, Self::Error>;
}

/// [`RendererOptions`] over a host tree
///
/// Owns the host and its parsing container; shares the trusted-content
/// gate with every other `NodeOps` of the same context.
pub struct NodeOps<H: HostTree> {
    host: H,
    gate: Rc<TrustedGate>,
    container: TemplateContainer<H::Node>,
}

impl<H: HostTree> NodeOps<H> {
    pub fn new(host: H, gate: Rc<TrustedGate>) -> Self {
        Self {
            host,
            gate,
            container: TemplateContainer::new(),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn gate(&self) -> &TrustedGate {
        &self.gate
    }

    pub fn into_host(self) -> H {
        self.host
    }
}

/// String form of a prop the way attribute assignment coerces it
fn attribute_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl<H: HostTree> RendererOptions for NodeOps<H> {
    type Node = H::Node;
    type Error = H::Error;

    fn insert(
        &mut self,
        child: H::Node,
        parent: H::Node,
        anchor: Option<H::Node>,
    ) -> Result<(), H::Error> {
        self.host.insert_before(parent, child, anchor)
    }

    fn remove(&mut self, child: H::Node) -> Result<(), H::Error> {
        match self.host.parent_node(child)? {
            Some(parent) => self.host.remove_child(parent, child),
            None => Ok(()),
        }
    }

    fn create_element(
        &mut self,
        tag: &str,
        namespace: Namespace,
        is: Option<&str>,
        props: Option<&Props>,
    ) -> Result<H::Node, H::Error> {
        let el = match namespace.uri() {
            Some(uri) => self.host.create_element_ns(uri, tag)?,
            None => self.host.create_element(tag, is)?,
        };

        // `multiple` assigned as a property before attach can be ignored,
        // so it is set as an attribute up front
        if tag == "select" {
            if let Some(multiple) = props.and_then(|p| p.get("multiple")) {
                if !multiple.is_null() {
                    self.host
                        .set_attribute(el, "multiple", &attribute_value(multiple))?;
                }
            }
        }

        Ok(el)
    }

    fn create_text(&mut self, text: &str) -> Result<H::Node, H::Error> {
        self.host.create_text(text)
    }

    fn create_comment(&mut self, text: &str) -> Result<H::Node, H::Error> {
        self.host.create_comment(text)
    }

    fn set_text(&mut self, node: H::Node, text: &str) -> Result<(), H::Error> {
        self.host.set_node_value(node, text)
    }

    fn set_element_text(&mut self, el: H::Node, text: &str) -> Result<(), H::Error> {
        self.host.set_text_content(el, text)
    }

    fn parent_node(&self, node: H::Node) -> Result<Option<H::Node>, H::Error> {
        self.host.parent_node(node)
    }

    fn next_sibling(&self, node: H::Node) -> Result<Option<H::Node>, H::Error> {
        self.host.next_sibling(node)
    }

    fn query_selector(&self, selector: &str) -> Result<Option<H::Node>, H::Error> {
        self.host.query_selector(selector)
    }

    fn set_scope_id(&mut self, el: H::Node, id: &str) -> Result<(), H::Error> {
        self.host.set_attribute(el, id, "")
    }

    fn insert_static_content(
        &mut self,
        content: &str,
        parent: H::Node,
        anchor: Option<H::Node>,
        namespace: Namespace,
        cache: Option<(H::Node, H::Node)>,
    ) -> Result<StaticRange<H::Node>, H::Error> {
        static_content::insert_static(
            &mut self.host,
            &mut self.container,
            &self.gate,
            content,
            parent,
            anchor,
            namespace,
            cache,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dom::{Document, DomError, NodeId};
    use serde_json::json;

    fn ops() -> (NodeOps<Document>, NodeId) {
        let mut doc = Document::new();
        let app = doc.create_element("div").unwrap();
        doc.set_attribute(app, "id", "app").unwrap();
        doc.append_child(doc.root(), app).unwrap();
        (NodeOps::new(doc, Rc::new(TrustedGate::inactive())), app)
    }

    fn props(value: Value) -> Props {
        match value {
            Value::Object(map) => map,
            _ => Props::new(),
        }
    }

    #[test]
    fn test_select_multiple_is_forced() {
        let (mut ops, _) = ops();
        let p = props(json!({ "multiple": "" }));
        let select = ops
            .create_element("select", Namespace::None, None, Some(&p))
            .unwrap();
        assert_eq!(ops.host().get_attribute(select, "multiple").unwrap(), Some(""));

        let p = props(json!({ "multiple": true }));
        let select = ops
            .create_element("select", Namespace::None, None, Some(&p))
            .unwrap();
        assert_eq!(ops.host().get_attribute(select, "multiple").unwrap(), Some("true"));
    }

    #[test]
    fn test_select_multiple_skipped_when_null_or_absent() {
        let (mut ops, _) = ops();
        let p = props(json!({ "multiple": null }));
        let select = ops
            .create_element("select", Namespace::None, None, Some(&p))
            .unwrap();
        assert_eq!(ops.host().get_attribute(select, "multiple").unwrap(), None);

        let select = ops
            .create_element("select", Namespace::None, None, None)
            .unwrap();
        assert_eq!(ops.host().get_attribute(select, "multiple").unwrap(), None);

        // Only `select` gets the treatment
        let p = props(json!({ "multiple": "" }));
        let input = ops
            .create_element("input", Namespace::None, None, Some(&p))
            .unwrap();
        assert_eq!(ops.host().get_attribute(input, "multiple").unwrap(), None);
    }

    #[test]
    fn test_create_element_namespaces() {
        let (mut ops, _) = ops();
        let circle = ops
            .create_element("circle", Namespace::Svg, None, None)
            .unwrap();
        let mi = ops.create_element("mi", Namespace::MathMl, None, None).unwrap();
        let button = ops
            .create_element("button", Namespace::None, Some("fancy-button"), None)
            .unwrap();

        let host = ops.host();
        assert_eq!(host.node(circle).unwrap().namespace, dom::Namespace::Svg);
        assert_eq!(host.node(mi).unwrap().namespace, dom::Namespace::MathMl);
        let button = host.node(button).unwrap();
        assert_eq!(button.namespace, dom::Namespace::Html);
        assert_eq!(button.is_value.as_deref(), Some("fancy-button"));
    }

    #[test]
    fn test_insert_remove_and_navigation() {
        let (mut ops, app) = ops();
        let a = ops.create_text("a").unwrap();
        let b = ops.create_comment("b").unwrap();

        ops.insert(b, app, None).unwrap();
        ops.insert(a, app, Some(b)).unwrap();
        assert_eq!(ops.parent_node(a).unwrap(), Some(app));
        assert_eq!(ops.next_sibling(a).unwrap(), Some(b));
        assert_eq!(ops.host().inner_html(app).unwrap(), "a<!--b-->");

        ops.remove(a).unwrap();
        assert_eq!(ops.parent_node(a).unwrap(), None);
        // Removing a detached node is a no-op
        ops.remove(a).unwrap();
        assert_eq!(ops.host().inner_html(app).unwrap(), "<!--b-->");
    }

    #[test]
    fn test_text_operations() {
        let (mut ops, app) = ops();
        let text = ops.create_text("old").unwrap();
        ops.insert(text, app, None).unwrap();
        ops.set_text(text, "new").unwrap();
        assert_eq!(ops.host().inner_html(app).unwrap(), "new");

        ops.set_element_text(app, "<b>plain</b>").unwrap();
        assert_eq!(ops.host().inner_html(app).unwrap(), "&lt;b&gt;plain&lt;/b&gt;");
        assert_eq!(ops.parent_node(text).unwrap(), None);
    }

    #[test]
    fn test_query_selector_and_scope_id() {
        let (mut ops, app) = ops();
        assert_eq!(ops.query_selector("#app").unwrap(), Some(app));
        assert_eq!(ops.query_selector(".missing").unwrap(), None);
        assert!(matches!(
            ops.query_selector("##"),
            Err(DomError::InvalidSelector(_))
        ));

        ops.set_scope_id(app, "data-v-7ba5bd90").unwrap();
        assert_eq!(
            ops.host().get_attribute(app, "data-v-7ba5bd90").unwrap(),
            Some("")
        );
        assert_eq!(ops.query_selector("[data-v-7ba5bd90]").unwrap(), Some(app));
    }
}
