//! Static content insertion
//!
//! Materializes a block of pre-compiled markup into the tree and reports
//! the inserted range so the caller can reuse it later:
//!
//! ```text
//! <parent> before | first ... last | anchor </parent>
//! ```
//!
//! Two paths:
//! - **Cached**: deep-clone a previously inserted range node by node. No
//!   string work at all.
//! - **Fresh**: parse the markup in the renderer's template container,
//!   strip the namespace wrapper, and move the parsed fragment into place.
//!
//! The inserted markup is assigned through a raw markup sink. It must come
//! from compiled templates; the trusted-content gate only types it.

use crate::host::HostTree;
use crate::namespace::Namespace;
use crate::trusted::TrustedGate;
use std::fmt;

/// Which way a static block was materialized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertPath {
    Cached,
    Fresh,
}

/// Range produced by [`insert_static`]
///
/// `first`/`last` are re-derived from the tree after insertion. They are
/// `None` only for degenerate calls, such as empty content into an empty
/// parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticRange<N> {
    pub first: Option<N>,
    pub last: Option<N>,
    pub path: InsertPath,
}

impl<N: Copy> StaticRange<N> {
    /// `(first, last)` as a cache range for a later insert, if both exist
    pub fn bounds(&self) -> Option<(N, N)> {
        self.first.zip(self.last)
    }
}

/// Per-renderer off-tree parsing surface
///
/// Created on first fresh insert and reused afterwards. Its content is
/// overwritten on every use, so a fresh insert must move everything out
/// before the next one starts; holding the container through `&mut` makes
/// overlapping use impossible.
#[derive(Debug)]
pub struct TemplateContainer<N> {
    template: Option<N>,
}

impl<N: Copy + fmt::Debug> TemplateContainer<N> {
    pub fn new() -> Self {
        Self { template: None }
    }

    pub fn is_created(&self) -> bool {
        self.template.is_some()
    }

    /// The template element, created on first call
    pub fn acquire<H>(&mut self, host: &mut H) -> Result<N, H::Error>
    where
        H: HostTree<Node = N>,
    {
        if let Some(template) = self.template {
            return Ok(template);
        }
        let template = host.create_template()?;
        tracing::debug!("[StaticContent] Created template container {:?}", template);
        self.template = Some(template);
        Ok(template)
    }
}

impl<N: Copy + fmt::Debug> Default for TemplateContainer<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Decide whether a cache range can be cloned
///
/// A single-node range is always clonable. A longer one needs `start` to
/// still have a next sibling: a detached node has lost its sibling links,
/// so walking from it would not reproduce the range. This is a heuristic
/// only; a range whose nodes were reordered (not removed) still passes.
pub fn select_path<H: HostTree>(
    host: &H,
    cache: Option<(H::Node, H::Node)>,
) -> Result<InsertPath, H::Error> {
    match cache {
        Some((start, end)) if start == end || host.next_sibling(start)?.is_some() => {
            Ok(InsertPath::Cached)
        }
        _ => Ok(InsertPath::Fresh),
    }
}

/// Insert `content` into `parent` before `anchor` (or at the end)
///
/// `cache` holds the first and last node of an earlier insertion of the
/// same block, when the caller kept them.
#[allow(clippy::too_many_arguments)]
pub fn insert_static<H: HostTree>(
    host: &mut H,
    container: &mut TemplateContainer<H::Node>,
    gate: &TrustedGate,
    content: &str,
    parent: H::Node,
    anchor: Option<H::Node>,
    namespace: Namespace,
    cache: Option<(H::Node, H::Node)>,
) -> Result<StaticRange<H::Node>, H::Error> {
    let before = match anchor {
        Some(anchor) => host.previous_sibling(anchor)?,
        None => host.last_child(parent)?,
    };

    let path = select_path(host, cache)?;
    tracing::trace!(
        "[StaticContent] Inserting {} bytes via {:?} path ({:?})",
        content.len(),
        path,
        namespace
    );

    match (path, cache) {
        (InsertPath::Cached, Some((start, end))) => {
            clone_range(host, parent, anchor, start, end)?
        }
        _ => parse_and_insert(host, container, gate, content, parent, anchor, namespace)?,
    }

    let first = match before {
        Some(before) => host.next_sibling(before)?,
        None => host.first_child(parent)?,
    };
    let last = match anchor {
        Some(anchor) => host.previous_sibling(anchor)?,
        None => host.last_child(parent)?,
    };

    Ok(StaticRange { first, last, path })
}

fn clone_range<H: HostTree>(
    host: &mut H,
    parent: H::Node,
    anchor: Option<H::Node>,
    start: H::Node,
    end: H::Node,
) -> Result<(), H::Error> {
    // Originals are collected up front so the walk never reaches a clone
    let mut originals = vec![start];
    let mut current = start;
    while current != end {
        match host.next_sibling(current)? {
            Some(next) => {
                originals.push(next);
                current = next;
            }
            None => break,
        }
    }

    for original in originals {
        let copy = host.clone_node(original, true)?;
        host.insert_before(parent, copy, anchor)?;
    }
    Ok(())
}

fn parse_and_insert<H: HostTree>(
    host: &mut H,
    container: &mut TemplateContainer<H::Node>,
    gate: &TrustedGate,
    content: &str,
    parent: H::Node,
    anchor: Option<H::Node>,
    namespace: Namespace,
) -> Result<(), H::Error> {
    let markup = gate.sanitize(namespace.wrap(content).into_owned());

    let template = container.acquire(host)?;
    host.set_inner_html(template, &markup)?;
    let fragment = host.template_content(template)?;

    if namespace.wrapper_tag().is_some() {
        // Lift the wrapper's children to the fragment root and drop the wrapper
        if let Some(wrapper) = host.first_child(fragment)? {
            while let Some(child) = host.first_child(wrapper)? {
                host.append_child(fragment, child)?;
            }
            host.remove_child(fragment, wrapper)?;
        }
    }

    host.insert_before(parent, fragment, anchor)
}
