//! Renderer Host Operations
//!
//! The node operations table a virtual-DOM renderer drives against a host
//! document, plus the one non-trivial operation in it: inserting a block of
//! static, pre-compiled markup either by cloning an earlier insertion or by
//! parsing it fresh.
//!
//! ## Layout
//!
//! ```text
//! RendererContext (config + shared TrustedGate)
//!        ↓ node_ops(host)
//! NodeOps<H: HostTree> ── RendererOptions
//!        ↓ insert_static_content
//! static_content::insert_static → cached clone | template parse
//! ```
//!
//! [`dom::Document`] is the bundled host; anything implementing
//! [`HostTree`] works.

pub mod context;
pub mod error;
pub mod host;
pub mod namespace;
pub mod node_ops;
pub mod static_content;
pub mod trusted;

pub use context::{RendererConfig, RendererContext};
pub use error::{ConfigError, PolicyError};
pub use host::HostTree;
pub use namespace::Namespace;
pub use node_ops::{NodeOps, Props, RendererOptions};
pub use static_content::{insert_static, InsertPath, StaticRange, TemplateContainer};
pub use trusted::{
    GateState, Markup, PolicyRegistry, TrustedGate, TrustedHtml, TrustedHtmlPolicy, TrustedTypes,
};
