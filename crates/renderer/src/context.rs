//! Renderer root context
//!
//! Holds configuration and the trusted-content gate shared by every
//! renderer created from it. Each renderer gets its own parsing container.

use crate::error::ConfigError;
use crate::host::HostTree;
use crate::node_ops::NodeOps;
use crate::trusted::{TrustedGate, TrustedTypes};
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use uuid::Uuid;

/// Renderer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    pub id: String,
    /// Negotiate a trusted types policy before raw markup assignment
    pub trusted_types: bool,
    pub policy_name: String,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            trusted_types: cfg!(debug_assertions) || cfg!(feature = "prod-trusted-types"),
            policy_name: "renderer".to_string(),
        }
    }
}

impl RendererConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}

pub struct RendererContext {
    config: RendererConfig,
    gate: Rc<TrustedGate>,
}

impl RendererContext {
    /// `trusted_types` is the host's policy factory, `None` when unsupported
    pub fn new(config: RendererConfig, trusted_types: Option<Rc<dyn TrustedTypes>>) -> Self {
        let gate = TrustedGate::new(
            config.trusted_types,
            config.policy_name.clone(),
            trusted_types,
        );
        tracing::debug!(
            "[RendererContext] Created context {} (trusted types: {})",
            config.id,
            config.trusted_types
        );
        Self {
            config,
            gate: Rc::new(gate),
        }
    }

    /// Context around an existing gate, e.g. a test double
    pub fn with_gate(config: RendererConfig, gate: Rc<TrustedGate>) -> Self {
        Self { config, gate }
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn gate(&self) -> &Rc<TrustedGate> {
        &self.gate
    }

    /// Node operations over `host`, sharing this context's gate
    pub fn node_ops<H: HostTree>(&self, host: H) -> NodeOps<H> {
        NodeOps::new(host, Rc::clone(&self.gate))
    }
}
