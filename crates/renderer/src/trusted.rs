//! Trusted-content gate
//!
//! Raw markup assignment is an injection sink. When the host enforces
//! trusted types, strings must be wrapped by a named policy before they can
//! be assigned. The gate negotiates that policy once, lazily, and remembers
//! the outcome for its whole lifetime:
//!
//! ```text
//! UNINITIALIZED --first sanitize--> READY(Active(policy))
//!                                \-> READY(Inactive)   (disabled, unsupported, or creation failed)
//! ```
//!
//! The policy performs a type-level conversion only. Whatever is passed to
//! [`TrustedGate::sanitize`] must already be trusted, compiler-produced markup.

use crate::error::PolicyError;
use std::cell::{OnceCell, RefCell};
use std::fmt;
use std::rc::Rc;

/// Markup that went through a trusted types policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustedHtml(String);

impl TrustedHtml {
    /// Hosts construct this only from inside a registered policy
    pub fn new(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrustedHtml {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Value handed to a markup-parsing sink; sinks must accept either form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Markup {
    Raw(String),
    Trusted(TrustedHtml),
}

impl Markup {
    pub fn as_str(&self) -> &str {
        match self {
            Markup::Raw(s) => s.as_str(),
            Markup::Trusted(t) => t.as_str(),
        }
    }

    pub fn is_trusted(&self) -> bool {
        matches!(self, Markup::Trusted(_))
    }
}

/// Sanitizing callback registered with a policy
pub type CreateHtml = fn(&str) -> String;

/// Identity rule: the gate only types, it does not rewrite
pub fn passthrough(value: &str) -> String {
    value.to_string()
}

/// A named policy produced by the host
pub trait TrustedHtmlPolicy {
    fn name(&self) -> &str;

    fn create_html(&self, input: &str) -> TrustedHtml;
}

/// Host trusted types factory (the `trustedTypes` global of a browser)
pub trait TrustedTypes {
    fn create_policy(
        &self,
        name: &str,
        create_html: CreateHtml,
    ) -> Result<Box<dyn TrustedHtmlPolicy>, PolicyError>;
}

/// Settled gate
pub enum GateState {
    Active(Box<dyn TrustedHtmlPolicy>),
    Inactive,
}

impl fmt::Debug for GateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateState::Active(policy) => f.debug_tuple("Active").field(&policy.name()).finish(),
            GateState::Inactive => f.write_str("Inactive"),
        }
    }
}

impl GateState {
    pub fn sanitize(&self, raw: String) -> Markup {
        match self {
            GateState::Active(policy) => Markup::Trusted(policy.create_html(&raw)),
            GateState::Inactive => Markup::Raw(raw),
        }
    }
}

/// Lazily negotiated, memoized policy holder
///
/// One gate is shared (via `Rc`) by every renderer created from the same
/// root context.
pub struct TrustedGate {
    enabled: bool,
    policy_name: String,
    factory: Option<Rc<dyn TrustedTypes>>,
    state: OnceCell<GateState>,
}

impl TrustedGate {
    /// `factory` is `None` when the host has no trusted types support
    pub fn new(
        enabled: bool,
        policy_name: impl Into<String>,
        factory: Option<Rc<dyn TrustedTypes>>,
    ) -> Self {
        Self {
            enabled,
            policy_name: policy_name.into(),
            factory,
            state: OnceCell::new(),
        }
    }

    /// Gate that is already settled to `state`
    pub fn with_state(state: GateState) -> Self {
        let gate = Self::new(false, String::new(), None);
        let _ = gate.state.set(state);
        gate
    }

    /// Gate that never wraps
    pub fn inactive() -> Self {
        Self::with_state(GateState::Inactive)
    }

    pub fn policy_name(&self) -> &str {
        &self.policy_name
    }

    /// Whether negotiation already happened
    pub fn is_settled(&self) -> bool {
        self.state.get().is_some()
    }

    /// Settled state, negotiating on first call
    pub fn state(&self) -> &GateState {
        self.state.get_or_init(|| self.negotiate())
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state(), GateState::Active(_))
    }

    /// Wrap `raw` with the active policy, or hand it back unchanged
    pub fn sanitize(&self, raw: String) -> Markup {
        self.state().sanitize(raw)
    }

    fn negotiate(&self) -> GateState {
        let factory = match (&self.factory, self.enabled) {
            (Some(factory), true) => factory,
            _ => return GateState::Inactive,
        };

        match factory.create_policy(&self.policy_name, passthrough) {
            Ok(policy) => {
                tracing::debug!(
                    "[TrustedGate] Created trusted types policy {:?}",
                    policy.name()
                );
                GateState::Active(policy)
            }
            Err(e) => {
                // Duplicate names throw unless the CSP allows duplicates
                tracing::warn!("[TrustedGate] Error creating trusted types policy: {}", e);
                GateState::Inactive
            }
        }
    }
}

impl fmt::Debug for TrustedGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrustedGate")
            .field("enabled", &self.enabled)
            .field("policy_name", &self.policy_name)
            .field("supported", &self.factory.is_some())
            .field("state", &self.state.get())
            .finish()
    }
}

/// In-memory trusted types factory
///
/// Mirrors the CSP `trusted-types` directive: a second policy with an
/// existing name is rejected unless duplicates are allowed.
#[derive(Debug, Default)]
pub struct PolicyRegistry {
    names: RefCell<Vec<String>>,
    allow_duplicates: bool,
}

impl PolicyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry behaving like `trusted-types ... 'allow-duplicates'`
    pub fn allowing_duplicates() -> Self {
        Self {
            names: RefCell::new(Vec::new()),
            allow_duplicates: true,
        }
    }

    pub fn policy_names(&self) -> Vec<String> {
        self.names.borrow().clone()
    }
}

struct RegisteredPolicy {
    name: String,
    rule: CreateHtml,
}

impl TrustedHtmlPolicy for RegisteredPolicy {
    fn name(&self) -> &str {
        &self.name
    }

    fn create_html(&self, input: &str) -> TrustedHtml {
        TrustedHtml::new((self.rule)(input))
    }
}

impl TrustedTypes for PolicyRegistry {
    fn create_policy(
        &self,
        name: &str,
        create_html: CreateHtml,
    ) -> Result<Box<dyn TrustedHtmlPolicy>, PolicyError> {
        let mut names = self.names.borrow_mut();
        if !self.allow_duplicates && names.iter().any(|n| n == name) {
            return Err(PolicyError::Duplicate(name.to_string()));
        }
        names.push(name.to_string());
        Ok(Box::new(RegisteredPolicy {
            name: name.to_string(),
            rule: create_html,
        }))
    }
}
