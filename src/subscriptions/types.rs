//! Subscription types: registry configuration, publish results and the
//! handle returned by `subscribe`.

use crate::types::{RegistryId, SubscriptionId, SubscriptionState};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;
use std::sync::Weak;

use super::manager::Shared;

/// Configuration for a registry.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// What happens when a handler panics during publish.
    /// Default: propagate to the publisher.
    pub failure_policy: FailurePolicy,

    /// What happens when a handle from another registry is passed to
    /// `unsubscribe`.
    /// Default: ignore.
    pub foreign_handles: ForeignHandlePolicy,
}

impl RegistryConfig {
    /// Keep publishing to the remaining handlers when one of them panics.
    pub fn isolated() -> Self {
        Self {
            failure_policy: FailurePolicy::Isolate,
            ..Default::default()
        }
    }

    /// Report handles issued by other registries as errors.
    pub fn strict() -> Self {
        Self {
            foreign_handles: ForeignHandlePolicy::Reject,
            ..Default::default()
        }
    }
}

/// Handling of a handler that panics while a publish is in flight.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Let the panic unwind out of `publish`; later handlers are skipped.
    #[default]
    Propagate,
    /// Catch the panic, log it and carry on with the next handler.
    Isolate,
}

/// Handling of a subscription handle issued by a different registry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForeignHandlePolicy {
    /// Treat it as an unknown subscription: nothing to remove.
    #[default]
    Ignore,
    /// Fail with `RegistryError::InvalidSubscription`.
    Reject,
}

/// Outcome of one publish pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PublishReport {
    /// Handlers that returned normally.
    pub delivered: usize,
    /// Handlers that panicked (only counted under `FailurePolicy::Isolate`).
    pub failed: usize,
}

impl PublishReport {
    /// Number of handlers invoked in this pass.
    pub fn invoked(&self) -> usize {
        self.delivered + self.failed
    }
}

/// Handle to one (channel, handler) registration.
///
/// Created by `SubscriptionManager::subscribe`. The handle does not keep the
/// registry alive; releasing it after the registry is gone only closes the
/// handle. Dropping a handle without releasing it leaves the handler
/// registered for the lifetime of the registry.
#[must_use = "dropping a subscription leaves its handler registered"]
pub struct Subscription<C, H: ?Sized> {
    id: SubscriptionId,
    registry: RegistryId,
    state: SubscriptionState,
    owner: Weak<Shared<C, H>>,
}

impl<C, H: ?Sized> Subscription<C, H> {
    pub(crate) fn new(id: SubscriptionId, registry: RegistryId, owner: Weak<Shared<C, H>>) -> Self {
        Self {
            id,
            registry,
            state: SubscriptionState::Open,
            owner,
        }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// The registry that issued this handle.
    pub fn registry_id(&self) -> RegistryId {
        self.registry
    }

    pub fn state(&self) -> SubscriptionState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state.is_open()
    }
}

impl<C: Eq + Hash, H: ?Sized> Subscription<C, H> {
    /// Release this subscription.
    ///
    /// Removes the handler from its channel and closes the handle. Calling
    /// it again is a no-op.
    pub fn free(&mut self) {
        if !self.state.is_open() {
            return;
        }
        if let Some(shared) = self.owner.upgrade() {
            shared.release(self.id);
        }
        self.state = SubscriptionState::Closed;
        self.owner = Weak::new();
    }
}

impl<C, H: ?Sized> fmt::Debug for Subscription<C, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("registry", &self.registry)
            .field("state", &self.state)
            .finish()
    }
}
