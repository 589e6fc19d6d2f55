//! Core types for the subscription registry.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier for a subscription.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(pub u64);

impl fmt::Debug for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SubscriptionId({})", self.0)
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies one registry instance within the process.
///
/// Every handle remembers the registry that issued it, which is how a
/// registry tells its own handles apart from foreign ones.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegistryId(pub u64);

static NEXT_REGISTRY_ID: AtomicU64 = AtomicU64::new(1);

impl RegistryId {
    pub(crate) fn next() -> Self {
        RegistryId(NEXT_REGISTRY_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Debug for RegistryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RegistryId({})", self.0)
    }
}

impl fmt::Display for RegistryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of a subscription handle.
///
/// A handle starts `Open` and moves to `Closed` exactly once, when it is
/// released. There is no way back.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionState {
    Open,
    Closed,
}

impl SubscriptionState {
    pub fn is_open(self) -> bool {
        matches!(self, SubscriptionState::Open)
    }
}

/// Convenience handler shape: a shareable callback taking a borrowed payload.
///
/// `SubscriptionManager<String, Callback<Event>>` is the usual way to hold
/// handlers of different closure types on one registry.
pub type Callback<A> = dyn Fn(&A) + Send + Sync;
