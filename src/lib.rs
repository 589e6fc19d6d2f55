//! # Subscription Registry
//!
//! A minimal in-process publish/subscribe registry. Handlers are registered
//! against channels, revoked through the handle returned at registration,
//! and invoked in registration order when something is published.
//!
//! ## Core Concepts
//!
//! - **Channels**: Opaque keys compared by equality
//! - **Handlers**: Caller-supplied callables, shared via `Arc`
//! - **Subscriptions**: Handles that are `Open` until released, then `Closed`
//! - **Publish**: Synchronous fan-out over a snapshot of the channel's handlers

pub mod error;
pub mod ids;
pub mod subscriptions;
pub mod types;

// Re-exports
pub use error::{RegistryError, Result};
pub use ids::{IdGenerator, SequentialIds};
pub use subscriptions::{
    FailurePolicy, ForeignHandlePolicy, PublishReport, RegistryConfig, Subscription,
    SubscriptionManager,
};
pub use types::*;
