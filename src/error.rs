//! Error types for the subscription registry.

use crate::types::{RegistryId, SubscriptionId};
use thiserror::Error;

/// Main error type for registry operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Subscription {subscription} was not issued by registry {registry}")]
    InvalidSubscription {
        subscription: SubscriptionId,
        registry: RegistryId,
    },
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
