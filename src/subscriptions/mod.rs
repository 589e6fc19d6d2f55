//! Channel subscriptions and in-process publish.
//!
//! A [`SubscriptionManager`] keeps, per channel, the handlers registered on
//! it in registration order:
//! - `subscribe` appends a handler and returns a [`Subscription`] handle
//! - `free` / `unsubscribe` removes it again, keeping the order of the rest
//! - `publish` calls every handler on a channel with the given arguments
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use subscription_registry::{Callback, SubscriptionManager};
//!
//! let manager: SubscriptionManager<&str, Callback<String>> = SubscriptionManager::new();
//!
//! let mut sub = manager.subscribe("greetings", Arc::new(|name: &String| {
//!     println!("hello, {name}");
//! }));
//!
//! let report = manager.publish(&"greetings", &"world".to_string());
//! assert_eq!(report.delivered, 1);
//!
//! sub.free();
//! assert!(manager.handlers(&"greetings").is_empty());
//! ```

mod manager;
mod types;

pub use manager::SubscriptionManager;
pub use types::{FailurePolicy, ForeignHandlePolicy, PublishReport, RegistryConfig, Subscription};
