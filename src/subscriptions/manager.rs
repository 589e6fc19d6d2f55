//! Subscription manager: channel registrations and publish fan-out.

use crate::error::{RegistryError, Result};
use crate::ids::{IdGenerator, SequentialIds};
use crate::types::{RegistryId, SubscriptionId};
use parking_lot::RwLock;
use std::any::Any;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, trace, warn};

use super::types::{
    FailurePolicy, ForeignHandlePolicy, PublishReport, RegistryConfig, Subscription,
};

/// A registered handler and the channel it belongs to.
struct Entry<C, H: ?Sized> {
    channel: C,
    handler: Arc<H>,
}

/// Both lookup tables, guarded together.
struct Tables<C, H: ?Sized> {
    /// Handler (and owning channel) by subscription.
    handlers: HashMap<SubscriptionId, Entry<C, H>>,
    /// Subscriptions per channel, oldest first.
    channels: HashMap<C, Vec<SubscriptionId>>,
}

/// State shared between a manager, its clones and the handles it issued.
pub(crate) struct Shared<C, H: ?Sized> {
    id: RegistryId,
    config: RegistryConfig,
    ids: Arc<dyn IdGenerator>,
    tables: RwLock<Tables<C, H>>,
}

impl<C: Eq + Hash, H: ?Sized> Shared<C, H> {
    /// Remove a subscription from both tables. Returns false if it was not
    /// registered.
    pub(crate) fn release(&self, id: SubscriptionId) -> bool {
        let mut tables = self.tables.write();
        let Some(entry) = tables.handlers.remove(&id) else {
            return false;
        };

        let mut now_empty = false;
        if let Some(subs) = tables.channels.get_mut(&entry.channel) {
            if let Some(pos) = subs.iter().position(|s| *s == id) {
                subs.remove(pos);
            }
            now_empty = subs.is_empty();
        }
        if now_empty {
            tables.channels.remove(&entry.channel);
        }

        debug!(registry = %self.id, subscription = %id, "unsubscribed");
        true
    }
}

/// Registry of channel handlers.
///
/// `C` is the channel key, `H` the handler. Handlers are stored behind an
/// `Arc`, so `H` may be unsized (see [`Callback`](crate::Callback)).
/// Cloning a manager yields another reference to the same registry.
pub struct SubscriptionManager<C, H: ?Sized> {
    shared: Arc<Shared<C, H>>,
}

impl<C: Eq + Hash, H: ?Sized> SubscriptionManager<C, H> {
    /// Create a new registry with the default configuration.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create a new registry with custom configuration.
    pub fn with_config(config: RegistryConfig) -> Self {
        Self::with_id_generator(config, Arc::new(SequentialIds))
    }

    /// Create a new registry drawing subscription ids from `ids`.
    pub fn with_id_generator(config: RegistryConfig, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            shared: Arc::new(Shared {
                id: RegistryId::next(),
                config,
                ids,
                tables: RwLock::new(Tables {
                    handlers: HashMap::new(),
                    channels: HashMap::new(),
                }),
            }),
        }
    }

    pub fn id(&self) -> RegistryId {
        self.shared.id
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.shared.config
    }

    /// Register `handler` on `channel`.
    ///
    /// The handler is visible to `handlers` and `publish` as soon as this
    /// returns, after every handler already registered on the channel.
    pub fn subscribe(&self, channel: C, handler: Arc<H>) -> Subscription<C, H>
    where
        C: Clone,
    {
        let id = self.shared.ids.next_id();

        {
            let mut tables = self.shared.tables.write();
            debug_assert!(
                !tables.handlers.contains_key(&id),
                "id generator returned duplicate {id}"
            );
            tables
                .channels
                .entry(channel.clone())
                .or_default()
                .push(id);
            tables.handlers.insert(id, Entry { channel, handler });
        }

        debug!(registry = %self.shared.id, subscription = %id, "subscribed");
        Subscription::new(id, self.shared.id, Arc::downgrade(&self.shared))
    }

    /// Release `subscription` and close the handle.
    ///
    /// Releasing a closed handle does nothing. A handle issued by another
    /// registry is ignored, or rejected under `ForeignHandlePolicy::Reject`.
    pub fn unsubscribe(&self, subscription: &mut Subscription<C, H>) -> Result<()> {
        if subscription.registry_id() != self.shared.id {
            return match self.shared.config.foreign_handles {
                ForeignHandlePolicy::Ignore => {
                    debug!(
                        registry = %self.shared.id,
                        subscription = %subscription.id(),
                        "ignoring foreign subscription"
                    );
                    Ok(())
                }
                ForeignHandlePolicy::Reject => {
                    warn!(
                        registry = %self.shared.id,
                        subscription = %subscription.id(),
                        issuer = %subscription.registry_id(),
                        "rejecting foreign subscription"
                    );
                    Err(RegistryError::InvalidSubscription {
                        subscription: subscription.id(),
                        registry: self.shared.id,
                    })
                }
            };
        }

        subscription.free();
        Ok(())
    }

    /// Handlers registered on `channel`, oldest first.
    ///
    /// Unknown channels yield an empty list.
    pub fn handlers<Q>(&self, channel: &Q) -> Vec<Arc<H>>
    where
        C: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let tables = self.shared.tables.read();
        match tables.channels.get(channel) {
            Some(subs) => subs
                .iter()
                .filter_map(|id| tables.handlers.get(id))
                .map(|entry| Arc::clone(&entry.handler))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Invoke every handler on `channel`, in order, with `args`.
    pub fn publish<Q, A>(&self, channel: &Q, args: &A) -> PublishReport
    where
        C: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        A: ?Sized,
        H: Fn(&A),
    {
        self.publish_with(channel, |handler| handler(args))
    }

    /// Invoke every handler on `channel`, in order, through `invoke`.
    ///
    /// The handler list is snapshotted before the first call and the lock is
    /// released, so handlers may subscribe or unsubscribe freely. Handlers
    /// released during the pass still run in it; handlers added during the
    /// pass run from the next publish on.
    pub fn publish_with<Q, F>(&self, channel: &Q, mut invoke: F) -> PublishReport
    where
        C: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        F: FnMut(&H),
    {
        let handlers = self.handlers(channel);
        trace!(registry = %self.shared.id, handlers = handlers.len(), "publishing");

        let mut report = PublishReport::default();
        for handler in &handlers {
            match self.shared.config.failure_policy {
                FailurePolicy::Propagate => {
                    invoke(handler.as_ref());
                    report.delivered += 1;
                }
                FailurePolicy::Isolate => {
                    match panic::catch_unwind(AssertUnwindSafe(|| invoke(handler.as_ref()))) {
                        Ok(()) => report.delivered += 1,
                        Err(payload) => {
                            warn!(
                                registry = %self.shared.id,
                                reason = panic_message(payload.as_ref()),
                                "handler panicked during publish"
                            );
                            report.failed += 1;
                        }
                    }
                }
            }
        }

        report
    }

    /// Number of live subscriptions.
    pub fn subscription_count(&self) -> usize {
        self.shared.tables.read().handlers.len()
    }

    /// Number of channels with at least one live subscription.
    pub fn channel_count(&self) -> usize {
        self.shared.tables.read().channels.len()
    }

    pub fn is_subscribed(&self, id: SubscriptionId) -> bool {
        self.shared.tables.read().handlers.contains_key(&id)
    }

    /// Channel a live subscription is registered on.
    pub fn channel_of(&self, id: SubscriptionId) -> Option<C>
    where
        C: Clone,
    {
        self.shared
            .tables
            .read()
            .handlers
            .get(&id)
            .map(|entry| entry.channel.clone())
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        *s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}

impl<C, H: ?Sized> Clone for SubscriptionManager<C, H> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<C: Eq + Hash, H: ?Sized> Default for SubscriptionManager<C, H> {
    fn default() -> Self {
        Self::new()
    }
}
