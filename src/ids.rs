//! Subscription identifier generation.

use crate::types::SubscriptionId;
use std::sync::atomic::{AtomicU64, Ordering};

/// Source of subscription identifiers.
///
/// Implementations must never hand out the same value twice within the
/// process. The registry treats the value as an opaque token.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> SubscriptionId;
}

/// Process-wide counter shared by every `SequentialIds`.
static NEXT_SUBSCRIPTION_ID: AtomicU64 = AtomicU64::new(1);

/// Default generator backed by a process-wide atomic counter.
///
/// Ids stay unique across registry instances, so a handle can never collide
/// with one issued elsewhere in the same process.
#[derive(Clone, Copy, Debug, Default)]
pub struct SequentialIds;

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> SubscriptionId {
        SubscriptionId(NEXT_SUBSCRIPTION_ID.fetch_add(1, Ordering::SeqCst))
    }
}

impl<F> IdGenerator for F
where
    F: Fn() -> SubscriptionId + Send + Sync,
{
    fn next_id(&self) -> SubscriptionId {
        self()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_sequential_ids_are_unique_across_instances() {
        let a = SequentialIds;
        let b = SequentialIds;

        let mut seen = HashSet::new();
        for _ in 0..100 {
            assert!(seen.insert(a.next_id()));
            assert!(seen.insert(b.next_id()));
        }
    }

    #[test]
    fn test_sequential_ids_unique_across_threads() {
        let ids = Arc::new(SequentialIds);
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let ids = Arc::clone(&ids);
                thread::spawn(move || (0..250).map(|_| ids.next_id()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id), "duplicate id {id}");
            }
        }
        assert_eq!(seen.len(), 1000);
    }

    #[test]
    fn test_closure_generator() {
        let counter = AtomicU64::new(500);
        let ids = move || SubscriptionId(counter.fetch_add(1, Ordering::SeqCst));

        assert_eq!(ids.next_id(), SubscriptionId(500));
        assert_eq!(ids.next_id(), SubscriptionId(501));
    }
}
