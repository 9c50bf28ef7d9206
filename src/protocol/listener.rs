use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use crate::types::{Status, TransactionId};

/// Notification emitted once per completed transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionEvent {
    pub operation: &'static str,
    pub transaction_id: TransactionId,
    pub status: Status,
}

pub trait TransactionListener: Send + Sync {
    fn on_transaction(&self, event: &TransactionEvent);
}

impl<F> TransactionListener for F
where
    F: Fn(&TransactionEvent) + Send + Sync,
{
    fn on_transaction(&self, event: &TransactionEvent) {
        self(event)
    }
}

type Listeners = RwLock<BTreeMap<u64, Arc<dyn TransactionListener>>>;

/// Registry of transaction listeners, shared between clones of a protocol client.
#[derive(Clone, Default)]
pub struct ListenerRegistry {
    next_id: Arc<AtomicU64>,
    listeners: Arc<Listeners>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, listener: Arc<dyn TransactionListener>) -> ListenerHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners.write().insert(id, listener);
        ListenerHandle {
            id,
            registry: Arc::downgrade(&self.listeners),
        }
    }

    /// Invoke every listener registered at the time of the call.
    ///
    /// Listeners run outside the lock, so a listener may register or remove
    /// listeners without deadlocking.
    pub fn notify(&self, event: &TransactionEvent) {
        let snapshot: Vec<Arc<dyn TransactionListener>> =
            self.listeners.read().values().cloned().collect();
        for listener in snapshot {
            listener.on_transaction(event);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// De-registration capability returned when a listener is added.
///
/// Dropping the handle keeps the listener registered; call [`ListenerHandle::remove`]
/// to detach it. Removing more than once is a no-op.
#[derive(Debug, Clone)]
pub struct ListenerHandle {
    id: u64,
    registry: Weak<Listeners>,
}

impl ListenerHandle {
    /// Detach the listener. Returns true only for the call that actually removed it.
    pub fn remove(&self) -> bool {
        match self.registry.upgrade() {
            Some(listeners) => listeners.write().remove(&self.id).is_some(),
            None => false,
        }
    }

    pub fn is_registered(&self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|listeners| listeners.read().contains_key(&self.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AccountId;
    use std::sync::atomic::AtomicUsize;

    fn event(n: u32) -> TransactionEvent {
        TransactionEvent {
            operation: "TokenMint",
            transaction_id: TransactionId {
                account_id: AccountId::from_num(2),
                valid_start_seconds: 1,
                valid_start_nanos: n,
            },
            status: Status::Success,
        }
    }

    fn counting_listener(counter: &Arc<AtomicUsize>) -> Arc<dyn TransactionListener> {
        let counter = counter.clone();
        Arc::new(move |_: &TransactionEvent| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_every_listener_sees_every_event() {
        let registry = ListenerRegistry::new();
        let a = Arc::new(AtomicUsize::new(0));
        let b = Arc::new(AtomicUsize::new(0));
        registry.register(counting_listener(&a));
        registry.register(counting_listener(&b));

        registry.notify(&event(1));
        registry.notify(&event(2));

        assert_eq!(a.load(Ordering::SeqCst), 2);
        assert_eq!(b.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let registry = ListenerRegistry::new();
        let count = Arc::new(AtomicUsize::new(0));
        let handle = registry.register(counting_listener(&count));

        registry.notify(&event(1));
        assert!(handle.remove());
        assert!(!handle.remove());
        assert!(!handle.is_registered());
        registry.notify(&event(2));

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_remove_only_detaches_own_listener() {
        let registry = ListenerRegistry::new();
        let a = Arc::new(AtomicUsize::new(0));
        let b = Arc::new(AtomicUsize::new(0));
        let handle_a = registry.register(counting_listener(&a));
        let _handle_b = registry.register(counting_listener(&b));

        handle_a.remove();
        handle_a.remove();
        registry.notify(&event(1));

        assert_eq!(a.load(Ordering::SeqCst), 0);
        assert_eq!(b.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_handle_outliving_registry() {
        let registry = ListenerRegistry::new();
        let handle = registry.register(Arc::new(|_: &TransactionEvent| {}));
        drop(registry);
        assert!(!handle.remove());
    }

    #[test]
    fn test_listener_can_remove_itself() {
        let registry = ListenerRegistry::new();
        let slot: Arc<parking_lot::Mutex<Option<ListenerHandle>>> = Arc::default();
        let count = Arc::new(AtomicUsize::new(0));

        let inner_slot = slot.clone();
        let inner_count = count.clone();
        let handle = registry.register(Arc::new(move |_: &TransactionEvent| {
            inner_count.fetch_add(1, Ordering::SeqCst);
            if let Some(handle) = inner_slot.lock().as_ref() {
                handle.remove();
            }
        }));
        *slot.lock() = Some(handle);

        registry.notify(&event(1));
        registry.notify(&event(2));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_concurrent_registration_and_notification() {
        let registry = ListenerRegistry::new();
        let count = Arc::new(AtomicUsize::new(0));

        std::thread::scope(|scope| {
            for _ in 0..8 {
                let registry = registry.clone();
                let count = count.clone();
                scope.spawn(move || {
                    let handle = registry.register(counting_listener(&count));
                    handle.remove();
                });
            }
        });

        assert!(registry.is_empty());
        let handle = registry.register(counting_listener(&count));
        registry.notify(&event(1));
        assert!(handle.remove());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
