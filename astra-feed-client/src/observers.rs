//! Observer registry and subscription handles
//!
//! Incoming events fan out to caller-supplied callbacks. The registry
//! keeps subscriptions in insertion order and delivers in that order;
//! duplicate registrations of the same callback are independent
//! subscriptions, each removable through its own [`Subscription`] handle.
//!
//! # Delivery Semantics
//!
//! Delivery is synchronous on the client's driver task. The registry lock
//! is never held while a callback runs, so observers may freely subscribe
//! or cancel during delivery: cancelling mid-round does not disturb
//! observers already notified in that round and takes effect before the
//! cancelled observer would next be invoked. A panicking observer is
//! isolated; the remaining observers still receive the event.

use crate::connection_state::lock;
use crate::fault::{Fault, FaultHook};
use astra_feed_core::AgentEvent;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, Weak};

/// Callback type for event observers
pub type ObserverFn = Arc<dyn Fn(AgentEvent) + Send + Sync>;

#[derive(Default)]
struct Inner {
    next_id: u64,
    entries: Vec<(u64, ObserverFn)>,
}

/// Ordered collection of event subscriptions
#[derive(Clone, Default)]
pub struct ObserverRegistry {
    inner: Arc<Mutex<Inner>>,
}

impl ObserverRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer; it receives every subsequently parsed event
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(AgentEvent) + Send + Sync + 'static,
    {
        let mut inner = lock(&self.inner);
        let id = inner.next_id;
        inner.next_id += 1;
        inner.entries.push((id, Arc::new(observer)));
        Subscription {
            id,
            registry: Arc::downgrade(&self.inner),
        }
    }

    /// Number of live subscriptions
    pub fn len(&self) -> usize {
        lock(&self.inner).entries.len()
    }

    /// Whether the registry has no subscriptions
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn contains(&self, id: u64) -> bool {
        lock(&self.inner).entries.iter().any(|(eid, _)| *eid == id)
    }

    /// Deliver an event to every registered observer, in subscription order
    ///
    /// The entry list is snapshotted up front; each observer is re-checked
    /// against the live registry just before its callback runs, so a
    /// cancellation issued by an earlier observer in the same round is
    /// honored. Panics are caught per observer and reported as faults.
    pub(crate) fn dispatch(&self, event: &AgentEvent, faults: &FaultHook) {
        let snapshot: Vec<(u64, ObserverFn)> = lock(&self.inner).entries.clone();

        for (id, observer) in snapshot {
            if !self.contains(id) {
                continue;
            }
            let delivery = catch_unwind(AssertUnwindSafe(|| observer(event.clone())));
            if delivery.is_err() {
                tracing::warn!(observer = id, "observer panicked during delivery");
                faults(Fault::ObserverPanic);
            }
        }
    }
}

/// Handle that removes exactly one registration
///
/// `cancel()` is idempotent: the second and later calls are no-ops.
/// Dropping the handle without cancelling leaves the subscription active,
/// mirroring a discarded unsubscribe closure.
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<Inner>>,
}

impl Subscription {
    /// Remove this registration; safe to call more than once
    pub fn cancel(&self) {
        if let Some(inner) = self.registry.upgrade() {
            lock(&inner).entries.retain(|(id, _)| *id != self.id);
        }
    }

    /// Whether this registration is still present
    pub fn is_active(&self) -> bool {
        match self.registry.upgrade() {
            Some(inner) => lock(&inner).entries.iter().any(|(id, _)| *id == self.id),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fault::default_hook;
    use astra_feed_core::Severity;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn event() -> AgentEvent {
        AgentEvent::new("Scout", "ping", Severity::Normal)
    }

    fn counting_observer(counter: Arc<AtomicUsize>) -> impl Fn(AgentEvent) + Send + Sync {
        move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn delivers_in_subscription_order() {
        let registry = ObserverRegistry::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let order = Arc::clone(&order);
            registry.subscribe(move |_| order.lock().unwrap().push(tag));
        }

        registry.dispatch(&event(), &default_hook());
        assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn cancel_stops_future_deliveries() {
        let registry = ObserverRegistry::new();
        let count = Arc::new(AtomicUsize::new(0));
        let sub = registry.subscribe(counting_observer(Arc::clone(&count)));

        registry.dispatch(&event(), &default_hook());
        assert_eq!(count.load(Ordering::SeqCst), 1);

        sub.cancel();
        registry.dispatch(&event(), &default_hook());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn cancel_is_idempotent() {
        let registry = ObserverRegistry::new();
        let sub = registry.subscribe(|_| {});
        assert!(sub.is_active());

        sub.cancel();
        assert!(!sub.is_active());
        sub.cancel();
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn duplicate_registrations_are_independent() {
        let registry = ObserverRegistry::new();
        let count = Arc::new(AtomicUsize::new(0));

        let sub_a = registry.subscribe(counting_observer(Arc::clone(&count)));
        let _sub_b = registry.subscribe(counting_observer(Arc::clone(&count)));

        registry.dispatch(&event(), &default_hook());
        assert_eq!(count.load(Ordering::SeqCst), 2);

        sub_a.cancel();
        registry.dispatch(&event(), &default_hook());
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn panicking_observer_does_not_block_later_ones() {
        let registry = ObserverRegistry::new();
        let count = Arc::new(AtomicUsize::new(0));
        let panics = Arc::new(AtomicUsize::new(0));

        registry.subscribe(|_| panic!("observer failure"));
        registry.subscribe(counting_observer(Arc::clone(&count)));

        let panics_seen = Arc::clone(&panics);
        let hook: FaultHook = Arc::new(move |fault| {
            if matches!(fault, Fault::ObserverPanic) {
                panics_seen.fetch_add(1, Ordering::SeqCst);
            }
        });

        registry.dispatch(&event(), &hook);
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(panics.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn cancelling_mid_round_spares_already_notified() {
        let registry = ObserverRegistry::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        let order_a = Arc::clone(&order);
        registry.subscribe(move |_| order_a.lock().unwrap().push("a"));

        // Observer b cancels observer c during delivery
        let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));
        let slot_b = Arc::clone(&slot);
        let order_b = Arc::clone(&order);
        registry.subscribe(move |_| {
            order_b.lock().unwrap().push("b");
            if let Some(sub) = slot_b.lock().unwrap().as_ref() {
                sub.cancel();
            }
        });

        let order_c = Arc::clone(&order);
        let sub_c = registry.subscribe(move |_| order_c.lock().unwrap().push("c"));
        *slot.lock().unwrap() = Some(sub_c);

        registry.dispatch(&event(), &default_hook());
        assert_eq!(*order.lock().unwrap(), vec!["a", "b"]);

        registry.dispatch(&event(), &default_hook());
        assert_eq!(*order.lock().unwrap(), vec!["a", "b", "a", "b"]);
    }

    #[test]
    fn subscribing_during_delivery_takes_effect_next_round() {
        let registry = ObserverRegistry::new();
        let count = Arc::new(AtomicUsize::new(0));

        let registry_inner = registry.clone();
        let count_inner = Arc::clone(&count);
        registry.subscribe(move |_| {
            let counter = Arc::clone(&count_inner);
            registry_inner.subscribe(counting_observer(counter));
        });

        registry.dispatch(&event(), &default_hook());
        // The nested observer was added after the snapshot was taken
        assert_eq!(count.load(Ordering::SeqCst), 0);

        registry.dispatch(&event(), &default_hook());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
