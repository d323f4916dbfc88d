//! Connection lifecycle tracking
//!
//! The feed connection moves through a small set of states:
//!
//! ```text
//! Disconnected → Connecting → Connected
//!                     ↓            ↓
//!                  Failed ← Reconnecting
//! ```
//!
//! A single [`ConnectionManager`] per client owns the current state, the
//! reconnect policy and an epoch counter, all behind one mutex so they
//! cannot drift apart: entering `Connected` resets the policy, consuming
//! a reconnect delay advances the attempt shown in
//! `Reconnecting { attempt }`, and every transition names the epoch it
//! belongs to.
//!
//! # Epochs
//!
//! Each `connect()` call starts a new epoch and hands its number to the
//! driver task it spawns. A driver from a superseded epoch may still be
//! tearing down while the fresh one is already connecting; its
//! transitions carry the stale number, fail the epoch check, and leave
//! the live epoch's state and budget untouched. State is kept behind a
//! plain mutex with short critical sections; every accessor returns
//! immediately, matching the client's non-blocking public surface.

use crate::backoff::ReconnectPolicy;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Connection state of a feed client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    /// No connection and none pending; `connect()` is required
    Disconnected,
    /// A connection attempt is in flight
    Connecting,
    /// Connected and delivering events
    Connected,
    /// Waiting out a backoff delay before attempt `attempt`
    Reconnecting {
        /// 1-indexed number of the upcoming attempt
        attempt: u32,
    },
    /// The reconnect budget is spent; idle until a fresh `connect()`
    Failed,
}

struct Inner {
    epoch: u64,
    state: ConnectionState,
    policy: Box<dyn ReconnectPolicy>,
}

/// Owns the lifecycle state and the reconnect policy of one client
pub struct ConnectionManager {
    inner: Mutex<Inner>,
}

impl ConnectionManager {
    /// Create a manager starting in `Disconnected`
    pub fn new(policy: Box<dyn ReconnectPolicy>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                epoch: 0,
                state: ConnectionState::Disconnected,
                policy,
            }),
        }
    }

    /// Current connection state
    pub fn state(&self) -> ConnectionState {
        lock(&self.inner).state.clone()
    }

    /// Start a fresh connection epoch
    ///
    /// Restores the reconnect budget, moves the state to `Connecting`
    /// (so `state()` never reports a stale `Failed` between `connect()`
    /// and the driver's first poll), and returns the new epoch number.
    /// Transitions carrying any earlier number are refused from here on.
    pub(crate) fn begin_epoch(&self) -> u64 {
        let mut inner = lock(&self.inner);
        inner.epoch += 1;
        inner.policy.reset();
        inner.state = ConnectionState::Connecting;
        inner.epoch
    }

    /// Whether `epoch` is still the live epoch
    pub(crate) fn is_current(&self, epoch: u64) -> bool {
        lock(&self.inner).epoch == epoch
    }

    fn transition(&self, epoch: u64, new_state: ConnectionState) -> bool {
        let mut inner = lock(&self.inner);
        if inner.epoch != epoch {
            return false;
        }
        inner.state = new_state;
        true
    }

    /// Transition to `Connecting`; refused for a stale epoch
    pub(crate) fn connecting(&self, epoch: u64) -> bool {
        self.transition(epoch, ConnectionState::Connecting)
    }

    /// Transition to `Connected` and reset the reconnect policy;
    /// refused for a stale epoch
    pub(crate) fn connected(&self, epoch: u64) -> bool {
        let mut inner = lock(&self.inner);
        if inner.epoch != epoch {
            return false;
        }
        inner.state = ConnectionState::Connected;
        inner.policy.reset();
        true
    }

    /// Transition to `Disconnected`; refused for a stale epoch
    pub(crate) fn disconnected(&self, epoch: u64) -> bool {
        self.transition(epoch, ConnectionState::Disconnected)
    }

    /// Transition to `Failed`; refused for a stale epoch
    pub(crate) fn failed(&self, epoch: u64) -> bool {
        self.transition(epoch, ConnectionState::Failed)
    }

    /// Consume the next reconnect delay
    ///
    /// Returns the delay to wait and moves the state to
    /// `Reconnecting { attempt }`; returns `None` once the policy's
    /// budget is spent (the caller is expected to transition to
    /// `Failed`). A stale epoch gets `None` without the policy being
    /// consulted, so a superseded driver cannot spend the live budget.
    pub(crate) fn next_reconnect_delay(&self, epoch: u64) -> Option<Duration> {
        let mut inner = lock(&self.inner);
        if inner.epoch != epoch {
            return None;
        }
        let delay = inner.policy.next_delay();
        if delay.is_some() {
            let attempt = inner.policy.attempts();
            inner.state = ConnectionState::Reconnecting { attempt };
        }
        delay
    }

    /// Attempts consumed since the last successful connection
    pub(crate) fn attempts(&self) -> u32 {
        lock(&self.inner).policy.attempts()
    }
}

// Observer callbacks run outside any registry or state lock and their
// panics are caught, so poisoning cannot accumulate meaning here; a
// poisoned guard is recovered rather than propagated.
pub(crate) fn lock<T: ?Sized>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backoff::ExponentialBackoff;

    fn manager_with(max_attempts: u32) -> ConnectionManager {
        let policy = ExponentialBackoff::new(
            Duration::from_millis(100),
            Duration::from_secs(10),
        )
        .with_max_attempts(max_attempts);
        ConnectionManager::new(Box::new(policy))
    }

    #[test]
    fn lifecycle_transitions() {
        let manager = manager_with(3);
        assert_eq!(manager.state(), ConnectionState::Disconnected);

        let epoch = manager.begin_epoch();
        assert_eq!(manager.state(), ConnectionState::Connecting);

        assert!(manager.connected(epoch));
        assert_eq!(manager.state(), ConnectionState::Connected);

        assert!(manager.disconnected(epoch));
        assert_eq!(manager.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn reconnect_attempts_advance_and_exhaust() {
        let manager = manager_with(3);
        let epoch = manager.begin_epoch();

        assert!(manager.next_reconnect_delay(epoch).is_some());
        assert_eq!(manager.state(), ConnectionState::Reconnecting { attempt: 1 });

        assert!(manager.next_reconnect_delay(epoch).is_some());
        assert_eq!(manager.state(), ConnectionState::Reconnecting { attempt: 2 });

        assert!(manager.next_reconnect_delay(epoch).is_some());
        assert_eq!(manager.state(), ConnectionState::Reconnecting { attempt: 3 });

        assert!(manager.next_reconnect_delay(epoch).is_none());
        assert_eq!(manager.attempts(), 3);
    }

    #[test]
    fn connected_resets_the_policy() {
        let manager = manager_with(5);
        let epoch = manager.begin_epoch();

        manager.next_reconnect_delay(epoch);
        manager.next_reconnect_delay(epoch);
        assert_eq!(manager.attempts(), 2);

        assert!(manager.connected(epoch));
        assert_eq!(manager.attempts(), 0);

        assert!(manager.next_reconnect_delay(epoch).is_some());
        assert_eq!(manager.state(), ConnectionState::Reconnecting { attempt: 1 });
    }

    #[test]
    fn begin_epoch_restores_budget() {
        let manager = manager_with(2);
        let epoch = manager.begin_epoch();
        manager.next_reconnect_delay(epoch);
        manager.next_reconnect_delay(epoch);
        assert!(manager.next_reconnect_delay(epoch).is_none());
        assert!(manager.failed(epoch));

        let fresh = manager.begin_epoch();
        assert!(manager.next_reconnect_delay(fresh).is_some());
    }

    #[test]
    fn stale_epoch_cannot_touch_state() {
        let manager = manager_with(3);
        let old = manager.begin_epoch();
        let fresh = manager.begin_epoch();

        assert!(!manager.connected(old));
        assert!(manager.connected(fresh));
        assert_eq!(manager.state(), ConnectionState::Connected);

        assert!(!manager.disconnected(old));
        assert!(!manager.failed(old));
        assert!(!manager.connecting(old));
        assert_eq!(manager.state(), ConnectionState::Connected);
    }

    #[test]
    fn stale_epoch_cannot_spend_the_budget() {
        let manager = manager_with(2);
        let old = manager.begin_epoch();
        let fresh = manager.begin_epoch();

        assert!(manager.next_reconnect_delay(old).is_none());
        assert_eq!(manager.attempts(), 0);

        assert!(manager.next_reconnect_delay(fresh).is_some());
        assert!(manager.next_reconnect_delay(fresh).is_some());
        assert!(manager.next_reconnect_delay(fresh).is_none());
    }
}
