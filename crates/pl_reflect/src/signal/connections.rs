use alloc::sync::Weak;
use alloc::vec::Vec;
use core::fmt;

use super::{ConnectionList, Signal, Slot};

// -----------------------------------------------------------------------------
// Subscription

/// A slot connected to one signal, disconnected when dropped.
///
/// Returned by [`Signal::subscribe`] and
/// [`ObjectExt::subscribe`](crate::object::ObjectExt::subscribe).
#[must_use = "dropping a subscription disconnects it immediately"]
pub struct Subscription {
    signal: Weak<ConnectionList>,
    slot: Slot,
}

impl Subscription {
    #[inline]
    pub(super) fn new(signal: Weak<ConnectionList>, slot: Slot) -> Self {
        Self { signal, slot }
    }

    /// The subscribed slot.
    #[inline]
    pub fn slot(&self) -> &Slot {
        &self.slot
    }

    /// Returns `true` while the signal exists and the slot is connected.
    pub fn is_active(&self) -> bool {
        self.signal
            .upgrade()
            .is_some_and(|connections| Signal { connections }.is_connected(&self.slot))
    }

    /// Disconnects now.
    #[inline]
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(connections) = self.signal.upgrade() {
            Signal { connections }.disconnect(&self.slot);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("slot", &self.slot)
            .field("active", &self.is_active())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Connections

/// Subscriptions held together, e.g. by an object while it is active.
///
/// Clearing or dropping the bag disconnects everything in it.
#[derive(Debug, Default)]
pub struct Connections {
    subscriptions: Vec<Subscription>,
}

impl Connections {
    #[inline]
    pub const fn new() -> Self {
        Self {
            subscriptions: Vec::new(),
        }
    }

    #[inline]
    pub fn push(&mut self, subscription: Subscription) {
        self.subscriptions.push(subscription);
    }

    /// Disconnects every held subscription.
    #[inline]
    pub fn clear(&mut self) {
        self.subscriptions.clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }
}

impl Extend<Subscription> for Connections {
    fn extend<I: IntoIterator<Item = Subscription>>(&mut self, iter: I) {
        self.subscriptions.extend(iter);
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::Connections;
    use crate::signal::Signal;
    use alloc::sync::Arc;
    use core::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn activate_toggle_repeats_cleanly() {
        let signal = Signal::new();
        let count = Arc::new(AtomicUsize::new(0));
        let mut connections = Connections::new();

        for _ in 0..1000 {
            let c = count.clone();
            connections.push(signal.subscribe(move |_| {
                c.fetch_add(1, Ordering::Relaxed);
            }));
            signal.emit(&[]);
            connections.clear();
        }

        signal.emit(&[]);
        assert_eq!(count.load(Ordering::Relaxed), 1000);
        assert!(signal.is_empty());
        assert!(connections.is_empty());
    }

    #[test]
    fn subscription_outliving_signal() {
        let signal = Signal::new();
        let sub = signal.subscribe(|_| {});
        assert!(sub.is_active());
        drop(signal);
        assert!(!sub.is_active());
        sub.unsubscribe();
    }
}
