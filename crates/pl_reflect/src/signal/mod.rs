//! Per-instance signals and the slots connected to them.
//!
//! ## Menu
//!
//! - [`Slot`]: a shared callback. Clones are the same slot.
//! - [`Signal`]: an ordered list of weakly held slots.
//! - [`Subscription`]: owns a slot connected to a signal, disconnects on drop.
//! - [`Connections`]: a bag of subscriptions, dropped together.
//!
//! A signal never keeps a slot alive. Dropping the last clone of a slot
//! disconnects it from every signal, so a destroyed receiver can't be
//! called.
//!
//! # Activation
//!
//! The usual pattern for an object that listens while active:
//!
//! ```
//! use pl_reflect::signal::{Connections, Signal};
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicU32, Ordering};
//!
//! let on_update = Signal::new();
//! let ticks = Arc::new(AtomicU32::new(0));
//! let mut connections = Connections::new();
//!
//! // activate
//! let counter = ticks.clone();
//! connections.push(on_update.subscribe(move |_| {
//!     counter.fetch_add(1, Ordering::Relaxed);
//! }));
//! on_update.emit(&[]);
//!
//! // deactivate
//! connections.clear();
//! on_update.emit(&[]);
//!
//! assert_eq!(ticks.load(Ordering::Relaxed), 1);
//! ```

// -----------------------------------------------------------------------------
// Modules

mod connections;
mod slot;

// -----------------------------------------------------------------------------
// Exports

pub use connections::{Connections, Subscription};
pub use slot::Slot;

use alloc::sync::{Arc, Weak};
use alloc::vec::Vec;
use core::fmt;
use core::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use pl_utils::hash::HashMap;

use crate::value::Value;
use slot::{SlotInner, slot_key};

// -----------------------------------------------------------------------------
// ConnectionTable

struct Connection {
    slot: Weak<SlotInner>,
    live: Arc<AtomicBool>,
}

impl Connection {
    #[inline]
    fn is_alive(&self) -> bool {
        self.slot.strong_count() > 0
    }
}

/// Connections in connection order, indexed by slot identity.
///
/// Disconnecting leaves a hole that is compacted away once holes make up
/// half of the table, or by the next emission. A held `Weak` keeps the slot
/// allocation, so a key is never reused while its entry exists.
#[derive(Default)]
struct ConnectionTable {
    entries: Vec<Option<Connection>>,
    index: HashMap<usize, usize>,
    holes: usize,
}

impl ConnectionTable {
    fn insert(&mut self, slot: &Slot) -> bool {
        let key = slot.key();
        if self.index.contains_key(&key) {
            return false;
        }
        if self.entries.len() == self.entries.capacity() {
            self.compact();
        }
        self.index.insert(key, self.entries.len());
        self.entries.push(Some(Connection {
            slot: slot.downgrade(),
            live: Arc::new(AtomicBool::new(true)),
        }));
        true
    }

    fn remove(&mut self, slot: &Slot) -> bool {
        let Some(position) = self.index.remove(&slot.key()) else {
            return false;
        };
        if let Some(connection) = self.entries.get_mut(position).and_then(Option::take) {
            connection.live.store(false, Ordering::Release);
        }
        self.holes += 1;
        if self.holes * 2 > self.entries.len() {
            self.compact();
        }
        true
    }

    #[inline]
    fn contains(&self, slot: &Slot) -> bool {
        self.index.contains_key(&slot.key())
    }

    // Drops holes and dead slots, keeping order.
    fn compact(&mut self) {
        let before = self.entries.len();
        self.entries
            .retain(|entry| entry.as_ref().is_some_and(Connection::is_alive));
        self.holes = 0;
        if self.entries.len() != before {
            self.index.clear();
            for (position, entry) in self.entries.iter().enumerate() {
                if let Some(connection) = entry {
                    self.index.insert(slot_key(&connection.slot), position);
                }
            }
        }
    }

    fn iter(&self) -> impl Iterator<Item = &Connection> {
        self.entries.iter().flatten()
    }

    fn clear(&mut self) {
        for connection in self.entries.drain(..).flatten() {
            connection.live.store(false, Ordering::Release);
        }
        self.index.clear();
        self.holes = 0;
    }
}

type ConnectionList = Mutex<ConnectionTable>;

// -----------------------------------------------------------------------------
// Signal

/// An emittable event.
///
/// Cloning a signal shares its connection list.
///
/// Connecting and disconnecting take amortized constant time. Emission
/// works on a snapshot of the connections, so slots may connect and
/// disconnect (themselves or others) while it runs. A slot disconnected
/// during emission is not called afterwards, a slot connected during
/// emission is first called by the next one.
///
/// # Examples
///
/// ```
/// use pl_reflect::signal::{Signal, Slot};
/// use std::sync::{Arc, Mutex};
///
/// let log = Arc::new(Mutex::new(Vec::new()));
/// let make = |name: &'static str| {
///     let log = log.clone();
///     Slot::new(move |_| log.lock().unwrap().push(name))
/// };
/// let (s1, s2) = (make("s1"), make("s2"));
///
/// let signal = Signal::new();
/// assert!(signal.connect(&s1));
/// assert!(signal.connect(&s2));
/// assert!(!signal.connect(&s1)); // already connected
///
/// signal.emit(&[]);
/// assert_eq!(*log.lock().unwrap(), ["s1", "s2"]);
/// ```
#[derive(Clone, Default)]
pub struct Signal {
    connections: Arc<ConnectionList>,
}

impl Signal {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    fn lock(&self) -> MutexGuard<'_, ConnectionTable> {
        self.connections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Connects a slot at the end of the list.
    ///
    /// Returns `false` if the slot is already connected; it is never
    /// delivered to twice.
    pub fn connect(&self, slot: &Slot) -> bool {
        self.lock().insert(slot)
    }

    /// Disconnects a slot, returning `false` if it wasn't connected.
    pub fn disconnect(&self, slot: &Slot) -> bool {
        self.lock().remove(slot)
    }

    /// Creates a slot from `f`, connects it and returns the owning
    /// [`Subscription`].
    pub fn subscribe(&self, f: impl Fn(&[Value]) + Send + Sync + 'static) -> Subscription {
        let slot = Slot::new(f);
        self.connect(&slot);
        Subscription::new(Arc::downgrade(&self.connections), slot)
    }

    /// Calls every connected slot in connection order.
    pub fn emit(&self, args: &[Value]) {
        let snapshot: Vec<(Arc<SlotInner>, Arc<AtomicBool>)> = {
            let mut table = self.lock();
            table.compact();
            table
                .iter()
                .filter_map(|c| Some((c.slot.upgrade()?, c.live.clone())))
                .collect()
        };
        for (slot, live) in snapshot {
            if live.load(Ordering::Acquire) {
                slot.call(args);
            }
        }
    }

    /// Returns `true` if `slot` is connected.
    pub fn is_connected(&self, slot: &Slot) -> bool {
        self.lock().contains(slot)
    }

    /// Number of connected slots that are still alive.
    pub fn len(&self) -> usize {
        self.lock().iter().filter(|c| c.is_alive()).count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Disconnects every slot.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Returns `true` if both handles share one connection list.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.connections, &other.connections)
    }
}

impl fmt::Debug for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("connections", &self.len())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{Signal, Slot};
    use crate::value::Value;
    use alloc::sync::Arc;
    use alloc::vec::Vec;
    use core::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn counter() -> (Arc<AtomicUsize>, Slot) {
        let count = Arc::new(AtomicUsize::new(0));
        let inner = count.clone();
        let slot = Slot::new(move |_| {
            inner.fetch_add(1, Ordering::SeqCst);
        });
        (count, slot)
    }

    #[test]
    fn counting_slot_stops_after_disconnect() {
        let on_tick = Signal::new();
        let (count, slot) = counter();
        on_tick.connect(&slot);

        for _ in 0..3 {
            on_tick.emit(&[]);
        }
        assert_eq!(count.load(Ordering::SeqCst), 3);

        assert!(on_tick.disconnect(&slot));
        on_tick.emit(&[]);
        on_tick.emit(&[]);
        assert_eq!(count.load(Ordering::SeqCst), 3);
        assert!(!on_tick.disconnect(&slot));
    }

    #[test]
    fn double_connect_delivers_once() {
        let signal = Signal::new();
        let (count, slot) = counter();
        assert!(signal.connect(&slot));
        assert!(!signal.connect(&slot.clone()));
        signal.emit(&[]);
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(signal.len(), 1);
    }

    #[test]
    fn disconnect_during_emission() {
        let signal = Signal::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        let push = |name: &'static str| {
            let order = order.clone();
            Slot::new(move |_| order.lock().unwrap().push(name))
        };
        let s2 = push("s2");
        let s3 = push("s3");
        let s1 = {
            let order = order.clone();
            let signal = signal.clone();
            let s2 = s2.clone();
            Slot::new(move |_| {
                order.lock().unwrap().push("s1");
                signal.disconnect(&s2);
            })
        };

        signal.connect(&s1);
        signal.connect(&s2);
        signal.connect(&s3);

        signal.emit(&[]);
        assert_eq!(*order.lock().unwrap(), ["s1", "s3"]);

        signal.emit(&[]);
        assert_eq!(*order.lock().unwrap(), ["s1", "s3", "s1", "s3"]);
    }

    #[test]
    fn self_disconnect_and_connect_during_emission() {
        let signal = Signal::new();
        let (late_count, late) = counter();
        let slot_cell: Arc<Mutex<Option<Slot>>> = Arc::new(Mutex::new(None));

        let once = {
            let signal = signal.clone();
            let cell = slot_cell.clone();
            let late = late.clone();
            Slot::new(move |_| {
                if let Some(me) = cell.lock().unwrap().take() {
                    signal.disconnect(&me);
                }
                signal.connect(&late);
            })
        };
        *slot_cell.lock().unwrap() = Some(once.clone());
        signal.connect(&once);

        signal.emit(&[]);
        // connected during emission, not called until the next one
        assert_eq!(late_count.load(Ordering::SeqCst), 0);
        assert!(!signal.is_connected(&once));

        signal.emit(&[]);
        assert_eq!(late_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn order_survives_disconnects() {
        let signal = Signal::new();
        let order = Arc::new(Mutex::new(Vec::new()));
        let slots: Vec<Slot> = (0..64)
            .map(|i| {
                let order = order.clone();
                Slot::new(move |_| order.lock().unwrap().push(i))
            })
            .collect();
        for slot in &slots {
            signal.connect(slot);
        }

        // every odd slot, then 0 to the back
        for slot in slots.iter().skip(1).step_by(2) {
            assert!(signal.disconnect(slot));
        }
        assert!(signal.disconnect(&slots[0]));
        assert!(signal.connect(&slots[0]));
        assert!(!signal.is_connected(&slots[1]));
        assert!(signal.is_connected(&slots[2]));

        signal.emit(&[]);
        let mut expected: Vec<i32> = (2..64).step_by(2).collect();
        expected.push(0);
        assert_eq!(*order.lock().unwrap(), expected);
    }

    #[test]
    fn holes_are_compacted() {
        let signal = Signal::new();
        let slots: Vec<Slot> = (0..1000).map(|_| Slot::new(|_| {})).collect();
        for slot in &slots {
            signal.connect(slot);
        }
        for slot in &slots[..999] {
            signal.disconnect(slot);
        }

        let table = signal.lock();
        assert!(table.entries.len() < 10);
        assert_eq!(table.index.len(), 1);
        drop(table);

        assert!(signal.is_connected(&slots[999]));
        assert!(signal.disconnect(&slots[999]));
        assert!(signal.is_empty());
    }

    #[test]
    fn dropped_slots_are_pruned() {
        let signal = Signal::new();
        let (count, slot) = counter();
        signal.connect(&slot);
        drop(slot);

        signal.emit(&[Value::Int(1)]);
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert!(signal.is_empty());
    }

    #[test]
    fn subscription_disconnects_on_drop() {
        let signal = Signal::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sub = {
            let seen = seen.clone();
            signal.subscribe(move |args| seen.lock().unwrap().extend_from_slice(args))
        };

        signal.emit(&[Value::Int(7)]);
        drop(sub);
        signal.emit(&[Value::Int(8)]);

        assert_eq!(*seen.lock().unwrap(), [Value::Int(7)]);
        assert!(signal.is_empty());
    }
}
