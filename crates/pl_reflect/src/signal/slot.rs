use alloc::boxed::Box;
use alloc::sync::{Arc, Weak};
use core::fmt;

use crate::value::Value;

type Callback = Box<dyn Fn(&[Value]) + Send + Sync>;

pub(super) struct SlotInner {
    callback: Callback,
}

impl SlotInner {
    #[inline]
    pub(super) fn call(&self, args: &[Value]) {
        (self.callback)(args);
    }
}

// -----------------------------------------------------------------------------
// Slot

/// A callback that can be connected to any number of signals.
///
/// Identity is shared by clones: connecting a clone of a connected slot is
/// a no-op, and the slot stays connected until its last clone is dropped.
#[derive(Clone)]
pub struct Slot {
    inner: Arc<SlotInner>,
}

impl Slot {
    pub fn new(f: impl Fn(&[Value]) + Send + Sync + 'static) -> Self {
        Self {
            inner: Arc::new(SlotInner {
                callback: Box::new(f),
            }),
        }
    }

    /// Calls the slot directly.
    #[inline]
    pub fn invoke(&self, args: &[Value]) {
        self.inner.call(args);
    }

    /// Returns `true` if both are the same slot.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    #[inline]
    pub(super) fn downgrade(&self) -> Weak<SlotInner> {
        Arc::downgrade(&self.inner)
    }

    /// Identity of the slot, shared with its `Weak` references.
    #[inline]
    pub(super) fn key(&self) -> usize {
        Arc::as_ptr(&self.inner) as usize
    }
}

#[inline]
pub(super) fn slot_key(weak: &Weak<SlotInner>) -> usize {
    weak.as_ptr() as usize
}

impl fmt::Debug for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Slot")
            .field(&Arc::as_ptr(&self.inner))
            .finish()
    }
}
