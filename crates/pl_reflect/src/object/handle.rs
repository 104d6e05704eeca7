use alloc::boxed::Box;
use alloc::sync::{Arc, Weak};
use core::fmt;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, TryLockError};

use super::{Object, ObjectExt};
use crate::class::Class;
use crate::signal::Slot;

type Shared = RwLock<Box<dyn Object>>;

// -----------------------------------------------------------------------------
// ObjectHandle

/// A shared, lockable object.
///
/// Handles are what [`Value::Object`](crate::value::Value::Object) carries
/// and what slots of other objects are bound to. Equality is identity.
#[derive(Clone)]
pub struct ObjectHandle(Arc<Shared>);

impl ObjectHandle {
    #[inline]
    pub fn new(object: impl Object) -> Self {
        Self::from_boxed(Box::new(object))
    }

    #[inline]
    pub fn from_boxed(object: Box<dyn Object>) -> Self {
        Self(Arc::new(RwLock::new(object)))
    }

    #[inline]
    pub fn read(&self) -> RwLockReadGuard<'_, Box<dyn Object>> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    #[inline]
    pub fn write(&self) -> RwLockWriteGuard<'_, Box<dyn Object>> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Locks for writing unless the object is already locked.
    pub fn try_write(&self) -> Option<RwLockWriteGuard<'_, Box<dyn Object>>> {
        match self.0.try_write() {
            Ok(guard) => Some(guard),
            Err(TryLockError::Poisoned(e)) => Some(e.into_inner()),
            Err(TryLockError::WouldBlock) => None,
        }
    }

    #[inline]
    pub fn downgrade(&self) -> WeakObjectHandle {
        WeakObjectHandle(Arc::downgrade(&self.0))
    }

    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    #[inline]
    pub fn class(&self) -> Option<Arc<Class>> {
        self.read().class()
    }

    /// The slot for the declared event handler `name`.
    ///
    /// The slot is created once and owned by the object: it stays
    /// connected until the object is dropped or it is disconnected. It
    /// holds the object weakly and is skipped with a warning while the
    /// object is locked, for instance when the object emits a signal it is
    /// itself connected to.
    ///
    /// # Examples
    ///
    /// ```
    /// use pl_reflect::info::{EventInfo, SlotInfo};
    /// use pl_reflect::object::connect_slot;
    /// use pl_reflect::prelude::*;
    ///
    /// #[derive(Object, Default)]
    /// struct Button {
    ///     #[object(base)]
    ///     base: ObjectBase,
    /// }
    ///
    /// #[derive(Object, Default)]
    /// struct Lamp {
    ///     #[object(base)]
    ///     base: ObjectBase,
    ///     on: bool,
    /// }
    ///
    /// let mut registry = ClassRegistry::new();
    /// let button = registry.register(
    ///     ClassBuilder::<Button>::new("Button")
    ///         .object_base()
    ///         .default_factory()
    ///         .event(EventInfo::new::<()>("OnPressed"))
    ///         .build(),
    /// ).unwrap();
    /// let lamp = registry.register(
    ///     ClassBuilder::<Lamp>::new("Lamp")
    ///         .object_base()
    ///         .default_factory()
    ///         .attribute(AttributeInfo::field("On", |l: &Lamp| &l.on, |l| &mut l.on))
    ///         .slot(SlotInfo::new("OnToggle", |l: &mut Lamp| l.on = !l.on))
    ///         .build(),
    /// ).unwrap();
    ///
    /// let button = button.create_shared().unwrap();
    /// let lamp = lamp.create_shared().unwrap();
    /// assert!(connect_slot(&button, "OnPressed", &lamp, "OnToggle"));
    ///
    /// button.read().emit("OnPressed", &[]).unwrap();
    /// assert_eq!(lamp.read().get_attribute("On"), "true");
    ///
    /// drop(lamp); // disconnects
    /// button.read().emit("OnPressed", &[]).unwrap();
    /// assert_eq!(button.read().signal("OnPressed").unwrap().len(), 0);
    /// ```
    pub fn slot(&self, name: &str) -> Option<Slot> {
        let object = self.read();
        let class = object.class()?;
        let info = class.slot(name)?;
        let mut slots = object.object_base().slots();
        if let Some(slot) = slots.get(info.name()) {
            return Some(slot.clone());
        }

        let target = self.downgrade();
        let slot_name = info.name();
        let slot = Slot::new(move |args| {
            let Some(handle) = target.upgrade() else {
                return;
            };
            let Some(mut object) = handle.try_write() else {
                log::warn!("slot `{slot_name}` skipped: its object is busy");
                return;
            };
            let Some(class) = object.class() else {
                return;
            };
            if let Err(e) = class.invoke_slot(object.as_any_mut(), slot_name, args) {
                log::warn!("{}: slot `{slot_name}` rejected the call: {e}", class.name());
            }
        });
        slots.insert(slot_name, slot.clone());
        Some(slot)
    }
}

impl PartialEq for ObjectHandle {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for ObjectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tuple = f.debug_tuple("ObjectHandle");
        match self.0.try_read() {
            Ok(object) => tuple.field(&object.class().map(|c| c.name())),
            Err(_) => tuple.field(&"<locked>"),
        };
        tuple.finish()
    }
}

/// A non-owning [`ObjectHandle`].
#[derive(Clone, Default)]
pub struct WeakObjectHandle(Weak<Shared>);

impl WeakObjectHandle {
    #[inline]
    pub fn upgrade(&self) -> Option<ObjectHandle> {
        self.0.upgrade().map(ObjectHandle)
    }
}

impl fmt::Debug for WeakObjectHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("WeakObjectHandle")
            .field(&self.0.as_ptr())
            .finish()
    }
}

/// Connects the event `event` of `source` to the slot `slot` of `target`.
///
/// Returns `false` if either name is not declared.
pub fn connect_slot(source: &ObjectHandle, event: &str, target: &ObjectHandle, slot: &str) -> bool {
    match target.slot(slot) {
        Some(slot) => source.read().connect(event, &slot),
        None => false,
    }
}
