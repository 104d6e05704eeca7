use alloc::boxed::Box;
use alloc::sync::Arc;
use core::any::Any;
use core::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use pl_utils::hash::HashMap;

use crate::class::{Class, ClassBuilder};
use crate::info::EventInfo;
use crate::signal::{Signal, Slot};

// -----------------------------------------------------------------------------
// Object

/// A native type that can be reflected as an instance of a [`Class`].
///
/// Every reflected type contains exactly one [`ObjectBase`], reached
/// through its chain of base-class sub-objects. Implement it with
/// `#[derive(Object)]`:
///
/// ```
/// use pl_reflect::prelude::*;
///
/// #[derive(Object, Default)]
/// struct Light {
///     #[object(base)]
///     base: ObjectBase,
///     range: f32,
/// }
///
/// #[derive(Object, Default)]
/// struct SpotLight {
///     #[object(base)]
///     light: Light,
///     angle: f32,
/// }
///
/// let spot = SpotLight::default();
/// assert!(spot.class().is_none()); // not created by a class
/// assert!(spot.as_any().is::<SpotLight>());
/// ```
///
/// Extension methods live on [`ObjectExt`](super::ObjectExt).
pub trait Object: Any + Send + Sync {
    /// The root sub-object.
    fn object_base(&self) -> &ObjectBase;

    fn object_base_mut(&mut self) -> &mut ObjectBase;

    /// The concrete instance.
    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

// -----------------------------------------------------------------------------
// ObjectBase

/// The root class `Object`.
///
/// Holds the class binding, the signals of declared events (created on
/// first use) and the slots handed out by
/// [`ObjectHandle::slot`](super::ObjectHandle::slot).
///
/// Dropping it emits `Destroyed` if anything asked for that signal.
#[derive(Default)]
pub struct ObjectBase {
    class: Option<Arc<Class>>,
    signals: Mutex<HashMap<&'static str, Signal>>,
    slots: Mutex<HashMap<&'static str, Slot>>,
}

impl ObjectBase {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// The class this instance was created by or adopted into.
    #[inline]
    pub fn class(&self) -> Option<&Arc<Class>> {
        self.class.as_ref()
    }

    #[inline]
    pub(crate) fn bind(&mut self, class: Arc<Class>) {
        self.class = Some(class);
    }

    #[inline]
    pub(crate) fn signals(&self) -> MutexGuard<'_, HashMap<&'static str, Signal>> {
        self.signals.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[inline]
    pub(crate) fn slots(&self) -> MutexGuard<'_, HashMap<&'static str, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Object for ObjectBase {
    #[inline]
    fn object_base(&self) -> &ObjectBase {
        self
    }

    #[inline]
    fn object_base_mut(&mut self) -> &mut ObjectBase {
        self
    }

    #[inline]
    fn as_any(&self) -> &dyn Any {
        self
    }

    #[inline]
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    #[inline]
    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

impl Drop for ObjectBase {
    fn drop(&mut self) {
        let destroyed = self
            .signals
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .remove("Destroyed");
        if let Some(signal) = destroyed {
            signal.emit(&[]);
        }
    }
}

impl fmt::Debug for ObjectBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectBase")
            .field("class", &self.class.as_ref().map(|c| c.full_name()))
            .finish_non_exhaustive()
    }
}

/// Declares the root class `Object`.
pub(crate) fn object_class() -> Class {
    ClassBuilder::<ObjectBase>::new("Object")
        .description("Root class of every reflected object")
        .default_factory()
        .event(
            EventInfo::new::<()>("Destroyed")
                .with_description("Emitted while the object is dropped"),
        )
        .build()
}
