use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::format;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::{TypeId, type_name};
use core::marker::PhantomData;
use core::sync::atomic::AtomicBool;
use std::sync::RwLock;

use super::descriptor::{Class, FieldCast};
use super::layout::{Layout, LinkState};
use crate::info::{AttributeInfo, ConstructorInfo, EventInfo, MethodInfo, SlotInfo};
use crate::object::{Object, ObjectBase};
use crate::registry::ModuleId;

// -----------------------------------------------------------------------------
// ClassBuilder

/// Declares a class for the native type `T`.
///
/// Members keep the order they are declared in. Declaring a member with
/// the name of an inherited one overrides it.
///
/// # Examples
///
/// ```
/// use pl_reflect::info::{EventInfo, MethodInfo};
/// use pl_reflect::prelude::*;
///
/// #[derive(Object, Default)]
/// struct Timer {
///     #[object(base)]
///     base: ObjectBase,
///     interval: f32,
/// }
///
/// let class = ClassBuilder::<Timer>::new("Timer")
///     .object_base()
///     .description("Emits OnTick at a fixed interval")
///     .property("Category", "Tools")
///     .default_factory()
///     .attribute(
///         AttributeInfo::field("Interval", |t: &Timer| &t.interval, |t| &mut t.interval)
///             .with_default(1.0),
///     )
///     .method(MethodInfo::new("Tick", |t: &mut Timer| t.emit("OnTick", &[]).is_ok()))
///     .event(EventInfo::new::<()>("OnTick"))
///     .build();
///
/// assert_eq!(class.name(), "Timer");
/// assert_eq!(class.full_name(), "Timer");
/// assert_eq!(class.base_name(), Some("Object"));
/// assert_eq!(class.property("Category"), Some("Tools"));
/// assert!(!class.is_abstract());
/// ```
#[must_use]
pub struct ClassBuilder<T> {
    class: Class,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Object> ClassBuilder<T> {
    /// Starts a root class without base, factory or members.
    pub fn new(name: &'static str) -> Self {
        Self {
            class: Class {
                name,
                namespace: "",
                full_name: Cow::Borrowed(name),
                base: None,
                module: ModuleId::CORE,
                description: "",
                type_id: TypeId::of::<T>(),
                type_name: type_name::<T>(),
                properties: Vec::new(),
                attributes: Vec::new(),
                methods: Vec::new(),
                constructors: Vec::new(),
                events: Vec::new(),
                slots: Vec::new(),
                factory: None,
                base_cast: None,
                warn_read_only: AtomicBool::new(true),
                layout: RwLock::new(Arc::new(Layout::empty())),
            },
            _marker: PhantomData,
        }
    }

    /// Places the class in a namespace, so that its full name becomes
    /// `namespace::name`.
    ///
    /// Nested namespaces are written `Outer::Inner`.
    #[inline]
    pub fn namespace(mut self, namespace: &'static str) -> Self {
        self.class.namespace = namespace;
        self
    }

    /// Derives from the class with the full name `name`, whose instances are
    /// reached through `get` and `get_mut`.
    pub fn base<B: Object>(
        mut self,
        name: &'static str,
        get: fn(&T) -> &B,
        get_mut: fn(&mut T) -> &mut B,
    ) -> Self {
        self.class.base = Some(name);
        self.class.base_cast = Some(Box::new(FieldCast { get, get_mut }));
        self
    }

    /// Derives directly from the root class `Object`.
    pub fn object_base(self) -> Self {
        self.base::<ObjectBase>("Object", T::object_base, T::object_base_mut)
    }

    #[inline]
    pub fn description(mut self, description: &'static str) -> Self {
        self.class.description = description;
        self
    }

    /// Adds a string property, inherited by derived classes.
    pub fn property(mut self, key: &'static str, value: &'static str) -> Self {
        match self.class.properties.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.class.properties.push((key, value)),
        }
        self
    }

    /// The module the class registers into, [`ModuleId::CORE`] by default.
    #[inline]
    pub fn module(mut self, module: ModuleId) -> Self {
        self.class.module = module;
        self
    }

    /// Sets the function [`Class::create`] uses to build instances.
    pub fn factory(mut self, factory: impl Fn() -> T + Send + Sync + 'static) -> Self {
        self.class.factory = Some(Box::new(move || Box::new(factory()) as Box<dyn Object>));
        self
    }

    /// Uses `T::default` as factory.
    pub fn default_factory(self) -> Self
    where
        T: Default,
    {
        self.factory(T::default)
    }

    pub fn attribute(mut self, info: AttributeInfo) -> Self {
        replace_or_push(&mut self.class.attributes, info, AttributeInfo::name);
        self
    }

    pub fn method(mut self, info: MethodInfo) -> Self {
        replace_or_push(&mut self.class.methods, info, MethodInfo::name);
        self
    }

    pub fn constructor(mut self, info: ConstructorInfo) -> Self {
        match self.class.constructors.iter_mut().find(|c| c.name() == info.name()) {
            Some(existing) => *existing = info,
            None => self.class.constructors.push(info),
        }
        self
    }

    pub fn event(mut self, info: EventInfo) -> Self {
        replace_or_push(&mut self.class.events, info, EventInfo::name);
        self
    }

    pub fn slot(mut self, info: SlotInfo) -> Self {
        replace_or_push(&mut self.class.slots, info, SlotInfo::name);
        self
    }

    /// Finishes the class.
    ///
    /// Until a registry links it, the class only sees its own members and
    /// reports a declared base as [`LinkState::Orphaned`].
    pub fn build(self) -> Class {
        let mut class = self.class;
        class.full_name = match class.namespace {
            "" => Cow::Borrowed(class.name),
            namespace => Cow::Owned(format!("{namespace}::{}", class.name)),
        };
        for info in &class.attributes {
            if info.has_default() && !info.has_setter() {
                log::warn!(
                    "{}: attribute `{}` has a default but no setter, the default is never applied",
                    class.full_name,
                    info.name()
                );
            }
        }
        let state = match class.base {
            Some(missing) => LinkState::Orphaned { missing },
            None => LinkState::Root,
        };
        class.link(Vec::new(), state);
        class
    }
}

fn replace_or_push<I>(list: &mut Vec<Arc<I>>, info: I, name: fn(&I) -> &'static str) {
    match list.iter_mut().find(|i| name(i) == name(&info)) {
        Some(existing) => *existing = Arc::new(info),
        None => list.push(Arc::new(info)),
    }
}
