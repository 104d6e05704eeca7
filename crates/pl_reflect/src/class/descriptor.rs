use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::{Any, TypeId};
use core::fmt;
use core::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock};

use super::layout::{Layout, LinkState};
use crate::func::CallError;
use crate::info::{AttributeInfo, ConstructorInfo, EventInfo, MethodInfo, SlotInfo};
use crate::object::{AttributeError, Object, ObjectHandle};
use crate::registry::ModuleId;
use crate::value::Value;

// -----------------------------------------------------------------------------
// Base casts

/// Reaches the base-class sub-object of an instance.
pub(super) trait BaseCast: Send + Sync {
    fn upcast<'a>(&self, this: &'a dyn Any) -> Option<&'a dyn Any>;
    fn upcast_mut<'a>(&self, this: &'a mut dyn Any) -> Option<&'a mut dyn Any>;
}

pub(super) struct FieldCast<T, B> {
    pub get: fn(&T) -> &B,
    pub get_mut: fn(&mut T) -> &mut B,
}

impl<T: Any, B: Any> BaseCast for FieldCast<T, B> {
    #[inline]
    fn upcast<'a>(&self, this: &'a dyn Any) -> Option<&'a dyn Any> {
        this.downcast_ref::<T>().map(|t| (self.get)(t) as &dyn Any)
    }

    #[inline]
    fn upcast_mut<'a>(&self, this: &'a mut dyn Any) -> Option<&'a mut dyn Any> {
        this.downcast_mut::<T>()
            .map(|t| (self.get_mut)(t) as &mut dyn Any)
    }
}

pub(super) type Factory = Box<dyn Fn() -> Box<dyn Object> + Send + Sync>;

// -----------------------------------------------------------------------------
// Class

/// The metadata and factory of one reflected class.
///
/// Built with [`ClassBuilder`](super::ClassBuilder) and shared as
/// `Arc<Class>` once registered. Own members never change after
/// [`build`](super::ClassBuilder::build); the flattened views are rebuilt
/// by the registry whenever the base chain changes.
///
/// # Examples
///
/// ```
/// use pl_reflect::prelude::*;
///
/// #[derive(Object, Default)]
/// struct Vehicle {
///     #[object(base)]
///     base: ObjectBase,
///     speed: f32,
/// }
///
/// #[derive(Object)]
/// struct Car {
///     #[object(base)]
///     base: Vehicle,
///     wheels: i32,
/// }
///
/// let mut registry = ClassRegistry::new();
/// registry.register(
///     ClassBuilder::<Vehicle>::new("Vehicle")
///         .object_base()
///         .default_factory()
///         .attribute(AttributeInfo::field("Speed", |v: &Vehicle| &v.speed, |v| &mut v.speed).with_default(0.0))
///         .build(),
/// ).unwrap();
/// registry.register(
///     ClassBuilder::<Car>::new("Car")
///         .base("Vehicle", |c: &Car| &c.base, |c| &mut c.base)
///         .factory(|| Car { base: Vehicle::default(), wheels: 0 })
///         .attribute(AttributeInfo::field("Wheels", |c: &Car| &c.wheels, |c| &mut c.wheels).with_default(4))
///         .build(),
/// ).unwrap();
///
/// let car = registry.get_class("Car").unwrap();
/// assert!(car.is_derived_from("Vehicle"));
/// assert!(car.is_derived_from("Object"));
///
/// let names: Vec<_> = car.attributes().iter().map(|a| a.name()).collect();
/// assert_eq!(names, ["Speed", "Wheels"]);
///
/// let mut o = car.create().unwrap();
/// assert_eq!(o.get_attribute("Wheels"), "4");
/// assert_eq!(o.get_attribute("Speed"), "0");
/// assert!(o.set_attribute("Speed", "88.5"));
/// assert_eq!(o.get_attribute("Speed"), "88.5");
/// ```
pub struct Class {
    pub(super) name: &'static str,
    pub(super) namespace: &'static str,
    pub(super) full_name: Cow<'static, str>,
    pub(super) base: Option<&'static str>,
    pub(super) module: ModuleId,
    pub(super) description: &'static str,
    pub(super) type_id: TypeId,
    pub(super) type_name: &'static str,
    pub(super) properties: Vec<(&'static str, &'static str)>,
    pub(super) attributes: Vec<Arc<AttributeInfo>>,
    pub(super) methods: Vec<Arc<MethodInfo>>,
    pub(super) constructors: Vec<ConstructorInfo>,
    pub(super) events: Vec<Arc<EventInfo>>,
    pub(super) slots: Vec<Arc<SlotInfo>>,
    pub(super) factory: Option<Factory>,
    pub(super) base_cast: Option<Box<dyn BaseCast>>,
    pub(super) warn_read_only: AtomicBool,
    pub(super) layout: RwLock<Arc<Layout>>,
}

impl Class {
    /// The class name without its namespace.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The namespace, empty for a class declared outside of one.
    #[inline]
    pub fn namespace(&self) -> &'static str {
        self.namespace
    }

    /// `Namespace::Name`, or the bare name outside of a namespace.
    ///
    /// Registries key classes by this name, and base classes are named by it.
    #[inline]
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// The declared full name of the base class, `None` for a root class.
    #[inline]
    pub fn base_name(&self) -> Option<&'static str> {
        self.base
    }

    /// The module that registered this class.
    #[inline]
    pub fn module(&self) -> ModuleId {
        self.module
    }

    #[inline]
    pub fn description(&self) -> &'static str {
        self.description
    }

    /// The native type of instances.
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns `true` if the class has no factory.
    ///
    /// Abstract classes can still be created through a named constructor.
    #[inline]
    pub fn is_abstract(&self) -> bool {
        self.factory.is_none()
    }

    #[inline]
    pub(crate) fn layout(&self) -> Arc<Layout> {
        self.layout
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn link(&self, ancestors: Vec<Arc<Class>>, state: LinkState) {
        let layout = Arc::new(Layout::build(self, ancestors, state));
        *self.layout.write().unwrap_or_else(PoisonError::into_inner) = layout;
    }

    #[inline]
    pub(crate) fn set_module(&mut self, module: ModuleId) {
        self.module = module;
    }

    #[inline]
    pub(crate) fn set_warn_read_only(&self, warn: bool) {
        self.warn_read_only.store(warn, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn warns_read_only(&self) -> bool {
        self.warn_read_only.load(Ordering::Relaxed)
    }

    // -------------------------------------------------------------------------
    // Hierarchy

    pub fn link_state(&self) -> LinkState {
        self.layout().state
    }

    /// The resolved base class.
    pub fn base_class(&self) -> Option<Arc<Class>> {
        self.layout().ancestors.first().cloned()
    }

    /// Every resolved ancestor, nearest first.
    pub fn ancestors(&self) -> Vec<Arc<Class>> {
        self.layout().ancestors.clone()
    }

    /// Returns `true` if the full name `name` is this class or one of its
    /// resolved ancestors.
    ///
    /// An unresolved base ends the chain.
    pub fn is_derived_from(&self, name: &str) -> bool {
        self.full_name() == name || self.depends_on(name)
    }

    /// Returns `true` if `name` is one of the resolved ancestors.
    pub(crate) fn depends_on(&self, name: &str) -> bool {
        self.layout()
            .ancestors
            .iter()
            .any(|c| c.full_name() == name)
    }

    // -------------------------------------------------------------------------
    // Members

    /// Flattened string properties, derived values override inherited ones.
    pub fn properties(&self) -> Vec<(&'static str, &'static str)> {
        self.layout().properties.clone()
    }

    pub fn property(&self, key: &str) -> Option<&'static str> {
        self.layout()
            .properties
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| *v)
    }

    /// Every attribute, inherited ones first.
    pub fn attributes(&self) -> Vec<Arc<AttributeInfo>> {
        self.layout().attributes.infos()
    }

    /// The most derived declaration of an attribute.
    pub fn attribute(&self, name: &str) -> Option<Arc<AttributeInfo>> {
        self.layout().attributes.get(name).map(|m| m.info.clone())
    }

    pub fn methods(&self) -> Vec<Arc<MethodInfo>> {
        self.layout().methods.infos()
    }

    pub fn method(&self, name: &str) -> Option<Arc<MethodInfo>> {
        self.layout().methods.get(name).map(|m| m.info.clone())
    }

    pub fn events(&self) -> Vec<Arc<EventInfo>> {
        self.layout().events.infos()
    }

    pub fn event(&self, name: &str) -> Option<Arc<EventInfo>> {
        self.layout().events.get(name).map(|m| m.info.clone())
    }

    pub fn slots(&self) -> Vec<Arc<SlotInfo>> {
        self.layout().slots.infos()
    }

    pub fn slot(&self, name: &str) -> Option<Arc<SlotInfo>> {
        self.layout().slots.get(name).map(|m| m.info.clone())
    }

    /// Constructors of this class. They are never inherited.
    #[inline]
    pub fn constructors(&self) -> &[ConstructorInfo] {
        &self.constructors
    }

    pub fn constructor(&self, name: &str) -> Option<&ConstructorInfo> {
        self.constructors.iter().find(|c| c.name() == name)
    }

    /// Attributes declared by this class itself.
    #[inline]
    pub fn own_attributes(&self) -> &[Arc<AttributeInfo>] {
        &self.attributes
    }

    #[inline]
    pub fn own_methods(&self) -> &[Arc<MethodInfo>] {
        &self.methods
    }

    #[inline]
    pub fn own_events(&self) -> &[Arc<EventInfo>] {
        &self.events
    }

    #[inline]
    pub fn own_slots(&self) -> &[Arc<SlotInfo>] {
        &self.slots
    }

    // -------------------------------------------------------------------------
    // Instantiation

    /// Creates an instance with the factory, then applies every declared
    /// default.
    ///
    /// Returns `None` for an abstract class.
    pub fn create(self: &Arc<Self>) -> Option<Box<dyn Object>> {
        let factory = self.factory.as_ref()?;
        let mut object = factory();
        self.apply_defaults(object.as_any_mut());
        object.object_base_mut().bind(self.clone());
        Some(object)
    }

    /// Creates an instance through the named constructor.
    ///
    /// The constructor builds the whole instance, declared defaults are not
    /// applied.
    pub fn create_with(
        self: &Arc<Self>,
        constructor: &str,
        args: &[Value],
    ) -> Result<Box<dyn Object>, CallError> {
        let info = self
            .constructor(constructor)
            .ok_or_else(|| CallError::UnknownMember(constructor.into()))?;
        let mut object = info.construct(args)?;
        object.object_base_mut().bind(self.clone());
        Ok(object)
    }

    /// Like [`create_with`](Self::create_with), with arguments given as a
    /// params string such as `Param0="1" Param1='x'`.
    pub fn create_from_str(
        self: &Arc<Self>,
        constructor: &str,
        params: &str,
    ) -> Result<Box<dyn Object>, CallError> {
        let info = self
            .constructor(constructor)
            .ok_or_else(|| CallError::UnknownMember(constructor.into()))?;
        let mut object = info.construct_str(params)?;
        object.object_base_mut().bind(self.clone());
        Ok(object)
    }

    /// Like [`create`](Self::create), wrapped in a shared handle.
    pub fn create_shared(self: &Arc<Self>) -> Option<ObjectHandle> {
        self.create().map(ObjectHandle::from_boxed)
    }

    // -------------------------------------------------------------------------
    // Member access on instances

    // Class `step` of the chain, 0 is `self`.
    fn chain<'a>(&'a self, layout: &'a Layout, step: usize) -> Option<&'a Class> {
        match step {
            0 => Some(self),
            n => layout.ancestors.get(n - 1).map(|c| &**c),
        }
    }

    fn upcast<'a>(&self, layout: &Layout, target: &'a dyn Any, depth: usize) -> Option<&'a dyn Any> {
        let mut current = target;
        for step in 0..depth {
            let cast = self.chain(layout, step)?.base_cast.as_ref()?;
            current = cast.upcast(current)?;
        }
        Some(current)
    }

    fn upcast_mut<'a>(
        &self,
        layout: &Layout,
        target: &'a mut dyn Any,
        depth: usize,
    ) -> Option<&'a mut dyn Any> {
        let mut current = target;
        for step in 0..depth {
            let cast = self.chain(layout, step)?.base_cast.as_ref()?;
            current = cast.upcast_mut(current)?;
        }
        Some(current)
    }

    pub(crate) fn read_attribute(
        &self,
        target: &dyn Any,
        name: &str,
    ) -> Option<(Arc<AttributeInfo>, Value)> {
        let layout = self.layout();
        let member = layout.attributes.get(name)?;
        let value = member
            .info
            .read(self.upcast(&layout, target, member.depth)?)?;
        Some((member.info.clone(), value))
    }

    /// Every attribute value in declaration order, inherited ones first.
    pub(crate) fn read_attributes(&self, target: &dyn Any) -> Vec<(Arc<AttributeInfo>, Value)> {
        let layout = self.layout();
        layout
            .attributes
            .members()
            .iter()
            .filter_map(|member| {
                let value = member
                    .info
                    .read(self.upcast(&layout, target, member.depth)?)?;
                Some((member.info.clone(), value))
            })
            .collect()
    }

    /// Writes an attribute. `force` ignores read-only access.
    pub(crate) fn write_attribute(
        &self,
        target: &mut dyn Any,
        name: &str,
        value: &Value,
        force: bool,
    ) -> Result<(), AttributeError> {
        let layout = self.layout();
        let member = layout
            .attributes
            .get(name)
            .ok_or_else(|| AttributeError::Unknown(name.into()))?;
        let target = self
            .upcast_mut(&layout, target, member.depth)
            .ok_or(AttributeError::TargetMismatch(self.type_name))?;
        if force {
            member.info.write_unchecked(target, value)
        } else {
            member.info.write(target, value)
        }
    }

    /// Applies every declared default, returning how many were set.
    ///
    /// Defaults of attributes without a setter are skipped.
    pub(crate) fn apply_defaults(&self, target: &mut dyn Any) -> usize {
        let layout = self.layout();
        let mut applied = 0;
        for member in layout.attributes.members() {
            if !member.info.has_default() || !member.info.has_setter() {
                continue;
            }
            let result = self
                .upcast_mut(&layout, target, member.depth)
                .ok_or(AttributeError::TargetMismatch(self.type_name))
                .and_then(|t| member.info.write_unchecked(t, member.info.default_value()));
            match result {
                Ok(()) => applied += 1,
                Err(e) => log::warn!(
                    "{}: default of `{}` not applied: {e}",
                    self.full_name,
                    member.info.name()
                ),
            }
        }
        applied
    }

    pub(crate) fn invoke_method(
        &self,
        target: &mut dyn Any,
        name: &str,
        args: &[Value],
    ) -> Result<Value, CallError> {
        let layout = self.layout();
        let member = layout
            .methods
            .get(name)
            .ok_or_else(|| CallError::UnknownMember(name.into()))?;
        let target = self
            .upcast_mut(&layout, target, member.depth)
            .ok_or(CallError::TargetMismatch(self.type_name))?;
        member.info.invoke(target, args)
    }

    pub(crate) fn invoke_method_str(
        &self,
        target: &mut dyn Any,
        name: &str,
        params: &str,
    ) -> Result<Value, CallError> {
        let layout = self.layout();
        let member = layout
            .methods
            .get(name)
            .ok_or_else(|| CallError::UnknownMember(name.into()))?;
        let target = self
            .upcast_mut(&layout, target, member.depth)
            .ok_or(CallError::TargetMismatch(self.type_name))?;
        member.info.invoke_str(target, params)
    }

    pub(crate) fn invoke_slot(
        &self,
        target: &mut dyn Any,
        name: &str,
        args: &[Value],
    ) -> Result<(), CallError> {
        let layout = self.layout();
        let member = layout
            .slots
            .get(name)
            .ok_or_else(|| CallError::UnknownMember(name.into()))?;
        let target = self
            .upcast_mut(&layout, target, member.depth)
            .ok_or(CallError::TargetMismatch(self.type_name))?;
        member.info.invoke(target, args)
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("name", &self.full_name)
            .field("base", &self.base)
            .field("module", &self.module)
            .field("state", &self.link_state())
            .finish_non_exhaustive()
    }
}
