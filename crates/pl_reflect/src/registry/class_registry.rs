use alloc::boxed::Box;
use alloc::string::ToString;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::TypeId;
use core::fmt;

use pl_utils::TypeIdMap;
use pl_utils::hash::HashMap;

use super::{DuplicatePolicy, ModuleDef, ModuleId, ModuleInfo, ModuleRegistrar};
use super::{RegisterError, RegistryConfig};
use crate::class::{Class, LinkState};
use crate::object::{Object, ObjectHandle, object_class};
use crate::signal::Signal;
use crate::value::Value;

// -----------------------------------------------------------------------------
// ClassFilter

/// Selects classes in [`ClassRegistry::get_classes`].
///
/// # Examples
///
/// ```
/// use pl_reflect::registry::ClassFilter;
///
/// // Every class deriving from `Loader`, `Loader` itself included,
/// // abstract ones too.
/// let filter = ClassFilter::derived_from("Loader")
///     .include_base()
///     .include_abstract();
/// assert!(filter.recursive);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassFilter<'a> {
    /// Only classes deriving from this one. `None` selects every class.
    pub base: Option<&'a str>,
    /// Include indirectly derived classes, not only direct children.
    pub recursive: bool,
    /// Include the base class itself.
    pub include_base: bool,
    /// Include classes without a factory.
    pub include_abstract: bool,
    pub module: Option<ModuleId>,
}

impl<'a> ClassFilter<'a> {
    /// Every class.
    pub const fn all() -> Self {
        Self {
            base: None,
            recursive: true,
            include_base: true,
            include_abstract: true,
            module: None,
        }
    }

    /// Creatable classes deriving from `base`, directly or not.
    pub const fn derived_from(base: &'a str) -> Self {
        Self {
            base: Some(base),
            recursive: true,
            include_base: false,
            include_abstract: false,
            module: None,
        }
    }

    #[inline]
    pub const fn non_recursive(mut self) -> Self {
        self.recursive = false;
        self
    }

    #[inline]
    pub const fn include_base(mut self) -> Self {
        self.include_base = true;
        self
    }

    #[inline]
    pub const fn include_abstract(mut self) -> Self {
        self.include_abstract = true;
        self
    }

    #[inline]
    pub const fn in_module(mut self, module: ModuleId) -> Self {
        self.module = Some(module);
        self
    }

    pub fn matches(&self, class: &Class) -> bool {
        let by_base = match self.base {
            None => true,
            Some(base) => {
                let name = class.full_name();
                (name == base && self.include_base)
                    || class.base_name() == Some(base)
                    || (self.recursive && name != base && class.is_derived_from(base))
            }
        };
        by_base
            && self.module.is_none_or(|m| class.module() == m)
            && (self.include_abstract || !class.is_abstract())
    }
}

impl Default for ClassFilter<'_> {
    #[inline]
    fn default() -> Self {
        Self::all()
    }
}

// -----------------------------------------------------------------------------
// RegistryEvents

/// Signals of a [`ClassRegistry`].
///
/// Each carries one [`Value::Str`]: the full class name, or the module name for
/// the module signals. They are emitted while the registry is borrowed
/// mutably, so slots must not reach back into it.
#[derive(Debug, Default)]
pub struct RegistryEvents {
    pub class_registered: Signal,
    pub class_unregistered: Signal,
    pub module_loaded: Signal,
    pub module_unloaded: Signal,
}

// -----------------------------------------------------------------------------
// ClassRegistry

/// The classes known to an application, grouped by module.
///
/// Full class names are unique, classes of different namespaces may share a
/// short name. Bases are named, not referenced: registering or
/// unregistering a class re-resolves every class whose chain goes through
/// that name, so classes may be registered in any order.
///
/// # Example
///
/// ```
/// use pl_reflect::prelude::*;
///
/// #[derive(Object, Default)]
/// struct Loader {
///     #[object(base)]
///     base: ObjectBase,
/// }
///
/// #[derive(Object, Default)]
/// struct PngLoader {
///     #[object(base)]
///     base: Loader,
/// }
///
/// let mut registry = ClassRegistry::new();
///
/// // The derived class first: it waits for its base.
/// registry.register(
///     ClassBuilder::<PngLoader>::new("PngLoader")
///         .base("Loader", |l: &PngLoader| &l.base, |l| &mut l.base)
///         .default_factory()
///         .build(),
/// ).unwrap();
/// assert!(!registry.get_class("PngLoader").unwrap().is_derived_from("Loader"));
///
/// registry.register(ClassBuilder::<Loader>::new("Loader").object_base().build()).unwrap();
/// assert!(registry.get_class("PngLoader").unwrap().is_derived_from("Loader"));
///
/// let loaders = registry.get_classes(&ClassFilter::derived_from("Loader"));
/// assert_eq!(loaders.len(), 1);
/// assert_eq!(loaders[0].name(), "PngLoader");
/// ```
pub struct ClassRegistry {
    config: RegistryConfig,
    classes: HashMap<Box<str>, Arc<Class>>,
    by_type: TypeIdMap<Box<str>>,
    modules: Vec<(ModuleId, ModuleInfo)>,
    next_module: u32,
    events: RegistryEvents,
}

impl Default for ClassRegistry {
    /// See [`ClassRegistry::new`].
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl ClassRegistry {
    /// Creates a registry holding only the core module, without classes.
    pub fn empty() -> Self {
        Self::empty_with_config(RegistryConfig::default())
    }

    pub fn empty_with_config(config: RegistryConfig) -> Self {
        Self {
            config,
            classes: HashMap::default(),
            by_type: TypeIdMap::new(),
            modules: alloc::vec![(ModuleId::CORE, ModuleInfo::new("PLCore"))],
            next_module: 1,
            events: RegistryEvents::default(),
        }
    }

    /// Creates a registry with the root class `Object`.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    pub fn with_config(config: RegistryConfig) -> Self {
        let mut registry = Self::empty_with_config(config);
        if let Err(e) = registry.register(object_class()) {
            log::error!("root class not registered: {e}");
        }
        registry
    }

    #[inline]
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: RegistryConfig) {
        for class in self.classes.values() {
            class.set_warn_read_only(config.warn_on_read_only_write);
        }
        self.config = config;
    }

    #[inline]
    pub fn events(&self) -> &RegistryEvents {
        &self.events
    }

    // -------------------------------------------------------------------------
    // Classes

    /// Registers a class in the module it was built for.
    ///
    /// A class whose name is taken replaces the old one with a warning, or
    /// is rejected, depending on [`RegistryConfig::duplicate_policy`].
    /// Objects already created keep their old class.
    pub fn register(&mut self, class: Class) -> Result<Arc<Class>, RegisterError> {
        let class = self.insert(class)?;
        self.relink(&[class.full_name()]);
        self.events
            .class_registered
            .emit(&[Value::from(class.full_name())]);
        Ok(class)
    }

    /// Registers a class in `module`.
    pub fn register_in(
        &mut self,
        module: ModuleId,
        mut class: Class,
    ) -> Result<Arc<Class>, RegisterError> {
        class.set_module(module);
        self.register(class)
    }

    fn insert(&mut self, class: Class) -> Result<Arc<Class>, RegisterError> {
        if self.module_info(class.module()).is_none() {
            return Err(RegisterError::UnknownModule(class.module()));
        }
        if let Some(existing) = self.classes.get(class.full_name()) {
            match self.config.duplicate_policy {
                DuplicatePolicy::Reject => {
                    return Err(RegisterError::Duplicate {
                        name: class.full_name().into(),
                        existing: existing.module(),
                    });
                }
                DuplicatePolicy::Replace => log::warn!(
                    "class `{}` of module {} replaces the one of module {}",
                    class.full_name(),
                    class.module(),
                    existing.module(),
                ),
            }
        }

        class.set_warn_read_only(self.config.warn_on_read_only_write);
        let class = Arc::new(class);
        self.by_type.insert(class.type_id(), class.full_name().into());
        self.classes.insert(class.full_name().into(), class.clone());
        Ok(class)
    }

    fn remove(&mut self, name: &str) -> Option<Arc<Class>> {
        let class = self.classes.remove(name)?;
        if self
            .by_type
            .get(&class.type_id())
            .is_some_and(|n| **n == *class.full_name())
        {
            let other = self
                .classes
                .values()
                .find(|c| c.type_id() == class.type_id())
                .map(|c| Box::from(c.full_name()));
            match other {
                Some(other) => self.by_type.insert(class.type_id(), other),
                None => self.by_type.remove(&class.type_id()),
            };
        }
        Some(class)
    }

    /// Removes the class with the full name `name`. Classes deriving from
    /// it become orphaned until a class with the same name is registered
    /// again.
    pub fn unregister(&mut self, name: &str) -> Option<Arc<Class>> {
        let class = self.remove(name)?;
        self.relink(&[class.full_name()]);
        self.events
            .class_unregistered
            .emit(&[Value::from(class.full_name())]);
        Some(class)
    }

    // Resolves the base chain of `class` by full name.
    fn resolve(&self, class: &Class) -> (Vec<Arc<Class>>, LinkState) {
        let mut ancestors: Vec<Arc<Class>> = Vec::new();
        let mut next = class.base_name();
        while let Some(name) = next {
            // A chain that closes a cycle keeps no ancestors, the classes
            // on it would hold each other.
            if name == class.full_name() || ancestors.iter().any(|c| c.full_name() == name) {
                return (Vec::new(), LinkState::Orphaned { missing: name });
            }
            match self.classes.get(name) {
                Some(base) => {
                    next = base.base_name();
                    ancestors.push(base.clone());
                }
                None => return (ancestors, LinkState::Orphaned { missing: name }),
            }
        }
        let state = if ancestors.is_empty() {
            LinkState::Root
        } else {
            LinkState::Linked
        };
        (ancestors, state)
    }

    // Relinks the classes named in `changed`, those whose chain goes
    // through them, and orphans.
    fn relink(&self, changed: &[&str]) {
        for class in self.classes.values() {
            let affected = class.link_state().is_orphaned()
                || changed
                    .iter()
                    .any(|&name| class.full_name() == name || class.depends_on(name));
            if !affected {
                continue;
            }
            let previous = class.link_state();
            let (ancestors, state) = self.resolve(class);
            if let LinkState::Orphaned { missing } = state
                && previous != state
            {
                log::warn!(
                    "class `{}` is orphaned: base `{missing}` is not registered",
                    class.full_name()
                );
            }
            class.link(ancestors, state);
        }
    }

    /// The class registered under the full name `name`.
    #[inline]
    pub fn get_class(&self, name: &str) -> Option<Arc<Class>> {
        self.classes.get(name).cloned()
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    /// The class most recently registered for the native type `T`.
    pub fn class_of<T: Object>(&self) -> Option<Arc<Class>> {
        self.class_of_type(TypeId::of::<T>())
    }

    pub fn class_of_type(&self, type_id: TypeId) -> Option<Arc<Class>> {
        self.by_type
            .get(&type_id)
            .and_then(|name| self.get_class(name))
    }

    /// Every class, sorted by full name.
    pub fn classes(&self) -> Vec<Arc<Class>> {
        self.get_classes(&ClassFilter::all())
    }

    /// The classes selected by `filter`, sorted by full name.
    pub fn get_classes(&self, filter: &ClassFilter<'_>) -> Vec<Arc<Class>> {
        let mut classes: Vec<_> = self
            .classes
            .values()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect();
        classes.sort_unstable_by(|a, b| a.full_name().cmp(b.full_name()));
        classes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    // -------------------------------------------------------------------------
    // Objects

    /// Creates an instance of the class `name`.
    pub fn create(&self, name: &str) -> Option<Box<dyn Object>> {
        self.get_class(name)?.create()
    }

    pub fn create_shared(&self, name: &str) -> Option<ObjectHandle> {
        self.get_class(name)?.create_shared()
    }

    /// Binds a natively constructed object to the class of its type.
    ///
    /// Declared defaults are not applied. Returns `false` if no class is
    /// registered for the type.
    pub fn adopt(&self, object: &mut dyn Object) -> bool {
        match self.class_of_type(object.as_any().type_id()) {
            Some(class) => {
                object.object_base_mut().bind(class);
                true
            }
            None => false,
        }
    }

    // -------------------------------------------------------------------------
    // Modules

    fn add_module(&mut self, info: ModuleInfo) -> ModuleId {
        let id = ModuleId(self.next_module);
        self.next_module += 1;
        self.modules.push((id, info));
        id
    }

    /// Opens a module to register classes into with
    /// [`register_in`](Self::register_in).
    pub fn create_module(&mut self, info: ModuleInfo) -> ModuleId {
        let name = info.name.clone();
        let id = self.add_module(info);
        self.events.module_loaded.emit(&[Value::Str(name)]);
        id
    }

    /// Loads every class of a module.
    ///
    /// Either every class is registered or none: the module is rejected
    /// when it declares a class twice, or when one of its classes is taken
    /// and duplicates are rejected. Bases are resolved once, after the
    /// whole module is in.
    pub fn load_module(&mut self, def: &dyn ModuleDef) -> Result<ModuleId, RegisterError> {
        let mut registrar = ModuleRegistrar::default();
        def.register(&mut registrar);
        let classes = registrar.into_classes();

        for (index, class) in classes.iter().enumerate() {
            let name = class.full_name();
            if classes[..index].iter().any(|c| c.full_name() == name) {
                return Err(RegisterError::DuplicateInModule(name.into()));
            }
            if self.config.duplicate_policy == DuplicatePolicy::Reject
                && let Some(existing) = self.classes.get(name)
            {
                return Err(RegisterError::Duplicate {
                    name: name.into(),
                    existing: existing.module(),
                });
            }
        }

        let info = def.info();
        let module_name = info.name.clone();
        let id = self.add_module(info);
        let mut inserted = Vec::with_capacity(classes.len());
        for mut class in classes {
            class.set_module(id);
            inserted.push(self.insert(class)?);
        }
        let names: Vec<&str> = inserted.iter().map(|c| c.full_name()).collect();
        self.relink(&names);

        log::debug!("module `{module_name}` loaded with {} classes", names.len());
        for name in names {
            self.events.class_registered.emit(&[Value::from(name)]);
        }
        self.events.module_loaded.emit(&[Value::Str(module_name)]);
        Ok(id)
    }

    /// Removes every class of a module, then the module itself. Returns
    /// the number of classes removed.
    ///
    /// The core module stays loaded, only its classes are removed.
    pub fn unregister_module(&mut self, module: ModuleId) -> usize {
        let names: Vec<Box<str>> = self
            .classes
            .values()
            .filter(|c| c.module() == module)
            .map(|c| Box::from(c.full_name()))
            .collect();
        for name in &names {
            self.remove(name);
        }
        let changed: Vec<&str> = names.iter().map(|n| &**n).collect();
        self.relink(&changed);
        for name in &changed {
            self.events.class_unregistered.emit(&[Value::from(*name)]);
        }

        if module != ModuleId::CORE
            && let Some(index) = self.modules.iter().position(|(id, _)| *id == module)
        {
            let (_, info) = self.modules.remove(index);
            log::debug!("module `{}` unloaded, {} classes removed", info.name, names.len());
            self.events.module_unloaded.emit(&[Value::Str(info.name)]);
        }
        names.len()
    }

    pub fn module_info(&self, module: ModuleId) -> Option<&ModuleInfo> {
        self.modules
            .iter()
            .find(|(id, _)| *id == module)
            .map(|(_, info)| info)
    }

    /// The loaded module named `name`.
    pub fn find_module(&self, name: &str) -> Option<ModuleId> {
        self.modules
            .iter()
            .find(|(_, info)| info.name == name)
            .map(|(id, _)| *id)
    }

    /// Loaded modules in load order.
    pub fn modules(&self) -> impl Iterator<Item = (ModuleId, &ModuleInfo)> {
        self.modules.iter().map(|(id, info)| (*id, info))
    }

    /// The classes of a module, sorted by name.
    pub fn module_classes(&self, module: ModuleId) -> Vec<Arc<Class>> {
        self.get_classes(&ClassFilter::all().in_module(module))
    }
}

impl fmt::Debug for ClassRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassRegistry")
            .field(
                "classes",
                &self.classes().iter().map(|c| c.full_name().to_string()).collect::<Vec<_>>(),
            )
            .field("modules", &self.modules.iter().map(|(_, i)| i.name.to_string()).collect::<Vec<_>>())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// ClassRegistryArc

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A shared [`ClassRegistry`] behind a coarse lock.
///
/// Lookups take the read lock; module loading and unloading take the
/// write lock.
#[derive(Clone, Default)]
pub struct ClassRegistryArc {
    /// The wrapped [`ClassRegistry`].
    pub internal: Arc<RwLock<ClassRegistry>>,
}

impl ClassRegistryArc {
    pub fn new(registry: ClassRegistry) -> Self {
        Self {
            internal: Arc::new(RwLock::new(registry)),
        }
    }

    /// Takes a read lock on the underlying [`ClassRegistry`].
    pub fn read(&self) -> RwLockReadGuard<'_, ClassRegistry> {
        self.internal.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Takes a write lock on the underlying [`ClassRegistry`].
    pub fn write(&self) -> RwLockWriteGuard<'_, ClassRegistry> {
        self.internal
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for ClassRegistryArc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.read().fmt(f)
    }
}
