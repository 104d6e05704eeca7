use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::class::Class;

// -----------------------------------------------------------------------------
// ModuleId

/// Handle of a loaded module.
///
/// Ids are never reused within one registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(pub(crate) u32);

impl ModuleId {
    /// The module of the built-in classes, loaded by every registry.
    pub const CORE: Self = Self(0);

    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// -----------------------------------------------------------------------------
// ModuleInfo

/// Descriptive data of a module.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ModuleInfo {
    pub name: String,
    pub vendor: String,
    pub license: String,
    pub description: String,
}

impl ModuleInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_vendor(mut self, vendor: impl Into<String>) -> Self {
        self.vendor = vendor.into();
        self
    }

    pub fn with_license(mut self, license: impl Into<String>) -> Self {
        self.license = license.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

// -----------------------------------------------------------------------------
// ModuleDef

/// A unit of classes loaded and unloaded together, like a plugin.
///
/// # Examples
///
/// ```
/// use pl_reflect::prelude::*;
/// use pl_reflect::registry::{ModuleDef, ModuleRegistrar};
///
/// #[derive(Object, Default)]
/// struct Fire {
///     #[object(base)]
///     base: ObjectBase,
/// }
///
/// struct Particles;
///
/// impl ModuleDef for Particles {
///     fn info(&self) -> ModuleInfo {
///         ModuleInfo::new("Particles").with_vendor("Example")
///     }
///
///     fn register(&self, module: &mut ModuleRegistrar) {
///         module.class(ClassBuilder::<Fire>::new("Fire").object_base().default_factory().build());
///     }
/// }
///
/// let mut registry = ClassRegistry::new();
/// let id = registry.load_module(&Particles).unwrap();
/// assert_eq!(registry.get_class("Fire").unwrap().module(), id);
///
/// assert_eq!(registry.unregister_module(id), 1);
/// assert!(registry.get_class("Fire").is_none());
/// ```
pub trait ModuleDef: Send + Sync {
    fn info(&self) -> ModuleInfo;

    /// Declares the classes of the module.
    fn register(&self, module: &mut ModuleRegistrar);
}

/// Collects the classes of a module being loaded.
#[derive(Default)]
pub struct ModuleRegistrar {
    classes: Vec<Class>,
}

impl ModuleRegistrar {
    pub fn class(&mut self, class: Class) -> &mut Self {
        self.classes.push(class);
        self
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    #[inline]
    pub(super) fn into_classes(self) -> Vec<Class> {
        self.classes
    }
}

impl fmt::Debug for ModuleRegistrar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.classes.iter().map(Class::name))
            .finish()
    }
}
