use super::{ClassRegistry, ModuleDef};

// -----------------------------------------------------------------------------
// AutoModule

/// A module submitted with [`submit_module!`](crate::submit_module).
pub struct AutoModule {
    def: &'static dyn ModuleDef,
}

impl AutoModule {
    #[inline]
    pub const fn new(def: &'static dyn ModuleDef) -> Self {
        Self { def }
    }

    #[inline]
    pub fn def(&self) -> &'static dyn ModuleDef {
        self.def
    }
}

#[cfg(feature = "auto_register")]
inventory::collect!(AutoModule);

/// Submits a [`ModuleDef`] for [`ClassRegistry::auto_register`].
///
/// The argument is a constant expression, usually a unit struct. Without
/// the `auto_register` feature the macro expands to nothing.
///
/// ```no_run
/// use pl_reflect::registry::{ModuleDef, ModuleInfo, ModuleRegistrar};
///
/// struct Scene;
///
/// impl ModuleDef for Scene {
///     fn info(&self) -> ModuleInfo {
///         ModuleInfo::new("Scene")
///     }
///
///     fn register(&self, _module: &mut ModuleRegistrar) {}
/// }
///
/// pl_reflect::submit_module!(Scene);
/// ```
#[cfg(feature = "auto_register")]
#[macro_export]
macro_rules! submit_module {
    ($def:expr) => {
        $crate::__macro_exports::inventory::submit! {
            $crate::registry::AutoModule::new(&$def)
        }
    };
}

#[cfg(not(feature = "auto_register"))]
#[macro_export]
macro_rules! submit_module {
    ($def:expr) => {};
}

impl ClassRegistry {
    /// Loads every module submitted with [`submit_module!`](crate::submit_module)
    /// that is not loaded yet, in order of module name. Returns how many
    /// were loaded.
    ///
    /// Nothing happens before this is called, and it always returns 0
    /// without the `auto_register` feature.
    pub fn auto_register(&mut self) -> usize {
        #[cfg(feature = "auto_register")]
        {
            use alloc::vec::Vec;

            let mut defs: Vec<&'static dyn ModuleDef> = inventory::iter::<AutoModule>
                .into_iter()
                .map(AutoModule::def)
                .collect();
            defs.sort_by_cached_key(|def| def.info().name);

            let mut loaded = 0;
            for def in defs {
                let name = def.info().name;
                if self.find_module(&name).is_some() {
                    continue;
                }
                match self.load_module(def) {
                    Ok(_) => loaded += 1,
                    Err(e) => log::error!("module `{name}` not loaded: {e}"),
                }
            }
            loaded
        }

        #[cfg(not(feature = "auto_register"))]
        {
            0
        }
    }
}
