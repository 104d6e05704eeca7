//! Class registry and modules.
//!
//! ## Menu
//!
//! - [`ClassRegistry`]: full class name to [`Class`](crate::class::Class),
//!   with base resolution by name.
//!     - [`ClassFilter`]: selects classes by base, module and factory.
//!     - [`RegistryEvents`]: signals for (un)registered classes and modules.
//! - [`ClassRegistryArc`]: a shared registry behind a lock.
//! - [`ModuleDef`]: a set of classes loaded and unloaded together.
//!     - [`ModuleId`] / [`ModuleInfo`]: handle and description of a module.
//! - [`RegistryConfig`]: duplicate policy and logging options.
//! - [`RegisterError`]: why a class or module was rejected.
//!
//! # Bootstrap
//!
//! Nothing registers itself. An application creates a registry and loads
//! its modules explicitly, or calls [`ClassRegistry::auto_register`] to
//! load every module submitted with [`submit_module!`](crate::submit_module).
//! Bases are resolved after each registration, so the order modules are
//! loaded in does not matter.

// -----------------------------------------------------------------------------
// Modules

mod auto_register;
mod class_registry;
mod config;
mod error;
mod module;

// -----------------------------------------------------------------------------
// Exports

pub use auto_register::AutoModule;
pub use class_registry::{ClassFilter, ClassRegistry, ClassRegistryArc, RegistryEvents};
pub use config::{DuplicatePolicy, RegistryConfig};
pub use error::RegisterError;
pub use module::{ModuleDef, ModuleId, ModuleInfo, ModuleRegistrar};

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{ClassFilter, ClassRegistry, ClassRegistryArc, DuplicatePolicy, ModuleDef};
    use super::{ModuleId, ModuleInfo, ModuleRegistrar, RegisterError, RegistryConfig};
    use crate::class::{ClassBuilder, LinkState};
    use crate::info::AttributeInfo;
    use crate::object::{ObjectBase, ObjectExt};
    use crate::prelude::Object;
    use crate::value::Value;
    use alloc::string::String;
    use alloc::sync::Arc;
    use alloc::vec::Vec;
    use std::sync::Mutex;

    #[derive(Object, Default)]
    struct Vehicle {
        #[object(base)]
        base: ObjectBase,
        speed: f32,
    }

    #[derive(Object, Default)]
    struct Car {
        #[object(base)]
        base: Vehicle,
        wheels: i32,
    }

    #[derive(Object, Default)]
    struct Truck {
        #[object(base)]
        base: Car,
        load: f64,
    }

    fn vehicle() -> crate::class::Class {
        ClassBuilder::<Vehicle>::new("Vehicle")
            .object_base()
            .default_factory()
            .attribute(
                AttributeInfo::field("Speed", |v: &Vehicle| &v.speed, |v| &mut v.speed)
                    .with_default(0.0),
            )
            .build()
    }

    fn car() -> crate::class::Class {
        ClassBuilder::<Car>::new("Car")
            .base("Vehicle", |c: &Car| &c.base, |c| &mut c.base)
            .default_factory()
            .attribute(
                AttributeInfo::field("Wheels", |c: &Car| &c.wheels, |c| &mut c.wheels).with_default(4),
            )
            .build()
    }

    fn truck() -> crate::class::Class {
        ClassBuilder::<Truck>::new("Truck")
            .base("Car", |t: &Truck| &t.base, |t| &mut t.base)
            .attribute(AttributeInfo::field("Load", |t: &Truck| &t.load, |t| &mut t.load))
            .build()
    }

    struct Vehicles;

    impl ModuleDef for Vehicles {
        fn info(&self) -> ModuleInfo {
            ModuleInfo::new("Vehicles")
                .with_vendor("PixelLight")
                .with_license("MIT")
        }

        fn register(&self, module: &mut ModuleRegistrar) {
            // derived first, bases resolve once the module is in
            module.class(truck()).class(car()).class(vehicle());
        }
    }

    #[test]
    fn vehicle_and_car() {
        let mut registry = ClassRegistry::new();
        registry.register(vehicle()).unwrap();
        registry.register(car()).unwrap();

        let mut o = registry.get_class("Car").unwrap().create().unwrap();
        assert_eq!(o.get_attribute("Wheels"), "4");
        assert_eq!(o.get_attribute("Speed"), "0");
        assert!(o.set_attribute("Speed", "88.5"));
        assert_eq!(o.get_attribute("Speed"), "88.5");
        assert!(o.class().unwrap().is_derived_from("Vehicle"));
        assert!(o.is_instance_of("Object"));
    }

    #[test]
    fn derivation_is_one_way() {
        let mut registry = ClassRegistry::new();
        registry.load_module(&Vehicles).unwrap();

        let names = ["Object", "Vehicle", "Car", "Truck"];
        for (i, derived) in names.iter().enumerate() {
            let class = registry.get_class(derived).unwrap();
            for (j, base) in names.iter().enumerate() {
                assert_eq!(class.is_derived_from(base), j <= i, "{derived} / {base}");
            }
        }
    }

    #[test]
    fn duplicate_names_last_wins() {
        let mut registry = ClassRegistry::new();
        let first = registry.register(vehicle()).unwrap();
        let second = registry.register(vehicle()).unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(&registry.get_class("Vehicle").unwrap(), &second));
        assert_eq!(
            registry.classes().iter().filter(|c| c.name() == "Vehicle").count(),
            1
        );
    }

    #[test]
    fn duplicate_names_rejected() {
        let config = RegistryConfig {
            duplicate_policy: DuplicatePolicy::Reject,
            ..RegistryConfig::default()
        };
        let mut registry = ClassRegistry::with_config(config);
        let first = registry.register(vehicle()).unwrap();

        assert_eq!(
            registry.register(vehicle()).unwrap_err(),
            RegisterError::Duplicate {
                name: "Vehicle".into(),
                existing: ModuleId::CORE,
            }
        );
        assert!(Arc::ptr_eq(&registry.get_class("Vehicle").unwrap(), &first));

        // nothing of the module is kept
        let before = registry.len();
        assert!(registry.load_module(&Vehicles).is_err());
        assert_eq!(registry.len(), before);
        assert!(registry.find_module("Vehicles").is_none());
        assert!(registry.get_class("Car").is_none());
    }

    #[test]
    fn unloading_orphans_dependents() {
        let mut registry = ClassRegistry::new();
        let vehicles = registry.load_module(&Vehicles).unwrap();

        let extras = registry.create_module(ModuleInfo::new("Extras"));
        #[derive(Object, Default)]
        struct Bus {
            #[object(base)]
            base: Car,
        }
        registry
            .register_in(
                extras,
                ClassBuilder::<Bus>::new("Bus")
                    .base("Car", |b: &Bus| &b.base, |b| &mut b.base)
                    .default_factory()
                    .build(),
            )
            .unwrap();
        let bus = registry.get_class("Bus").unwrap();
        assert_eq!(bus.link_state(), LinkState::Linked);
        assert_eq!(bus.attributes().len(), 2);

        assert_eq!(registry.unregister_module(vehicles), 3);
        assert!(registry.module_info(vehicles).is_none());
        assert_eq!(bus.link_state(), LinkState::Orphaned { missing: "Car" });
        assert!(!bus.is_derived_from("Vehicle"));
        assert!(bus.attributes().is_empty());
        let mut o = bus.create().unwrap();
        assert_eq!(o.get_attribute("Speed"), "");
        assert!(!o.set_attribute("Speed", "1"));

        // reloading resolves the orphan again
        registry.load_module(&Vehicles).unwrap();
        assert_eq!(bus.link_state(), LinkState::Linked);
        assert!(bus.is_derived_from("Vehicle"));
    }

    #[test]
    fn cycles_are_orphans() {
        #[derive(Object, Default)]
        struct Node {
            #[object(base)]
            base: ObjectBase,
        }
        fn node(name: &'static str, base: &'static str) -> crate::class::Class {
            ClassBuilder::<Node>::new(name)
                .base(base, |n: &Node| &n.base, |n| &mut n.base)
                .build()
        }

        let mut registry = ClassRegistry::empty();
        registry.register(node("A", "B")).unwrap();
        registry.register(node("B", "A")).unwrap();
        registry.register(node("C", "A")).unwrap();

        let a = registry.get_class("A").unwrap();
        assert_eq!(a.link_state(), LinkState::Orphaned { missing: "A" });
        assert!(a.ancestors().is_empty());
        assert!(!a.is_derived_from("B"));
        assert_eq!(
            registry.get_class("B").unwrap().link_state(),
            LinkState::Orphaned { missing: "B" }
        );
        assert_eq!(
            registry.get_class("C").unwrap().link_state(),
            LinkState::Orphaned { missing: "A" }
        );

        // classes on a cycle are freed with the registry
        let weak_a = Arc::downgrade(&a);
        let weak_b = Arc::downgrade(&registry.get_class("B").unwrap());
        drop(a);
        drop(registry);
        assert!(weak_a.upgrade().is_none());
        assert!(weak_b.upgrade().is_none());
    }

    #[test]
    fn breaking_a_cycle_relinks() {
        #[derive(Object, Default)]
        struct Node {
            #[object(base)]
            base: ObjectBase,
        }
        let mut registry = ClassRegistry::new();
        registry
            .register(
                ClassBuilder::<Node>::new("A")
                    .base("B", |n: &Node| &n.base, |n| &mut n.base)
                    .build(),
            )
            .unwrap();
        let cyclic = registry
            .register(
                ClassBuilder::<Node>::new("B")
                    .base("A", |n: &Node| &n.base, |n| &mut n.base)
                    .build(),
            )
            .map(|b| Arc::downgrade(&b))
            .unwrap();

        // replacing B with a root class ends the cycle
        registry.register(ClassBuilder::<Node>::new("B").object_base().build()).unwrap();
        let a = registry.get_class("A").unwrap();
        assert_eq!(a.link_state(), LinkState::Linked);
        assert!(a.is_derived_from("Object"));
        assert!(cyclic.upgrade().is_none());
    }

    #[test]
    fn namespaces_keep_short_names_apart() {
        #[derive(Object, Default)]
        struct Loader {
            #[object(base)]
            base: ObjectBase,
        }
        #[derive(Object, Default)]
        struct MeshLoader {
            #[object(base)]
            base: Loader,
        }
        let loader = |namespace| {
            ClassBuilder::<Loader>::new("Loader")
                .namespace(namespace)
                .object_base()
                .default_factory()
                .build()
        };

        let mut registry = ClassRegistry::new();
        let image = registry.register(loader("PLGraphics")).unwrap();
        let mesh = registry.register(loader("PLMesh")).unwrap();
        registry
            .register(
                ClassBuilder::<MeshLoader>::new("MeshLoaderObj")
                    .namespace("PLMesh")
                    .base("PLMesh::Loader", |l: &MeshLoader| &l.base, |l| &mut l.base)
                    .default_factory()
                    .build(),
            )
            .unwrap();

        assert_eq!(image.name(), "Loader");
        assert_eq!(image.namespace(), "PLGraphics");
        assert_eq!(image.full_name(), "PLGraphics::Loader");
        assert!(!Arc::ptr_eq(&image, &mesh));
        assert!(registry.get_class("Loader").is_none());
        assert!(Arc::ptr_eq(&registry.get_class("PLMesh::Loader").unwrap(), &mesh));

        let obj = registry.get_class("PLMesh::MeshLoaderObj").unwrap();
        assert_eq!(obj.link_state(), LinkState::Linked);
        assert!(obj.is_derived_from("PLMesh::Loader"));
        assert!(!obj.is_derived_from("PLGraphics::Loader"));
        assert!(!obj.is_derived_from("Loader"));

        let names: Vec<_> = registry
            .get_classes(&ClassFilter::derived_from("PLMesh::Loader"))
            .iter()
            .map(|c| String::from(c.full_name()))
            .collect();
        assert_eq!(names, ["PLMesh::MeshLoaderObj"]);

        let object = registry.create("PLMesh::MeshLoaderObj").unwrap();
        assert!(object.is_instance_of("PLMesh::Loader"));
        assert_eq!(
            object.to_snapshot().unwrap().class(),
            "PLMesh::MeshLoaderObj"
        );

        registry.unregister("PLMesh::Loader").unwrap();
        assert_eq!(obj.link_state(), LinkState::Orphaned { missing: "PLMesh::Loader" });
        assert!(registry.contains("PLGraphics::Loader"));
    }

    #[test]
    fn lookups_miss_quietly() {
        let registry = ClassRegistry::new();
        assert!(registry.get_class("Nope").is_none());
        assert!(registry.create("Nope").is_none());
        assert!(registry.create_shared("Nope").is_none());
        assert!(registry.class_of::<Car>().is_none());
        assert!(registry.module_info(ModuleId(42)).is_none());
    }

    #[test]
    fn unknown_module_is_an_error() {
        let mut registry = ClassRegistry::new();
        assert_eq!(
            registry.register_in(ModuleId(9), vehicle()).unwrap_err(),
            RegisterError::UnknownModule(ModuleId(9))
        );
    }

    #[test]
    fn class_filters() {
        let mut registry = ClassRegistry::new();
        let id = registry.load_module(&Vehicles).unwrap();
        let names = |filter: ClassFilter<'_>| -> Vec<&str> {
            registry.get_classes(&filter).iter().map(|c| c.name()).collect()
        };

        assert_eq!(names(ClassFilter::derived_from("Vehicle")), ["Car"]);
        assert_eq!(
            names(ClassFilter::derived_from("Vehicle").include_abstract()),
            ["Car", "Truck"]
        );
        assert_eq!(
            names(ClassFilter::derived_from("Vehicle").include_base().non_recursive()),
            ["Car", "Vehicle"]
        );
        assert_eq!(names(ClassFilter::all().in_module(id)), ["Car", "Truck", "Vehicle"]);
        assert_eq!(names(ClassFilter::all().in_module(ModuleId::CORE)), ["Object"]);
        assert_eq!(registry.module_classes(id).len(), 3);
    }

    #[test]
    fn adopt_binds_native_objects() {
        let mut registry = ClassRegistry::new();
        registry.register(vehicle()).unwrap();
        registry.register(car()).unwrap();

        let mut car = Car::default();
        assert_eq!(car.get_attribute("Wheels"), "");
        assert!(registry.adopt(&mut car));
        // defaults are not applied
        assert_eq!(car.get_attribute("Wheels"), "0");
        assert!(Arc::ptr_eq(&car.class().unwrap(), &registry.class_of::<Car>().unwrap()));

        let mut truck = Truck::default();
        assert!(!registry.adopt(&mut truck));
    }

    #[test]
    fn registry_signals() {
        let mut registry = ClassRegistry::new();
        let log = Arc::new(Mutex::new(Vec::<String>::new()));
        let record = |prefix: &'static str| {
            let log = log.clone();
            move |args: &[Value]| {
                let name = args[0].as_str().unwrap_or_default();
                log.lock().unwrap().push(alloc::format!("{prefix} {name}"));
            }
        };
        let events = registry.events();
        let _subs = [
            events.class_registered.subscribe(record("+")),
            events.class_unregistered.subscribe(record("-")),
            events.module_loaded.subscribe(record("load")),
            events.module_unloaded.subscribe(record("unload")),
        ];

        let id = registry.load_module(&Vehicles).unwrap();
        registry.unregister("Truck");
        registry.unregister_module(id);

        let log = log.lock().unwrap();
        assert!(log.contains(&String::from("load Vehicles")));
        assert!(log.contains(&String::from("- Truck")));
        assert!(log.contains(&String::from("- Car")));
        assert_eq!(log.last().map(String::as_str), Some("unload Vehicles"));
        assert_eq!(log.iter().filter(|l| l.starts_with('+')).count(), 3);
    }

    #[test]
    fn shared_registry() {
        let shared = ClassRegistryArc::new(ClassRegistry::new());
        shared.write().register(vehicle()).unwrap();

        let reader = shared.clone();
        let handle = std::thread::spawn(move || reader.read().create("Vehicle").is_some());
        assert!(handle.join().unwrap());
        assert!(shared.read().contains("Vehicle"));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn module_info_serializes() {
        let info = Vehicles.info();
        let json = serde_json::to_string(&info).unwrap();
        assert_eq!(serde_json::from_str::<ModuleInfo>(&json).unwrap(), info);

        let partial: ModuleInfo = ron::from_str("(name: \"Tools\")").unwrap();
        assert_eq!(partial, ModuleInfo::new("Tools"));
    }

    #[cfg(feature = "auto_register")]
    mod auto {
        use super::{ClassRegistry, ModuleDef, ModuleInfo, ModuleRegistrar, Vehicles};

        struct Empty;

        impl ModuleDef for Empty {
            fn info(&self) -> ModuleInfo {
                ModuleInfo::new("AutoEmpty")
            }

            fn register(&self, _module: &mut ModuleRegistrar) {}
        }

        crate::submit_module!(Empty);
        crate::submit_module!(Vehicles);

        #[test]
        fn submitted_modules_load_once() {
            let mut registry = ClassRegistry::new();
            assert!(registry.auto_register() >= 2);
            assert!(registry.find_module("AutoEmpty").is_some());
            assert!(registry.get_class("Truck").is_some());
            assert_eq!(registry.auto_register(), 0);
        }
    }
}
