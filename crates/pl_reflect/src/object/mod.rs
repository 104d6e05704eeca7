//! Reflected instances and their dynamic API.
//!
//! ## Menu
//!
//! - [`Object`]: implemented by every reflected type, usually through
//!   `#[derive(Object)]`.
//! - [`ObjectBase`]: the root sub-object holding the class binding and the
//!   per-instance signals.
//! - [`ObjectExt`]: attribute get/set, method calls and signals by name.
//!     - [`DefaultValues`]: which attributes `get_values` writes.
//! - [`ObjectHandle`] / [`WeakObjectHandle`]: shared objects, the target
//!   of slots.
//!     - [`connect_slot`]: wires an event of one object to a slot of another.
//! - [`AttributeSnapshot`]: ordered attribute dump for serialization.
//! - [`AttributeError`]: why a typed attribute write was rejected.

// -----------------------------------------------------------------------------
// Modules

mod base;
mod error;
mod ext;
mod handle;
mod snapshot;

// -----------------------------------------------------------------------------
// Exports

pub use base::{Object, ObjectBase};
pub use error::AttributeError;
pub use ext::{DefaultValues, ObjectExt};
pub use handle::{ObjectHandle, WeakObjectHandle, connect_slot};
pub use snapshot::{AttributeEntry, AttributeSnapshot};

pub(crate) use base::object_class;

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{AttributeError, DefaultValues, ObjectBase, ObjectExt, ObjectHandle, connect_slot};
    use crate::class::ClassBuilder;
    use crate::func::CallError;
    use crate::impl_reflect_enum;
    use crate::info::{AttributeInfo, EventInfo, MethodInfo, SlotInfo};
    use crate::prelude::Object;
    use crate::registry::ClassRegistry;
    use crate::value::Value;
    use alloc::string::String;
    use alloc::sync::Arc;
    use alloc::vec::Vec;
    use core::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, Copy, PartialEq, Default)]
    enum Mode {
        #[default]
        Idle,
        Running,
        Paused,
    }

    impl_reflect_enum!(Mode { Idle, Running, Paused });

    #[derive(Object, Default)]
    struct Timer {
        #[object(base)]
        base: ObjectBase,
        interval: f32,
        mode: Mode,
        ticks: u32,
        name: String,
    }

    fn registry() -> ClassRegistry {
        let mut registry = ClassRegistry::new();
        registry
            .register(
                ClassBuilder::<Timer>::new("Timer")
                    .object_base()
                    .default_factory()
                    .attribute(
                        AttributeInfo::field("Interval", |t: &Timer| &t.interval, |t| &mut t.interval)
                            .with_default(0.25),
                    )
                    .attribute(
                        AttributeInfo::field("Mode", |t: &Timer| &t.mode, |t| &mut t.mode)
                            .with_default(Mode::Running),
                    )
                    .attribute(AttributeInfo::getter("Ticks", |t: &Timer| t.ticks))
                    .attribute(AttributeInfo::property(
                        "Name",
                        |t: &Timer| t.name.clone(),
                        |t: &mut Timer, v: String| t.name = v,
                    ))
                    .method(
                        MethodInfo::new("Advance", |t: &mut Timer, n: u32| {
                            t.ticks += n;
                            t.ticks
                        })
                        .with_param_names(&["count"]),
                    )
                    .event(EventInfo::new::<()>("OnTick"))
                    .event(EventInfo::new::<(u32,)>("OnCount").with_param_names(&["ticks"]))
                    .slot(SlotInfo::new("OnAdvance", |t: &mut Timer| t.ticks += 1))
                    .build(),
            )
            .unwrap();
        registry
    }

    #[test]
    fn created_objects_report_their_class() {
        let registry = registry();
        for class in registry.classes() {
            if let Some(object) = class.create() {
                assert_eq!(object.class().unwrap().name(), class.name());
            }
        }
    }

    #[test]
    fn read_then_write_back_changes_nothing() {
        let registry = registry();
        let mut timer = registry.create("Timer").unwrap();
        timer.set_attribute("Name", "main \"loop\"");

        let before = timer.get_values(DefaultValues::WithDefault);
        for attribute in registry.get_class("Timer").unwrap().attributes() {
            let text = timer.get_attribute(attribute.name());
            timer.set_attribute(attribute.name(), &text);
        }
        assert_eq!(timer.get_values(DefaultValues::WithDefault), before);
    }

    #[test]
    fn nested_list_attributes_round_trip() {
        #[derive(Object, Default)]
        struct Grid {
            #[object(base)]
            base: ObjectBase,
            rows: Vec<Vec<i32>>,
            cells: usize,
        }

        let mut registry = ClassRegistry::new();
        registry
            .register(
                ClassBuilder::<Grid>::new("Grid")
                    .object_base()
                    .default_factory()
                    .attribute(
                        AttributeInfo::field("Rows", |g: &Grid| &g.rows, |g| &mut g.rows)
                            .with_default(alloc::vec![alloc::vec![1, 2], alloc::vec![3]]),
                    )
                    // a default without setter is skipped, not applied
                    .attribute(AttributeInfo::getter("Cells", |g: &Grid| g.cells).with_default(9_u64))
                    .build(),
            )
            .unwrap();

        let mut grid = registry.create("Grid").unwrap();
        let before = grid.attribute("Rows");
        let text = grid.get_attribute("Rows");
        assert_eq!(text, "[1,2],[3]");
        assert!(grid.set_attribute("Rows", &text));
        assert_eq!(grid.attribute("Rows"), before);
        assert!(grid.is_attribute_default("Rows"));

        assert_eq!(grid.get_attribute("Cells"), "0");
        assert!(!grid.is_attribute_default("Cells"));
        assert!(!grid.set_attribute_default("Cells"));
        assert_eq!(grid.set_default_values(), 1);
    }

    #[test]
    fn unknown_names_are_harmless() {
        let registry = registry();
        let mut timer = registry.create("Timer").unwrap();
        let before = timer.get_values(DefaultValues::WithDefault);

        assert_eq!(timer.get_attribute("doesNotExist"), "");
        assert!(!timer.set_attribute("doesNotExist", "x"));
        assert_eq!(timer.attribute("doesNotExist"), None);
        assert_eq!(
            timer.call_method("doesNotExist", &[]),
            Err(CallError::UnknownMember("doesNotExist".into()))
        );
        assert!(timer.signal("doesNotExist").is_none());
        assert_eq!(timer.get_values(DefaultValues::WithDefault), before);
    }

    #[test]
    fn string_writes_fail_soft() {
        let registry = registry();
        let mut timer = registry.create("Timer").unwrap();

        assert_eq!(timer.get_attribute("Mode"), "Running");
        assert!(timer.set_attribute("Mode", "Paused"));
        assert_eq!(timer.attribute("Mode"), Some(Value::Enum(2)));
        assert!(!timer.set_attribute("Mode", "Sprinting"));
        assert!(!timer.set_attribute("Interval", "fast"));
        assert_eq!(timer.get_attribute("Mode"), "Paused");
        assert_eq!(timer.get_attribute("Interval"), "0.25");

        // read-only
        assert!(!timer.set_attribute("Ticks", "10"));
        assert_eq!(
            timer.set_attribute_value("Ticks", 10_u32),
            Err(AttributeError::ReadOnly("Ticks"))
        );
        assert_eq!(timer.get_attribute("Ticks"), "0");
    }

    #[test]
    fn defaults() {
        let registry = registry();
        let mut timer = registry.create("Timer").unwrap();

        assert!(timer.is_attribute_default("Interval"));
        assert!(timer.set_attribute("Interval", "2"));
        assert!(!timer.is_attribute_default("Interval"));
        assert_eq!(timer.get_values(DefaultValues::NoDefault), "Interval=\"2\" Ticks=\"0\" Name=\"\"");

        assert!(timer.set_attribute_default("Interval"));
        assert!(timer.is_attribute_default("Interval"));
        // no declared default
        assert!(!timer.set_attribute_default("Name"));
        assert!(!timer.is_attribute_default("Name"));

        timer.set_attribute("Mode", "Idle");
        assert_eq!(timer.set_default_values(), 2);
        assert_eq!(timer.get_attribute("Mode"), "Running");
    }

    #[test]
    fn values_list_round_trip() {
        let registry = registry();
        let mut a = registry.create("Timer").unwrap();
        a.set_values("Interval=\"1.5\" Mode='Paused' Name=\"it's\"");

        let mut b = registry.create("Timer").unwrap();
        assert_eq!(b.set_values(&a.get_values(DefaultValues::NoDefault)), 3);
        assert_eq!(b.get_attribute("Name"), "it's");
        assert_eq!(b.get_attribute("Mode"), "Paused");
        assert_eq!(b.get_attribute("Interval"), "1.5");
    }

    #[test]
    fn method_calls_are_all_or_nothing() {
        let registry = registry();
        let mut timer = registry.create("Timer").unwrap();

        assert_eq!(timer.call_method("Advance", &[Value::Int(3)]), Ok(Value::UInt(3)));
        assert!(timer.call_method("Advance", &[Value::from("x")]).is_err());
        assert!(timer.call_method("Advance", &[Value::Int(-1)]).is_err());
        assert!(timer.call_method("Advance", &[]).is_err());
        assert_eq!(timer.call_method_str("Advance", "count=\"2\""), Ok(Value::UInt(5)));
        assert_eq!(timer.call_method_str("Advance", "Param0=1"), Ok(Value::UInt(6)));
        assert_eq!(timer.get_attribute("Ticks"), "6");
    }

    #[test]
    fn timer_ticks_until_disconnected() {
        let registry = registry();
        let timer = registry.create("Timer").unwrap();
        let count = Arc::new(AtomicUsize::new(0));
        let slot = {
            let count = count.clone();
            crate::signal::Slot::new(move |_| {
                count.fetch_add(1, Ordering::SeqCst);
            })
        };

        assert!(timer.connect("OnTick", &slot));
        for _ in 0..3 {
            timer.emit("OnTick", &[]).unwrap();
        }
        assert_eq!(count.load(Ordering::SeqCst), 3);

        assert!(timer.disconnect("OnTick", &slot));
        timer.emit("OnTick", &[]).unwrap();
        timer.emit("OnTick", &[]).unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn emit_checks_arguments() {
        let registry = registry();
        let timer = registry.create("Timer").unwrap();
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let _sub = {
            let seen = seen.clone();
            timer
                .subscribe("OnCount", move |args| seen.lock().unwrap().extend_from_slice(args))
                .unwrap()
        };

        assert!(timer.emit("OnCount", &[Value::UInt(7)]).is_ok());
        assert!(matches!(
            timer.emit("OnCount", &[Value::from("seven")]),
            Err(CallError::ArgType { index: 0, .. })
        ));
        assert!(timer.emit("OnCount", &[]).is_err());
        assert!(timer.emit("OnMissing", &[]).is_err());
        assert_eq!(*seen.lock().unwrap(), [Value::UInt(7)]);
    }

    #[test]
    fn destroyed_is_emitted_on_drop() {
        let registry = registry();
        let timer = registry.create("Timer").unwrap();
        let count = Arc::new(AtomicUsize::new(0));
        let sub = {
            let count = count.clone();
            timer
                .subscribe("Destroyed", move |_| {
                    count.fetch_add(1, Ordering::SeqCst);
                })
                .unwrap()
        };

        drop(timer);
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(!sub.is_active());
    }

    #[test]
    fn slots_follow_their_object() {
        let registry = registry();
        let source = registry.create_shared("Timer").unwrap();
        let target = registry.create_shared("Timer").unwrap();

        assert!(connect_slot(&source, "OnTick", &target, "OnAdvance"));
        // idempotent
        assert!(!connect_slot(&source, "OnTick", &target, "OnAdvance"));
        assert!(!connect_slot(&source, "OnTick", &target, "Missing"));
        assert!(target.slot("OnAdvance").unwrap().ptr_eq(&target.slot("OnAdvance").unwrap()));

        source.read().emit("OnTick", &[]).unwrap();
        source.read().emit("OnTick", &[]).unwrap();
        assert_eq!(target.read().get_attribute("Ticks"), "2");

        drop(target);
        source.read().emit("OnTick", &[]).unwrap();
        assert!(source.read().signal("OnTick").unwrap().is_empty());
    }

    #[test]
    fn busy_target_is_skipped() {
        let registry = registry();
        let timer = registry.create_shared("Timer").unwrap();
        assert!(connect_slot(&timer, "OnTick", &timer, "OnAdvance"));

        // the emitter holds the lock its own slot needs
        timer.write().emit("OnTick", &[]).unwrap();
        assert_eq!(timer.read().get_attribute("Ticks"), "0");

        let signal = timer.read().signal("OnTick").unwrap();
        signal.emit(&[]);
        assert_eq!(timer.read().get_attribute("Ticks"), "1");
    }

    #[test]
    fn handles_compare_by_identity() {
        let registry = registry();
        let a = registry.create_shared("Timer").unwrap();
        let b = registry.create_shared("Timer").unwrap();
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
        assert_eq!(a.downgrade().upgrade(), Some(a.clone()));
        assert_eq!(Value::Object(a.clone()).as_object(), Some(&a));
        assert!(ObjectHandle::new(ObjectBase::new()).class().is_none());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn snapshots_survive_serialization() {
        use super::AttributeSnapshot;

        let registry = registry();
        let mut timer = registry.create("Timer").unwrap();
        timer.set_values("Interval=\"0.5\" Mode=\"Paused\" Name=\"backup\"");
        let snapshot = timer.to_snapshot().unwrap();
        assert_eq!(snapshot.class(), "Timer");
        assert_eq!(snapshot.get("Mode"), Some("Paused"));

        let json = serde_json::to_string(&snapshot).unwrap();
        let from_json: AttributeSnapshot = serde_json::from_str(&json).unwrap();
        let text = ron::to_string(&snapshot).unwrap();
        let from_ron: AttributeSnapshot = ron::from_str(&text).unwrap();
        assert_eq!(from_json, snapshot);
        assert_eq!(from_ron, snapshot);

        let mut copy = registry.create("Timer").unwrap();
        // `Ticks` is read-only
        assert_eq!(copy.apply_snapshot(&from_ron), 3);
        assert_eq!(copy.get_values(DefaultValues::WithDefault), timer.get_values(DefaultValues::WithDefault));
    }
}
