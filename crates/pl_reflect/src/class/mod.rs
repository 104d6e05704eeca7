//! Class descriptors.
//!
//! ## Menu
//!
//! - [`Class`]: metadata and factory of one reflected class.
//! - [`ClassBuilder`]: declares a class for a native type.
//! - [`LinkState`]: whether the base chain of a class is resolved.
//!
//! A class names its base instead of pointing at it. The
//! [`ClassRegistry`](crate::registry::ClassRegistry) resolves the name
//! when classes are registered or unregistered, and caches the flattened
//! ancestor chain and member tables on the class.

// -----------------------------------------------------------------------------
// Modules

mod builder;
mod descriptor;
mod layout;

// -----------------------------------------------------------------------------
// Exports

pub use builder::ClassBuilder;
pub use descriptor::Class;
pub use layout::LinkState;

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{ClassBuilder, LinkState};
    use crate::info::{AttributeInfo, ConstructorInfo, EventInfo, MethodInfo};
    use crate::object::{ObjectBase, ObjectExt};
    use crate::prelude::Object;
    use crate::registry::ClassRegistry;
    use crate::value::Value;
    use alloc::string::String;
    use alloc::sync::Arc;
    use alloc::vec::Vec;

    #[derive(Object, Default)]
    struct Shape {
        #[object(base)]
        base: ObjectBase,
        name: String,
        visible: bool,
    }

    #[derive(Object, Default)]
    struct Circle {
        #[object(base)]
        base: Shape,
        radius: f64,
    }

    fn registry() -> ClassRegistry {
        let mut registry = ClassRegistry::new();
        registry
            .register(
                ClassBuilder::<Shape>::new("Shape")
                    .object_base()
                    .property("Icon", "shape.png")
                    .attribute(AttributeInfo::field("Name", |s: &Shape| &s.name, |s| &mut s.name))
                    .attribute(
                        AttributeInfo::field("Visible", |s: &Shape| &s.visible, |s| &mut s.visible)
                            .with_default(true),
                    )
                    .method(MethodInfo::new("Hide", |s: &mut Shape| s.visible = false))
                    .event(EventInfo::new::<()>("OnChanged"))
                    .build(),
            )
            .unwrap();
        registry
            .register(
                ClassBuilder::<Circle>::new("Circle")
                    .base("Shape", |c: &Circle| &c.base, |c| &mut c.base)
                    .property("Icon", "circle.png")
                    .default_factory()
                    .attribute(
                        AttributeInfo::field("Name", |c: &Circle| &c.base.name, |c| &mut c.base.name)
                            .with_default("circle"),
                    )
                    .attribute(AttributeInfo::field("Radius", |c: &Circle| &c.radius, |c| &mut c.radius))
                    .constructor(
                        ConstructorInfo::new("FromRadius", |radius: f64| Circle {
                            radius,
                            ..Circle::default()
                        })
                        .with_param_names(&["radius"]),
                    )
                    .build(),
            )
            .unwrap();
        registry
    }

    #[test]
    fn flattened_view_prefers_derived() {
        let registry = registry();
        let circle = registry.get_class("Circle").unwrap();

        let names: Vec<_> = circle.attributes().iter().map(|a| a.name()).collect();
        assert_eq!(names, ["Name", "Visible", "Radius"]);
        assert_eq!(circle.attribute("Name").unwrap().default_string(), "circle");
        assert_eq!(circle.property("Icon"), Some("circle.png"));
        assert!(circle.method("Hide").is_some());
        assert!(circle.event("OnChanged").is_some());
        assert!(circle.event("Destroyed").is_some());
        assert_eq!(circle.own_attributes().len(), 2);
        assert_eq!(circle.link_state(), LinkState::Linked);
    }

    #[test]
    fn inherited_members_reach_the_base() {
        let registry = registry();
        let circle = registry.get_class("Circle").unwrap();
        let mut object = circle.create().unwrap();

        assert_eq!(object.get_attribute("Visible"), "true");
        assert_eq!(object.get_attribute("Name"), "circle");
        object.call_method("Hide", &[]).unwrap();
        assert_eq!(object.attribute("Visible"), Some(Value::Bool(false)));

        let native = object.as_any().downcast_ref::<Circle>().unwrap();
        assert!(!native.base.visible);
    }

    #[test]
    fn constructors_and_abstract_classes() {
        let registry = registry();
        let shape = registry.get_class("Shape").unwrap();
        assert!(shape.is_abstract());
        assert!(shape.create().is_none());

        let circle = registry.get_class("Circle").unwrap();
        let object = circle.create_with("FromRadius", &[Value::Float(2.5)]).unwrap();
        assert_eq!(object.get_attribute("Radius"), "2.5");
        assert!(Arc::ptr_eq(&object.class().unwrap(), &circle));

        let object = circle.create_from_str("FromRadius", "radius=\"4\"").unwrap();
        assert_eq!(object.attribute("Radius"), Some(Value::Float(4.0)));

        assert!(circle.create_with("FromRadius", &[Value::from("big")]).is_err());
        assert!(circle.create_with("Missing", &[]).is_err());
        // constructors are not inherited
        assert!(shape.constructor("FromRadius").is_none());
    }

    #[test]
    fn unregistered_class_sees_own_members() {
        let class = ClassBuilder::<Circle>::new("Loose")
            .base("Shape", |c: &Circle| &c.base, |c| &mut c.base)
            .attribute(AttributeInfo::field("Radius", |c: &Circle| &c.radius, |c| &mut c.radius))
            .build();
        assert_eq!(class.link_state(), LinkState::Orphaned { missing: "Shape" });
        assert!(class.is_derived_from("Loose"));
        assert!(!class.is_derived_from("Shape"));
        assert_eq!(class.attributes().len(), 1);
    }
}
