use alloc::string::String;
use alloc::sync::Arc;

use super::{AttributeError, AttributeSnapshot, Object};
use crate::class::Class;
use crate::func::CallError;
use crate::signal::{Signal, Slot, Subscription};
use crate::value::{ParamsParser, Value, write_param};

// -----------------------------------------------------------------------------
// DefaultValues

/// Which attributes [`ObjectExt::get_values`] writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DefaultValues {
    /// Every attribute.
    WithDefault,
    /// Only attributes that differ from their declared default.
    #[default]
    NoDefault,
}

// -----------------------------------------------------------------------------
// ObjectExt

/// The dynamic API of every [`Object`].
///
/// Everything goes through the class the object is bound to. An object
/// that no class created or adopted has no attributes, methods or events.
///
/// The string methods ([`get_attribute`](Self::get_attribute),
/// [`set_attribute`](Self::set_attribute), [`set_values`](Self::set_values))
/// never fail: a miss reads as an empty string, a rejected write is logged
/// and leaves the attribute unchanged.
pub trait ObjectExt: Object {
    /// The class of this instance.
    fn class(&self) -> Option<Arc<Class>> {
        self.object_base().class().cloned()
    }

    /// Returns `true` if the class of this instance is `name` or derives
    /// from it.
    fn is_instance_of(&self, name: &str) -> bool {
        self.class().is_some_and(|c| c.is_derived_from(name))
    }

    // -------------------------------------------------------------------------
    // Attributes

    /// Reads an attribute.
    fn attribute(&self, name: &str) -> Option<Value> {
        let class = self.class()?;
        class.read_attribute(self.as_any(), name).map(|(_, v)| v)
    }

    /// Writes an attribute, honoring read-only access.
    fn set_attribute_value(
        &mut self,
        name: &str,
        value: impl Into<Value>,
    ) -> Result<(), AttributeError> {
        let class = self.class().ok_or(AttributeError::Unbound)?;
        class.write_attribute(self.as_any_mut(), name, &value.into(), false)
    }

    /// Reads an attribute in string form, empty if there is no such
    /// attribute.
    fn get_attribute(&self, name: &str) -> String {
        match self.class() {
            Some(class) => match class.read_attribute(self.as_any(), name) {
                Some((info, value)) => info.type_desc().format(&value),
                None => String::new(),
            },
            None => String::new(),
        }
    }

    /// Parses and writes an attribute, returning `true` if it was written.
    fn set_attribute(&mut self, name: &str, value: &str) -> bool {
        let Some(class) = self.class() else {
            log::debug!("attribute `{name}` not set: object has no class");
            return false;
        };
        let Some(info) = class.attribute(name) else {
            log::debug!("{}: no attribute `{name}`", class.name());
            return false;
        };
        if info.is_read_only() {
            if class.warns_read_only() {
                log::warn!("{}: attribute `{name}` is read-only", class.name());
            }
            return false;
        }
        let result = info
            .type_desc()
            .parse(value)
            .map_err(|source| AttributeError::Parse {
                attribute: info.name(),
                source,
            })
            .and_then(|value| class.write_attribute(self.as_any_mut(), name, &value, false));
        match result {
            Ok(()) => true,
            Err(e) => {
                log::warn!("{}: {e}, value {value:?} ignored", class.name());
                false
            }
        }
    }

    /// Resets an attribute to its declared default.
    ///
    /// Returns `false` if it has none or can't be written.
    fn set_attribute_default(&mut self, name: &str) -> bool {
        let Some(class) = self.class() else {
            return false;
        };
        let Some(info) = class.attribute(name).filter(|i| i.has_default()) else {
            return false;
        };
        match class.write_attribute(self.as_any_mut(), name, info.default_value(), false) {
            Ok(()) => true,
            Err(e) => {
                log::debug!("{}: default not restored: {e}", class.name());
                false
            }
        }
    }

    /// Returns `true` if the attribute has a declared default and currently
    /// holds it.
    ///
    /// Values are compared in string form, so `1` equals `1.0`.
    fn is_attribute_default(&self, name: &str) -> bool {
        let Some(class) = self.class() else {
            return false;
        };
        match class.read_attribute(self.as_any(), name) {
            Some((info, value)) => {
                info.has_default() && info.type_desc().format(&value) == info.default_string()
            }
            None => false,
        }
    }

    /// Applies every declared default, read-only attributes included.
    /// Returns how many were set.
    fn set_default_values(&mut self) -> usize {
        match self.class() {
            Some(class) => class.apply_defaults(self.as_any_mut()),
            None => 0,
        }
    }

    /// Writes attributes as `Name="value"` pairs, in declaration order.
    ///
    /// # Examples
    ///
    /// ```
    /// use pl_reflect::prelude::*;
    ///
    /// #[derive(Object, Default)]
    /// struct Fog {
    ///     #[object(base)]
    ///     base: ObjectBase,
    ///     density: f32,
    ///     label: String,
    /// }
    ///
    /// let mut registry = ClassRegistry::new();
    /// let fog = registry.register(
    ///     ClassBuilder::<Fog>::new("Fog")
    ///         .object_base()
    ///         .default_factory()
    ///         .attribute(AttributeInfo::field("Density", |f: &Fog| &f.density, |f| &mut f.density).with_default(0.5))
    ///         .attribute(AttributeInfo::field("Label", |f: &Fog| &f.label, |f| &mut f.label))
    ///         .build(),
    /// ).unwrap();
    ///
    /// let mut o = fog.create().unwrap();
    /// assert_eq!(o.set_values("Label='morning \"haze\"'"), 1);
    /// assert_eq!(o.get_values(DefaultValues::NoDefault), r#"Label='morning "haze"'"#);
    /// assert_eq!(
    ///     o.get_values(DefaultValues::WithDefault),
    ///     r#"Density="0.5" Label='morning "haze"'"#,
    /// );
    /// ```
    fn get_values(&self, which: DefaultValues) -> String {
        let mut out = String::new();
        let Some(class) = self.class() else {
            return out;
        };
        for (info, value) in class.read_attributes(self.as_any()) {
            let text = info.type_desc().format(&value);
            if which == DefaultValues::NoDefault && info.has_default() && text == info.default_string() {
                continue;
            }
            write_param(&mut out, info.name(), &text);
        }
        out
    }

    /// Sets attributes from `Name="value"` pairs, returning how many were
    /// written.
    ///
    /// Malformed input stops at the first bad pair; pairs before it are kept.
    fn set_values(&mut self, values: &str) -> usize {
        let mut written = 0;
        for pair in ParamsParser::new(values) {
            match pair {
                Ok((name, text)) => written += usize::from(self.set_attribute(name, &text)),
                Err(e) => {
                    log::warn!("malformed attribute list: {e}");
                    break;
                }
            }
        }
        written
    }

    /// Captures every attribute in string form.
    fn to_snapshot(&self) -> Option<AttributeSnapshot> {
        let class = self.class()?;
        let mut snapshot = AttributeSnapshot::new(class.full_name());
        for (info, value) in class.read_attributes(self.as_any()) {
            snapshot.push(info.name(), info.type_desc().format(&value));
        }
        Some(snapshot)
    }

    /// Sets every attribute of a snapshot, returning how many were written.
    fn apply_snapshot(&mut self, snapshot: &AttributeSnapshot) -> usize {
        if let Some(class) = self.class()
            && class.full_name() != snapshot.class()
        {
            log::debug!("applying a `{}` snapshot to a `{}`", snapshot.class(), class.full_name());
        }
        snapshot
            .iter()
            .filter(|entry| self.set_attribute(&entry.name, &entry.value))
            .count()
    }

    // -------------------------------------------------------------------------
    // Methods

    /// Calls a method. Either every argument converts and the method runs,
    /// or nothing happens.
    fn call_method(&mut self, name: &str, args: &[Value]) -> Result<Value, CallError> {
        let class = self.class().ok_or(CallError::Unbound)?;
        class.invoke_method(self.as_any_mut(), name, args)
    }

    /// Calls a method with arguments given as a params string, such as
    /// `Param0="1" Param1='x'` or keyed by parameter name.
    fn call_method_str(&mut self, name: &str, params: &str) -> Result<Value, CallError> {
        let class = self.class().ok_or(CallError::Unbound)?;
        class.invoke_method_str(self.as_any_mut(), name, params)
    }

    // -------------------------------------------------------------------------
    // Signals

    /// The signal of a declared event, created on first use.
    fn signal(&self, name: &str) -> Option<Signal> {
        let event = self.class()?.event(name)?;
        let mut signals = self.object_base().signals();
        Some(signals.entry(event.name()).or_default().clone())
    }

    /// Emits a declared event after checking the arguments against it.
    fn emit(&self, name: &str, args: &[Value]) -> Result<(), CallError> {
        let class = self.class().ok_or(CallError::Unbound)?;
        let event = class
            .event(name)
            .ok_or_else(|| CallError::UnknownMember(name.into()))?;
        event.check_args(args)?;
        // Nothing is connected to a signal that was never asked for.
        let signal = self.object_base().signals().get(name).cloned();
        if let Some(signal) = signal {
            signal.emit(args);
        }
        Ok(())
    }

    /// Connects a slot to a declared event, see [`Signal::connect`].
    fn connect(&self, event: &str, slot: &Slot) -> bool {
        self.signal(event).is_some_and(|s| s.connect(slot))
    }

    fn disconnect(&self, event: &str, slot: &Slot) -> bool {
        self.signal(event).is_some_and(|s| s.disconnect(slot))
    }

    /// Subscribes a callback to a declared event, see [`Signal::subscribe`].
    fn subscribe(
        &self,
        event: &str,
        f: impl Fn(&[Value]) + Send + Sync + 'static,
    ) -> Option<Subscription> {
        self.signal(event).map(|s| s.subscribe(f))
    }
}

impl<T: Object + ?Sized> ObjectExt for T {}
