use alloc::boxed::Box;
use alloc::string::String;
use core::any::{Any, type_name};
use core::fmt;

use super::{Annotations, impl_annotations_fn};
use crate::object::AttributeError;
use crate::value::{Reflected, TypeDesc, Value};

// -----------------------------------------------------------------------------
// Access & Storage

/// Whether an attribute can be written through the dynamic API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Access {
    #[default]
    ReadWrite,
    /// Dynamic writes are ignored. Declared defaults still apply on creation.
    ReadOnly,
}

/// Where an attribute's value lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    /// A field of the object.
    Direct,
    /// A getter / setter pair.
    Accessor,
}

// -----------------------------------------------------------------------------
// AttributeInfo

type Getter = Box<dyn Fn(&dyn Any) -> Option<Value> + Send + Sync>;
type Setter = Box<dyn Fn(&mut dyn Any, &Value) -> Result<(), AttributeError> + Send + Sync>;

/// Describes a named attribute of a class.
///
/// The accessors work on the class that declares the attribute; classes
/// deriving from it reach it through their base chain.
///
/// # Examples
///
/// ```
/// use pl_reflect::info::{Access, AttributeInfo, Storage};
///
/// struct Mesh {
///     lod: u8,
///     triangles: Vec<u32>,
/// }
///
/// let lod = AttributeInfo::field("Lod", |m: &Mesh| &m.lod, |m| &mut m.lod)
///     .with_default(2_u8)
///     .with_description("Level of detail");
/// assert_eq!(lod.storage(), Storage::Direct);
/// assert_eq!(lod.type_desc().name(), "uint8");
/// assert_eq!(lod.default_string(), "2");
///
/// let count = AttributeInfo::getter("Triangles", |m: &Mesh| m.triangles.len() as u32 / 3);
/// assert_eq!(count.access(), Access::ReadOnly);
/// assert_eq!(count.storage(), Storage::Accessor);
/// ```
pub struct AttributeInfo {
    name: &'static str,
    ty: TypeDesc,
    access: Access,
    storage: Storage,
    default: Value,
    description: &'static str,
    annotations: Option<Box<Annotations>>,
    getter: Getter,
    setter: Option<Setter>,
}

impl AttributeInfo {
    /// An attribute stored in a field of `T`.
    pub fn field<T: Any, V: Reflected>(
        name: &'static str,
        get: fn(&T) -> &V,
        get_mut: fn(&mut T) -> &mut V,
    ) -> Self {
        Self::new::<V>(
            name,
            Storage::Direct,
            Box::new(move |target: &dyn Any| target.downcast_ref::<T>().map(|t| get(t).to_value())),
            Some(Box::new(move |target: &mut dyn Any, value: &Value| {
                let t = target
                    .downcast_mut::<T>()
                    .ok_or(AttributeError::TargetMismatch(type_name::<T>()))?;
                *get_mut(t) = convert::<V>(name, value)?;
                Ok(())
            })),
        )
    }

    /// An attribute behind a getter / setter pair.
    pub fn property<T: Any, V: Reflected>(
        name: &'static str,
        get: impl Fn(&T) -> V + Send + Sync + 'static,
        set: impl Fn(&mut T, V) + Send + Sync + 'static,
    ) -> Self {
        Self::new::<V>(
            name,
            Storage::Accessor,
            Box::new(move |target: &dyn Any| target.downcast_ref::<T>().map(|t| get(t).to_value())),
            Some(Box::new(move |target: &mut dyn Any, value: &Value| {
                let t = target
                    .downcast_mut::<T>()
                    .ok_or(AttributeError::TargetMismatch(type_name::<T>()))?;
                set(t, convert::<V>(name, value)?);
                Ok(())
            })),
        )
    }

    /// A read-only attribute computed by a getter.
    pub fn getter<T: Any, V: Reflected>(
        name: &'static str,
        get: impl Fn(&T) -> V + Send + Sync + 'static,
    ) -> Self {
        let mut info = Self::new::<V>(
            name,
            Storage::Accessor,
            Box::new(move |target: &dyn Any| target.downcast_ref::<T>().map(|t| get(t).to_value())),
            None,
        );
        info.access = Access::ReadOnly;
        info
    }

    fn new<V: Reflected>(
        name: &'static str,
        storage: Storage,
        getter: Getter,
        setter: Option<Setter>,
    ) -> Self {
        Self {
            name,
            ty: V::type_desc(),
            access: Access::ReadWrite,
            storage,
            default: Value::Void,
            description: "",
            annotations: None,
            getter,
            setter,
        }
    }

    /// Marks the attribute read-only for dynamic writes.
    #[inline]
    pub fn read_only(mut self) -> Self {
        self.access = Access::ReadOnly;
        self
    }

    /// Sets the value applied when the class creates an instance, and by
    /// [`ObjectExt::set_attribute_default`](crate::object::ObjectExt::set_attribute_default).
    #[inline]
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = value.into();
        self
    }

    #[inline]
    pub fn with_description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    impl_annotations_fn!(annotations);

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn type_desc(&self) -> TypeDesc {
        self.ty
    }

    #[inline]
    pub fn access(&self) -> Access {
        self.access
    }

    #[inline]
    pub fn is_read_only(&self) -> bool {
        self.access == Access::ReadOnly
    }

    /// Returns `false` for attributes declared with [`getter`](Self::getter),
    /// which can't be written at all, not even to apply a default.
    #[inline]
    pub fn has_setter(&self) -> bool {
        self.setter.is_some()
    }

    #[inline]
    pub fn storage(&self) -> Storage {
        self.storage
    }

    /// The declared default, [`Value::Void`] if none was declared.
    #[inline]
    pub fn default_value(&self) -> &Value {
        &self.default
    }

    /// Returns `true` if a default was declared.
    #[inline]
    pub fn has_default(&self) -> bool {
        !self.default.is_void()
    }

    /// The declared default in string form.
    pub fn default_string(&self) -> String {
        self.ty.format(&self.default)
    }

    #[inline]
    pub fn description(&self) -> &'static str {
        self.description
    }

    /// Reads the attribute from an instance of the declaring class.
    pub(crate) fn read(&self, target: &dyn Any) -> Option<Value> {
        (self.getter)(target)
    }

    /// Writes the attribute, honoring [`Access`].
    pub(crate) fn write(&self, target: &mut dyn Any, value: &Value) -> Result<(), AttributeError> {
        if self.is_read_only() {
            return Err(AttributeError::ReadOnly(self.name));
        }
        self.write_unchecked(target, value)
    }

    /// Writes the attribute, ignoring [`Access`]. Used to apply defaults.
    pub(crate) fn write_unchecked(
        &self,
        target: &mut dyn Any,
        value: &Value,
    ) -> Result<(), AttributeError> {
        match &self.setter {
            Some(setter) => setter(target, value),
            None => Err(AttributeError::ReadOnly(self.name)),
        }
    }
}

fn convert<V: Reflected>(attribute: &'static str, value: &Value) -> Result<V, AttributeError> {
    V::from_value(value).ok_or_else(|| AttributeError::TypeMismatch {
        attribute,
        expected: V::type_desc().name(),
        found: value.kind(),
    })
}

impl fmt::Debug for AttributeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeInfo")
            .field("name", &self.name)
            .field("type", &self.ty.name())
            .field("access", &self.access)
            .field("storage", &self.storage)
            .field("default", &self.default)
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// Tests
