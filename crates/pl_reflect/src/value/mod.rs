//! Generic values exchanged by dynamic attribute access, method calls and signals.
//!
//! ## Menu
//!
//! - [`Value`]: the closed variant passed through every dynamic API.
//! - [`ValueKind`]: the semantic tag of a value or a declared type.
//! - [`TypeDesc`]: describes a native type (name, kind, size, enum names).
//! - [`Reflected`]: converts a native type to and from [`Value`].
//! - [`ParseError`]: returned by the string codec.
//! - [`impl_reflect_enum`] / [`impl_reflect_flags`]: expose enums and
//!   `bitflags` types with symbolic names.
//!
//! Strings are only produced at serialization boundaries, see
//! [`TypeDesc::format`] and [`TypeDesc::parse`].
//!
//! [`impl_reflect_enum`]: crate::impl_reflect_enum
//! [`impl_reflect_flags`]: crate::impl_reflect_flags

// -----------------------------------------------------------------------------
// Modules

mod codec;
mod enums;
mod params;
mod reflected;
mod type_desc;

// -----------------------------------------------------------------------------
// Exports

pub use codec::ParseError;
pub use params::{ParamsParser, write_param};
pub use reflected::Reflected;
pub use type_desc::{EnumEntry, EnumInfo, TypeDesc};

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::object::ObjectHandle;

// -----------------------------------------------------------------------------
// ValueKind

/// The semantic type tag of a [`Value`] or a [`TypeDesc`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValueKind {
    Void,
    Bool,
    Int,
    UInt,
    Float,
    String,
    Enum,
    Flags,
    Object,
    List,
    /// A type with no generic representation.
    Custom,
}

impl ValueKind {
    /// Returns `true` for `Int`, `UInt` and `Float`.
    #[inline]
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Int | Self::UInt | Self::Float)
    }

    /// Returns the lowercase name of the kind.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Void => "void",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::UInt => "uint",
            Self::Float => "float",
            Self::String => "string",
            Self::Enum => "enum",
            Self::Flags => "flags",
            Self::Object => "object",
            Self::List => "list",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// -----------------------------------------------------------------------------
// Value

/// A dynamically typed value.
///
/// Enum and flag values carry their raw integer; the symbolic names live on
/// the [`TypeDesc`] of the attribute or parameter they belong to.
///
/// # Examples
///
/// ```
/// use pl_reflect::value::{Reflected, Value, ValueKind};
///
/// let v = 4_i32.to_value();
/// assert_eq!(v, Value::Int(4));
/// assert_eq!(v.kind(), ValueKind::Int);
///
/// // Integers widen to floats.
/// assert_eq!(f32::from_value(&v), Some(4.0));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    #[default]
    Void,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
    Enum(i64),
    Flags(u64),
    /// A shared object reference. Never serialized.
    #[cfg_attr(feature = "serde", serde(skip))]
    Object(ObjectHandle),
    List(Vec<Value>),
}

impl Value {
    /// Returns the kind of this value.
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Void => ValueKind::Void,
            Self::Bool(_) => ValueKind::Bool,
            Self::Int(_) => ValueKind::Int,
            Self::UInt(_) => ValueKind::UInt,
            Self::Float(_) => ValueKind::Float,
            Self::Str(_) => ValueKind::String,
            Self::Enum(_) => ValueKind::Enum,
            Self::Flags(_) => ValueKind::Flags,
            Self::Object(_) => ValueKind::Object,
            Self::List(_) => ValueKind::List,
        }
    }

    #[inline]
    pub const fn is_void(&self) -> bool {
        matches!(self, Self::Void)
    }

    #[inline]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    pub const fn as_object(&self) -> Option<&ObjectHandle> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    #[inline]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(l) => Some(l),
            _ => None,
        }
    }

    /// Converts into a native type, see [`Reflected::from_value`].
    #[inline]
    pub fn get<T: Reflected>(&self) -> Option<T> {
        T::from_value(self)
    }
}

impl<T: Reflected> From<T> for Value {
    #[inline]
    fn from(value: T) -> Self {
        value.to_value()
    }
}

impl From<&str> for Value {
    #[inline]
    fn from(value: &str) -> Self {
        Self::Str(value.into())
    }
}

/// Formats without type information: enums and flags print as integers.
///
/// Use [`TypeDesc::format`] for the symbolic form.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Void | Self::Object(_) => Ok(()),
            Self::Bool(b) => f.write_str(if *b { "true" } else { "false" }),
            Self::Int(i) | Self::Enum(i) => fmt::Display::fmt(i, f),
            Self::UInt(u) | Self::Flags(u) => fmt::Display::fmt(u, f),
            Self::Float(x) => fmt::Display::fmt(x, f),
            Self::Str(s) => f.write_str(s),
            Self::List(items) => {
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        f.write_str(",")?;
                    }
                    if let Self::List(_) = item {
                        write!(f, "[{item}]")?;
                    } else {
                        fmt::Display::fmt(item, f)?;
                    }
                }
                Ok(())
            }
        }
    }
}
