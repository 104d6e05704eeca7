use alloc::string::String;
use alloc::vec::Vec;
use core::mem::size_of;

use super::{TypeDesc, Value, ValueKind};
use crate::object::ObjectHandle;

// -----------------------------------------------------------------------------
// Reflected

/// A native type with a generic [`Value`] representation.
///
/// Implemented for the primitive types, `String`, `Vec<T>`, [`ObjectHandle`]
/// and `()`. Enums and `bitflags` types implement it through
/// [`impl_reflect_enum`](crate::impl_reflect_enum) and
/// [`impl_reflect_flags`](crate::impl_reflect_flags).
///
/// `from_value` coerces between numeric kinds when no information is lost:
///
/// - integers widen to floats;
/// - floats narrow to integers only when integral and in range;
/// - signed and unsigned integers convert only when in range.
///
/// # Examples
///
/// ```
/// use pl_reflect::value::{Reflected, Value};
///
/// assert_eq!(u8::from_value(&Value::Int(200)), Some(200));
/// assert_eq!(u8::from_value(&Value::Int(300)), None);
/// assert_eq!(i32::from_value(&Value::Float(3.0)), Some(3));
/// assert_eq!(i32::from_value(&Value::Float(3.5)), None);
/// assert_eq!(bool::from_value(&Value::Int(1)), None);
/// ```
pub trait Reflected: Sized + Send + Sync + 'static {
    /// Describes the type.
    fn type_desc() -> TypeDesc;

    /// Converts into the generic representation.
    fn to_value(&self) -> Value;

    /// Converts from the generic representation, `None` if the value has
    /// an incompatible kind or is out of range.
    fn from_value(value: &Value) -> Option<Self>;
}

// -----------------------------------------------------------------------------
// Numeric helpers

const I64_RANGE: core::ops::Range<f64> = -9_223_372_036_854_775_808.0..9_223_372_036_854_775_808.0;
const U64_RANGE: core::ops::Range<f64> = 0.0..18_446_744_073_709_551_616.0;

fn integral_i64(x: f64) -> Option<i64> {
    if I64_RANGE.contains(&x) && (x as i64) as f64 == x {
        Some(x as i64)
    } else {
        None
    }
}

fn integral_u64(x: f64) -> Option<u64> {
    if U64_RANGE.contains(&x) && (x as u64) as f64 == x {
        Some(x as u64)
    } else {
        None
    }
}

// -----------------------------------------------------------------------------
// Impls

impl Reflected for () {
    #[inline]
    fn type_desc() -> TypeDesc {
        TypeDesc::VOID
    }

    #[inline]
    fn to_value(&self) -> Value {
        Value::Void
    }

    #[inline]
    fn from_value(value: &Value) -> Option<Self> {
        value.is_void().then_some(())
    }
}

impl Reflected for bool {
    #[inline]
    fn type_desc() -> TypeDesc {
        TypeDesc::new("bool", ValueKind::Bool, 1)
    }

    #[inline]
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    #[inline]
    fn from_value(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

macro_rules! impl_signed {
    ($($ty:ty => $name:literal),* $(,)?) => {$(
        impl Reflected for $ty {
            #[inline]
            fn type_desc() -> TypeDesc {
                TypeDesc::new($name, ValueKind::Int, size_of::<$ty>())
            }

            #[inline]
            fn to_value(&self) -> Value {
                Value::Int(*self as i64)
            }

            fn from_value(value: &Value) -> Option<Self> {
                match value {
                    Value::Int(i) | Value::Enum(i) => <$ty>::try_from(*i).ok(),
                    Value::UInt(u) | Value::Flags(u) => <$ty>::try_from(*u).ok(),
                    Value::Float(x) => integral_i64(*x).and_then(|i| <$ty>::try_from(i).ok()),
                    _ => None,
                }
            }
        }
    )*};
}

macro_rules! impl_unsigned {
    ($($ty:ty => $name:literal),* $(,)?) => {$(
        impl Reflected for $ty {
            #[inline]
            fn type_desc() -> TypeDesc {
                TypeDesc::new($name, ValueKind::UInt, size_of::<$ty>())
            }

            #[inline]
            fn to_value(&self) -> Value {
                Value::UInt(*self as u64)
            }

            fn from_value(value: &Value) -> Option<Self> {
                match value {
                    Value::UInt(u) | Value::Flags(u) => <$ty>::try_from(*u).ok(),
                    Value::Int(i) | Value::Enum(i) => <$ty>::try_from(*i).ok(),
                    Value::Float(x) => integral_u64(*x).and_then(|u| <$ty>::try_from(u).ok()),
                    _ => None,
                }
            }
        }
    )*};
}

impl_signed! {
    i8 => "int8",
    i16 => "int16",
    i32 => "int",
    i64 => "int64",
    isize => "isize",
}

impl_unsigned! {
    u8 => "uint8",
    u16 => "uint16",
    u32 => "uint32",
    u64 => "uint64",
    usize => "usize",
}

impl Reflected for f32 {
    #[inline]
    fn type_desc() -> TypeDesc {
        TypeDesc::new("float", ValueKind::Float, 4)
    }

    #[inline]
    fn to_value(&self) -> Value {
        Value::Float(*self as f64)
    }

    #[inline]
    fn from_value(value: &Value) -> Option<Self> {
        f64::from_value(value).map(|x| x as f32)
    }
}

impl Reflected for f64 {
    #[inline]
    fn type_desc() -> TypeDesc {
        TypeDesc::new("double", ValueKind::Float, 8)
    }

    #[inline]
    fn to_value(&self) -> Value {
        Value::Float(*self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(x) => Some(*x),
            Value::Int(i) => Some(*i as f64),
            Value::UInt(u) => Some(*u as f64),
            _ => None,
        }
    }
}

impl Reflected for String {
    #[inline]
    fn type_desc() -> TypeDesc {
        TypeDesc::new("string", ValueKind::String, size_of::<String>())
    }

    #[inline]
    fn to_value(&self) -> Value {
        Value::Str(self.clone())
    }

    #[inline]
    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(String::from)
    }
}

impl<T: Reflected> Reflected for Vec<T> {
    #[inline]
    fn type_desc() -> TypeDesc {
        TypeDesc::new("list", ValueKind::List, size_of::<Vec<T>>()).with_element(T::type_desc)
    }

    #[inline]
    fn to_value(&self) -> Value {
        Value::List(self.iter().map(T::to_value).collect())
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_list()?.iter().map(T::from_value).collect()
    }
}

impl Reflected for ObjectHandle {
    #[inline]
    fn type_desc() -> TypeDesc {
        TypeDesc::new("Object*", ValueKind::Object, size_of::<ObjectHandle>())
    }

    #[inline]
    fn to_value(&self) -> Value {
        Value::Object(self.clone())
    }

    #[inline]
    fn from_value(value: &Value) -> Option<Self> {
        value.as_object().cloned()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::Reflected;
    use crate::value::{Value, ValueKind};
    use alloc::string::String;
    use alloc::vec;
    use alloc::vec::Vec;

    #[test]
    fn float_narrowing() {
        assert_eq!(i64::from_value(&Value::Float(-2.0)), Some(-2));
        assert_eq!(u32::from_value(&Value::Float(-2.0)), None);
        assert_eq!(i64::from_value(&Value::Float(f64::NAN)), None);
        assert_eq!(i64::from_value(&Value::Float(1e30)), None);
        assert_eq!(u64::from_value(&Value::Float(1e30)), None);
    }

    #[test]
    fn signed_unsigned_range() {
        assert_eq!(u16::from_value(&Value::Int(-1)), None);
        assert_eq!(i8::from_value(&Value::UInt(127)), Some(127));
        assert_eq!(i8::from_value(&Value::UInt(128)), None);
        assert_eq!(i64::from_value(&Value::UInt(u64::MAX)), None);
    }

    #[test]
    fn strings_do_not_coerce() {
        assert_eq!(i32::from_value(&Value::Str("4".into())), None);
        assert_eq!(String::from_value(&Value::Int(4)), None);
    }

    #[test]
    fn lists_convert_every_element() {
        let v = vec![1_i32, 2, 3].to_value();
        assert_eq!(Vec::<f64>::from_value(&v), Some(vec![1.0, 2.0, 3.0]));

        let mixed = Value::List(vec![Value::Int(1), Value::Str("x".into())]);
        assert_eq!(Vec::<i32>::from_value(&mixed), None);

        let desc = Vec::<u8>::type_desc();
        assert_eq!(desc.kind(), ValueKind::List);
        assert_eq!(desc.element().map(|e| e.name()), Some("uint8"));
    }
}
