//! `impl_reflect_enum!` and `impl_reflect_flags!`.

/// Implements [`Reflected`](crate::value::Reflected) for a fieldless enum.
///
/// Every listed variant becomes a symbolic name, attribute strings use the
/// name rather than the discriminant. The enum must be `Copy`.
///
/// # Examples
///
/// ```
/// use pl_reflect::impl_reflect_enum;
/// use pl_reflect::value::{Reflected, Value};
///
/// #[derive(Clone, Copy, Debug, PartialEq)]
/// enum Filter {
///     Nearest,
///     Linear = 4,
/// }
///
/// impl_reflect_enum!(Filter { Nearest, Linear });
///
/// let desc = Filter::type_desc();
/// assert_eq!(desc.format(&Filter::Linear.to_value()), "Linear");
/// assert_eq!(desc.parse("Linear"), Ok(Value::Enum(4)));
/// assert_eq!(Filter::from_value(&Value::Enum(0)), Some(Filter::Nearest));
/// assert_eq!(Filter::from_value(&Value::Enum(1)), None);
/// ```
#[macro_export]
macro_rules! impl_reflect_enum {
    ($ty:ident { $($variant:ident),+ $(,)? }) => {
        impl $crate::value::Reflected for $ty {
            fn type_desc() -> $crate::value::TypeDesc {
                static INFO: $crate::__macro_exports::OnceLock<$crate::value::EnumInfo> =
                    $crate::__macro_exports::OnceLock::new();
                let info = INFO.get_or_init(|| {
                    $crate::value::EnumInfo::new_enum(
                        ::core::stringify!($ty),
                        [$((::core::stringify!($variant), $ty::$variant as i64)),+],
                    )
                });
                $crate::value::TypeDesc::new(
                    ::core::stringify!($ty),
                    $crate::value::ValueKind::Enum,
                    ::core::mem::size_of::<$ty>(),
                )
                .with_enum_info(info)
            }

            #[inline]
            fn to_value(&self) -> $crate::value::Value {
                $crate::value::Value::Enum(*self as i64)
            }

            fn from_value(value: &$crate::value::Value) -> ::core::option::Option<Self> {
                let raw = match value {
                    $crate::value::Value::Enum(i) | $crate::value::Value::Int(i) => *i,
                    $crate::value::Value::Str(name) => {
                        $(
                            if name == ::core::stringify!($variant) {
                                return ::core::option::Option::Some($ty::$variant);
                            }
                        )+
                        return ::core::option::Option::None;
                    }
                    _ => return ::core::option::Option::None,
                };
                $(
                    if raw == $ty::$variant as i64 {
                        return ::core::option::Option::Some($ty::$variant);
                    }
                )+
                ::core::option::Option::None
            }
        }
    };
}

/// Implements [`Reflected`](crate::value::Reflected) for a `bitflags` type.
///
/// The second argument is the type's bits type. Named flags come from
/// [`Flags::FLAGS`](bitflags::Flags::FLAGS); unknown bits are dropped when
/// converting back.
///
/// # Examples
///
/// ```
/// use pl_reflect::impl_reflect_flags;
/// use pl_reflect::value::{Reflected, Value};
///
/// bitflags::bitflags! {
///     #[derive(Clone, Copy, Debug, PartialEq)]
///     pub struct Clear: u32 {
///         const COLOR = 1;
///         const DEPTH = 2;
///         const STENCIL = 4;
///     }
/// }
///
/// impl_reflect_flags!(Clear, u32);
///
/// let desc = Clear::type_desc();
/// let both = (Clear::COLOR | Clear::DEPTH).to_value();
/// assert_eq!(desc.format(&both), "COLOR|DEPTH");
/// assert_eq!(desc.parse("DEPTH | STENCIL"), Ok(Value::Flags(6)));
/// assert_eq!(Clear::from_value(&Value::Flags(6)), Some(Clear::DEPTH | Clear::STENCIL));
/// ```
#[macro_export]
macro_rules! impl_reflect_flags {
    ($ty:ty, $bits:ty) => {
        impl $crate::value::Reflected for $ty {
            fn type_desc() -> $crate::value::TypeDesc {
                use $crate::__macro_exports::bitflags::Flags as _;

                static INFO: $crate::__macro_exports::OnceLock<$crate::value::EnumInfo> =
                    $crate::__macro_exports::OnceLock::new();
                let info = INFO.get_or_init(|| {
                    $crate::value::EnumInfo::new_flags(
                        ::core::stringify!($ty),
                        <$ty>::FLAGS
                            .iter()
                            .filter(|flag| flag.is_named())
                            .map(|flag| (flag.name(), flag.value().bits() as u64)),
                    )
                });
                $crate::value::TypeDesc::new(
                    ::core::stringify!($ty),
                    $crate::value::ValueKind::Flags,
                    ::core::mem::size_of::<$bits>(),
                )
                .with_enum_info(info)
            }

            #[inline]
            fn to_value(&self) -> $crate::value::Value {
                use $crate::__macro_exports::bitflags::Flags as _;
                $crate::value::Value::Flags(self.bits() as u64)
            }

            fn from_value(value: &$crate::value::Value) -> ::core::option::Option<Self> {
                use $crate::__macro_exports::bitflags::Flags as _;
                match value {
                    $crate::value::Value::Flags(bits) | $crate::value::Value::UInt(bits) => {
                        let bits = <$bits>::try_from(*bits).ok()?;
                        ::core::option::Option::Some(<$ty>::from_bits_truncate(bits))
                    }
                    _ => ::core::option::Option::None,
                }
            }
        }
    };
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use crate::value::{Reflected, Value, ValueKind};

    #[derive(Clone, Copy, Debug, PartialEq)]
    enum Mode {
        Off = -1,
        Low = 1,
        High = 2,
    }

    crate::impl_reflect_enum!(Mode { Off, Low, High });

    bitflags::bitflags! {
        #[derive(Clone, Copy, Debug, PartialEq)]
        struct Caps: u8 {
            const READ = 0b001;
            const WRITE = 0b010;
            const ALL = 0b011;
        }
    }

    crate::impl_reflect_flags!(Caps, u8);

    #[test]
    fn enum_names_survive_reordering() {
        let desc = Mode::type_desc();
        assert_eq!(desc.kind(), ValueKind::Enum);
        assert_eq!(desc.format(&Mode::Off.to_value()), "Off");
        assert_eq!(desc.parse("High"), Ok(Value::Enum(2)));
        // integers are still accepted
        assert_eq!(desc.parse("-1"), Ok(Value::Enum(-1)));
        assert!(desc.parse("Medium").is_err());
        assert_eq!(Mode::from_value(&Value::Str("Low".into())), Some(Mode::Low));
    }

    #[test]
    fn undeclared_discriminant_formats_as_number() {
        assert_eq!(Mode::type_desc().format(&Value::Enum(7)), "7");
    }

    #[test]
    fn flags_take_names_in_declaration_order() {
        let desc = Caps::type_desc();
        // READ and WRITE are declared first and consume every bit
        assert_eq!(desc.format(&Caps::ALL.to_value()), "READ|WRITE");
        assert_eq!(desc.format(&Value::Flags(0)), "");
        assert_eq!(desc.format(&Value::Flags(0b101)), "READ|4");
        assert_eq!(desc.parse(""), Ok(Value::Flags(0)));
        assert_eq!(desc.parse("ALL"), Ok(Value::Flags(3)));
        assert_eq!(Caps::from_value(&Value::Flags(0x1ff)), None);
        assert_eq!(Caps::from_value(&Value::Flags(0xff)), Some(Caps::ALL));
    }
}
