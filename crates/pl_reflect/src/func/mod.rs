//! Dynamic invocation of native functions.
//!
//! ## Menu
//!
//! - [`MethodFn`]: a function `Fn(&mut T, P0, P1, ..) -> R` callable with a
//!   [`Value`] argument list. Also used for event handlers.
//! - [`ConstructorFn`]: a function `Fn(P0, P1, ..) -> T` producing a new
//!   instance.
//! - [`EventParams`]: the parameter tuple of an event.
//! - [`CallError`]: why a dynamic call was rejected.
//! - [`args_from_str`]: converts a `Param0="1" Param1='x'` string into an
//!   argument list.
//!
//! Implemented for up to 8 parameters. Arguments are converted before the
//! function runs; a conversion failure rejects the whole call.

// -----------------------------------------------------------------------------
// Modules

mod error;

// -----------------------------------------------------------------------------
// Exports

pub use error::CallError;

use alloc::boxed::Box;
use alloc::format;
use alloc::string::ToString;
use alloc::vec;
use alloc::vec::Vec;
use core::any::{Any, type_name};

use crate::info::ParamInfo;
use crate::object::Object;
use crate::value::{ParamsParser, Reflected, TypeDesc, Value};

// -----------------------------------------------------------------------------
// Traits

/// A native method callable with generic arguments.
///
/// `Marker` is `fn(P0, P1, ..) -> R` and only disambiguates arities.
///
/// # Examples
///
/// ```
/// use pl_reflect::func::{CallError, MethodFn};
/// use pl_reflect::value::Value;
///
/// struct Counter(i64);
///
/// fn add(c: &mut Counter, n: i64) -> i64 {
///     c.0 += n;
///     c.0
/// }
///
/// fn call<M>(f: impl MethodFn<Counter, M>, c: &mut Counter, args: &[Value]) -> Result<Value, CallError> {
///     f.call(c, args)
/// }
///
/// let mut c = Counter(1);
/// assert_eq!(call(add, &mut c, &[Value::Int(2)]), Ok(Value::Int(3)));
/// assert!(call(add, &mut c, &[Value::Bool(true)]).is_err());
/// assert_eq!(c.0, 3);
/// ```
pub trait MethodFn<T, Marker>: Send + Sync + 'static {
    /// Parameter types, in order.
    fn param_types() -> Vec<TypeDesc>;

    fn return_type() -> TypeDesc;

    /// Converts every argument, then calls the function.
    fn call(&self, this: &mut T, args: &[Value]) -> Result<Value, CallError>;
}

/// A native constructor callable with generic arguments.
///
/// `Marker` is `fn(P0, P1, ..) -> T`.
pub trait ConstructorFn<T, Marker>: Send + Sync + 'static {
    /// Parameter types, in order.
    fn param_types() -> Vec<TypeDesc>;

    /// Converts every argument, then builds the instance.
    fn construct(&self, args: &[Value]) -> Result<T, CallError>;
}

/// The parameter tuple of an event, e.g. `(f32,)` or `()`.
pub trait EventParams: Send + Sync + 'static {
    fn param_types() -> Vec<TypeDesc>;

    /// Converts the tuple into an argument list.
    fn into_values(self) -> Vec<Value>;
}

// -----------------------------------------------------------------------------
// Impls

#[inline]
fn check_count(expected: usize, args: &[Value]) -> Result<(), CallError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(CallError::ArgCount {
            expected,
            found: args.len(),
        })
    }
}

#[inline]
fn arg<A: Reflected>(args: &[Value], index: usize) -> Result<A, CallError> {
    let value = args.get(index).ok_or(CallError::ArgCount {
        expected: index + 1,
        found: args.len(),
    })?;
    A::from_value(value).ok_or_else(|| CallError::ArgType {
        index,
        expected: A::type_desc().name(),
        found: value.kind(),
    })
}

macro_rules! impl_func {
    ([$($index:tt : $name:ident,)*]) => {
        impl<T, R, F, $($name,)*> MethodFn<T, fn($($name,)*) -> R> for F
        where
            T: 'static,
            R: Reflected,
            F: Fn(&mut T, $($name,)*) -> R + Send + Sync + 'static,
            $($name: Reflected,)*
        {
            fn param_types() -> Vec<TypeDesc> {
                vec![$(<$name>::type_desc(),)*]
            }

            fn return_type() -> TypeDesc {
                R::type_desc()
            }

            #[allow(non_snake_case, reason = "macro implementation.")]
            fn call(&self, this: &mut T, args: &[Value]) -> Result<Value, CallError> {
                const COUNT: usize = {
                    let names: &[&str] = &[$(stringify!($name),)*];
                    names.len()
                };
                check_count(COUNT, args)?;
                $( let $name = arg::<$name>(args, $index)?; )*
                Ok((self)(this, $($name,)*).to_value())
            }
        }

        impl<T, F, $($name,)*> ConstructorFn<T, fn($($name,)*) -> T> for F
        where
            T: 'static,
            F: Fn($($name,)*) -> T + Send + Sync + 'static,
            $($name: Reflected,)*
        {
            fn param_types() -> Vec<TypeDesc> {
                vec![$(<$name>::type_desc(),)*]
            }

            #[allow(non_snake_case, reason = "macro implementation.")]
            fn construct(&self, args: &[Value]) -> Result<T, CallError> {
                const COUNT: usize = {
                    let names: &[&str] = &[$(stringify!($name),)*];
                    names.len()
                };
                check_count(COUNT, args)?;
                $( let $name = arg::<$name>(args, $index)?; )*
                Ok((self)($($name,)*))
            }
        }

        impl<$($name: Reflected,)*> EventParams for ($($name,)*) {
            fn param_types() -> Vec<TypeDesc> {
                vec![$(<$name>::type_desc(),)*]
            }

            #[allow(non_snake_case, reason = "macro implementation.")]
            fn into_values(self) -> Vec<Value> {
                let ($($name,)*) = self;
                vec![$($name.to_value(),)*]
            }
        }
    };
}

pl_utils::range_invoke!(impl_func, [0: P0, 1: P1, 2: P2, 3: P3, 4: P4, 5: P5, 6: P6, 7: P7]);

// -----------------------------------------------------------------------------
// Thunks

/// A type-erased method or event handler.
pub(crate) type MethodThunk =
    Box<dyn Fn(&mut dyn Any, &[Value]) -> Result<Value, CallError> + Send + Sync>;

/// A type-erased constructor.
pub(crate) type ConstructorThunk =
    Box<dyn Fn(&[Value]) -> Result<Box<dyn Object>, CallError> + Send + Sync>;

pub(crate) fn method_thunk<T: Any, M: 'static>(f: impl MethodFn<T, M>) -> MethodThunk {
    Box::new(move |target: &mut dyn Any, args: &[Value]| {
        let this = target
            .downcast_mut::<T>()
            .ok_or(CallError::TargetMismatch(type_name::<T>()))?;
        f.call(this, args)
    })
}

pub(crate) fn constructor_thunk<T: Object, M: 'static>(f: impl ConstructorFn<T, M>) -> ConstructorThunk {
    Box::new(move |args: &[Value]| {
        f.construct(args)
            .map(|object| Box::new(object) as Box<dyn Object>)
    })
}

// -----------------------------------------------------------------------------
// args_from_str

/// Builds an argument list from a params string.
///
/// Each pair is matched to a parameter by its declared name, or by its
/// position written as `Param0`, `Param1`, ... Every parameter must be
/// given; a repeated name keeps the last value.
///
/// # Examples
///
/// ```
/// use pl_reflect::func::{EventParams, args_from_str};
/// use pl_reflect::info::ParamInfo;
/// use pl_reflect::value::Value;
///
/// let params = ParamInfo::list(<(i32, f32)>::param_types());
/// let args = args_from_str(&params, "Param1='0.753' Param0=200").unwrap();
/// assert_eq!(args, [Value::Int(200), Value::Float(0.753)]);
/// ```
pub fn args_from_str(params: &[ParamInfo], input: &str) -> Result<Vec<Value>, CallError> {
    let mut args = vec![Value::Void; params.len()];
    let mut given = vec![false; params.len()];

    for pair in ParamsParser::new(input) {
        let (name, text) = pair.map_err(|source| CallError::Parse {
            name: input.into(),
            source,
        })?;
        let index = params
            .iter()
            .position(|p| p.name() == name)
            .or_else(|| {
                name.strip_prefix("Param")
                    .and_then(|n| n.parse::<usize>().ok())
                    .filter(|&n| n < params.len())
            })
            .ok_or_else(|| CallError::UnknownParameter(name.into()))?;

        args[index] = params[index]
            .type_desc()
            .parse(&text)
            .map_err(|source| CallError::Parse {
                name: name.into(),
                source,
            })?;
        given[index] = true;
    }

    match given.iter().position(|g| !g) {
        Some(index) => Err(CallError::MissingArgument {
            index,
            name: params[index].name().to_string(),
        }),
        None => Ok(args),
    }
}

/// Default name of the parameter at `index`.
#[inline]
pub(crate) fn default_param_name(index: usize) -> alloc::string::String {
    format!("Param{index}")
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::{CallError, ConstructorFn, EventParams, MethodFn, args_from_str};
    use crate::info::ParamInfo;
    use crate::value::{Value, ValueKind};
    use alloc::string::String;
    use alloc::vec::Vec;

    struct Lamp {
        on: bool,
        label: String,
    }

    fn call<M>(f: impl MethodFn<Lamp, M>, lamp: &mut Lamp, args: &[Value]) -> Result<Value, CallError> {
        f.call(lamp, args)
    }

    #[test]
    fn conversion_failure_has_no_side_effects() {
        let mut lamp = Lamp {
            on: false,
            label: String::new(),
        };
        let set = |l: &mut Lamp, on: bool, label: String| {
            l.on = on;
            l.label = label;
        };

        let result = call(set, &mut lamp, &[Value::Bool(true), Value::Int(3)]);
        assert_eq!(
            result,
            Err(CallError::ArgType {
                index: 1,
                expected: "string",
                found: ValueKind::Int,
            })
        );
        assert!(!lamp.on);

        let result = call(set, &mut lamp, &[Value::Bool(true)]);
        assert_eq!(result, Err(CallError::ArgCount { expected: 2, found: 1 }));

        let result = call(set, &mut lamp, &[Value::Bool(true), Value::from("hall")]);
        assert_eq!(result, Ok(Value::Void));
        assert!(lamp.on);
        assert_eq!(lamp.label, "hall");
    }

    #[test]
    fn zero_arity() {
        let mut lamp = Lamp {
            on: true,
            label: String::new(),
        };
        let toggle = |l: &mut Lamp| {
            l.on = !l.on;
            l.on
        };
        assert_eq!(call(toggle, &mut lamp, &[]), Ok(Value::Bool(false)));
        assert!(call(toggle, &mut lamp, &[Value::Void]).is_err());
    }

    #[test]
    fn constructors_convert_arguments() {
        fn build<M>(f: impl ConstructorFn<(i32, f32), M>, args: &[Value]) -> Result<(i32, f32), CallError> {
            f.construct(args)
        }
        let make = |a: i32, b: f32| (a, b);
        assert_eq!(build(make, &[Value::Int(1), Value::Int(2)]), Ok((1, 2.0)));
        assert!(build(make, &[Value::Float(1.5), Value::Int(2)]).is_err());
    }

    #[test]
    fn event_params_describe_tuples() {
        let types = <(bool, u8)>::param_types();
        let names: Vec<_> = types.iter().map(|t| t.name()).collect();
        assert_eq!(names, ["bool", "uint8"]);
        assert!(<()>::param_types().is_empty());
        assert_eq!((true, 3_u8).into_values(), [Value::Bool(true), Value::UInt(3)]);
    }

    #[test]
    fn params_by_name_or_position() {
        let params = ParamInfo::named(<(i32, String)>::param_types(), &["count", "label"]);
        let args = args_from_str(&params, "label='a b' Param0=7").unwrap();
        assert_eq!(args, [Value::Int(7), Value::from("a b")]);

        assert!(matches!(
            args_from_str(&params, "count=1"),
            Err(CallError::MissingArgument { index: 1, .. })
        ));
        assert!(matches!(
            args_from_str(&params, "count=1 label=x Param2=3"),
            Err(CallError::UnknownParameter(_))
        ));
        assert!(matches!(
            args_from_str(&params, "count=x label=y"),
            Err(CallError::Parse { .. })
        ));
    }
}
