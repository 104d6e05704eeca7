use alloc::vec::Vec;

use super::ParamInfo;
use crate::func::{CallError, EventParams};
use crate::value::Value;

// -----------------------------------------------------------------------------
// EventInfo

/// Describes a signal an instance can emit.
///
/// The connections themselves live on each instance, see
/// [`ObjectExt::signal`](crate::object::ObjectExt::signal).
///
/// # Examples
///
/// ```
/// use pl_reflect::info::EventInfo;
/// use pl_reflect::value::Value;
///
/// let info = EventInfo::new::<(f32,)>("OnSpeedChanged").with_param_names(&["speed"]);
/// assert_eq!(info.params()[0].name(), "speed");
/// assert!(info.check_args(&[Value::Float(1.0)]).is_ok());
/// assert!(info.check_args(&[]).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct EventInfo {
    name: &'static str,
    params: Vec<ParamInfo>,
    description: &'static str,
}

impl EventInfo {
    pub fn new<P: EventParams>(name: &'static str) -> Self {
        Self {
            name,
            params: ParamInfo::list(P::param_types()),
            description: "",
        }
    }

    /// Renames parameters in order, the rest keep `ParamN`.
    pub fn with_param_names(mut self, names: &[&'static str]) -> Self {
        self.params = ParamInfo::named(self.params.iter().map(ParamInfo::type_desc), names);
        self
    }

    #[inline]
    pub fn with_description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn params(&self) -> &[ParamInfo] {
        &self.params
    }

    #[inline]
    pub fn description(&self) -> &'static str {
        self.description
    }

    /// Checks an argument list against the declared parameters.
    ///
    /// Only kinds are checked, numeric values are accepted for any
    /// numeric parameter.
    pub fn check_args(&self, args: &[Value]) -> Result<(), CallError> {
        if args.len() != self.params.len() {
            return Err(CallError::ArgCount {
                expected: self.params.len(),
                found: args.len(),
            });
        }
        for (index, (param, arg)) in self.params.iter().zip(args).enumerate() {
            let ty = param.type_desc();
            if !ty.accepts(arg.kind()) {
                return Err(CallError::ArgType {
                    index,
                    expected: ty.name(),
                    found: arg.kind(),
                });
            }
        }
        Ok(())
    }
}
