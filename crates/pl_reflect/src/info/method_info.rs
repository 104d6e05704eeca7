use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;

use super::{Annotations, impl_annotations_fn};
use crate::func::{
    CallError, ConstructorFn, ConstructorThunk, MethodFn, MethodThunk, args_from_str,
    constructor_thunk, default_param_name, method_thunk,
};
use crate::object::Object;
use crate::value::{TypeDesc, Value};

// -----------------------------------------------------------------------------
// ParamInfo

/// One parameter of a method, constructor, event or slot.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamInfo {
    name: Cow<'static, str>,
    ty: TypeDesc,
}

impl ParamInfo {
    #[inline]
    pub fn new(name: impl Into<Cow<'static, str>>, ty: TypeDesc) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }

    /// Parameters named `Param0`, `Param1`, ...
    pub fn list(types: impl IntoIterator<Item = TypeDesc>) -> Vec<Self> {
        types
            .into_iter()
            .enumerate()
            .map(|(index, ty)| Self::new(default_param_name(index), ty))
            .collect()
    }

    /// Parameters named by `names`, falling back to `ParamN` past its end.
    pub fn named(types: impl IntoIterator<Item = TypeDesc>, names: &[&'static str]) -> Vec<Self> {
        let mut params = Self::list(types);
        rename(&mut params, names);
        params
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn type_desc(&self) -> TypeDesc {
        self.ty
    }
}

// Renames in place, keeping types.
fn rename(params: &mut [ParamInfo], names: &[&'static str]) {
    for (param, name) in params.iter_mut().zip(names) {
        param.name = Cow::Borrowed(*name);
    }
}

// -----------------------------------------------------------------------------
// MethodInfo

/// Describes a method callable by name.
///
/// # Examples
///
/// ```
/// use pl_reflect::info::MethodInfo;
///
/// struct Door {
///     open: bool,
/// }
///
/// let info = MethodInfo::new("SetOpen", |d: &mut Door, open: bool| d.open = open)
///     .with_param_names(&["open"]);
///
/// assert_eq!(info.params()[0].name(), "open");
/// assert_eq!(info.params()[0].type_desc().name(), "bool");
/// assert_eq!(info.return_type().name(), "void");
/// assert_eq!(info.signature(), "void SetOpen(bool open)");
/// ```
pub struct MethodInfo {
    name: &'static str,
    params: Vec<ParamInfo>,
    ret: TypeDesc,
    description: &'static str,
    annotations: Option<Box<Annotations>>,
    thunk: MethodThunk,
}

impl MethodInfo {
    pub fn new<T: Any, M: 'static, F: MethodFn<T, M>>(name: &'static str, f: F) -> Self {
        Self {
            name,
            params: ParamInfo::list(F::param_types()),
            ret: F::return_type(),
            description: "",
            annotations: None,
            thunk: method_thunk(f),
        }
    }

    /// Renames parameters in order, the rest keep `ParamN`.
    pub fn with_param_names(mut self, names: &[&'static str]) -> Self {
        rename(&mut self.params, names);
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
    pub fn params(&self) -> &[ParamInfo] {
        &self.params
    }

    #[inline]
    pub fn return_type(&self) -> TypeDesc {
        self.ret
    }

    #[inline]
    pub fn description(&self) -> &'static str {
        self.description
    }

    /// Returns the declaration, like `float GetSpeed()`.
    pub fn signature(&self) -> alloc::string::String {
        signature(self.ret.name(), self.name, &self.params)
    }

    /// Calls the method on an instance of the declaring class.
    pub(crate) fn invoke(&self, target: &mut dyn Any, args: &[Value]) -> Result<Value, CallError> {
        (self.thunk)(target, args)
    }

    /// Like `invoke`, with arguments given as a params string.
    pub(crate) fn invoke_str(&self, target: &mut dyn Any, params: &str) -> Result<Value, CallError> {
        let args = args_from_str(&self.params, params)?;
        self.invoke(target, &args)
    }
}

impl fmt::Debug for MethodInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodInfo")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("return", &self.ret.name())
            .finish_non_exhaustive()
    }
}

fn signature(ret: &str, name: &str, params: &[ParamInfo]) -> alloc::string::String {
    use core::fmt::Write;

    let mut out = alloc::string::String::new();
    let _ = write!(out, "{ret} {name}(");
    for (index, param) in params.iter().enumerate() {
        if index > 0 {
            out.push_str(", ");
        }
        let _ = write!(out, "{} {}", param.ty.name(), param.name);
    }
    out.push(')');
    out
}

// -----------------------------------------------------------------------------
// ConstructorInfo

/// Describes a named constructor.
///
/// Constructors belong to exactly one class, derived classes don't
/// inherit them.
pub struct ConstructorInfo {
    name: &'static str,
    params: Vec<ParamInfo>,
    description: &'static str,
    thunk: ConstructorThunk,
}

impl ConstructorInfo {
    pub fn new<T: Object, M: 'static, F: ConstructorFn<T, M>>(name: &'static str, f: F) -> Self {
        Self {
            name,
            params: ParamInfo::list(F::param_types()),
            description: "",
            thunk: constructor_thunk(f),
        }
    }

    /// Renames parameters in order, the rest keep `ParamN`.
    pub fn with_param_names(mut self, names: &[&'static str]) -> Self {
        rename(&mut self.params, names);
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

    /// Builds an unbound instance.
    pub(crate) fn construct(&self, args: &[Value]) -> Result<Box<dyn Object>, CallError> {
        (self.thunk)(args)
    }

    pub(crate) fn construct_str(&self, params: &str) -> Result<Box<dyn Object>, CallError> {
        let args = args_from_str(&self.params, params)?;
        self.construct(&args)
    }
}

impl fmt::Debug for ConstructorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstructorInfo")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// SlotInfo

/// Describes an event handler.
///
/// A slot is a method without return value that an instance exposes for
/// connection to signals of other objects, see
/// [`ObjectHandle::slot`](crate::object::ObjectHandle::slot).
pub struct SlotInfo {
    name: &'static str,
    params: Vec<ParamInfo>,
    description: &'static str,
    thunk: MethodThunk,
}

impl SlotInfo {
    pub fn new<T: Any, M: 'static, F: MethodFn<T, M>>(name: &'static str, f: F) -> Self {
        Self {
            name,
            params: ParamInfo::list(F::param_types()),
            description: "",
            thunk: method_thunk(f),
        }
    }

    /// Renames parameters in order, the rest keep `ParamN`.
    pub fn with_param_names(mut self, names: &[&'static str]) -> Self {
        rename(&mut self.params, names);
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

    /// Runs the handler on an instance of the declaring class.
    pub(crate) fn invoke(&self, target: &mut dyn Any, args: &[Value]) -> Result<(), CallError> {
        (self.thunk)(target, args).map(|_| ())
    }
}

impl fmt::Debug for SlotInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotInfo")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}
