use alloc::vec::Vec;
use core::fmt;

use super::ValueKind;

// -----------------------------------------------------------------------------
// EnumInfo

/// A symbolic name declared for an enum or flag value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumEntry {
    pub name: &'static str,
    /// Discriminant for enums, bit pattern for flags.
    pub value: u64,
}

/// Symbolic names of an enum or flag type.
///
/// Built once by [`impl_reflect_enum`](crate::impl_reflect_enum) and
/// [`impl_reflect_flags`](crate::impl_reflect_flags).
#[derive(Debug, Clone)]
pub struct EnumInfo {
    type_name: &'static str,
    entries: Vec<EnumEntry>,
    is_flags: bool,
}

impl EnumInfo {
    /// Creates the names of a plain enum from `(name, discriminant)` pairs.
    pub fn new_enum(
        type_name: &'static str,
        entries: impl IntoIterator<Item = (&'static str, i64)>,
    ) -> Self {
        Self {
            type_name,
            entries: entries
                .into_iter()
                .map(|(name, value)| EnumEntry {
                    name,
                    value: value as u64,
                })
                .collect(),
            is_flags: false,
        }
    }

    /// Creates the names of a flag set from `(name, bits)` pairs.
    pub fn new_flags(
        type_name: &'static str,
        entries: impl IntoIterator<Item = (&'static str, u64)>,
    ) -> Self {
        Self {
            type_name,
            entries: entries
                .into_iter()
                .map(|(name, value)| EnumEntry { name, value })
                .collect(),
            is_flags: true,
        }
    }

    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    #[inline]
    pub fn is_flags(&self) -> bool {
        self.is_flags
    }

    /// Declared entries, in declaration order.
    #[inline]
    pub fn entries(&self) -> &[EnumEntry] {
        &self.entries
    }

    /// Returns the name declared for an enum discriminant.
    pub fn name_of(&self, value: i64) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|e| e.value as i64 == value)
            .map(|e| e.name)
    }

    /// Returns the enum discriminant or flag bits declared for `name`.
    ///
    /// Names are compared case-sensitively.
    pub fn value_of(&self, name: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.value)
    }
}

// -----------------------------------------------------------------------------
// TypeDesc

/// Describes a native type for dynamic access.
///
/// The name follows engine conventions (`bool`, `int`, `uint8`, `float`,
/// `double`, `string`, ...), it is what property inspectors display.
///
/// # Examples
///
/// ```
/// use pl_reflect::value::{Reflected, ValueKind};
///
/// let desc = f32::type_desc();
/// assert_eq!(desc.name(), "float");
/// assert_eq!(desc.kind(), ValueKind::Float);
/// assert_eq!(desc.size(), 4);
/// ```
#[derive(Clone, Copy)]
pub struct TypeDesc {
    name: &'static str,
    kind: ValueKind,
    size: usize,
    enum_info: Option<&'static EnumInfo>,
    element: Option<fn() -> TypeDesc>,
}

impl TypeDesc {
    /// The descriptor of `()`.
    pub const VOID: Self = Self::new("void", ValueKind::Void, 0);

    #[inline]
    pub const fn new(name: &'static str, kind: ValueKind, size: usize) -> Self {
        Self {
            name,
            kind,
            size,
            enum_info: None,
            element: None,
        }
    }

    /// Attaches symbolic names.
    #[inline]
    pub const fn with_enum_info(mut self, info: &'static EnumInfo) -> Self {
        self.enum_info = Some(info);
        self
    }

    /// Attaches the element descriptor of a list type.
    #[inline]
    pub const fn with_element(mut self, element: fn() -> TypeDesc) -> Self {
        self.element = Some(element);
        self
    }

    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub const fn kind(&self) -> ValueKind {
        self.kind
    }

    /// Size of the native type in bytes.
    #[inline]
    pub const fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub const fn enum_info(&self) -> Option<&'static EnumInfo> {
        self.enum_info
    }

    /// Element descriptor for list types.
    #[inline]
    pub fn element(&self) -> Option<TypeDesc> {
        self.element.map(|f| f())
    }

    /// Returns `true` if a value of kind `kind` may be passed where this
    /// type is expected.
    ///
    /// Numbers are accepted for any numeric type, exact range checks happen
    /// in [`Reflected::from_value`](super::Reflected::from_value).
    pub fn accepts(&self, kind: ValueKind) -> bool {
        match self.kind {
            ValueKind::Custom => true,
            ValueKind::Int | ValueKind::UInt | ValueKind::Float => kind.is_numeric(),
            ValueKind::Enum => matches!(kind, ValueKind::Enum | ValueKind::Int),
            ValueKind::Flags => matches!(kind, ValueKind::Flags | ValueKind::UInt),
            expected => expected == kind,
        }
    }
}

impl PartialEq for TypeDesc {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.kind == other.kind && self.size == other.size
    }
}

impl Eq for TypeDesc {}

impl fmt::Debug for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDesc")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for TypeDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
