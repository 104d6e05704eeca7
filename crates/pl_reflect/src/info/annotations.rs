use alloc::vec::Vec;

use crate::value::Value;

// -----------------------------------------------------------------------------
// Annotations

/// Extra metadata attached to a member, like `min` / `max` for a
/// property inspector.
///
/// Entries keep insertion order; inserting an existing name replaces its
/// value in place.
///
/// # Example
///
/// ```
/// use pl_reflect::info::{Annotations, AttributeInfo};
/// use pl_reflect::object::ObjectBase;
/// use pl_reflect::value::Value;
///
/// # struct Light { base: ObjectBase, range: f32 }
/// let info = AttributeInfo::field("Range", |l: &Light| &l.range, |l| &mut l.range)
///     .with_annotations(Annotations::new().with("min", 0.0).with("max", 1000.0));
///
/// assert_eq!(info.annotation("max"), Some(&Value::Float(1000.0)));
/// assert!(!info.has_annotation("step"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Annotations {
    entries: Vec<(&'static str, Value)>,
}

impl Annotations {
    /// An empty set, returned for members without annotations.
    pub(crate) const EMPTY: &'static Self = &Self::new();

    /// Creates an empty [`Annotations`].
    #[inline]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Adds an annotation, replacing an existing one with the same name.
    pub fn with(mut self, name: &'static str, value: impl Into<Value>) -> Self {
        self.insert(name, value.into());
        self
    }

    /// Inserts an annotation, returning the replaced value.
    pub fn insert(&mut self, name: &'static str, value: Value) -> Option<Value> {
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => Some(core::mem::replace(slot, value)),
            None => {
                self.entries.push((name, value));
                None
            }
        }
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterates in insertion order.
    #[inline]
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&'static str, &Value)> {
        self.entries.iter().map(|(n, v)| (*n, v))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// -----------------------------------------------------------------------------
// Auxiliary macro

/// Implement `annotations`, `annotation` and `has_annotation`.
macro_rules! impl_annotations_fn {
    ($field:ident) => {
        /// Returns the annotations of this member.
        #[inline]
        pub fn annotations(&self) -> &$crate::info::Annotations {
            match &self.$field {
                Some(boxed) => &**boxed,
                None => $crate::info::Annotations::EMPTY,
            }
        }

        /// Returns the annotation named `name`, if present.
        #[inline]
        pub fn annotation(&self, name: &str) -> Option<&$crate::value::Value> {
            self.annotations().get(name)
        }

        /// Returns `true` if the annotation named `name` is present.
        #[inline]
        pub fn has_annotation(&self, name: &str) -> bool {
            self.annotations().contains(name)
        }

        /// Replaces stored annotations (overwrite, do not merge).
        pub fn with_annotations(self, annotations: $crate::info::Annotations) -> Self {
            Self {
                $field: if annotations.is_empty() {
                    None
                } else {
                    Some(::alloc::boxed::Box::new(annotations))
                },
                ..self
            }
        }
    };
}

pub(crate) use impl_annotations_fn;
