use alloc::string::String;
use alloc::vec::Vec;

// -----------------------------------------------------------------------------
// AttributeSnapshot

/// One attribute of a snapshot, value in string form.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttributeEntry {
    pub name: String,
    pub value: String,
}

/// The attributes of an object, in declaration order.
///
/// Produced by [`ObjectExt::to_snapshot`](super::ObjectExt::to_snapshot)
/// and applied with [`ObjectExt::apply_snapshot`](super::ObjectExt::apply_snapshot).
/// Values use the string codec, so enums and flags are stored by name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttributeSnapshot {
    class: String,
    attributes: Vec<AttributeEntry>,
}

impl AttributeSnapshot {
    #[inline]
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            attributes: Vec::new(),
        }
    }

    /// Name of the class the snapshot was taken from.
    #[inline]
    pub fn class(&self) -> &str {
        &self.class
    }

    /// Appends an entry, replacing an existing one with the same name.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|e| e.name == name) {
            Some(entry) => entry.value = value,
            None => self.attributes.push(AttributeEntry { name, value }),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.value.as_str())
    }

    #[inline]
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &AttributeEntry> {
        self.attributes.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}
