use alloc::string::String;

use thiserror::Error;

use super::ModuleId;

// -----------------------------------------------------------------------------
// RegisterError

/// An error returned when a class or module can't be registered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum RegisterError {
    /// A class with this name is already registered and the registry
    /// rejects duplicates.
    #[error("class `{name}` is already registered by module {existing}")]
    Duplicate {
        name: String,
        existing: ModuleId,
    },
    #[error("module {0} is not loaded")]
    UnknownModule(ModuleId),
    /// The same class name appears twice in one module.
    #[error("class `{0}` is declared twice in the module")]
    DuplicateInModule(String),
}
