use alloc::string::String;

use thiserror::Error;

use crate::value::{ParseError, ValueKind};

// -----------------------------------------------------------------------------
// AttributeError

/// An error returned by typed attribute access.
///
/// The string API ([`ObjectExt::set_attribute`](super::ObjectExt::set_attribute))
/// logs these and leaves the attribute unchanged.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum AttributeError {
    #[error("no attribute named `{0}`")]
    Unknown(String),
    #[error("attribute `{0}` is read-only")]
    ReadOnly(&'static str),
    #[error("attribute `{attribute}` expects {expected}, found {found}")]
    TypeMismatch {
        attribute: &'static str,
        expected: &'static str,
        found: ValueKind,
    },
    #[error("attribute `{attribute}`: {source}")]
    Parse {
        attribute: &'static str,
        #[source]
        source: ParseError,
    },
    #[error("object is not bound to a class")]
    Unbound,
    #[error("object is not an instance of `{0}`")]
    TargetMismatch(&'static str),
}
