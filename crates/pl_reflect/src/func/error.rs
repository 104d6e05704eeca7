use alloc::string::String;

use thiserror::Error;

use crate::value::{ParseError, ValueKind};

// -----------------------------------------------------------------------------
// CallError

/// An error returned by dynamic method, constructor and event calls.
///
/// A failed call has no side effects: every argument is converted before
/// the native function runs.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum CallError {
    #[error("no member named `{0}`")]
    UnknownMember(String),
    #[error("expected {expected} argument(s), found {found}")]
    ArgCount { expected: usize, found: usize },
    #[error("argument {index} expects {expected}, found {found}")]
    ArgType {
        index: usize,
        expected: &'static str,
        found: ValueKind,
    },
    #[error("no parameter named `{0}`")]
    UnknownParameter(String),
    #[error("missing argument `{name}` (position {index})")]
    MissingArgument { index: usize, name: String },
    #[error("argument `{name}`: {source}")]
    Parse {
        name: String,
        #[source]
        source: ParseError,
    },
    #[error("object is not bound to a class")]
    Unbound,
    #[error("target is not an instance of `{0}`")]
    TargetMismatch(&'static str),
}
