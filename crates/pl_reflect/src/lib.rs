#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

// -----------------------------------------------------------------------------
// Extern Self

// Generated code refers to `::pl_reflect`, which must also resolve inside
// this crate and its doc tests.
extern crate self as pl_reflect;

// -----------------------------------------------------------------------------
// no_std support

// `std` is only used for `Mutex`, `RwLock` and `OnceLock`.
extern crate std;

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

pub mod class;
pub mod func;
pub mod info;
pub mod object;
pub mod registry;
pub mod signal;
pub mod value;

// -----------------------------------------------------------------------------
// Top-Level exports

#[doc(hidden)]
pub mod __macro_exports;

pub use pl_reflect_derive as derive;

/// Common imports for declaring and using reflected classes.
pub mod prelude {
    pub use crate::class::{Class, ClassBuilder};
    pub use crate::derive::Object;
    pub use crate::info::{Access, AttributeInfo, Storage};
    pub use crate::object::{DefaultValues, Object, ObjectBase, ObjectExt, ObjectHandle};
    pub use crate::registry::{ClassFilter, ClassRegistry, ModuleId, ModuleInfo};
    pub use crate::signal::{Connections, Signal, Slot, Subscription};
    pub use crate::value::{Reflected, TypeDesc, Value, ValueKind};
}
