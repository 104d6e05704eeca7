//! Items used by `#[derive(Object)]` and the `impl_reflect_*` macros.

pub use alloc::boxed::Box;
pub use core::any::Any;
pub use std::sync::OnceLock;

pub use bitflags;

#[cfg(feature = "auto_register")]
pub use inventory;
