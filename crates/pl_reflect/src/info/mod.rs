//! Member descriptors of a reflected class.
//!
//! ## Menu
//!
//! - [`AttributeInfo`]: a named property, stored in a field ([`Storage::Direct`])
//!   or behind a getter/setter pair ([`Storage::Accessor`]).
//!     - [`Access`]: read-write or read-only.
//! - [`MethodInfo`]: a named method with typed parameters and return type.
//! - [`ConstructorInfo`]: a named constructor producing a new instance.
//! - [`EventInfo`]: a named signal an instance can emit.
//! - [`SlotInfo`]: a named event handler, connectable to signals of other objects.
//! - [`ParamInfo`]: one parameter of a method, constructor, event or slot.
//! - [`Annotations`]: ordered extra metadata such as `min` / `max`.
//!
//! Descriptors are immutable once their class is built, and shared between
//! a class and every class deriving from it.

// -----------------------------------------------------------------------------
// Modules

mod annotations;
mod attribute_info;
mod event_info;
mod method_info;

// -----------------------------------------------------------------------------
// Exports

pub use annotations::Annotations;
pub use attribute_info::{Access, AttributeInfo, Storage};
pub use event_info::EventInfo;
pub use method_info::{ConstructorInfo, MethodInfo, ParamInfo, SlotInfo};

pub(crate) use annotations::impl_annotations_fn;
