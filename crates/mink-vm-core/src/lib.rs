//! # Mink VM Core
//!
//! Object model and VM call bridge for the Mink JavaScript engine
//! (ECMAScript 5.1 semantics).
//!
//! ## Design Principles
//!
//! - **Single-threaded**: one runtime per thread; the object graph uses
//!   `Rc` + interior mutability and is not internally synchronized
//! - **Closed kind set**: object behavior dispatches over a tagged
//!   [`object::ObjectKind`] rather than open-ended vtables
//! - **Insertion order**: property maps pair a hash map with an ordered
//!   key list, so enumeration follows insertion
//! - **Narrow VM seam**: script functions enter the bytecode machine
//!   through a save/restore bridge with explicit frame records

#![warn(clippy::all)]
#![warn(missing_docs)]

pub mod enumerate;
pub mod error;
pub mod function;
pub mod object;
pub mod property;
pub mod runtime;
pub mod value;
pub mod vm;

pub use enumerate::{PropIter, PropIterItem, RawPropIter};
pub use error::{VmError, VmResult};
pub use function::{FunctionCall, NativeFn};
pub use object::{JsObject, ObjectKind, ObjectRef};
pub use property::{Property, PropertyAttributes, PropertyDescriptor, Slot};
pub use runtime::{Global, Runtime, RuntimeConfig};
pub use value::{Export, ExportType, Value};
pub use vm::{Program, Stash, Vm};
