//! Conversion between guest-side arguments and host types.
//!
//! `guest_memory` is the collaborator interface to the memory emulator,
//! `flat_memory` a simple implementation of it, and the `*_conversion`
//! modules turn raw guest arguments (string pointers, fixed fields, paths)
//! into host values.
pub mod datatype_conversion;
pub mod flat_memory;
pub mod guest_memory;
pub mod path_conversion;

pub use datatype_conversion::*;
pub use flat_memory::*;
pub use guest_memory::*;
pub use path_conversion::*;
