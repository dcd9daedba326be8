//! Virtual file system for the guest's device namespace.
//!
//! Guest paths carry a device prefix (`ms0:/PSP/SAVEDATA`).  The
//! [`MetaFileSystem`] mount table maps each prefix onto a [`FileSystem`]
//! backend and forwards operations to it.  [`DirectoryFileSystem`] is the
//! backend used for the memory stick and flash devices: a plain host
//! directory.
//!
//! Intermediate directories are never created implicitly.

pub mod directory;
pub mod error;
pub mod file_info;
pub mod filesystem;
pub mod meta;

pub use directory::DirectoryFileSystem;
pub use error::FsError;
pub use file_info::{FileAccess, FileInfo, FileMove, FileType};
pub use filesystem::FileSystem;
pub use meta::{shared, MetaFileSystem, SharedFileSystem};
