use crate::error::FsError;
use crate::file_info::{FileAccess, FileInfo, FileMove};

/// A mountable backend.
///
/// Paths handed to a backend are device-relative (`/PSP/SAVEDATA`); the
/// device prefix has already been stripped by the mount table.  File handles
/// are local to the backend and never 0.
pub trait FileSystem: Send {
    fn open_file(&mut self, path: &str, access: FileAccess) -> Result<u32, FsError>;
    fn close_file(&mut self, handle: u32) -> Result<(), FsError>;

    /// Fill as much of `buf` as the file has left; returns the count read.
    fn read_file(&mut self, handle: u32, buf: &mut [u8]) -> Result<usize, FsError>;
    fn write_file(&mut self, handle: u32, data: &[u8]) -> Result<usize, FsError>;

    /// Move the file position and return the new absolute position.
    fn seek_file(&mut self, handle: u32, offset: i64, whence: FileMove) -> Result<u64, FsError>;
    fn get_seek_pos(&mut self, handle: u32) -> Result<u64, FsError>;

    /// Metadata for `path`.  A path that does not exist is not an error; it
    /// comes back with `exists == false`.
    fn get_file_info(&mut self, path: &str) -> FileInfo;
    fn get_dir_listing(&mut self, path: &str) -> Result<Vec<FileInfo>, FsError>;

    /// Create one directory; the parent must already exist.
    fn mkdir(&mut self, path: &str) -> Result<(), FsError>;
    /// Remove an empty directory.
    fn rmdir(&mut self, path: &str) -> Result<(), FsError>;
    fn delete_file(&mut self, path: &str) -> Result<(), FsError>;
    fn rename_file(&mut self, from: &str, to: &str) -> Result<(), FsError>;
}
