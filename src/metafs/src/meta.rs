//! The mount table.
//!
//! `MetaFileSystem` maps device prefixes (`ms0:`, `flash0:`, ...) onto
//! backends and forwards every operation to the backend a path resolves to.
//! Several prefixes may share one backend; the backends are reference
//! counted and locked individually.  File handles issued here are global
//! across devices and translate to the owning backend's local handle.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use typemap::path_conversion::{join_relative, normpath, split_device};

use crate::error::FsError;
use crate::file_info::{FileAccess, FileInfo, FileMove};
use crate::filesystem::FileSystem;

/// A backend as stored in the mount table.
pub type SharedFileSystem = Arc<Mutex<dyn FileSystem>>;

/// Wrap a backend so it can be mounted (possibly under several prefixes).
pub fn shared<F: FileSystem + 'static>(fs: F) -> SharedFileSystem {
    Arc::new(Mutex::new(fs))
}

struct MountPoint {
    prefix: String,
    system: SharedFileSystem,
}

struct OpenHandle {
    system: SharedFileSystem,
    backend_handle: u32,
}

/// Two mount entries refer to the same backend instance.
fn same_backend(a: &SharedFileSystem, b: &SharedFileSystem) -> bool {
    Arc::as_ptr(a).cast::<()>() == Arc::as_ptr(b).cast::<()>()
}

pub struct MetaFileSystem {
    mounts: Vec<MountPoint>,
    handles: HashMap<u32, OpenHandle>,
    next_handle: u32,
    /// Device-qualified current directory, empty until `chdir`.
    current_dir: String,
}

impl Default for MetaFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl MetaFileSystem {
    pub fn new() -> Self {
        MetaFileSystem {
            mounts: Vec::new(),
            handles: HashMap::new(),
            next_handle: 1,
            current_dir: String::new(),
        }
    }

    /// Register `system` under `prefix`.  Mounting a prefix again replaces
    /// the earlier backend.
    pub fn mount(&mut self, prefix: &str, system: SharedFileSystem) {
        log::info!("mounting {}", prefix);
        match self.mounts.iter_mut().find(|m| m.prefix == prefix) {
            Some(existing) => existing.system = system,
            None => self.mounts.push(MountPoint {
                prefix: prefix.to_string(),
                system,
            }),
        }
    }

    /// Remove the mapping for `prefix`.  Files already open through it stay
    /// usable until closed.
    pub fn unmount(&mut self, prefix: &str) -> bool {
        let before = self.mounts.len();
        self.mounts.retain(|m| m.prefix != prefix);
        before != self.mounts.len()
    }

    /// Mounted prefixes in mount order.
    pub fn mounts(&self) -> impl Iterator<Item = &str> {
        self.mounts.iter().map(|m| m.prefix.as_str())
    }

    fn lookup(&self, device: &str) -> Result<SharedFileSystem, FsError> {
        self.mounts
            .iter()
            .find(|m| m.prefix == device)
            .map(|m| Arc::clone(&m.system))
            .ok_or_else(|| FsError::NoSuchDevice(device.to_string()))
    }

    /// Turn `path` into `(device, normalized device-relative path)`.  A path
    /// with no device is taken relative to the current directory.
    fn qualify(&self, path: &str) -> Result<(String, String), FsError> {
        if let Some((device, rest)) = split_device(path) {
            return Ok((device.to_string(), normpath(rest)));
        }
        match split_device(&self.current_dir) {
            Some((device, dir)) => Ok((device.to_string(), join_relative(dir, path))),
            None => Err(FsError::NoSuchDevice(path.to_string())),
        }
    }

    /// Find the backend for `path` and the path inside it.
    pub fn resolve(&self, path: &str) -> Result<(SharedFileSystem, String), FsError> {
        let (device, rest) = self.qualify(path)?;
        Ok((self.lookup(&device)?, rest))
    }

    /// Set the directory relative paths resolve against.  The device must be
    /// mounted.
    pub fn chdir(&mut self, dir: &str) -> Result<(), FsError> {
        let (device, rest) = self.qualify(dir)?;
        self.lookup(&device)?;
        self.current_dir = format!("{device}{rest}");
        log::debug!("current directory is now {}", self.current_dir);
        Ok(())
    }

    pub fn current_dir(&self) -> &str {
        &self.current_dir
    }

    fn alloc_handle(&mut self) -> u32 {
        loop {
            let h = self.next_handle;
            self.next_handle = self.next_handle.wrapping_add(1).max(1);
            if !self.handles.contains_key(&h) {
                return h;
            }
        }
    }

    fn open_handle(&self, handle: u32) -> Result<&OpenHandle, FsError> {
        self.handles.get(&handle).ok_or(FsError::InvalidHandle(handle))
    }

    /// Open a file; the returned handle is never 0.
    pub fn open_file(&mut self, path: &str, access: FileAccess) -> Result<u32, FsError> {
        let (system, rest) = self.resolve(path)?;
        let backend_handle = system.lock().open_file(&rest, access)?;
        let handle = self.alloc_handle();
        self.handles.insert(handle, OpenHandle { system, backend_handle });
        Ok(handle)
    }

    pub fn close_file(&mut self, handle: u32) -> Result<(), FsError> {
        let open = self.handles.remove(&handle).ok_or(FsError::InvalidHandle(handle))?;
        let result = open.system.lock().close_file(open.backend_handle);
        result
    }

    pub fn read_file(&self, handle: u32, buf: &mut [u8]) -> Result<usize, FsError> {
        let open = self.open_handle(handle)?;
        open.system.lock().read_file(open.backend_handle, buf)
    }

    pub fn write_file(&self, handle: u32, data: &[u8]) -> Result<usize, FsError> {
        let open = self.open_handle(handle)?;
        open.system.lock().write_file(open.backend_handle, data)
    }

    pub fn seek_file(&self, handle: u32, offset: i64, whence: FileMove) -> Result<u64, FsError> {
        let open = self.open_handle(handle)?;
        open.system.lock().seek_file(open.backend_handle, offset, whence)
    }

    pub fn get_seek_pos(&self, handle: u32) -> Result<u64, FsError> {
        let open = self.open_handle(handle)?;
        open.system.lock().get_seek_pos(open.backend_handle)
    }

    /// Bytes between the current position and the end of the file.  The
    /// position is left where it was.
    pub fn remaining_bytes(&self, handle: u32) -> Result<u64, FsError> {
        let open = self.open_handle(handle)?;
        let mut system = open.system.lock();
        let pos = system.get_seek_pos(open.backend_handle)?;
        let end = system.seek_file(open.backend_handle, 0, FileMove::End)?;
        system.seek_file(open.backend_handle, pos as i64, FileMove::Begin)?;
        Ok(end.saturating_sub(pos))
    }

    /// Whether `handle` is an open VFS file.
    pub fn is_open(&self, handle: u32) -> bool {
        self.handles.contains_key(&handle)
    }

    pub fn open_count(&self) -> usize {
        self.handles.len()
    }

    pub fn get_file_info(&self, path: &str) -> Result<FileInfo, FsError> {
        let (system, rest) = self.resolve(path)?;
        let info = system.lock().get_file_info(&rest);
        Ok(info)
    }

    /// Shorthand for `get_file_info(path).exists`, false on unknown devices.
    pub fn exists(&self, path: &str) -> bool {
        self.get_file_info(path).map(|i| i.exists).unwrap_or(false)
    }

    pub fn get_dir_listing(&self, path: &str) -> Result<Vec<FileInfo>, FsError> {
        let (system, rest) = self.resolve(path)?;
        let listing = system.lock().get_dir_listing(&rest);
        listing
    }

    pub fn mkdir(&self, path: &str) -> Result<(), FsError> {
        let (system, rest) = self.resolve(path)?;
        let result = system.lock().mkdir(&rest);
        result
    }

    pub fn rmdir(&self, path: &str) -> Result<(), FsError> {
        let (system, rest) = self.resolve(path)?;
        let result = system.lock().rmdir(&rest);
        result
    }

    pub fn delete_file(&self, path: &str) -> Result<(), FsError> {
        let (system, rest) = self.resolve(path)?;
        let result = system.lock().delete_file(&rest);
        result
    }

    /// Rename within one backend.  A `to` without a device stays on the
    /// device of `from`, relative to the directory `from` lives in.
    pub fn rename_file(&self, from: &str, to: &str) -> Result<(), FsError> {
        let (from_dev, from_rest) = self.qualify(from)?;
        let (to_dev, to_rest) = match split_device(to) {
            Some(_) => self.qualify(to)?,
            None => {
                let parent = from_rest.rsplit_once('/').map(|(p, _)| p).unwrap_or("");
                (from_dev.clone(), join_relative(parent, to))
            }
        };
        let from_sys = self.lookup(&from_dev)?;
        let to_sys = self.lookup(&to_dev)?;
        if !same_backend(&from_sys, &to_sys) {
            return Err(FsError::CrossDevice);
        }
        let result = from_sys.lock().rename_file(&from_rest, &to_rest);
        result
    }
}
