// Kernel objects owned by the I/O calls.

use kobjtables::ObjectVariant;
use metafs::FileInfo;
use sysdefs::constants::SceError;

/// Work a `*Async` call left for the next wait/poll on the same handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredAction {
    Close,
}

/// An open file.
#[derive(Debug)]
pub struct FileNode {
    pub fullpath: String,
    /// VFS file handle.
    pub handle: u32,
    /// Completion callback; id 0 means none.
    pub callback_id: u32,
    pub callback_arg: u32,
    /// Result of the last operation on this handle, as reported by the
    /// async wait/poll calls.
    pub async_result: u64,
    /// An async operation has been issued and not yet waited for.
    pub pending_async: bool,
    pub deferred: Option<DeferredAction>,
}

impl FileNode {
    pub fn new(fullpath: &str, handle: u32) -> Self {
        FileNode {
            fullpath: fullpath.to_string(),
            handle,
            callback_id: 0,
            callback_arg: 0,
            async_result: 0,
            pending_async: false,
            deferred: None,
        }
    }
}

/// A directory snapshot being read with `dread`.
#[derive(Debug)]
pub struct DirListing {
    pub name: String,
    pub listing: Vec<FileInfo>,
    pub index: usize,
}

#[derive(Debug)]
pub enum KernelObject {
    File(FileNode),
    Directory(DirListing),
}

impl kobjtables::KernelObject for KernelObject {
    fn name(&self) -> &str {
        match self {
            KernelObject::File(f) => &f.fullpath,
            KernelObject::Directory(d) => &d.name,
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            KernelObject::File(_) => "OpenFile",
            KernelObject::Directory(_) => "DirListing",
        }
    }
}

impl ObjectVariant<KernelObject> for FileNode {
    fn missing_error_code() -> u32 {
        SceError::KernelBadf.code()
    }

    fn from_object(obj: &KernelObject) -> Option<&Self> {
        match obj {
            KernelObject::File(f) => Some(f),
            _ => None,
        }
    }

    fn from_object_mut(obj: &mut KernelObject) -> Option<&mut Self> {
        match obj {
            KernelObject::File(f) => Some(f),
            _ => None,
        }
    }
}

impl ObjectVariant<KernelObject> for DirListing {
    fn missing_error_code() -> u32 {
        SceError::KernelBadf.code()
    }

    fn from_object(obj: &KernelObject) -> Option<&Self> {
        match obj {
            KernelObject::Directory(d) => Some(d),
            _ => None,
        }
    }

    fn from_object_mut(obj: &mut KernelObject) -> Option<&mut Self> {
        match obj {
            KernelObject::Directory(d) => Some(d),
            _ => None,
        }
    }
}
