//! `DirectoryFileSystem`: a backend rooted at a host directory.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use typemap::path_conversion::normpath;

use crate::error::FsError;
use crate::file_info::{FileAccess, FileInfo, FileMove, FileType};
use crate::filesystem::FileSystem;

#[derive(Debug)]
pub struct DirectoryFileSystem {
    root: PathBuf,
    open_files: HashMap<u32, File>,
    next_handle: u32,
}

impl DirectoryFileSystem {
    /// A backend serving the contents of `root`.  The directory is not
    /// created here.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirectoryFileSystem {
            root: root.into(),
            open_files: HashMap::new(),
            next_handle: 1,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn host_path(&self, path: &str) -> PathBuf {
        let rel = normpath(path);
        self.root.join(rel.trim_start_matches('/'))
    }

    fn file(&mut self, handle: u32) -> Result<&mut File, FsError> {
        self.open_files.get_mut(&handle).ok_or(FsError::InvalidHandle(handle))
    }

    fn alloc_handle(&mut self) -> u32 {
        loop {
            let h = self.next_handle;
            self.next_handle = self.next_handle.wrapping_add(1).max(1);
            if !self.open_files.contains_key(&h) {
                return h;
            }
        }
    }

    fn info_from_metadata(name: String, meta: &fs::Metadata) -> FileInfo {
        let file_type = if meta.is_dir() {
            FileType::Directory
        } else {
            FileType::Normal
        };
        let mut access = if meta.permissions().readonly() { 0o444 } else { 0o666 };
        if meta.is_dir() {
            access |= 0o111;
        }
        FileInfo {
            name,
            size: if meta.is_dir() { 0 } else { meta.len() },
            exists: true,
            file_type,
            access,
            start_sector: 0,
            mtime: meta.modified().ok(),
        }
    }
}

fn last_component(path: &str) -> String {
    normpath(path).rsplit('/').next().unwrap_or_default().to_string()
}

impl FileSystem for DirectoryFileSystem {
    fn open_file(&mut self, path: &str, access: FileAccess) -> Result<u32, FsError> {
        let host = self.host_path(path);
        let append = access.contains(FileAccess::APPEND);
        let write = access.intersects(FileAccess::WRITE | FileAccess::APPEND | FileAccess::CREATE);
        let read = access.contains(FileAccess::READ) || !write;

        let mut opts = OpenOptions::new();
        opts.read(read)
            .write(write && !append)
            .append(append)
            .create(write && access.contains(FileAccess::CREATE))
            .truncate(write && !append && access.contains(FileAccess::TRUNCATE));

        let file = opts.open(&host).map_err(|e| FsError::from_io(e, path))?;
        if file.metadata().map(|m| m.is_dir()).unwrap_or(false) {
            return Err(FsError::NotFound(path.to_string()));
        }
        let handle = self.alloc_handle();
        self.open_files.insert(handle, file);
        log::trace!("dirfs open {} -> {}", host.display(), handle);
        Ok(handle)
    }

    fn close_file(&mut self, handle: u32) -> Result<(), FsError> {
        self.open_files
            .remove(&handle)
            .map(drop)
            .ok_or(FsError::InvalidHandle(handle))
    }

    fn read_file(&mut self, handle: u32, buf: &mut [u8]) -> Result<usize, FsError> {
        let file = self.file(handle)?;
        let mut total = 0;
        while total < buf.len() {
            match file.read(&mut buf[total..]) {
                Ok(0) => break,
                Ok(n) => total += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(total)
    }

    fn write_file(&mut self, handle: u32, data: &[u8]) -> Result<usize, FsError> {
        let file = self.file(handle)?;
        file.write_all(data)?;
        Ok(data.len())
    }

    fn seek_file(&mut self, handle: u32, offset: i64, whence: FileMove) -> Result<u64, FsError> {
        let file = self.file(handle)?;
        let from = match whence {
            FileMove::Begin => SeekFrom::Start(
                u64::try_from(offset).map_err(|_| io::Error::from(io::ErrorKind::InvalidInput))?,
            ),
            FileMove::Current => SeekFrom::Current(offset),
            FileMove::End => SeekFrom::End(offset),
        };
        Ok(file.seek(from)?)
    }

    fn get_seek_pos(&mut self, handle: u32) -> Result<u64, FsError> {
        Ok(self.file(handle)?.stream_position()?)
    }

    fn get_file_info(&mut self, path: &str) -> FileInfo {
        let name = last_component(path);
        match fs::metadata(self.host_path(path)) {
            Ok(meta) => Self::info_from_metadata(name, &meta),
            Err(_) => FileInfo::missing(&name),
        }
    }

    fn get_dir_listing(&mut self, path: &str) -> Result<Vec<FileInfo>, FsError> {
        let host = self.host_path(path);
        let mut listing = Vec::new();
        for entry in fs::read_dir(&host).map_err(|e| FsError::from_io(e, path))? {
            let entry = entry?;
            let meta = entry.metadata()?;
            let name = entry.file_name().to_string_lossy().into_owned();
            listing.push(Self::info_from_metadata(name, &meta));
        }
        // host order is arbitrary
        listing.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(listing)
    }

    fn mkdir(&mut self, path: &str) -> Result<(), FsError> {
        fs::create_dir(self.host_path(path)).map_err(|e| FsError::from_io(e, path))
    }

    fn rmdir(&mut self, path: &str) -> Result<(), FsError> {
        fs::remove_dir(self.host_path(path)).map_err(|e| FsError::from_io(e, path))
    }

    fn delete_file(&mut self, path: &str) -> Result<(), FsError> {
        fs::remove_file(self.host_path(path)).map_err(|e| FsError::from_io(e, path))
    }

    fn rename_file(&mut self, from: &str, to: &str) -> Result<(), FsError> {
        fs::rename(self.host_path(from), self.host_path(to)).map_err(|e| FsError::from_io(e, from))
    }
}
