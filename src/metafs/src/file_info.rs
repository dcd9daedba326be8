// File metadata and open-mode types shared by every backend.

use std::time::SystemTime;

bitflags::bitflags! {
    /// Access requested when opening a file.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct FileAccess: u32 {
        const READ = 1;
        const WRITE = 1 << 1;
        const APPEND = 1 << 2;
        const CREATE = 1 << 3;
        const TRUNCATE = 1 << 4;
    }
}

/// Seek origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileMove {
    Begin,
    Current,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileType {
    #[default]
    Normal,
    Directory,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileInfo {
    /// Last path component.
    pub name: String,
    pub size: u64,
    pub exists: bool,
    pub file_type: FileType,
    /// Unix-style permission bits as reported by the backend.
    pub access: u32,
    /// Location on the medium for block devices; 0 on host directories.
    pub start_sector: u32,
    pub mtime: Option<SystemTime>,
}

impl FileInfo {
    /// The info for a path that does not exist.
    pub fn missing(name: &str) -> Self {
        FileInfo {
            name: name.to_string(),
            ..FileInfo::default()
        }
    }

    pub fn is_directory(&self) -> bool {
        self.file_type == FileType::Directory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_bits_combine() {
        let mode = FileAccess::WRITE | FileAccess::CREATE;
        assert!(mode.contains(FileAccess::WRITE));
        assert!(mode.contains(FileAccess::CREATE));
        assert!(!mode.contains(FileAccess::READ));
        assert_eq!(mode.bits(), 10);
        assert!(FileAccess::default().is_empty());
    }
}
