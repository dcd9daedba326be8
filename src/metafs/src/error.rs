use std::io;

/// Failure of a file system operation, before it is turned into a guest
/// result code.
#[derive(Debug, thiserror::Error)]
pub enum FsError {
    /// The path names a device prefix nothing is mounted under.
    #[error("no device mounted for {0}")]
    NoSuchDevice(String),
    /// The path does not resolve inside its backend.
    #[error("{0}: not found")]
    NotFound(String),
    #[error("{0}: already exists")]
    AlreadyExists(String),
    /// A rename whose two paths live on different backends.
    #[error("rename across devices")]
    CrossDevice,
    /// A file handle that is not open.
    #[error("file handle {0} is not open")]
    InvalidHandle(u32),
    #[error("host I/O error: {0}")]
    Io(#[from] io::Error),
}

impl FsError {
    /// Classify a host error for `path`, keeping the common kinds distinct.
    pub fn from_io(e: io::Error, path: &str) -> Self {
        match e.kind() {
            io::ErrorKind::NotFound => FsError::NotFound(path.to_string()),
            io::ErrorKind::AlreadyExists => FsError::AlreadyExists(path.to_string()),
            _ => FsError::Io(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn messages_and_sources() {
        assert_eq!(FsError::NotFound("/a".into()).to_string(), "/a: not found");
        assert_eq!(FsError::InvalidHandle(7).to_string(), "file handle 7 is not open");
        assert!(FsError::CrossDevice.source().is_none());

        let wrapped: FsError = io::Error::from(io::ErrorKind::PermissionDenied).into();
        assert!(matches!(wrapped, FsError::Io(_)));
        assert!(wrapped.source().is_some());
    }

    #[test]
    fn host_kinds_are_classified() {
        let e = FsError::from_io(io::Error::from(io::ErrorKind::NotFound), "/x");
        assert!(matches!(e, FsError::NotFound(p) if p == "/x"));
        let e = FsError::from_io(io::Error::from(io::ErrorKind::AlreadyExists), "/x");
        assert!(matches!(e, FsError::AlreadyExists(_)));
    }
}
