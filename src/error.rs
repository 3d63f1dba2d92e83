//! Typed errors for every file operation in the crate.
//!
//! Engines classify the `io::Error`s coming back from an [`Fs`](crate::platform::Fs)
//! by kind, so callers can match on `NotFound` or `AlreadyExists` without
//! inspecting OS error codes.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("already exists: {}", path.display())]
    AlreadyExists { path: PathBuf },

    #[error("source and destination are the same file: {}", path.display())]
    SameFile { path: PathBuf },

    #[error("not a directory: {}", path.display())]
    NotADirectory { path: PathBuf },

    #[error("max depth {max} exceeded at {}", path.display())]
    DepthExceeded { path: PathBuf, max: usize },

    #[error("unimplemented: {what}: {}", path.display())]
    Unimplemented { what: &'static str, path: PathBuf },

    #[error("already locked: {}", path.display())]
    AlreadyLocked {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid lock file content: {}", path.display())]
    InvalidLockContent { path: PathBuf },

    #[error("temp file is not ready: {reason}")]
    NotReady { reason: &'static str },

    #[error("{op} failed: {}", path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl Error {
    /// Returns a mapper that turns an `io::Error` from `op` on `path` into an
    /// [`Error`], promoting `NotFound` and `AlreadyExists` to their own variants.
    pub(crate) fn io<'a>(op: &'static str, path: &'a Path) -> impl FnOnce(io::Error) -> Error + 'a {
        move |source| match source.kind() {
            io::ErrorKind::NotFound => Error::NotFound {
                path: path.to_path_buf(),
            },
            io::ErrorKind::AlreadyExists => Error::AlreadyExists {
                path: path.to_path_buf(),
            },
            _ => Error::Io {
                op,
                path: path.to_path_buf(),
                source,
            },
        }
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        let kind = match &err {
            Error::NotFound { .. } => io::ErrorKind::NotFound,
            Error::AlreadyExists { .. } | Error::AlreadyLocked { .. } => {
                io::ErrorKind::AlreadyExists
            }
            Error::NotADirectory { .. } => io::ErrorKind::NotADirectory,
            Error::SameFile { .. } => io::ErrorKind::InvalidInput,
            Error::Unimplemented { .. } => io::ErrorKind::Unsupported,
            Error::Io { source, .. } => source.kind(),
            _ => io::ErrorKind::Other,
        };
        io::Error::new(kind, err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_mapping_promotes_known_kinds() {
        let path = Path::new("/tmp/x");
        let err = Error::io("open", path)(io::Error::from(io::ErrorKind::NotFound));
        assert!(matches!(err, Error::NotFound { .. }));

        let err = Error::io("open", path)(io::Error::from(io::ErrorKind::AlreadyExists));
        assert!(matches!(err, Error::AlreadyExists { .. }));

        let err = Error::io("open", path)(io::Error::from(io::ErrorKind::PermissionDenied));
        match err {
            Error::Io { op, source, .. } => {
                assert_eq!(op, "open");
                assert_eq!(source.kind(), io::ErrorKind::PermissionDenied);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn converts_back_into_io_error() {
        let err: io::Error = Error::NotReady { reason: "not created" }.into();
        assert_eq!(err.kind(), io::ErrorKind::Other);
        assert!(err.to_string().contains("not created"));

        let err: io::Error = Error::AlreadyExists {
            path: PathBuf::from("/a"),
        }
        .into();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
    }
}
