//! Commit-or-discard scopes around temp files and directories.
//!
//! A scope creates a temp artifact, hands it to a handler and publishes it
//! under its final name only if the handler accepts. Rejection, a handler
//! error, a failed sync or a failed publish all remove the temp artifact, so
//! the final name only ever holds a complete, accepted result.

use std::path::{Path, PathBuf};
use tracing::{debug, trace};

use crate::closer::Closer;
use crate::copy::{MoveOptions, move_file};
use crate::error::Error;
use crate::platform::{Fs, FsFile};
use crate::temp::{create_temp_dir, create_temp_file};

#[derive(Debug, Clone, Copy)]
pub struct TempScope<'a, F: Fs> {
    fs: &'a F,
    move_options: MoveOptions,
}

impl<'a, F: Fs> TempScope<'a, F> {
    pub fn new(fs: &'a F) -> Self {
        Self {
            fs,
            move_options: MoveOptions::default(),
        }
    }

    /// How accepted temp files are moved to their final name. Directories
    /// are always published with a plain rename.
    pub fn with_move_options(mut self, opts: MoveOptions) -> Self {
        self.move_options = opts;
        self
    }

    /// Run `handler` on a fresh temp file in `dir` and move the file to
    /// `final_name` if it returns `Ok(true)`. Returns the handler's verdict.
    pub fn temp_file_scope<E, H>(
        &self,
        dir: &Path,
        prefix: &str,
        final_name: &Path,
        handler: H,
    ) -> Result<bool, E>
    where
        E: From<Error>,
        H: FnOnce(&mut F::File) -> Result<bool, E>,
    {
        let published = self.lazy_temp_file_scope(dir, prefix, |file| {
            Ok::<_, E>(handler(file)?.then(|| final_name.to_path_buf()))
        })?;
        Ok(published.is_some())
    }

    /// Like [`temp_file_scope`](Self::temp_file_scope), but the handler picks
    /// the final name after writing, or returns `None` to discard the file.
    pub fn lazy_temp_file_scope<E, H>(
        &self,
        dir: &Path,
        prefix: &str,
        handler: H,
    ) -> Result<Option<PathBuf>, E>
    where
        E: From<Error>,
        H: FnOnce(&mut F::File) -> Result<Option<PathBuf>, E>,
    {
        let fs = self.fs;
        let temp = create_temp_file(fs, dir, prefix)?;
        let mut guard = Closer::new(temp, move |(_, path)| fs.remove_file(path));

        let Some(final_name) = handler(&mut guard.0)? else {
            trace!(path = %guard.1.display(), "temp file rejected");
            return Ok(None);
        };

        guard.0.sync_all().map_err(Error::io("sync", &guard.1))?;
        move_file(fs, &guard.1, &final_name, self.move_options)?;
        guard.disarm();
        debug!(path = %final_name.display(), "committed temp file");
        Ok(Some(final_name))
    }

    /// Run `handler` on a fresh temp directory in `dir` and rename it to
    /// `final_name` if it returns `Ok(true)`.
    ///
    /// The rename does not merge: it fails if `final_name` is a non-empty
    /// directory.
    pub fn temp_dir_scope<E, H>(
        &self,
        dir: &Path,
        prefix: &str,
        final_name: &Path,
        handler: H,
    ) -> Result<bool, E>
    where
        E: From<Error>,
        H: FnOnce(&Path) -> Result<bool, E>,
    {
        let published = self.lazy_temp_dir_scope(dir, prefix, |path| {
            Ok::<_, E>(handler(path)?.then(|| final_name.to_path_buf()))
        })?;
        Ok(published.is_some())
    }

    pub fn lazy_temp_dir_scope<E, H>(
        &self,
        dir: &Path,
        prefix: &str,
        handler: H,
    ) -> Result<Option<PathBuf>, E>
    where
        E: From<Error>,
        H: FnOnce(&Path) -> Result<Option<PathBuf>, E>,
    {
        let fs = self.fs;
        let temp = create_temp_dir(fs, dir, prefix)?;
        let mut guard = Closer::new(temp, move |path| fs.remove_dir_all(path));

        let Some(final_name) = handler(&guard)? else {
            trace!(path = %guard.display(), "temp dir rejected");
            return Ok(None);
        };

        fs.rename(&guard, &final_name)
            .map_err(Error::io("rename", &final_name))?;
        guard.disarm();
        debug!(path = %final_name.display(), "committed temp dir");
        Ok(Some(final_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Result;
    use crate::platform::{FakeFs, FakeOp, RealFs};
    use crate::test_helpers::{read_string, setup_fs};
    use std::io::Write;

    fn entries(fs: &FakeFs, dir: &str) -> Vec<String> {
        fs.read_dir(Path::new(dir))
            .unwrap()
            .into_iter()
            .map(|e| e.file_name.to_string_lossy().into_owned())
            .collect()
    }

    fn put(f: &mut impl Write, bytes: &[u8]) -> Result<()> {
        f.write_all(bytes).map_err(Error::io("write", Path::new("temp")))
    }

    #[test]
    fn test_accepted_file_is_published() {
        let fs = setup_fs();
        let scope = TempScope::new(&fs);

        let accepted = scope
            .temp_file_scope(Path::new("/work"), ".t-", Path::new("/work/out"), |f| {
                put(f, b"approved bytes")?;
                Ok::<_, Error>(true)
            })
            .unwrap();
        assert!(accepted);
        assert_eq!(read_string(&fs, "/work/out"), "approved bytes");
        assert_eq!(entries(&fs, "/work"), ["out"]);
    }

    #[test]
    fn test_rejected_file_leaves_nothing() {
        let fs = setup_fs();
        let scope = TempScope::new(&fs);

        let accepted = scope
            .temp_file_scope(Path::new("/work"), ".t-", Path::new("/work/out"), |f| {
                put(f, b"draft")?;
                Ok::<_, Error>(false)
            })
            .unwrap();
        assert!(!accepted);
        assert!(entries(&fs, "/work").is_empty());
    }

    #[test]
    fn test_handler_error_discards_and_propagates() {
        #[derive(Debug)]
        enum AppError {
            Io(Error),
            Invalid,
        }
        impl From<Error> for AppError {
            fn from(e: Error) -> Self {
                AppError::Io(e)
            }
        }

        let fs = setup_fs();
        fs.add_file("/work/out", "previous");
        let scope = TempScope::new(&fs);

        let err = scope
            .temp_file_scope(Path::new("/work"), ".t-", Path::new("/work/out"), |f| {
                f.write_all(b"half").map_err(|_| AppError::Invalid)?;
                Err(AppError::Invalid)
            })
            .unwrap_err();
        assert!(matches!(err, AppError::Invalid));
        assert_eq!(read_string(&fs, "/work/out"), "previous");
        assert_eq!(entries(&fs, "/work"), ["out"]);

        let err = scope
            .temp_file_scope(Path::new("/nope"), ".t-", Path::new("/work/out"), |_| {
                Ok::<_, AppError>(true)
            })
            .unwrap_err();
        assert!(matches!(err, AppError::Io(Error::NotFound { .. })));
    }

    #[test]
    fn test_accept_overwrites_destination() {
        let fs = setup_fs();
        fs.add_file("/work/out", "old");
        let scope = TempScope::new(&fs);

        scope
            .temp_file_scope(Path::new("/work"), ".t-", Path::new("/work/out"), |f| {
                put(f, b"new")?;
                Ok::<_, Error>(true)
            })
            .unwrap();
        assert_eq!(read_string(&fs, "/work/out"), "new");
    }

    #[test]
    fn test_no_overwrite_keeps_destination() {
        let fs = setup_fs();
        fs.add_file("/work/out", "old");
        let scope = TempScope::new(&fs).with_move_options(MoveOptions {
            no_overwrite: true,
            ..Default::default()
        });

        let err = scope
            .temp_file_scope(Path::new("/work"), ".t-", Path::new("/work/out"), |f| {
                put(f, b"new")?;
                Ok::<_, Error>(true)
            })
            .unwrap_err();
        assert!(matches!(err, Error::AlreadyExists { .. }), "got: {err}");
        assert_eq!(read_string(&fs, "/work/out"), "old");
        assert_eq!(entries(&fs, "/work"), ["out"]);
    }

    #[test]
    fn test_sync_failure_discards() {
        let fs = setup_fs();
        fs.set_failing(FakeOp::Sync, true);
        let scope = TempScope::new(&fs);

        let err = scope
            .temp_file_scope(Path::new("/work"), ".t-", Path::new("/work/out"), |f| {
                put(f, b"unsynced")?;
                Ok::<_, Error>(true)
            })
            .unwrap_err();
        assert!(matches!(err, Error::Io { op: "sync", .. }), "got: {err}");
        assert!(entries(&fs, "/work").is_empty());
    }

    #[test]
    fn test_publish_failure_discards() {
        let fs = setup_fs();
        let scope = TempScope::new(&fs);

        let err = scope
            .temp_file_scope(Path::new("/work"), ".t-", Path::new("/missing/out"), |f| {
                put(f, b"nowhere to go")?;
                Ok::<_, Error>(true)
            })
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }), "got: {err}");
        assert!(entries(&fs, "/work").is_empty());
    }

    #[test]
    fn test_panicking_handler_removes_temp() {
        let fs = setup_fs();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            TempScope::new(&fs).temp_file_scope(
                Path::new("/work"),
                ".t-",
                Path::new("/work/out"),
                |_| -> Result<bool> { panic!("handler blew up") },
            )
        }));
        assert!(result.is_err());
        assert!(entries(&fs, "/work").is_empty());
    }

    #[test]
    fn test_lazy_file_scope_chooses_name_from_content() {
        let fs = setup_fs();
        let scope = TempScope::new(&fs);
        let body = b"content addressed";

        let published = scope
            .lazy_temp_file_scope(Path::new("/work"), ".t-", |f| {
                put(f, body)?;
                Ok::<_, Error>(Some(PathBuf::from(format!("/work/{}.blob", body.len()))))
            })
            .unwrap();
        assert_eq!(published.as_deref(), Some(Path::new("/work/17.blob")));
        assert_eq!(read_string(&fs, "/work/17.blob"), "content addressed");

        let published = scope
            .lazy_temp_file_scope(Path::new("/work"), ".t-", |_| Ok::<_, Error>(None))
            .unwrap();
        assert_eq!(published, None);
        assert_eq!(entries(&fs, "/work"), ["17.blob"]);
    }

    #[test]
    fn test_dir_scope_accept_and_reject() {
        let fs = setup_fs();
        let scope = TempScope::new(&fs);

        let accepted = scope
            .temp_dir_scope(Path::new("/work"), ".d-", Path::new("/work/site"), |dir| {
                fs.write(&dir.join("index.html"), b"<html>")?;
                fs.create_dir(&dir.join("assets"), 0o755)?;
                Ok::<_, std::io::Error>(true)
            })
            .unwrap();
        assert!(accepted);
        assert_eq!(read_string(&fs, "/work/site/index.html"), "<html>");
        assert!(fs.is_dir(Path::new("/work/site/assets")));

        let accepted = scope
            .temp_dir_scope(Path::new("/work"), ".d-", Path::new("/work/other"), |dir| {
                fs.write(&dir.join("junk"), b"x").map_err(Error::io("write", dir))?;
                Ok::<_, Error>(false)
            })
            .unwrap();
        assert!(!accepted);
        assert_eq!(entries(&fs, "/work"), ["site"]);
    }

    #[test]
    fn test_dir_scope_does_not_merge() {
        let fs = setup_fs();
        fs.add_file("/work/site/keep", "existing");
        let scope = TempScope::new(&fs);

        let err = scope
            .temp_dir_scope(Path::new("/work"), ".d-", Path::new("/work/site"), |dir| {
                fs.write(&dir.join("new"), b"x").map_err(Error::io("write", dir))?;
                Ok::<_, Error>(true)
            })
            .unwrap_err();
        assert!(matches!(err, Error::Io { op: "rename", .. }), "got: {err}");
        assert_eq!(entries(&fs, "/work"), ["site"]);
        assert_eq!(entries(&fs, "/work/site"), ["keep"]);
    }

    #[test]
    fn test_real_fs_scopes() {
        let tmp = tempfile::TempDir::new().unwrap();
        let scope = TempScope::new(&RealFs);
        let out = tmp.path().join("out");

        scope
            .temp_file_scope(tmp.path(), ".t-", &out, |f| {
                put(f, b"on disk")?;
                Ok::<_, Error>(true)
            })
            .unwrap();
        assert_eq!(std::fs::read(&out).unwrap(), b"on disk");

        let site = tmp.path().join("site");
        scope
            .temp_dir_scope(tmp.path(), ".d-", &site, |dir| {
                std::fs::write(dir.join("a"), b"a").map_err(Error::io("write", dir))?;
                Ok::<_, Error>(true)
            })
            .unwrap();
        assert!(site.join("a").is_file());
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 2);
    }
}
