//! Single-file copy and move with overwrite control.
//!
//! [`move_file`] publishes by rename when it can and falls back to
//! copy-then-delete when it can't (different filesystems, `no_rename`).
//! With `no_overwrite`, the rename is done as link-then-unlink so that
//! "destination exists" is detected atomically by the filesystem.
//!
//! The copy fallback is not atomic: if the copy succeeds but removing the
//! source fails, the error is returned and both files exist.

use std::io;
use std::path::Path;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::platform::{Fs, FsFile, OpenOptions};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyOptions {
    /// Fail with [`Error::AlreadyExists`] instead of replacing `dst`.
    pub no_overwrite: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveOptions {
    /// Fail with [`Error::AlreadyExists`] instead of replacing `dst`.
    pub no_overwrite: bool,
    /// Skip the rename attempt and always copy, then delete the source.
    pub no_rename: bool,
}

/// Copy the bytes and permission bits of `src` to `dst`, then sync `dst`.
pub fn copy_file<F: Fs>(fs: &F, src: &Path, dst: &Path, opts: CopyOptions) -> Result<()> {
    let mut reader = fs.open(src).map_err(Error::io("open source", src))?;
    let meta = reader.stat().map_err(Error::io("stat source", src))?;
    // Truncating dst would empty src.
    if fs.metadata(dst).is_ok_and(|d| d.same_file(&meta)) {
        return Err(Error::SameFile {
            path: dst.to_path_buf(),
        });
    }
    let mode = meta.mode;

    let flags = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .create_new(opts.no_overwrite)
        .mode(mode);
    let mut writer = fs
        .open_file(dst, &flags)
        .map_err(Error::io("open destination", dst))?;

    let bytes = io::copy(&mut reader, &mut writer).map_err(Error::io("copy", dst))?;
    writer.sync_all().map_err(Error::io("sync", dst))?;
    drop(writer);

    // The create mode is masked by umask and ignored for an existing file.
    fs.set_mode(dst, mode).map_err(Error::io("chmod", dst))?;

    trace!(src = %src.display(), dst = %dst.display(), bytes, "copied file");
    Ok(())
}

/// Move `src` to `dst` by hard-linking `dst` and then removing `src`.
///
/// Fails with `AlreadyExists` when `dst` is taken, without touching `src`.
/// If the link is made but `src` can't be removed, both names remain and
/// the removal error is returned.
pub fn rename_using_link<F: Fs>(fs: &F, src: &Path, dst: &Path) -> Result<()> {
    fs.hard_link(src, dst).map_err(Error::io("link", dst))?;
    fs.remove_file(src).map_err(Error::io("remove source", src))
}

pub fn move_file<F: Fs>(fs: &F, src: &Path, dst: &Path, opts: MoveOptions) -> Result<()> {
    if !opts.no_rename {
        if opts.no_overwrite {
            match fs.hard_link(src, dst) {
                Ok(()) => {
                    fs.remove_file(src).map_err(Error::io("remove source", src))?;
                    debug!(src = %src.display(), dst = %dst.display(), "moved by link");
                    return Ok(());
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    return Err(Error::AlreadyExists {
                        path: dst.to_path_buf(),
                    });
                }
                Err(e) => trace!(error = %e, "link failed, falling back to copy"),
            }
        } else {
            match fs.rename(src, dst) {
                Ok(()) => {
                    debug!(src = %src.display(), dst = %dst.display(), "moved by rename");
                    return Ok(());
                }
                Err(e) => trace!(error = %e, "rename failed, falling back to copy"),
            }
        }
    }

    copy_file(
        fs,
        src,
        dst,
        CopyOptions {
            no_overwrite: opts.no_overwrite,
        },
    )?;
    fs.remove_file(src).map_err(Error::io("remove source", src))?;
    debug!(src = %src.display(), dst = %dst.display(), "moved by copy");
    Ok(())
}
