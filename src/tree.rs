//! Recursive directory copy and move built on the single-file engine.

use std::path::Path;
use tracing::{debug, trace};

use crate::copy::{CopyOptions, copy_file};
use crate::error::{Error, Result};
use crate::platform::{FileKind, Fs};

/// Deepest directory level [`copy_tree`] will descend into. The source
/// directory itself is level 1.
pub const MAX_TREE_DEPTH: usize = 127;

const DIR_MODE: u32 = 0o755;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyTreeOptions {
    /// Fail if the destination directory already exists.
    pub no_overwrite: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveTreeOptions {
    /// Fail if the destination directory already exists.
    pub no_overwrite: bool,
    /// Always copy the tree and then delete the source.
    pub no_rename: bool,
}

/// Copy every file and directory below `src` into `dst`.
///
/// Files are copied with their permission bits, and directories get the
/// source mode once their content is in place. Existing files in `dst` are
/// overwritten. Symbolic links are not supported and fail with
/// [`Error::Unimplemented`].
pub fn copy_tree<F: Fs>(fs: &F, src: &Path, dst: &Path, opts: CopyTreeOptions) -> Result<()> {
    let meta = fs.metadata(src).map_err(Error::io("stat", src))?;
    if !meta.is_dir() {
        return Err(Error::NotADirectory {
            path: src.to_path_buf(),
        });
    }
    if opts.no_overwrite && fs.exists(dst) {
        return Err(Error::AlreadyExists {
            path: dst.to_path_buf(),
        });
    }
    fs.create_dir_all(dst, DIR_MODE)
        .map_err(Error::io("create directory", dst))?;

    copy_tree_content(fs, src, dst, 1)
}

fn copy_tree_content<F: Fs>(fs: &F, src: &Path, dst: &Path, depth: usize) -> Result<()> {
    if depth > MAX_TREE_DEPTH {
        return Err(Error::DepthExceeded {
            path: src.to_path_buf(),
            max: MAX_TREE_DEPTH,
        });
    }

    for entry in fs.read_dir(src).map_err(Error::io("read directory", src))? {
        let target = dst.join(&entry.file_name);
        match entry.metadata.kind {
            FileKind::Dir => {
                fs.create_dir_all(&target, DIR_MODE)
                    .map_err(Error::io("create directory", &target))?;
                copy_tree_content(fs, &entry.path, &target, depth + 1)?;
            }
            FileKind::Symlink => {
                return Err(Error::Unimplemented {
                    what: "copy symlink",
                    path: entry.path,
                });
            }
            FileKind::File => copy_file(fs, &entry.path, &target, CopyOptions::default())?,
        }
        fs.set_mode(&target, entry.metadata.mode)
            .map_err(Error::io("chmod", &target))?;
        trace!(src = %entry.path.display(), dst = %target.display(), "copied entry");
    }
    Ok(())
}

/// Move the directory `src` to `dst`, renaming when possible and otherwise
/// copying the tree and removing the source.
///
/// With `no_overwrite` the destination is checked before the rename, so a
/// directory created at `dst` in between can still be replaced if it is empty.
pub fn move_tree<F: Fs>(fs: &F, src: &Path, dst: &Path, opts: MoveTreeOptions) -> Result<()> {
    if opts.no_overwrite && fs.exists(dst) {
        return Err(Error::AlreadyExists {
            path: dst.to_path_buf(),
        });
    }

    if !opts.no_rename {
        match fs.rename(src, dst) {
            Ok(()) => {
                debug!(src = %src.display(), dst = %dst.display(), "moved tree by rename");
                return Ok(());
            }
            Err(e) => trace!(error = %e, "rename failed, falling back to copy"),
        }
    }

    copy_tree(
        fs,
        src,
        dst,
        CopyTreeOptions {
            no_overwrite: opts.no_overwrite,
        },
    )?;
    fs.remove_dir_all(src)
        .map_err(Error::io("remove source tree", src))?;
    debug!(src = %src.display(), dst = %dst.display(), "moved tree by copy");
    Ok(())
}
