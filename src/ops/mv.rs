use anyhow::{Context, Result};
use ose::platform::Fs;
use ose::{MoveOptions, MoveTreeOptions, move_file, move_tree};
use std::path::Path;
use tracing::info;

/// Move a file or directory from `src` to `dst`.
pub fn run(fs: &impl Fs, src: &Path, dst: &Path, no_overwrite: bool, no_rename: bool) -> Result<()> {
    let is_dir = fs
        .symlink_metadata(src)
        .with_context(|| format!("Failed to stat {}", src.display()))?
        .is_dir();

    let result = if is_dir {
        move_tree(fs, src, dst, MoveTreeOptions { no_overwrite, no_rename })
    } else {
        move_file(fs, src, dst, MoveOptions { no_overwrite, no_rename })
    };
    result.with_context(|| format!("Failed to move {} to {}", src.display(), dst.display()))?;

    info!("Moved {} to {}", src.display(), dst.display());
    Ok(())
}
