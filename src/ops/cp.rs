use anyhow::{Context, Result, bail};
use ose::platform::Fs;
use ose::{CopyOptions, CopyTreeOptions, copy_file, copy_tree};
use std::path::Path;
use tracing::info;

/// Copy `src` to `dst`. Directories need `recursive`.
pub fn run(fs: &impl Fs, src: &Path, dst: &Path, no_overwrite: bool, recursive: bool) -> Result<()> {
    if fs.is_dir(src) {
        if !recursive {
            bail!("{} is a directory (use -r to copy it)", src.display());
        }
        copy_tree(fs, src, dst, CopyTreeOptions { no_overwrite }).with_context(|| {
            format!("Failed to copy {} to {}", src.display(), dst.display())
        })?;
    } else {
        copy_file(fs, src, dst, CopyOptions { no_overwrite }).with_context(|| {
            format!("Failed to copy {} to {}", src.display(), dst.display())
        })?;
    }

    info!("Copied {} to {}", src.display(), dst.display());
    Ok(())
}
