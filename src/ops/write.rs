//! Publish stdin at a destination without exposing a partial file.
//!
//! The input is streamed into a temp file next to the destination (or in the
//! configured temp dir), which is moved into place only after all of it was
//! written and synced. Any failure leaves the destination as it was. A
//! destination of `-` streams straight to stdout.

use anyhow::{Context, Result};
use ose::MoveOptions;
use ose::opener::Opener;
use ose::platform::{Fs, Io};
use std::path::Path;
use tracing::info;

use crate::config::TempConfig;

pub fn run<F: Fs, I: Io>(
    fs: &F,
    stdio: &I,
    config: &TempConfig,
    dst: &Path,
    no_overwrite: bool,
) -> Result<u64> {
    let opener = Opener::new(fs, stdio).with_move_options(MoveOptions {
        no_overwrite,
        ..Default::default()
    });
    let mut input = opener.open(Path::new("-")).context("Failed to open stdin")?;

    let dir = config.dir_for(dst);
    let mut bytes = 0;
    opener
        .create_temp_file(&dir, &config.prefix, dst, |out| {
            bytes = std::io::copy(&mut input, out).context("Failed to write output")?;
            Ok::<_, anyhow::Error>(true)
        })
        .with_context(|| format!("Failed to publish {}", dst.display()))?;

    info!("Wrote {bytes} bytes to {}", dst.display());
    Ok(bytes)
}
