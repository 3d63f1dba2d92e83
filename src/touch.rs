use std::path::Path;
use tracing::trace;

use crate::error::{Error, Result};
use crate::platform::{Clock, Fs, OpenOptions};

/// Create `path` if it is missing and set its access and modification times
/// to the clock's current time. Existing content is left alone.
pub fn touch<F: Fs, C: Clock>(fs: &F, clock: &C, path: &Path) -> Result<()> {
    let opts = OpenOptions::new().write(true).create(true).mode(0o644);
    drop(fs.open_file(path, &opts).map_err(Error::io("open", path))?);

    let now = clock.now();
    fs.set_times(path, now, now).map_err(Error::io("set times", path))?;
    trace!(path = %path.display(), "touched");
    Ok(())
}
