use anyhow::{Context, Result};
use ose::platform::{Clock, Fs};
use ose::{LockFile, LockId};
use std::path::Path;
use tracing::info;

/// Remove the lock file at `path` if its content matches `id`. Without an
/// id, only an empty lock file is removed.
pub fn run(fs: &impl Fs, clock: &impl Clock, path: &Path, id: Option<String>) -> Result<()> {
    let lock = LockFile::with_id(fs, clock, path, id.map_or(LockId::None, LockId::Custom));
    lock.try_to_unlock()
        .with_context(|| format!("Failed to unlock {}", path.display()))?;
    info!("Released lock at {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ose::platform::{FakeClock, FakeFs};

    #[test]
    fn removes_matching_lock() {
        let fs = FakeFs::default();
        fs.add_file("/tmp/.lock", "42\n");
        run(&fs, &FakeClock::default(), Path::new("/tmp/.lock"), Some("42".into())).unwrap();
        assert!(!fs.exists(Path::new("/tmp/.lock")));
    }

    #[test]
    fn keeps_foreign_lock() {
        let fs = FakeFs::default();
        fs.add_file("/tmp/.lock", "42\n");
        let err = run(&fs, &FakeClock::default(), Path::new("/tmp/.lock"), Some("7".into())).unwrap_err();
        assert!(format!("{err:#}").contains("invalid lock file content"));
        assert!(fs.exists(Path::new("/tmp/.lock")));

        assert!(run(&fs, &FakeClock::default(), Path::new("/tmp/.lock"), None).is_err());
        assert!(fs.exists(Path::new("/tmp/.lock")));
    }
}
