use anyhow::{Context, Result};
use ose::platform::{Clock, Fs};
use std::path::PathBuf;
use tracing::debug;

pub fn run(fs: &impl Fs, clock: &impl Clock, paths: &[PathBuf]) -> Result<()> {
    for path in paths {
        ose::touch(fs, clock, path)
            .with_context(|| format!("Failed to touch {}", path.display()))?;
        debug!("Touched {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ose::platform::{FakeClock, FakeFs};
    use std::path::Path;
    use std::time::{Duration, SystemTime};

    #[test]
    fn touches_every_path() {
        let fs = FakeFs::default();
        fs.add_file("/work/old", "content");
        let now = SystemTime::UNIX_EPOCH + Duration::from_secs(7);
        let clock = FakeClock::new(now, Duration::ZERO);

        run(&fs, &clock, &[PathBuf::from("/work/old"), PathBuf::from("/work/new")]).unwrap();
        assert_eq!(fs.metadata(Path::new("/work/old")).unwrap().modified, now);
        assert_eq!(fs.metadata(Path::new("/work/new")).unwrap().modified, now);
        assert_eq!(fs.read_to_string(Path::new("/work/old")).unwrap(), "content");
    }

    #[test]
    fn stops_at_first_failure() {
        let fs = FakeFs::default();
        let clock = FakeClock::default();
        let err = run(
            &fs,
            &clock,
            &[PathBuf::from("/missing/a"), PathBuf::from("/tmp/b")],
        )
        .unwrap_err();
        assert!(err.to_string().contains("/missing/a"));
        assert!(!fs.exists(Path::new("/tmp/b")));
    }
}
