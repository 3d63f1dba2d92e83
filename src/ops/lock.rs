use anyhow::{Context, Result, bail};
use ose::platform::{Clock, Fs};
use ose::{Error, LockFile, LockId};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, trace};

use crate::config::LockConfig;

/// Create the lock file at `path` and return the identity written into it.
/// Without an id the lock file is left empty, which is what `unlock`
/// expects by default.
///
/// Without a timeout this waits for as long as the lock is held by someone
/// else. Errors other than contention are reported immediately.
pub fn run<F: Fs, C: Clock>(
    fs: &F,
    clock: &C,
    config: &LockConfig,
    path: &Path,
    id: Option<String>,
    timeout: Option<Duration>,
) -> Result<String> {
    let lock = LockFile::with_id(fs, clock, path, id.map_or(LockId::None, LockId::Custom))
        .with_mode(config.mode)
        .with_interval(config.interval());

    match timeout {
        Some(timeout) => acquire_lock(&lock, clock, timeout)?,
        None => match lock.try_to_lock() {
            Ok(()) => debug!("Acquired lock at {}", path.display()),
            Err(Error::AlreadyLocked { .. }) => {
                info!("Waiting for lock at {}", path.display());
                lock.lock();
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to lock {}", path.display()));
            }
        },
    }

    Ok(lock.id().unwrap_or_default().to_string())
}

/// Attempt to acquire a lock with retry and timeout.
///
/// Retries every `lock.interval()` until the lock is acquired or the timeout
/// elapses. A timeout of zero means fail immediately if the lock is held.
pub fn acquire_lock<F: Fs, C: Clock>(
    lock: &LockFile<'_, F, C>,
    clock: &C,
    timeout: Duration,
) -> Result<()> {
    let start = clock.now();
    let path_display = lock.path().display().to_string();

    loop {
        match lock.try_to_lock() {
            Ok(()) => {
                debug!("Acquired lock at {path_display}");
                return Ok(());
            }
            Err(Error::AlreadyLocked { .. }) => {}
            Err(e) => return Err(e).with_context(|| format!("Failed to lock {path_display}")),
        }

        let elapsed = clock.now().duration_since(start).unwrap_or_default();
        let owner = lock.owner()?;
        match owner {
            Some(pid) => debug!("Lock at {path_display} held by PID {pid}"),
            None => debug!("Lock at {path_display} held by unknown process"),
        }

        if elapsed >= timeout {
            let pid_msg = match owner {
                Some(pid) => format!("The lock is held by PID {pid}."),
                None => "The lock holder is unknown.".to_string(),
            };
            bail!(
                "Could not acquire lock at {path_display} within {}s.\n\
                 {pid_msg}\n\
                 If no other process is running, delete the lock file and retry.",
                timeout.as_secs(),
            );
        }

        trace!(
            "Lock busy, retrying ({:.1}s / {}s)",
            elapsed.as_secs_f64(),
            timeout.as_secs()
        );
        clock.sleep(lock.interval());
    }
}
