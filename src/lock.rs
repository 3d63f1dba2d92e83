//! Advisory lock files.
//!
//! A lock is held by whoever managed to create the lock file exclusively.
//! The file carries an identity body (by default the holder's PID) that
//! [`LockFile::try_to_unlock`] checks before removing it, so a holder never
//! removes a lock that was replaced by someone else.

use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::platform::{Clock, Fs, OpenOptions};

pub const DEFAULT_MODE: u32 = 0o644;
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(100);

/// What a lock file identifies its holder by.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LockId {
    /// An empty lock file.
    None,
    /// The decimal PID of the current process.
    #[default]
    Pid,
    Custom(String),
}

impl LockId {
    /// The identity token, or `None` for an anonymous lock.
    pub fn token(&self) -> Option<String> {
        match self {
            LockId::None => None,
            LockId::Pid => Some(std::process::id().to_string()),
            LockId::Custom(id) if id.is_empty() => None,
            LockId::Custom(id) => Some(id.clone()),
        }
    }
}

/// Parse a lock file body written with a PID identity.
pub fn parse_pid(body: &str) -> Option<u32> {
    body.trim().parse().ok()
}

pub struct LockFile<'a, F: Fs, C: Clock> {
    fs: &'a F,
    clock: &'a C,
    path: PathBuf,
    mode: u32,
    interval: Duration,
    id: Option<String>,
    body: Vec<u8>,
    /// Serializes lock/unlock calls and keeps the last error seen by
    /// [`lock`](Self::lock) or [`unlock`](Self::unlock).
    last_error: Mutex<Option<Error>>,
}

impl<'a, F: Fs, C: Clock> LockFile<'a, F, C> {
    /// A lock file identified by the current process's PID.
    pub fn new(fs: &'a F, clock: &'a C, path: impl Into<PathBuf>) -> Self {
        Self::with_id(fs, clock, path, LockId::Pid)
    }

    pub fn with_id(fs: &'a F, clock: &'a C, path: impl Into<PathBuf>, id: LockId) -> Self {
        let id = id.token();
        let body = id
            .as_ref()
            .map(|id| format!("{id}\n").into_bytes())
            .unwrap_or_default();
        Self {
            fs,
            clock,
            path: path.into(),
            mode: DEFAULT_MODE,
            interval: DEFAULT_INTERVAL,
            id,
            body,
            last_error: Mutex::new(None),
        }
    }

    /// Permission bits of the lock file. Zero keeps the default.
    pub fn with_mode(mut self, mode: u32) -> Self {
        if mode != 0 {
            self.mode = mode;
        }
        self
    }

    /// How long [`lock`](Self::lock) sleeps between attempts.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Create the lock file, failing with [`Error::AlreadyLocked`] if it
    /// already exists. Does not block.
    pub fn try_to_lock(&self) -> Result<()> {
        let _guard = self.guard();
        self.create()
    }

    /// Block until the lock file is created, sleeping between attempts.
    ///
    /// There is no timeout. The outcome of the final attempt is kept and
    /// can be read with [`take_error`](Self::take_error). Other callers on
    /// this instance wait until this returns.
    pub fn lock(&self) {
        let mut last_error = self.guard();
        let mut attempts = 0u64;
        loop {
            attempts += 1;
            match self.create() {
                Ok(()) => {
                    *last_error = None;
                    debug!(path = %self.path.display(), attempts, "lock acquired");
                    return;
                }
                Err(e) => {
                    trace!(path = %self.path.display(), error = %e, "lock busy");
                    *last_error = Some(e);
                }
            }
            self.clock.sleep(self.interval);
        }
    }

    /// Remove the lock file if it still carries this instance's body.
    ///
    /// A mismatch fails with [`Error::InvalidLockContent`] and leaves the
    /// file in place.
    pub fn try_to_unlock(&self) -> Result<()> {
        let _guard = self.guard();
        self.remove()
    }

    /// Like [`try_to_unlock`](Self::try_to_unlock), but records the error
    /// instead of returning it.
    pub fn unlock(&self) {
        let mut last_error = self.guard();
        *last_error = self.remove().err();
    }

    /// Take the error recorded by the last [`lock`](Self::lock) or
    /// [`unlock`](Self::unlock), if any.
    pub fn take_error(&self) -> Option<Error> {
        self.guard().take()
    }

    /// The PID stored in the lock file, if it holds one.
    pub fn owner(&self) -> Result<Option<u32>> {
        match self.fs.read_to_string(&self.path) {
            Ok(body) => Ok(parse_pid(&body)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::io("read lock file", &self.path)(e)),
        }
    }

    fn guard(&self) -> MutexGuard<'_, Option<Error>> {
        self.last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn create(&self) -> Result<()> {
        let opts = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .create_new(true)
            .mode(self.mode);
        let mut file = self.fs.open_file(&self.path, &opts).map_err(|source| {
            if source.kind() == io::ErrorKind::AlreadyExists {
                Error::AlreadyLocked {
                    path: self.path.clone(),
                    source,
                }
            } else {
                Error::io("create lock file", &self.path)(source)
            }
        })?;

        if !self.body.is_empty()
            && let Err(e) = file.write_all(&self.body)
        {
            drop(file);
            if let Err(cleanup) = self.fs.remove_file(&self.path) {
                debug!(path = %self.path.display(), error = %cleanup, "failed to remove partial lock file");
            }
            return Err(Error::io("write lock file", &self.path)(e));
        }
        trace!(path = %self.path.display(), "lock file created");
        Ok(())
    }

    fn remove(&self) -> Result<()> {
        let actual = self
            .fs
            .read(&self.path)
            .map_err(Error::io("read lock file", &self.path))?;
        if actual != self.body {
            return Err(Error::InvalidLockContent {
                path: self.path.clone(),
            });
        }
        self.fs
            .remove_file(&self.path)
            .map_err(Error::io("remove lock file", &self.path))?;
        trace!(path = %self.path.display(), "lock file removed");
        Ok(())
    }
}

impl<F: Fs, C: Clock> fmt::Debug for LockFile<'_, F, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockFile")
            .field("path", &self.path)
            .field("mode", &format_args!("{:o}", self.mode))
            .field("interval", &self.interval)
            .field("id", &self.id)
            .finish()
    }
}
