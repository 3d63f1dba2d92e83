//! Uniquely named temp files and directories, and a [`TempFile`] handle
//! that publishes itself to a destination when closed.

use std::io::{self, Read, Write};
use std::mem;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

use crate::closer::Closer;
use crate::copy::{MoveOptions, move_file};
use crate::error::{Error, Result};
use crate::platform::{Fs, FsFile, OpenOptions};

const MAX_ATTEMPTS: u32 = 10_000;
const FILE_MODE: u32 = 0o600;
const DIR_MODE: u32 = 0o700;

/// Build a candidate name from `prefix`. The last `*` in the prefix is
/// replaced by the random part; otherwise it is appended.
fn temp_name(prefix: &str) -> String {
    let random = format!("{:09}", rand::random::<u32>() % 1_000_000_000);
    match prefix.rfind('*') {
        Some(pos) => format!("{}{random}{}", &prefix[..pos], &prefix[pos + 1..]),
        None => format!("{prefix}{random}"),
    }
}

fn resolve_dir<F: Fs>(fs: &F, dir: &Path, prefix: &str) -> Result<PathBuf> {
    let dir = if dir.as_os_str().is_empty() {
        fs.temp_dir()
    } else {
        dir.to_path_buf()
    };
    if prefix.contains(std::path::MAIN_SEPARATOR) {
        return Err(Error::Io {
            op: "create temp",
            path: dir.join(prefix),
            source: io::Error::new(io::ErrorKind::InvalidInput, "prefix contains path separator"),
        });
    }
    Ok(dir)
}

/// Create a new file named `prefix` + random digits in `dir` (or the
/// filesystem's temp dir when `dir` is empty), opened for reading and
/// writing with mode 0600.
pub fn create_temp_file<F: Fs>(fs: &F, dir: &Path, prefix: &str) -> Result<(F::File, PathBuf)> {
    let dir = resolve_dir(fs, dir, prefix)?;
    let opts = OpenOptions::new()
        .read(true)
        .write(true)
        .create_new(true)
        .mode(FILE_MODE);

    for _ in 0..MAX_ATTEMPTS {
        let path = dir.join(temp_name(prefix));
        match fs.open_file(&path, &opts) {
            Ok(file) => {
                trace!(path = %path.display(), "created temp file");
                return Ok((file, path));
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(Error::io("create temp file", &path)(e)),
        }
    }
    Err(Error::AlreadyExists {
        path: dir.join(prefix),
    })
}

/// Like [`create_temp_file`] but creates a directory with mode 0700.
pub fn create_temp_dir<F: Fs>(fs: &F, dir: &Path, prefix: &str) -> Result<PathBuf> {
    let dir = resolve_dir(fs, dir, prefix)?;

    for _ in 0..MAX_ATTEMPTS {
        let path = dir.join(temp_name(prefix));
        match fs.create_dir(&path, DIR_MODE) {
            Ok(()) => {
                trace!(path = %path.display(), "created temp dir");
                return Ok(path);
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(Error::io("create temp dir", &path)(e)),
        }
    }
    Err(Error::AlreadyExists {
        path: dir.join(prefix),
    })
}

enum State<'a, T> {
    Pending,
    Open(Closer<'a, (T, PathBuf)>),
    Finalized,
}

/// A temp file that is either published to a destination or removed.
///
/// The handle starts out pending; [`create`](Self::create) makes the file.
/// [`close`](Self::close) syncs it and moves it to the destination (or
/// removes it when none is set), [`cancel`](Self::cancel) removes it, and
/// dropping an open handle removes it as well. Anything done to a pending or
/// finalized handle fails with [`Error::NotReady`].
pub struct TempFile<'a, F: Fs> {
    fs: &'a F,
    dir: PathBuf,
    prefix: String,
    destination: Option<PathBuf>,
    move_options: MoveOptions,
    state: State<'a, F::File>,
}

impl<'a, F: Fs> TempFile<'a, F> {
    pub fn new(fs: &'a F, dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            fs,
            dir: dir.into(),
            prefix: prefix.into(),
            destination: None,
            move_options: MoveOptions::default(),
            state: State::Pending,
        }
    }

    /// Shorthand for [`new`](Self::new) followed by [`create`](Self::create).
    pub fn create_in(fs: &'a F, dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Result<Self> {
        let mut temp = Self::new(fs, dir, prefix);
        temp.create()?;
        Ok(temp)
    }

    pub fn with_destination(mut self, destination: impl Into<PathBuf>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    pub fn with_move_options(mut self, opts: MoveOptions) -> Self {
        self.move_options = opts;
        self
    }

    pub fn create(&mut self) -> Result<()> {
        if !matches!(self.state, State::Pending) {
            return Err(Error::NotReady {
                reason: "already created",
            });
        }
        let fs = self.fs;
        let (file, path) = create_temp_file(fs, &self.dir, &self.prefix)?;
        self.state = State::Open(Closer::new((file, path), move |(_, path)| {
            fs.remove_file(path)
        }));
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, State::Open(_))
    }

    /// The generated path of the open temp file.
    pub fn path(&self) -> Result<&Path> {
        match &self.state {
            State::Open(guard) => Ok(&guard.1),
            State::Pending => Err(not_created()),
            State::Finalized => Err(finalized()),
        }
    }

    pub fn destination(&self) -> Option<&Path> {
        self.destination.as_deref()
    }

    /// Sync the temp file and publish it to the destination.
    ///
    /// If syncing or moving fails, the temp file is removed and the error
    /// returned. Either way the handle is finalized.
    pub fn close(&mut self) -> Result<()> {
        let mut guard = self.take_open()?;
        guard.0.sync_all().map_err(Error::io("sync", &guard.1))?;

        let Some(destination) = &self.destination else {
            let path = guard.1.clone();
            return guard.close().map_err(Error::io("remove temp file", &path));
        };
        move_file(self.fs, &guard.1, destination, self.move_options)?;
        guard.disarm();
        debug!(path = %destination.display(), "published temp file");
        Ok(())
    }

    /// Remove the temp file without publishing it.
    pub fn cancel(&mut self) -> Result<()> {
        let guard = self.take_open()?;
        let path = guard.1.clone();
        guard.close().map_err(Error::io("remove temp file", &path))
    }

    fn take_open(&mut self) -> Result<Closer<'a, (F::File, PathBuf)>> {
        match mem::replace(&mut self.state, State::Finalized) {
            State::Open(guard) => Ok(guard),
            State::Pending => {
                self.state = State::Pending;
                Err(not_created())
            }
            State::Finalized => Err(finalized()),
        }
    }

    fn file(&mut self) -> io::Result<&mut F::File> {
        match &mut self.state {
            State::Open(guard) => Ok(&mut guard.0),
            State::Pending => Err(not_created().into()),
            State::Finalized => Err(finalized().into()),
        }
    }
}

fn not_created() -> Error {
    Error::NotReady {
        reason: "not created yet",
    }
}

fn finalized() -> Error {
    Error::NotReady {
        reason: "already finalized",
    }
}

impl<F: Fs> Write for TempFile<'_, F> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file()?.flush()
    }
}

impl<F: Fs> Read for TempFile<'_, F> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file()?.read(buf)
    }
}
