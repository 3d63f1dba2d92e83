//! Abstracted external dependencies for testability.
//!
//! Three traits cover all side effects: [`Fs`] for filesystem operations,
//! [`Clock`] for reading the time and sleeping between polls, and [`Io`]
//! for the standard streams.
//!
//! Production code uses the real implementations ([`RealFs`], [`RealClock`],
//! [`RealIo`]). Tests substitute the in-memory fakes ([`FakeFs`],
//! [`FakeClock`], [`FakeIo`]) via generics.

mod fake_clock;
mod fake_fs;
mod fake_io;
mod real_clock;
mod real_fs;
mod real_io;

pub use fake_clock::FakeClock;
pub use fake_fs::{FakeFs, FakeOp};
pub use fake_io::FakeIo;
pub use real_clock::RealClock;
pub use real_fs::RealFs;
pub use real_io::RealIo;

use std::ffi::OsString;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

// ---------------------------------------------------------------------------
// Filesystem
// ---------------------------------------------------------------------------

/// Flags for [`Fs::open_file`], mirroring `std::fs::OpenOptions` plus the
/// permission bits used when the file is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenOptions {
    pub read: bool,
    pub write: bool,
    pub append: bool,
    pub create: bool,
    pub truncate: bool,
    /// Exclusive creation: fail with `AlreadyExists` if the path is taken.
    pub create_new: bool,
    pub mode: u32,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            read: false,
            write: false,
            append: false,
            create: false,
            truncate: false,
            create_new: false,
            mode: 0o666,
        }
    }
}

impl OpenOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read(mut self, read: bool) -> Self {
        self.read = read;
        self
    }

    pub fn write(mut self, write: bool) -> Self {
        self.write = write;
        self
    }

    pub fn append(mut self, append: bool) -> Self {
        self.append = append;
        self
    }

    pub fn create(mut self, create: bool) -> Self {
        self.create = create;
        self
    }

    pub fn truncate(mut self, truncate: bool) -> Self {
        self.truncate = truncate;
        self
    }

    pub fn create_new(mut self, create_new: bool) -> Self {
        self.create_new = create_new;
        self
    }

    pub fn mode(mut self, mode: u32) -> Self {
        self.mode = mode;
        self
    }
}

/// What kind of object a path names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    File,
    Dir,
    Symlink,
}

/// The subset of file metadata the engines care about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    pub kind: FileKind,
    /// Permission bits (`0o7777` mask).
    pub mode: u32,
    pub len: u64,
    /// Device holding the inode. `(dev, ino)` identifies the file.
    pub dev: u64,
    /// Inode number. Stable across rename, fresh after copy.
    pub ino: u64,
    pub accessed: SystemTime,
    pub modified: SystemTime,
}

impl Metadata {
    pub fn is_file(&self) -> bool {
        self.kind == FileKind::File
    }

    pub fn is_dir(&self) -> bool {
        self.kind == FileKind::Dir
    }

    pub fn is_symlink(&self) -> bool {
        self.kind == FileKind::Symlink
    }

    /// Whether both metadata describe the same file on disk.
    pub fn same_file(&self, other: &Metadata) -> bool {
        self.dev == other.dev && self.ino == other.ino
    }
}

/// A single entry returned by [`Fs::read_dir`].
#[derive(Debug, Clone)]
pub struct DirEntry {
    /// Full path to this entry.
    pub path: PathBuf,
    pub file_name: OsString,
    /// Metadata of the entry itself (lstat: symlinks are not followed).
    pub metadata: Metadata,
}

/// An open file handle produced by an [`Fs`].
pub trait FsFile: Read + Write {
    /// Flush written data to durable storage. This is the fallible half of
    /// closing a file; dropping the handle releases it.
    fn sync_all(&mut self) -> io::Result<()>;

    /// Metadata of the open file.
    fn stat(&self) -> io::Result<Metadata>;
}

/// Abstraction over all filesystem operations used by the engines.
///
/// Methods return bare `io::Error`s so callers can branch on
/// [`io::ErrorKind`]; the engines attach the operation and path.
pub trait Fs {
    type File: FsFile;

    // -- Opening --

    /// Open an existing file for reading.
    fn open(&self, path: &Path) -> io::Result<Self::File> {
        self.open_file(path, &OpenOptions::new().read(true))
    }

    /// Open a file with explicit flags.
    fn open_file(&self, path: &Path, opts: &OpenOptions) -> io::Result<Self::File>;

    /// Create or truncate a file for writing.
    fn create(&self, path: &Path) -> io::Result<Self::File> {
        self.open_file(
            path,
            &OpenOptions::new().write(true).create(true).truncate(true),
        )
    }

    // -- Metadata --

    /// Metadata for `path`, following symlinks.
    fn metadata(&self, path: &Path) -> io::Result<Metadata>;

    /// Metadata for `path` itself (does not follow a final symlink).
    fn symlink_metadata(&self, path: &Path) -> io::Result<Metadata>;

    /// List the entries of a directory, sorted by file name.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>>;

    // -- Namespace changes --

    /// Atomically rename `from` to `to`, replacing `to` if the platform allows.
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Create a hard link at `link` for `original`. Fails if `link` exists.
    fn hard_link(&self, original: &Path, link: &Path) -> io::Result<()>;

    /// Remove a single file (or symlink).
    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Remove an empty directory.
    fn remove_dir(&self, path: &Path) -> io::Result<()>;

    /// Remove a directory and everything below it.
    fn remove_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Create a single directory. Fails if it exists.
    fn create_dir(&self, path: &Path, mode: u32) -> io::Result<()>;

    /// Create a directory and all missing parents.
    fn create_dir_all(&self, path: &Path, mode: u32) -> io::Result<()>;

    /// Create a symbolic link at `link` pointing to `original`.
    fn symlink(&self, original: &Path, link: &Path) -> io::Result<()>;

    // -- Attributes --

    /// Set the permission bits of `path`.
    fn set_mode(&self, path: &Path, mode: u32) -> io::Result<()>;

    /// Set access and modification times of `path`.
    fn set_times(&self, path: &Path, accessed: SystemTime, modified: SystemTime)
    -> io::Result<()>;

    // -- System paths --

    /// Default parent directory for temp artifacts.
    fn temp_dir(&self) -> PathBuf;

    /// The user's config directory (e.g. `~/.config`), if it can be determined.
    fn config_dir(&self) -> Option<PathBuf>;

    // -- Conveniences --

    /// Read the entire contents of a file as raw bytes.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        let mut file = self.open(path)?;
        let mut buf = Vec::new();
        file.read_to_end(&mut buf)?;
        Ok(buf)
    }

    /// Read the entire contents of a file as a UTF-8 string.
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let mut file = self.open(path)?;
        let mut buf = String::new();
        file.read_to_string(&mut buf)?;
        Ok(buf)
    }

    /// Write `contents` to a file, creating it or truncating if it exists.
    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let mut file = self.create(path)?;
        file.write_all(contents)?;
        file.flush()
    }

    /// Check if a path exists (follows symlinks; broken symlinks return false).
    fn exists(&self, path: &Path) -> bool {
        self.metadata(path).is_ok()
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.metadata(path).is_ok_and(|m| m.is_dir())
    }

    fn is_file(&self, path: &Path) -> bool {
        self.metadata(path).is_ok_and(|m| m.is_file())
    }
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Abstraction over wall-clock time and thread sleeping.
pub trait Clock {
    fn now(&self) -> SystemTime;

    /// Block the calling thread for `duration`.
    fn sleep(&self, duration: Duration);
}

// ---------------------------------------------------------------------------
// Standard streams
// ---------------------------------------------------------------------------

/// Abstraction over standard input, output and error.
pub trait Io {
    fn stdin(&self) -> impl Read + '_;

    fn stdout(&self) -> impl Write + '_;

    fn stderr(&self) -> impl Write + '_;
}
