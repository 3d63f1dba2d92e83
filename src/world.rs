use std::path::PathBuf;

use crate::lock::LockFile;
use crate::opener::Opener;
use crate::platform::{Clock, FakeClock, FakeFs, FakeIo, Fs, Io, RealClock, RealFs, RealIo};
use crate::tempscope::TempScope;

/// The side-effect capabilities a program runs against.
///
/// Built once at startup and passed by reference; the engines borrow the
/// filesystem, clock and standard streams from here instead of reaching for
/// globals.
#[derive(Debug, Clone, Default)]
pub struct World<F: Fs = RealFs, C: Clock = RealClock, I: Io = RealIo> {
    pub fs: F,
    pub clock: C,
    pub io: I,
}

impl World {
    /// The operating system's filesystem, wall clock and standard streams.
    pub fn real() -> Self {
        Self {
            fs: RealFs,
            clock: RealClock,
            io: RealIo,
        }
    }
}

impl World<FakeFs, FakeClock, FakeIo> {
    /// An empty in-memory filesystem, a clock starting at the epoch and
    /// empty in-memory streams.
    pub fn fake() -> Self {
        Self {
            fs: FakeFs::default(),
            clock: FakeClock::default(),
            io: FakeIo::default(),
        }
    }
}

impl<F: Fs, C: Clock, I: Io> World<F, C, I> {
    pub fn new(fs: F, clock: C, io: I) -> Self {
        Self { fs, clock, io }
    }

    pub fn temp_scope(&self) -> TempScope<'_, F> {
        TempScope::new(&self.fs)
    }

    /// An opener that maps `-` to this world's standard streams.
    pub fn opener(&self) -> Opener<'_, F, I> {
        Opener::new(&self.fs, &self.io)
    }

    /// A lock file at `path` identified by this process's PID.
    pub fn lock_file(&self, path: impl Into<PathBuf>) -> LockFile<'_, F, C> {
        LockFile::new(&self.fs, &self.clock, path)
    }
}
