//! In-memory standard streams for testing.
//!
//! Input is preloaded and consumed by reads across every [`Io::stdin`]
//! handle. Output and error collect everything written, so a test can run a
//! command and then inspect what it printed.

use std::io::{self, Cursor, Read, Write};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::Io;

#[derive(Debug, Default)]
pub struct FakeIo {
    input: Mutex<Cursor<Vec<u8>>>,
    out: Mutex<Vec<u8>>,
    err: Mutex<Vec<u8>>,
}

impl FakeIo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Streams whose stdin yields `input`.
    pub fn with_input(input: impl Into<Vec<u8>>) -> Self {
        Self {
            input: Mutex::new(Cursor::new(input.into())),
            ..Self::default()
        }
    }

    /// Everything written to stdout so far.
    pub fn stdout_bytes(&self) -> Vec<u8> {
        lock(&self.out).clone()
    }

    pub fn stdout_string(&self) -> String {
        String::from_utf8_lossy(&lock(&self.out)).into_owned()
    }

    pub fn stderr_string(&self) -> String {
        String::from_utf8_lossy(&lock(&self.err)).into_owned()
    }
}

impl Io for FakeIo {
    fn stdin(&self) -> impl Read + '_ {
        SharedReader(&self.input)
    }

    fn stdout(&self) -> impl Write + '_ {
        SharedWriter(&self.out)
    }

    fn stderr(&self) -> impl Write + '_ {
        SharedWriter(&self.err)
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

struct SharedReader<'a>(&'a Mutex<Cursor<Vec<u8>>>);

impl Read for SharedReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        lock(self.0).read(buf)
    }
}

struct SharedWriter<'a>(&'a Mutex<Vec<u8>>);

impl Write for SharedWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        lock(self.0).extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
