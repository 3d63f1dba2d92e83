//! A value paired with a release action that runs exactly once.
//!
//! The inner reader/writer stays reachable through `Deref`, `Read` and
//! `Write`. The release action runs on [`Closer::close`] or, failing that,
//! on drop.

use std::fmt;
use std::io::{self, Read, Write};
use std::ops::{Deref, DerefMut};
use tracing::debug;

type Release<'a, T> = Box<dyn FnOnce(&mut T) -> io::Result<()> + 'a>;

pub struct Closer<'a, T> {
    inner: T,
    release: Option<Release<'a, T>>,
}

impl<'a, T> Closer<'a, T> {
    pub fn new(inner: T, release: impl FnOnce(&mut T) -> io::Result<()> + 'a) -> Self {
        Self {
            inner,
            release: Some(Box::new(release)),
        }
    }

    /// A closer whose release does nothing.
    pub fn nop(inner: T) -> Self {
        Self {
            inner,
            release: None,
        }
    }

    /// Run the release action now and report its outcome.
    pub fn close(mut self) -> io::Result<()> {
        match self.release.take() {
            Some(release) => release(&mut self.inner),
            None => Ok(()),
        }
    }

    /// Cancel the release action. Returns whether one was still pending.
    pub fn disarm(&mut self) -> bool {
        self.release.take().is_some()
    }

    pub fn is_armed(&self) -> bool {
        self.release.is_some()
    }
}

impl<T> Drop for Closer<'_, T> {
    fn drop(&mut self) {
        if let Some(release) = self.release.take()
            && let Err(e) = release(&mut self.inner)
        {
            debug!(error = %e, "release on drop failed");
        }
    }
}

impl<T> Deref for Closer<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner
    }
}

impl<T> DerefMut for Closer<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.inner
    }
}

impl<T: Read> Read for Closer<'_, T> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl<T: Write> Write for Closer<'_, T> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl<T: fmt::Debug> fmt::Debug for Closer<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Closer")
            .field("inner", &self.inner)
            .field("armed", &self.is_armed())
            .finish()
    }
}
