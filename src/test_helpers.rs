//! Shared test helpers for setting up in-memory test environments.

use crate::platform::{FakeFs, Fs};
use std::path::Path;

pub const HOME: &str = "/home/test";
pub const WORK: &str = "/work";

/// Create a `FakeFs` with the standard home layout and an empty `/work`
/// directory for tests to populate.
pub fn setup_fs() -> FakeFs {
    let fs = FakeFs::new(HOME);
    fs.add_dir(WORK);
    fs
}

/// Read a file that the test expects to exist.
pub fn read_string(fs: &FakeFs, path: &str) -> String {
    fs.read_to_string(Path::new(path))
        .unwrap_or_else(|e| panic!("reading {path}: {e}"))
}
