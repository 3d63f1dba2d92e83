//! Filesystem primitives for command-line tools that publish files safely.
//!
//! - [`copy`]: copy and move single files with overwrite control.
//! - [`tree`]: the same for directory trees.
//! - [`temp`] and [`tempscope`]: write into a temp artifact and publish it
//!   under its final name only on success.
//! - [`lock`]: advisory lock files with identity-checked release.
//! - [`opener`]: open inputs and outputs by name, `-` meaning stdio.
//!
//! All side effects go through the [`platform::Fs`], [`platform::Clock`] and
//! [`platform::Io`] traits, bundled at startup into a [`World`].

pub mod closer;
pub mod copy;
pub mod error;
pub mod lock;
pub mod opener;
pub mod platform;
pub mod temp;
pub mod tempscope;
pub mod touch;
pub mod tree;
pub mod world;

#[cfg(test)]
mod test_helpers;

pub use closer::Closer;
pub use copy::{CopyOptions, MoveOptions, copy_file, move_file, rename_using_link};
pub use error::{Error, Result};
pub use lock::{LockFile, LockId};
pub use opener::Opener;
pub use temp::{TempFile, create_temp_dir, create_temp_file};
pub use tempscope::TempScope;
pub use touch::touch;
pub use tree::{CopyTreeOptions, MAX_TREE_DEPTH, MoveTreeOptions, copy_tree, move_tree};
pub use world::World;
