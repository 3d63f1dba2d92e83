//! Operations that implement ose commands.
//!
//! Each submodule corresponds to a CLI subcommand and exposes a `run()`
//! function generic over the filesystem (and clock, where time matters), so
//! the commands are tested against the in-memory fakes.

pub mod cp;
pub mod lock;
pub mod mv;
pub mod touch;
pub mod unlock;
pub mod write;
