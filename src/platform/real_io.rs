use std::io::{self, Read, Write};

use super::Io;

/// The process's own standard streams.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealIo;

impl Io for RealIo {
    fn stdin(&self) -> impl Read + '_ {
        io::stdin().lock()
    }

    fn stdout(&self) -> impl Write + '_ {
        io::stdout()
    }

    fn stderr(&self) -> impl Write + '_ {
        io::stderr()
    }
}
