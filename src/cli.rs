use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ose", about = "Copy, move and publish files safely")]
pub struct Cli {
    /// Override config file location
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v = DEBUG, -vv = TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Copy a file, or a directory tree with -r
    Cp {
        src: PathBuf,
        dst: PathBuf,

        /// Fail if the destination exists
        #[arg(short, long)]
        no_overwrite: bool,

        /// Copy a directory tree
        #[arg(short, long)]
        recursive: bool,
    },

    /// Move a file or directory, renaming when possible
    Mv {
        src: PathBuf,
        dst: PathBuf,

        /// Fail if the destination exists
        #[arg(short, long)]
        no_overwrite: bool,

        /// Always copy and delete instead of renaming
        #[arg(long)]
        no_rename: bool,
    },

    /// Create files or update their timestamps
    Touch {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Write stdin to a file, publishing it only once fully written
    Write {
        /// Destination path, or `-` for stdout
        dst: PathBuf,

        /// Fail if the destination exists
        #[arg(short, long)]
        no_overwrite: bool,
    },

    /// Create a lock file, waiting while another holder has it
    Lock {
        path: PathBuf,

        /// Identity written into the lock file (default: empty)
        #[arg(long)]
        id: Option<String>,

        /// Give up after this many seconds instead of waiting forever
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Remove a lock file if it carries the given identity
    Unlock {
        path: PathBuf,

        /// Identity the lock file must contain (default: empty)
        #[arg(long)]
        id: Option<String>,
    },
}
