mod cli;
mod config;
mod ops;

use anyhow::Result;
use clap::Parser;
use ose::World;
use ose::platform::Io;
use std::io::Write;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command};
use config::Config;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = match cli.verbose {
        0 => "ose=info",
        1 => "ose=debug",
        _ => "ose=trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .without_time()
        .init();

    let world = World::real();
    let config = Config::resolve(cli.config.as_deref(), &world.fs)?;

    match cli.command {
        Command::Cp {
            src,
            dst,
            no_overwrite,
            recursive,
        } => {
            ops::cp::run(&world.fs, &src, &dst, no_overwrite, recursive)?;
        }
        Command::Mv {
            src,
            dst,
            no_overwrite,
            no_rename,
        } => {
            ops::mv::run(&world.fs, &src, &dst, no_overwrite, no_rename)?;
        }
        Command::Touch { paths } => {
            ops::touch::run(&world.fs, &world.clock, &paths)?;
        }
        Command::Write { dst, no_overwrite } => {
            ops::write::run(&world.fs, &world.io, &config.temp, &dst, no_overwrite)?;
        }
        Command::Lock { path, id, timeout } => {
            let id = ops::lock::run(
                &world.fs,
                &world.clock,
                &config.lock,
                &path,
                id,
                timeout.map(Duration::from_secs),
            )?;
            if !id.is_empty() {
                writeln!(world.io.stdout(), "{id}")?;
            }
        }
        Command::Unlock { path, id } => {
            ops::unlock::run(&world.fs, &world.clock, &path, id)?;
        }
    }

    Ok(())
}
