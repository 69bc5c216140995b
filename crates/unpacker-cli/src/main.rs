//! Unpacker CLI - rebuilds the resource stream of a packed SWF movie.
//!
//! Recovers the order in which the movie's packed class concatenates its
//! embedded binaries and writes them out in that order:
//!
//! ```text
//! unpacker -i Game.swf unpacked.swf
//! unpacker -i https://example.com/Game.swf --order-only --json
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{ArgAction, Parser};
use tracing_subscriber::filter::EnvFilter;

mod commands;
mod config;
mod stats;

#[derive(Parser)]
#[command(
    name = "unpacker",
    version,
    about = "Rebuild the resource stream of a packed SWF movie"
)]
struct Cli {
    /// Increase output verbosity. Verbose messages go to stderr.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Config file path
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(flatten)]
    unpack: commands::unpack::UnpackCommand,
}

fn level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

fn run(cli: &Cli) -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(EnvFilter::from_default_env().add_directive(level(cli.verbose).parse()?))
        .init();

    let config = config::load_config(cli.config.as_deref())?;
    cli.unpack.run(&config)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::from(2)
        }
    }
}
