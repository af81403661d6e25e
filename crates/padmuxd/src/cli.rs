use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;

#[derive(Debug, Subcommand, PartialEq)]
pub(crate) enum Command {
    /// Run the aggregator and the navigator in the foreground.
    Run,
    /// Show connected controller slots. Works without the virtual driver.
    Slots,
    /// Print the effective configuration.
    Config,
}

/// Merge all physical controllers into one virtual controller.
#[derive(Parser)]
#[command(version, about, long_about = None)]
pub(crate) struct Cli {
    /// Turn debugging information on
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Path to padmux.yaml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// The command to run
    #[clap(subcommand)]
    pub command: Command,
}
