//! logdrop: follow a thrashd log and react to block/expire lines.

mod cli;
mod error;
mod logging;
mod output;
mod run;

use clap::Parser;
use colored::Colorize;

use crate::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run::execute(cli).await {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(e.exit_code());
    }
}
