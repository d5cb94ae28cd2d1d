use anyhow::Result;
use clap::Parser;
use repostitch::{cli, clipboard, logging, workflow};

fn main() -> Result<()> {
    // Daemon mode is an early exit and must run before argument parsing.
    if clipboard::check_and_run_daemon_if_requested()? {
        return Ok(());
    }

    let cli_args = cli::Cli::parse();

    // The interactive UI owns the terminal, so it stays quiet unless asked.
    logging::init_logging(if cli_args.is_headless() { "warn" } else { "off" });

    workflow::run_repostitch(cli_args)
}
