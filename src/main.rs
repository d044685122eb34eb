//! `lnkr` binary.
use anyhow::Result;
use clap::Parser;

use lnkr::cli::{self, Command};
use lnkr::commands;
use lnkr::logging::{self, Logger};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = cli::Cli::parse();
    logging::init_subscriber(args.verbose);
    let log = Logger::new();

    match &args.command {
        Command::Init(opts) => commands::init::run(&args.global, opts, &log),
        Command::Add(opts) => commands::add::run(&args.global, opts, &log),
        Command::Remove(opts) => commands::remove::run(&args.global, opts, &log),
        Command::Switch(opts) => commands::switch::run(&args.global, opts, &log),
        Command::Link => commands::link::run_link(&args.global, &log),
        Command::Unlink => commands::link::run_unlink(&args.global, &log),
        Command::Status => commands::status::run(&args.global, &log),
        Command::Clean => commands::clean::run(&args.global, &log),
        Command::Version => {
            commands::version::run();
            Ok(())
        }
    }
}
