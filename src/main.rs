mod cli;
mod config;
mod lib;
mod load;
mod logging;

use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::Parser;

use crate::cli::{load_cmd, report_cmd, status_cmd, Cli, Command};
use crate::config::{Config, StoreConfig};
use crate::load::store::Store;

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    let store = Store::new(store_path(cli.store, &config.store));
    match cli.command {
        Command::Load(args) => load_cmd::run(args, &config, &store),
        Command::Report(args) => report_cmd::run(args, &store),
        Command::Status(args) => status_cmd::run(args, &store),
    }
}

/// `--store` wins over the path in the config file.
fn store_path(flag: Option<PathBuf>, config: &StoreConfig) -> PathBuf {
    flag.unwrap_or_else(|| config.path.clone())
}
