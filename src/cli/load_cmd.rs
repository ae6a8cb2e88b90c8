//! Load command: import payments from ledger into the store.

use anyhow::{Context, Result};
use tracing::info_span;

use crate::cli::LoadArgs;
use crate::config::{Config, LedgerConfig};
use crate::load::{ledger::LedgerQuery, store::Store};

/// Run ledger and save what it reports.
pub fn run(args: LoadArgs, config: &Config, store: &Store) -> Result<()> {
    let _cmd = info_span!("load").entered();
    let replace = args.replace;
    let query = query(args, &config.ledger);
    // nothing is written unless the whole export parsed
    let payments = query.run().context("failed to import payments from ledger")?;
    if replace {
        store.replace(&payments)?;
    } else {
        store.append(&payments)?;
    }
    println!(
        "Imported {} payments into {}",
        payments.len(),
        store.path().display()
    );
    Ok(())
}

/// Ledger invocation from the config file, with command-line flags on top.
///
/// Search criteria from the config come first, then the ones given on the
/// command line.
fn query(args: LoadArgs, config: &LedgerConfig) -> LedgerQuery {
    let from_scratch = args.from_scratch().unwrap_or(config.from_scratch);
    LedgerQuery {
        command: args.ledger_command.unwrap_or_else(|| config.command.clone()),
        from_scratch,
        arguments: config
            .arguments
            .iter()
            .cloned()
            .chain(args.ledger_arguments)
            .collect(),
    }
}
