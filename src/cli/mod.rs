//! Command-line surface and rendering of results.

pub mod load_cmd;
pub mod plot;
pub mod report_cmd;
pub mod status_cmd;
pub mod table;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::lib::date::{Date, FormatError};

/// Supporter status tracking from ledger payments.
#[derive(Parser)]
#[command(
    name = "supporters",
    version,
    about = "Track supporter standing from ledger payments"
)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to TOML configuration file [default: supporters.toml if present].
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the payment store path from config.
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Import payment data from ledger into the payment store.
    Load(LoadArgs),
    /// Print a CSV report counting supporters over time.
    Report(ReportArgs),
    /// Show the standing of individual supporters.
    Status(StatusArgs),
}

/// Arguments for the `load` subcommand.
#[derive(clap::Args)]
pub struct LoadArgs {
    /// Name or path of ledger executable.
    #[arg(long, value_name = "COMMAND")]
    pub ledger_command: Option<String>,

    /// Import exactly the payments found by your search criteria,
    /// without the default supporter and income criteria.
    #[arg(long, overrides_with = "no_ledger_from_scratch")]
    pub ledger_from_scratch: bool,

    /// Keep the default supporter and income criteria even when the
    /// config sets `from_scratch`.
    #[arg(long, overrides_with = "ledger_from_scratch")]
    pub no_ledger_from_scratch: bool,

    /// Discard previously imported payments.
    #[arg(long)]
    pub replace: bool,

    /// Additional ledger search criteria for payments to import.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "LEDGER_ARGUMENTS")]
    pub ledger_arguments: Vec<String>,
}

impl LoadArgs {
    /// Whichever of the two from-scratch flags was given last.
    pub fn from_scratch(&self) -> Option<bool> {
        match (self.ledger_from_scratch, self.no_ledger_from_scratch) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

/// Arguments for the `report` subcommand.
#[derive(clap::Args)]
pub struct ReportArgs {
    /// First month in report [default: month of the earliest payment].
    #[arg(long, value_name = "YYYY-MM", value_parser = parse_month)]
    pub start_month: Option<Date>,

    /// Last month in report [default: current month].
    #[arg(long, value_name = "YYYY-MM", value_parser = parse_month)]
    pub end_month: Option<Date>,

    /// Output layout.
    #[arg(short, long, value_enum, default_value_t = Format::Csv)]
    pub format: Format,

    /// Also draw the Total columns as an SVG chart.
    #[arg(long, value_name = "FILE")]
    pub plot: Option<PathBuf>,
}

/// Arguments for the `status` subcommand.
#[derive(clap::Args)]
pub struct StatusArgs {
    /// Date at which to evaluate [default: today].
    #[arg(long, value_name = "YYYY-MM-DD", value_parser = parse_date)]
    pub as_of: Option<Date>,

    /// Entities to show [default: every Annual and Monthly supporter].
    pub entities: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Comma-separated values under a fixed header.
    Csv,
    /// Box-drawn table for the terminal.
    Table,
}

fn parse_month(s: &str) -> Result<Date, FormatError> {
    Date::parse_month(s)
}

fn parse_date(s: &str) -> Result<Date, FormatError> {
    s.parse()
}

#[cfg(test)]
mod test {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn report_months() {
        let cli = Cli::try_parse_from([
            "supporters", "report", "--start-month", "2023-01", "--end-month", "2023-06",
        ])
        .unwrap();
        match cli.command {
            Command::Report(args) => {
                assert_eq!(args.start_month, Some(Date::parse_month("2023-01").unwrap()));
                assert_eq!(args.end_month, Some(Date::parse_month("2023-06").unwrap()));
                assert_eq!(args.format, Format::Csv);
                assert!(args.plot.is_none());
            }
            _ => panic!("expected report"),
        }
    }

    #[test]
    fn malformed_month_is_rejected() {
        assert!(Cli::try_parse_from(["supporters", "report", "--start-month", "Jan 2023"]).is_err());
        assert!(Cli::try_parse_from(["supporters", "report", "--end-month", "2023-13"]).is_err());
    }

    #[test]
    fn load_passes_ledger_arguments_through() {
        let cli = Cli::try_parse_from([
            "supporters", "-v", "load", "--ledger-from-scratch", "--", "-f", "books.ledger", "Income",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Command::Load(args) => {
                assert_eq!(args.from_scratch(), Some(true));
                assert!(!args.replace);
                assert_eq!(args.ledger_arguments, vec!["-f", "books.ledger", "Income"]);
            }
            _ => panic!("expected load"),
        }
    }

    #[test]
    fn last_from_scratch_flag_wins() {
        let from_scratch = |argv: &[&str]| match Cli::try_parse_from(argv.iter().copied()).unwrap().command {
            Command::Load(args) => args.from_scratch(),
            _ => panic!("expected load"),
        };
        assert_eq!(from_scratch(&["supporters", "load"]), None);
        assert_eq!(from_scratch(&["supporters", "load", "--no-ledger-from-scratch"]), Some(false));
        assert_eq!(
            from_scratch(&["supporters", "load", "--no-ledger-from-scratch", "--ledger-from-scratch"]),
            Some(true)
        );
        assert_eq!(
            from_scratch(&["supporters", "load", "--ledger-from-scratch", "--no-ledger-from-scratch"]),
            Some(false)
        );
    }

    #[test]
    fn status_entities() {
        let cli = Cli::try_parse_from([
            "supporters", "--store", "p.csv", "status", "--as-of", "2023-03-01", "Jane Doe",
        ])
        .unwrap();
        assert_eq!(cli.store, Some(PathBuf::from("p.csv")));
        match cli.command {
            Command::Status(args) => {
                assert_eq!(args.as_of, Some("2023-03-01".parse().unwrap()));
                assert_eq!(args.entities, vec!["Jane Doe"]);
            }
            _ => panic!("expected status"),
        }
    }
}
