//! Run ledger and read the payments it reports

use std::io;
use std::process::{Command, ExitStatus, Stdio};

use thiserror::Error;
use tracing::{debug, info};

use crate::lib::payment::Payment;
use crate::load::{line_of, read_record, RecordError};

/// Ledger `--csv-format` expression for each exported column
const COLUMN_FORMATS: [&str; 5] = [
    r#"%(format_date(date, "%Y-%m-%d"))"#,
    r#"%(quoted(meta("Entity")))"#,
    "%(quoted(payee))",
    r#"%(quoted(meta("Program")))"#,
    "%(quoted(display_amount))",
];

/// Restricts the export to supporter programs
const SUPPORTER_LIMIT: &str = r#"tag("Program") =~ /:Supporters:/"#;
/// Restricts the export to income postings
const INCOME_ACCOUNTS: &str = "/^Income:/";

/// Locale variables in the order ledger's C library consults them
const LOCALE_VARS: [&str; 3] = ["LC_ALL", "LC_CTYPE", "LANG"];

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to run `{command}`")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },
    #[error("`{command}` exited with {status}")]
    Failed { command: String, status: ExitStatus },
    #[error("unreadable ledger output")]
    Csv(#[from] csv::Error),
    #[error("bad payment on line {line} of ledger output")]
    Record {
        line: u64,
        #[source]
        source: RecordError,
    },
}

/// How to invoke ledger for an export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerQuery {
    /// name or path of the ledger executable
    pub command: String,
    /// skip the default supporter/income search criteria
    pub from_scratch: bool,
    /// additional search criteria
    pub arguments: Vec<String>,
}

impl LedgerQuery {
    /// Arguments passed to the ledger executable
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            "csv".to_string(),
            "--csv-format".to_string(),
            format!("{}\n", COLUMN_FORMATS.join(",")),
            "--sort".to_string(),
            "date".to_string(),
        ];
        if self.from_scratch {
            args.extend(self.arguments.iter().cloned());
        } else {
            args.push("--limit".to_string());
            args.push(SUPPORTER_LIMIT.to_string());
            args.extend(self.arguments.iter().cloned());
            args.push(INCOME_ACCOUNTS.to_string());
        }
        args
    }

    /// Run ledger to completion and parse its output
    pub fn run(&self) -> Result<Vec<Payment>, LoadError> {
        let args = self.args();
        let (var, value) = utf8_locale(|name| std::env::var(name).ok());
        info!(command = %self.command, ?args, "running ledger");
        debug!(%var, %value, "forcing UTF-8 output");
        let output = Command::new(&self.command)
            .args(&args)
            .env(var, value)
            .stdin(Stdio::null())
            .stderr(Stdio::inherit())
            .output()
            .map_err(|source| LoadError::Spawn {
                command: self.command.clone(),
                source,
            })?;
        if !output.status.success() {
            return Err(LoadError::Failed {
                command: self.command.clone(),
                status: output.status,
            });
        }
        read_payments(output.stdout.as_slice())
    }
}

/// Parse headerless ledger CSV output
pub fn read_payments<R: io::Read>(input: R) -> Result<Vec<Payment>, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(input);
    let mut payments = Vec::new();
    for record in reader.records() {
        let record = record?;
        let payment = read_record(&record).map_err(|source| LoadError::Record {
            line: line_of(&record),
            source,
        })?;
        payments.push(payment);
    }
    debug!(count = payments.len(), "ledger output parsed");
    Ok(payments)
}

/// Locale variable to set so that ledger writes UTF-8
///
/// The first of `LOCALE_VARS` that is set keeps its language and gets a
/// `.utf8` encoding; when none is set, `LC_CTYPE` is set to `en_US.utf8`.
fn utf8_locale<F>(lookup: F) -> (&'static str, String)
where
    F: Fn(&str) -> Option<String>,
{
    for var in LOCALE_VARS {
        if let Some(value) = lookup(var) {
            let language = value.split('.').next().unwrap_or_default();
            return (var, format!("{}.utf8", language));
        }
    }
    ("LC_CTYPE", "en_US.utf8".to_string())
}
