//! Report command: monthly supporter counts.

use std::io;

use anyhow::{Context, Result};
use tracing::{info, info_span};

use crate::cli::{plot::Plotter, table::Table, Format, ReportArgs};
use crate::lib::{
    date::{Date, DateError},
    report,
    repository::PaymentRepository,
};
use crate::load::store::Store;

/// Generate the report over the stored payments and print it.
pub fn run(args: ReportArgs, store: &Store) -> Result<()> {
    let _cmd = info_span!("report").entered();
    let log = store.read()?;
    info!(payments = log.len(), "payment store loaded");

    let (start, end) = report_range(&args, &log, Date::today)?;
    let rows = report::generate(start, end, &log)?;

    match args.format {
        Format::Csv => report::write_csv(&rows, io::stdout().lock())?,
        Format::Table => print!("{}", Table::from(&rows)),
    }
    if let Some(path) = args.plot {
        Plotter::from(&rows)
            .save(&path)
            .with_context(|| format!("failed to write chart: {}", path.display()))?;
        info!(path = %path.display(), "chart written");
    }
    Ok(())
}

/// First and last month to report on.
///
/// Without flags the report runs from the month of the earliest payment to
/// the current month, which needs at least one stored payment.
fn report_range<R, F>(args: &ReportArgs, repo: &R, today: F) -> Result<(Date, Date)>
where
    R: PaymentRepository,
    F: FnOnce() -> Result<Date, DateError>,
{
    let start = match args.start_month {
        Some(month) => month,
        None => repo
            .first_payment_date()?
            .map(Date::start_of_month)
            .context("the payment store is empty, nothing to report")?,
    };
    let end = match args.end_month {
        Some(month) => month,
        None => today().context("the system clock is outside the supported years")?,
    };
    Ok((start, end))
}
