//! Month-by-month counts of supporters per status
//!
//! Each row evaluates every Annual and every Monthly supporter as of the
//! first day of its month.

use std::io;
use std::ops;

use thiserror::Error;
use tracing::{debug, info};

use crate::lib::{
    date::Date,
    repository::PaymentRepository,
    status::{self, Status},
};

/// Interval categories reported side by side, in column order
pub const CATEGORIES: [&str; 2] = ["Annual", "Monthly"];

pub const HEADER: [&str; 13] = [
    "Month",
    "Annual New", "Annual Active", "Annual Lapsed", "Annual Lost",
    "Monthly New", "Monthly Active", "Monthly Lapsed", "Monthly Lost",
    "Total New", "Total Active", "Total Lapsed", "Total Lost",
];

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("end month {end} predates start month {start}")]
    Range { start: String, end: String },
    #[error("failed to query payments")]
    Repository(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Raw number of supporters in each status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally([usize; Status::COUNT]);

impl Tally {
    pub fn query(&self, status: Status) -> usize {
        self.0[status as usize]
    }
}

impl ops::AddAssign<Status> for Tally {
    fn add_assign(&mut self, status: Status) {
        self.0[status as usize] += 1;
    }
}

impl ops::Add for Tally {
    type Output = Self;

    fn add(mut self, other: Self) -> Self {
        for (a, b) in self.0.iter_mut().zip(other.0) {
            *a += b;
        }
        self
    }
}

/// Counts as displayed
///
/// `active` includes the new supporters: it is the sum of the raw
/// New and Active tallies, not a status of its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counts {
    pub new: usize,
    pub active: usize,
    pub lapsed: usize,
    pub lost: usize,
}

impl From<Tally> for Counts {
    fn from(t: Tally) -> Self {
        Self {
            new: t.query(Status::New),
            active: t.query(Status::New) + t.query(Status::Active),
            lapsed: t.query(Status::Lapsed),
            lost: t.query(Status::Lost),
        }
    }
}

impl Counts {
    pub fn fields(&self) -> [usize; 4] {
        [self.new, self.active, self.lapsed, self.lost]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub month: Date,
    pub annual: Counts,
    pub monthly: Counts,
    pub total: Counts,
}

impl ReportRow {
    /// The twelve counts in `HEADER` order (after the month label)
    pub fn counts(&self) -> Vec<usize> {
        [self.annual, self.monthly, self.total]
            .iter()
            .flat_map(Counts::fields)
            .collect()
    }

    pub fn record(&self) -> Vec<String> {
        std::iter::once(self.month.month_label())
            .chain(self.counts().into_iter().map(|n| n.to_string()))
            .collect()
    }
}

/// First days of the months between two dates, both ends included
#[derive(Debug, Clone)]
pub struct Months {
    next: Date,
    end: Date,
}

impl Months {
    pub fn between(start: Date, end: Date) -> Self {
        Self { next: start.start_of_month(), end }
    }
}

impl Iterator for Months {
    type Item = Date;

    fn next(&mut self) -> Option<Date> {
        if self.next <= self.end {
            let month = self.next;
            self.next = month.round_month_up();
            Some(month)
        } else {
            None
        }
    }
}

/// Tally the statuses of one interval category as of `month`
fn tally<R>(repo: &R, category: &str, month: Date) -> Result<Tally, R::Error>
where
    R: PaymentRepository,
{
    let mut tally = Tally::default();
    for entity in repo.supporters(Some(&[category]))? {
        let payments = repo.payments(&entity, Some(month))?;
        if let Some(s) = status::status(&payments, month) {
            tally += s;
        }
    }
    Ok(tally)
}

fn report_month<R>(repo: &R, month: Date) -> Result<ReportRow, R::Error>
where
    R: PaymentRepository,
{
    let annual = tally(repo, CATEGORIES[0], month)?;
    let monthly = tally(repo, CATEGORIES[1], month)?;
    debug!(month = %month.month_label(), ?annual, ?monthly, "month tallied");
    Ok(ReportRow {
        month,
        annual: annual.into(),
        monthly: monthly.into(),
        total: (annual + monthly).into(),
    })
}

/// One row per month from `start` to `end` inclusive
pub fn generate<R>(start: Date, end: Date, repo: &R) -> Result<Vec<ReportRow>, ReportError>
where
    R: PaymentRepository,
{
    let start = start.start_of_month();
    if end < start {
        return Err(ReportError::Range {
            start: start.month_label(),
            end: end.month_label(),
        });
    }
    info!(start = %start.month_label(), end = %end.month_label(), "generating report");
    Months::between(start, end)
        .map(|month| report_month(repo, month))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ReportError::Repository(Box::new(e)))
}

/// Write rows as CSV under the fixed header
pub fn write_csv<W: io::Write>(rows: &[ReportRow], out: W) -> csv::Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(HEADER)?;
    for row in rows {
        writer.write_record(row.record())?;
    }
    writer.flush()?;
    Ok(())
}
