//! Status command: standing of individual supporters.

use std::io;

use anyhow::{Context, Result};
use tracing::{debug, info_span};

use crate::cli::StatusArgs;
use crate::lib::{
    date::Date,
    report::CATEGORIES,
    repository::PaymentRepository,
    status::{self, Standing},
};
use crate::load::store::Store;

const HEADER: [&str; 6] = [
    "Entity",
    "Interval",
    "First Payment",
    "Last Payment",
    "Lapse Date",
    "Status",
];

/// Print one CSV line per supporter that paid by the as-of date.
pub fn run(args: StatusArgs, store: &Store) -> Result<()> {
    let _cmd = info_span!("status").entered();
    let log = store.read()?;
    let as_of = match args.as_of {
        Some(date) => date,
        None => Date::today().context("the system clock is outside the supported years")?,
    };
    let entities = if args.entities.is_empty() {
        log.supporters(Some(&CATEGORIES))?
    } else {
        args.entities
    };

    let mut out = csv::Writer::from_writer(io::stdout().lock());
    out.write_record(HEADER)?;
    for entity in entities {
        let payments = log.payments(&entity, Some(as_of))?;
        match status::standing(&payments, as_of) {
            Some(standing) => out.write_record(record(&entity, &standing))?,
            None => debug!(%entity, %as_of, "no payments yet"),
        }
    }
    out.flush()?;
    Ok(())
}

fn record(entity: &str, s: &Standing) -> [String; 6] {
    [
        entity.to_string(),
        s.interval.as_ref().map(|i| i.to_string()).unwrap_or_default(),
        s.first_payment.to_string(),
        s.last_payment.to_string(),
        s.lapse_date.to_string(),
        s.status.to_string(),
    ]
}
