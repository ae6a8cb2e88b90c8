//! Getting payments in and out of text
//!
//! Ledger exports and the payment store share one five-column record layout.

pub mod ledger;
pub mod store;

use thiserror::Error;

use crate::lib::{date::FormatError, payment::Payment};

/// Column names of a payment record, in order
pub const FIELDS: [&str; 5] = ["date", "entity", "payee", "program", "amount"];

/// Ways in which a single record can be unusable
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("expected {} fields, found {found}", FIELDS.len())]
    FieldCount { found: usize },
    #[error(transparent)]
    Date(#[from] FormatError),
}

/// Build a payment from a `date,entity,payee,program,amount` record
pub fn read_record(record: &csv::StringRecord) -> Result<Payment, RecordError> {
    if record.len() != FIELDS.len() {
        return Err(RecordError::FieldCount { found: record.len() });
    }
    Ok(Payment {
        date: record[0].parse()?,
        entity: record[1].to_string(),
        payee: record[2].to_string(),
        program: record[3].to_string(),
        amount: record[4].to_string(),
    })
}

/// Inverse of `read_record`
pub fn write_record(payment: &Payment) -> [String; 5] {
    [
        payment.date.to_string(),
        payment.entity.clone(),
        payment.payee.clone(),
        payment.program.clone(),
        payment.amount.clone(),
    ]
}

/// Line of the input a record was read from
fn line_of(record: &csv::StringRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or(0)
}
