//! Read-only queries over recorded payments
//!
//! The status engine and the report only ever see payments through
//! `PaymentRepository`, so any storage can back them.

use std::collections::HashSet;
use std::convert::Infallible;

use crate::lib::{date::Date, payment::Payment};

pub trait PaymentRepository {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Distinct entities that paid into a program ending in `:<tag>` for one of `intervals`
    ///
    /// `None` selects every entity with any payment, an empty slice selects none.
    fn supporters(&self, intervals: Option<&[&str]>) -> Result<Vec<String>, Self::Error>;

    /// Payments of `entity` up to and including `as_of`, in ascending date order
    fn payments(&self, entity: &str, as_of: Option<Date>) -> Result<Vec<Payment>, Self::Error>;

    /// Date of the earliest recorded payment
    fn first_payment_date(&self) -> Result<Option<Date>, Self::Error>;
}

/// All payments held in memory, sorted by date
#[derive(Debug, Default, Clone)]
pub struct PaymentLog {
    payments: Vec<Payment>,
}

impl PaymentLog {
    /// Same-day payments keep their relative order
    pub fn new(mut payments: Vec<Payment>) -> Self {
        payments.sort_by_key(|p| p.date);
        Self { payments }
    }

    pub fn len(&self) -> usize {
        self.payments.len()
    }
}

impl PaymentRepository for PaymentLog {
    type Error = Infallible;

    fn supporters(&self, intervals: Option<&[&str]>) -> Result<Vec<String>, Infallible> {
        let mut seen = HashSet::new();
        Ok(self
            .payments
            .iter()
            .filter(|p| match intervals {
                None => true,
                Some(tags) => tags.iter().any(|tag| p.has_interval(tag)),
            })
            .filter(|p| seen.insert(p.entity.as_str()))
            .map(|p| p.entity.clone())
            .collect())
    }

    fn payments(&self, entity: &str, as_of: Option<Date>) -> Result<Vec<Payment>, Infallible> {
        Ok(self
            .payments
            .iter()
            .filter(|p| p.entity == entity)
            .filter(|p| as_of.map(|d| p.date <= d).unwrap_or(true))
            .cloned()
            .collect())
    }

    fn first_payment_date(&self) -> Result<Option<Date>, Infallible> {
        Ok(self.payments.first().map(|p| p.date))
    }
}
