//! Classification of a supporter from their payment history
//!
//! Everything here is a pure function of an ordered payment list and an
//! as-of date: nothing is stored, and the same inputs always produce the
//! same standing.

use std::fmt;

use crate::lib::{
    date::Date,
    payment::{Interval, Payment},
};

/// Days past the lapse date after which a supporter is considered lost
pub const LOST_THRESHOLD_DAYS: isize = 365;
/// Days past the lapse date after which a supporter is considered lapsed
pub const LAPSED_THRESHOLD_DAYS: isize = 0;
/// Length of the window in which a first payment makes a supporter new
pub const NEW_WINDOW_MONTHS: isize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Status {
    New,
    Active,
    Lapsed,
    Lost,
}

impl Status {
    pub const COUNT: usize = 4;
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Everything derived about a supporter as of one date
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Standing {
    pub interval: Option<Interval>,
    pub first_payment: Date,
    pub last_payment: Date,
    pub lapse_date: Date,
    pub status: Status,
}

/// Interval of the most recent tagged payment
///
/// Among payments on the same day, the latest in the list wins.
pub fn interval(payments: &[Payment]) -> Option<Interval> {
    payments
        .iter()
        .filter(|p| p.is_tagged())
        .max_by_key(|p| p.date)
        .and_then(Payment::interval)
}

/// First date at which a supporter who last paid on `last_payment` is overdue
///
/// Anything that is not `Monthly` is due yearly.
pub fn lapse_date(last_payment: Date, interval: Option<&Interval>) -> Date {
    match interval {
        Some(Interval::Monthly) => last_payment.jump_month(1).round_month_up(),
        _ => last_payment.jump_year(1).round_month_up(),
    }
}

/// Full derivation of the standing as of `as_of`
///
/// `payments` must be in ascending date order; those after `as_of` are ignored.
/// `None` when no payment was made by `as_of`.
pub fn standing(payments: &[Payment], as_of: Date) -> Option<Standing> {
    let visible = payments
        .iter()
        .filter(|p| p.date <= as_of)
        .cloned()
        .collect::<Vec<_>>();
    let first_payment = visible.first()?.date;
    let last_payment = visible.last()?.date;
    let interval = interval(&visible);
    let lapse_date = lapse_date(last_payment, interval.as_ref());
    let days_past_due = as_of.days_since(lapse_date);
    let status = if days_past_due >= LOST_THRESHOLD_DAYS {
        Status::Lost
    } else if days_past_due >= LAPSED_THRESHOLD_DAYS {
        Status::Lapsed
    } else if as_of.jump_month_on(-NEW_WINDOW_MONTHS, 1) < first_payment {
        Status::New
    } else {
        Status::Active
    };
    Some(Standing {
        interval,
        first_payment,
        last_payment,
        lapse_date,
        status,
    })
}

/// Status as of `as_of`, `None` when no payment was made by then
pub fn status(payments: &[Payment], as_of: Date) -> Option<Status> {
    standing(payments, as_of).map(|s| s.status)
}
