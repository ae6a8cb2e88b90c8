use std::fmt;

use crate::lib::date::Date;

/// One recorded payment, as exported by ledger
///
/// Immutable once recorded. `amount` is kept verbatim and never interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payment {
    pub date: Date,
    pub entity: String,
    pub payee: String,
    pub program: String,
    pub amount: String,
}

/// Periodicity of a supporter, read from the last segment of a program tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interval {
    Annual,
    Monthly,
    /// any other suffix, lapses on the annual schedule
    Other(String),
}

impl Payment {
    /// Payments for non-supporter programs carry an empty tag
    pub fn is_tagged(&self) -> bool {
        !self.program.is_empty()
    }

    /// Interval named by the program tag, `None` if the payment is untagged
    pub fn interval(&self) -> Option<Interval> {
        if self.is_tagged() {
            Some(Interval::from_tag(&self.program))
        } else {
            None
        }
    }

    /// Whether the program tag ends with the `:<suffix>` segment
    pub fn has_interval(&self, suffix: &str) -> bool {
        self.program
            .strip_suffix(suffix)
            .map(|head| head.ends_with(':'))
            .unwrap_or(false)
    }
}

impl Interval {
    /// Parse the final `:`-delimited segment of a program tag
    pub fn from_tag(program: &str) -> Self {
        match program.rsplit(':').next().unwrap_or(program) {
            "Annual" => Interval::Annual,
            "Monthly" => Interval::Monthly,
            other => Interval::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interval::Annual => write!(f, "Annual"),
            Interval::Monthly => write!(f, "Monthly"),
            Interval::Other(s) => write!(f, "{}", s),
        }
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;

    /// Build a payment with only the fields the status logic reads
    pub(crate) fn pay(date: &str, entity: &str, program: &str) -> Payment {
        Payment {
            date: date.parse().unwrap(),
            entity: entity.to_string(),
            payee: format!("{} payee", entity),
            program: program.to_string(),
            amount: "$10.00".to_string(),
        }
    }

    #[test]
    fn interval_from_tag() {
        assert_eq!(Interval::from_tag("Org:Supporters:Annual"), Interval::Annual);
        assert_eq!(Interval::from_tag("Org:Supporters:Monthly"), Interval::Monthly);
        assert_eq!(Interval::from_tag("Monthly"), Interval::Monthly);
        assert_eq!(
            Interval::from_tag("Org:Supporters:Lifetime"),
            Interval::Other("Lifetime".to_string())
        );
    }

    #[test]
    fn untagged_has_no_interval() {
        assert_eq!(pay("2023-01-01", "a", "").interval(), None);
        assert_eq!(
            pay("2023-01-01", "a", "Org:Supporters:Monthly").interval(),
            Some(Interval::Monthly)
        );
    }

    #[test]
    fn has_interval() {
        let p = pay("2023-01-01", "a", "Org:Supporters:Annual");
        assert!(p.has_interval("Annual"));
        assert!(!p.has_interval("Monthly"));
        assert!(!p.has_interval("nnual"));
        assert!(!pay("2023-01-01", "a", "Annual").has_interval("Annual"));
    }
}
