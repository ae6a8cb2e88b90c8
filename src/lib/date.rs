//! Day-precise time management, with a focus on month-length edge cases
//!
//! Dates are `YYYY-MM-DD`, not number of seconds, and provide an interface
//! for dealing with durations that are expressed in number of days, months
//! or years.
//!
//! Month arithmetic never overflows into the next month: the day is
//! truncated to fit (`2023-01-31` plus one month is `2023-02-28`).

use chrono::Datelike;
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use pest::Parser;
use pest_derive::*;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A date with day-precision
///
/// Supports years in the range 1000..=9999.
///
/// Ordering is chronological. All methods except `jump_day`
/// execute in constant time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Date {
    year: u16,
    month: Month,
    day: u8,
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}-{:02}", self.year, self.month.number(), self.day)
    }
}

/// Twelve months in the year, identified by their 3-letter abbreviations
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromPrimitive, PartialOrd, Ord, Hash)]
pub enum Month {
    Jan = 0,
    Feb,
    Mar,
    Apr,
    May,
    Jun,
    Jul,
    Aug,
    Sep,
    Oct,
    Nov,
    Dec,
}

impl Month {
    const ALL: [Month; 12] = {
        use Month::*;
        [Jan, Feb, Mar, Apr, May, Jun, Jul, Aug, Sep, Oct, Nov, Dec]
    };

    /// Month from its calendar number (`1` is `Jan`, `12` is `Dec`)
    pub fn from_number(n: usize) -> Option<Self> {
        Self::from_usize(n.checked_sub(1)?)
    }

    /// Calendar number of the month, in `1..=12`
    pub fn number(self) -> u8 {
        self as u8 + 1
    }

    /// Month directly succeeding the current one with wrapping
    pub fn next(self) -> Self {
        Self::ALL[(self as usize + 1) % 12]
    }

    /// Month directly preceding the current one with wrapping
    pub fn prev(self) -> Self {
        Self::ALL[(self as usize + 11) % 12]
    }

    /// Number of days in this month of the given year
    pub fn count(self, year: u16) -> u8 {
        use Month::*;
        match self {
            Jan | Mar | May | Jul | Aug | Oct | Dec => 31,
            Apr | Jun | Sep | Nov => 30,
            Feb => if is_leap(year) { 29 } else { 28 },
        }
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Ways in which a date taken from user input can be wrong
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DateError {
    /// year is outside of 1000..=9999
    #[error("{0} is outside of the supported range for years")]
    UnsupportedYear(usize),
    /// month number outside of 1..=12
    #[error("{0} is not a valid month")]
    InvalidMonth(usize),
    /// Feb 29 of a non-leap year
    #[error("{0} is not bissextile, Feb 29 does not exist")]
    NotBissextile(usize),
    /// Feb 30 or Feb 31 or 31st day of a 30-day month
    #[error("{0} is a short month, it does not have a {1}th day")]
    MonthTooShort(Month, usize),
    /// day outside of 1..=31
    #[error("{0} is not a valid day")]
    InvalidDay(usize),
}

impl DateError {
    /// What message to show to help fix the date error
    pub fn fix_hint(&self) -> String {
        use DateError::*;
        match *self {
            UnsupportedYear(_) => "year should be between 1000 and 9999 inclusive".to_string(),
            InvalidMonth(m) => format!("{} is not in the range 1 ..= 12", m),
            NotBissextile(y) => format!("did you mean {y}-02-28 or {y}-03-01 ?", y = y),
            MonthTooShort(m, d) => format!("{} is only {} days long", m,
                if m == Month::Feb { 28.max(d - 1) } else { 30 }
            ),
            InvalidDay(d) => format!("{} is not in the range 1 ..= 31", d),
        }
    }
}

/// Text that could not be read as a date
#[derive(Debug, Error)]
pub enum FormatError {
    /// does not follow the expected layout at all
    #[error("malformed date '{text}', expected {layout}")]
    Syntax {
        text: String,
        layout: &'static str,
        #[source]
        source: Box<pest::error::Error<Rule>>,
    },
    /// well-formed but not a day of the calendar
    #[error("invalid date '{text}' ({hint})", hint = .source.fix_hint())]
    Invalid {
        text: String,
        #[source]
        source: DateError,
    },
}

/// Pest-generated parser for `YYYY-MM` and `YYYY-MM-DD`
#[derive(Parser)]
#[grammar = "lib/date.pest"]
struct DateParser;

impl Date {
    /// Validate year-month-day into date
    pub fn from(year: usize, month: Month, day: usize) -> Result<Self, DateError> {
        if !(1000..=9999).contains(&year) {
            Err(DateError::UnsupportedYear(year))
        } else if day == 0 || day > 31 {
            Err(DateError::InvalidDay(day))
        } else if day <= month.count(year as u16) as usize {
            Ok(Self { year: year as u16, month, day: day as u8 })
        } else if day >= 30 {
            Err(DateError::MonthTooShort(month, day))
        } else {
            Err(DateError::NotBissextile(year))
        }
    }

    /// Current date according to the local clock
    pub fn today() -> Result<Self, DateError> {
        Self::try_from(chrono::Local::now().date_naive())
    }

    /// Parse a `YYYY-MM` month into the first day of that month
    pub fn parse_month(s: &str) -> Result<Self, FormatError> {
        parse_with(Rule::month_date, "YYYY-MM", s)
    }

    /// `YYYY-MM` label of the month this date falls in
    pub fn month_label(&self) -> String {
        format!("{}-{:02}", self.year, self.month.number())
    }

    /// Biject the dates with integers
    ///
    /// This indexing is guaranteed consistent in the sense that
    /// for any date `d`,
    ///
    ///     assert_eq!(d.index() + 1, d.next().index());
    pub fn index(self) -> usize {
        let leaps = {
            let years = if self.month <= Month::Feb {
                self.year as usize - 1
            } else {
                self.year as usize
            };
            // count leap years before current
            (years / 4) - (years / 100) + (years / 400)
        };
        let mut n = self.year as usize * 365 + self.day as usize;
        // partially elapsed current year
        n += [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334][self.month as usize];
        n += leaps; // each leap year adds one day
        n
    }

    /// Signed number of days from `other` to `self`
    ///
    /// Positive when `self` is the later date.
    pub fn days_since(self, other: Self) -> isize {
        self.index() as isize - other.index() as isize
    }

    pub fn next(self) -> Self {
        if self.month.count(self.year) == self.day {
            if self.month == Month::Dec {
                Self { year: self.year + 1, month: Month::Jan, day: 1 }
            } else {
                Self { month: self.month.next(), day: 1, ..self }
            }
        } else {
            Self { day: self.day + 1, ..self }
        }
    }

    pub fn prev(self) -> Self {
        if self.day == 1 {
            if self.month == Month::Jan {
                Self { year: self.year - 1, month: Month::Dec, day: 31 }
            } else {
                let month = self.month.prev();
                Self { month, day: month.count(self.year), ..self }
            }
        } else {
            Self { day: self.day - 1, ..self }
        }
    }

    /// `count` days before/after current date
    pub fn jump_day(self, count: isize) -> Self {
        let target = self.index() as isize + count;
        // whole years first, never more than `count` days away
        let mut d = self.jump_year(count / 366);
        while (d.index() as isize) < target {
            d = d.next();
        }
        while (d.index() as isize) > target {
            d = d.prev();
        }
        d
    }

    /// `count` months before/after current date
    ///
    /// Day will be truncated to fit in the new month:
    /// adding one month to `2000-01-31` makes it `2000-02-29`
    pub fn jump_month(self, count: isize) -> Self {
        self.jump_month_on(count, self.day)
    }

    /// `count` months before/after current date, landing on `day`
    ///
    /// Day will be truncated to fit in the new month, exactly like `jump_month`.
    /// The year is not checked against the range `Date::from` accepts:
    /// a lapse date computed from `9999-12-15` is `10001-01-01`, which still
    /// compares after every valid date.
    pub fn jump_month_on(self, count: isize, day: u8) -> Self {
        let months = self.year as isize * 12 + self.month as isize + count;
        let year = months.div_euclid(12) as u16;
        let month = Month::ALL[months.rem_euclid(12) as usize];
        Self {
            year,
            month,
            day: day.clamp(1, month.count(year)),
        }
    }

    /// `count` years before/after current date
    ///
    /// Day will be truncated in the rare case it is needed:
    /// adding one year to `2000-02-29` makes it `2001-02-28`
    pub fn jump_year(self, count: isize) -> Self {
        self.jump_month(count * 12)
    }

    /// First day of the month following the current one
    ///
    /// Unconditional: `2023-03-01` rounds up to `2023-04-01`.
    pub fn round_month_up(self) -> Self {
        self.jump_month_on(1, 1)
    }

    /// Get date of the first day of the current month
    pub fn start_of_month(self) -> Self {
        Self { day: 1, ..self }
    }
}

impl FromStr for Date {
    type Err = FormatError;

    /// Parse a full `YYYY-MM-DD` date
    fn from_str(s: &str) -> Result<Self, FormatError> {
        parse_with(Rule::full_date, "YYYY-MM-DD", s)
    }
}

impl TryFrom<chrono::NaiveDate> for Date {
    type Error = DateError;

    fn try_from(date: chrono::NaiveDate) -> Result<Self, DateError> {
        let year = usize::try_from(date.year()).unwrap_or(0);
        let month = Month::from_u32(date.month0())
            .ok_or(DateError::InvalidMonth(date.month() as usize))?;
        Self::from(year, month, date.day() as usize)
    }
}

fn parse_with(rule: Rule, layout: &'static str, s: &str) -> Result<Date, FormatError> {
    let pairs = DateParser::parse(rule, s).map_err(|e| FormatError::Syntax {
        text: s.to_string(),
        layout,
        source: Box::new(e),
    })?;
    let (mut year, mut month, mut day) = (0, 0, 1);
    for pair in pairs.flatten() {
        match pair.as_rule() {
            Rule::year => year = digits(pair.as_str()),
            Rule::month => month = digits(pair.as_str()),
            Rule::day => day = digits(pair.as_str()),
            _ => (),
        }
    }
    let invalid = |source| FormatError::Invalid { text: s.to_string(), source };
    let month = Month::from_number(month).ok_or_else(|| invalid(DateError::InvalidMonth(month)))?;
    Date::from(year, month, day).map_err(invalid)
}

// the grammar only lets ASCII digits through
fn digits(s: &str) -> usize {
    s.bytes().fold(0, |n, b| n * 10 + (b - b'0') as usize)
}

fn is_leap(year: u16) -> bool {
    if year % 400 == 0 {
        true
    } else if year % 100 == 0 {
        false
    } else {
        year % 4 == 0
    }
}

#[cfg(test)]
mod test {
    use super::{
        *,
        Month::*,
    };

    #[test]
    fn bissextile_check() {
        macro_rules! yes {
            ( $y:expr ) => { assert!(is_leap($y)); }
        }
        macro_rules! no {
            ( $y:expr ) => { assert!(!is_leap($y)); }
        }
        yes!(2004);
        no!(2100);
        yes!(2000);
        no!(2001);
        no!(2023);
        yes!(2024);
    }

    macro_rules! ok {
        ( $y:tt - $m:tt - $d:tt ) => {
            assert_eq!(Date::from($y, $m, $d), Ok(Date { year: $y, month: $m, day: $d }));
        }
    }
    macro_rules! short {
        ( $y:tt - $m:tt - $d:tt ) => {
            assert_eq!(Date::from($y, $m, $d), Err(DateError::MonthTooShort($m, $d)));
        }
    }
    macro_rules! nbiss {
        ( $y:tt - $m:tt - $d:tt ) => {
            assert_eq!(Date::from($y, $m, $d), Err(DateError::NotBissextile($y)));
        }
    }

    #[test]
    fn validation() {
        ok!(2020-Jan-31);
        short!(2020-Apr-31);
        short!(2020-Feb-30);
        ok!(2020-Feb-29);
        nbiss!(2021-Feb-29);
        ok!(2021-Feb-28);
        assert_eq!(Date::from(2020, Jan, 0), Err(DateError::InvalidDay(0)));
        assert_eq!(Date::from(999, Jan, 1), Err(DateError::UnsupportedYear(999)));
    }

    macro_rules! dt {
        ( $y:tt - $m:tt - $d:tt ) => {
            Date::from($y, $m, $d).unwrap()
        }
    }

    #[test]
    fn index_consistent() {
        let mut d = Date::from(2000, Jan, 1).unwrap();
        let end = Date::from(2100, Dec, 31).unwrap();
        while d < end {
            let ds = d.next();
            let n = d.index() + 1;
            let ns = ds.index();
            if n != ns {
                panic!("date {}, successor {}, expected {} == {}", d, ds, n, ns);
            }
            d = ds;
        }
    }

    #[test]
    fn days_since() {
        assert_eq!(dt!(2023-Mar-1).days_since(dt!(2023-Feb-28)), 1);
        assert_eq!(dt!(2024-Mar-1).days_since(dt!(2024-Feb-28)), 2);
        assert_eq!(dt!(2023-Feb-28).days_since(dt!(2023-Mar-1)), -1);
        assert_eq!(dt!(2024-Mar-1).days_since(dt!(2023-Mar-1)), 366);
        assert_eq!(dt!(2023-Mar-1).days_since(dt!(2023-Mar-1)), 0);
    }

    macro_rules! jday {
        ( $d1:expr, $n:expr, $d2:expr ) => {{
            assert_eq!($d1.jump_day($n), $d2);
            assert_eq!($d2.jump_day(-$n), $d1);
        }}
    }

    #[test]
    fn jump_day() {
        jday!(dt!(2020-Jan-31), 1, dt!(2020-Feb-1));
        jday!(dt!(2021-Feb-28), 1, dt!(2021-Mar-1));
        jday!(dt!(2020-Dec-31), 1, dt!(2021-Jan-1));
        jday!(dt!(2023-Mar-1), 365, dt!(2024-Feb-29));
        jday!(dt!(2023-Mar-1), 364, dt!(2024-Feb-28));
        jday!(dt!(2000-Jan-1), 365242, dt!(2999-Dec-31));
    }

    macro_rules! jmonth {
        ( $d1:expr, $n:expr, <->, $d2:expr ) => {{
            assert_eq!($d1.jump_month($n), $d2);
            assert_eq!($d2.jump_month(-$n), $d1);
        }};
        ( $d1:expr, $n:expr, ->, $d2:expr ) => {{
            assert_eq!($d1.jump_month($n), $d2);
        }};
    }

    #[test]
    fn jump_month() {
        jmonth!(dt!(2020-Jan-1), 2, <->, dt!(2020-Mar-1));
        jmonth!(dt!(2020-Dec-1), 1, <->, dt!(2021-Jan-1));
        jmonth!(dt!(2020-Dec-30), 1, <->, dt!(2021-Jan-30));
        jmonth!(dt!(2020-Mar-31), 1, ->, dt!(2020-Apr-30));
        jmonth!(dt!(2019-Dec-31), 2, ->, dt!(2020-Feb-29));
        jmonth!(dt!(2023-Jan-31), 1, ->, dt!(2023-Feb-28));
        jmonth!(dt!(2024-Jan-31), 1, ->, dt!(2024-Feb-29));
        jmonth!(dt!(2020-Jan-15), 25, <->, dt!(2022-Feb-15));
        jmonth!(dt!(2021-Jan-15), -13, <->, dt!(2019-Dec-15));
    }

    #[test]
    fn jump_month_on() {
        assert_eq!(dt!(2023-Jul-1).jump_month_on(-1, 1), dt!(2023-Jun-1));
        assert_eq!(dt!(2023-Jan-20).jump_month_on(-1, 1), dt!(2022-Dec-1));
        assert_eq!(dt!(2023-Jan-5).jump_month_on(1, 31), dt!(2023-Feb-28));
    }

    #[test]
    fn jump_year() {
        assert_eq!(dt!(2020-Jan-1).jump_year(1), dt!(2021-Jan-1));
        assert_eq!(dt!(2020-Feb-29).jump_year(1), dt!(2021-Feb-28));
        assert_eq!(dt!(2020-Feb-29).jump_year(4), dt!(2024-Feb-29));
        assert_eq!(dt!(2021-Mar-31).jump_year(-1), dt!(2020-Mar-31));
    }

    #[test]
    fn round_month_up() {
        assert_eq!(dt!(2023-Mar-1).round_month_up(), dt!(2023-Apr-1));
        assert_eq!(dt!(2023-Mar-15).round_month_up(), dt!(2023-Apr-1));
        assert_eq!(dt!(2023-Mar-31).round_month_up(), dt!(2023-Apr-1));
        assert_eq!(dt!(2023-Dec-31).round_month_up(), dt!(2024-Jan-1));
    }

    #[test]
    fn time_boundaries() {
        assert_eq!(dt!(2020-Mar-26).start_of_month(), dt!(2020-Mar-1));
        assert_eq!(dt!(2020-Mar-1).start_of_month(), dt!(2020-Mar-1));
    }

    #[test]
    fn display() {
        assert_eq!(dt!(2023-Mar-5).to_string(), "2023-03-05");
        assert_eq!(dt!(2023-Nov-30).month_label(), "2023-11");
    }

    #[test]
    fn parse_month() {
        assert_eq!(Date::parse_month("2023-06").unwrap(), dt!(2023-Jun-1));
        assert_eq!(Date::parse_month("2023-6").unwrap(), dt!(2023-Jun-1));
        assert!(matches!(Date::parse_month("2023-13"), Err(FormatError::Invalid { .. })));
        assert!(matches!(Date::parse_month("June 2023"), Err(FormatError::Syntax { .. })));
        assert!(matches!(Date::parse_month("2023-06-01"), Err(FormatError::Syntax { .. })));
        assert!(matches!(Date::parse_month(""), Err(FormatError::Syntax { .. })));
    }

    #[test]
    fn parse_full_date() {
        assert_eq!("2023-01-10".parse::<Date>().unwrap(), dt!(2023-Jan-10));
        assert!(matches!("2023-02-29".parse::<Date>(), Err(FormatError::Invalid { .. })));
        assert!(matches!("2023-01".parse::<Date>(), Err(FormatError::Syntax { .. })));
        assert!(matches!("10/01/2023".parse::<Date>(), Err(FormatError::Syntax { .. })));
    }

    #[test]
    fn format_error_message() {
        let err = Date::parse_month("2023-00").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("'2023-00'"));
        assert!(msg.contains("1 ..= 12"));
    }

    #[test]
    fn arithmetic_past_supported_years() {
        let last = dt!(9999-Dec-15);
        let lapse = last.jump_year(1).round_month_up();
        assert_eq!(lapse.to_string(), "10001-01-01");
        assert!(lapse > last);
        assert_eq!(lapse.days_since(last), 383);
        assert!(Date::from(10001, Month::Jan, 1).is_err());
    }

    #[test]
    fn from_chrono() {
        let naive = chrono::NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(Date::try_from(naive), Ok(dt!(2024-Feb-29)));
        assert!(Date::today().is_ok());
    }
}
