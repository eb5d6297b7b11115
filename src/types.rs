use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// unique identifier for an index table
pub type IndexTableId = Uuid;

/// where an index table or value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Provenance {
    #[default]
    Manual,
    /// loaded from a spreadsheet/csv file
    Imported,
    /// pulled from an official statistics provider
    Synced,
}

/// how a table's published values turn into a monthly factor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum IndexKind {
    /// value is the month's percentage variation (e.g. 0.42 means 0.42%)
    #[default]
    MonthlyRate,
    /// value is a cumulative index number; variation is value(m) / value(m-1) - 1
    NumberIndex,
}

/// calculation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CalculationMode {
    /// index and interest terms chosen by the user
    #[default]
    Standard,
    /// index and interest dictated by the legislative era of each month
    PublicTreasury,
}

/// interest compounding type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum InterestType {
    #[default]
    Simple,
    Compound,
}

/// unit the interest rate refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Periodicity {
    Daily,
    #[default]
    Monthly,
    Yearly,
}

/// A competence: the calendar month an index value or accrual refers to.
///
/// Stored as the first day of the month. Serialized as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Competence(NaiveDate);

impl Competence {
    /// create from year and month, None for an invalid month
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(Competence)
    }

    /// competence a date belongs to
    pub fn from_date(date: NaiveDate) -> Self {
        Competence(date - Duration::days(i64::from(date.day0())))
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.0
    }

    pub fn last_day(&self) -> NaiveDate {
        self.0 + Duration::days(i64::from(self.days_in_month()) - 1)
    }

    pub fn days_in_month(&self) -> u32 {
        days_in_month(self.year(), self.month())
    }

    pub fn next(&self) -> Competence {
        Competence(self.0 + Duration::days(i64::from(self.days_in_month())))
    }

    pub fn previous(&self) -> Competence {
        Competence::from_date(self.0 - Duration::days(1))
    }

    /// Competences touched by the half-open day interval `[from, to)`.
    ///
    /// Partial first and last months count as touched; an empty interval
    /// touches nothing.
    pub fn span(from: NaiveDate, to: NaiveDate) -> Vec<Competence> {
        let mut months = Vec::new();
        if to <= from {
            return months;
        }

        let last = Competence::from_date(to - Duration::days(1));
        let mut current = Competence::from_date(from);
        while current <= last {
            months.push(current);
            current = current.next();
        }
        months
    }
}

impl fmt::Display for Competence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl FromStr for Competence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| format!("invalid competence: {}", s))?;
        let year: i32 = year.parse().map_err(|_| format!("invalid competence year: {}", s))?;
        let month: u32 = month.parse().map_err(|_| format!("invalid competence month: {}", s))?;
        Competence::new(year, month).ok_or_else(|| format!("invalid competence: {}", s))
    }
}

impl TryFrom<String> for Competence {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Competence> for String {
    fn from(c: Competence) -> Self {
        c.to_string()
    }
}

/// whole months elapsed between two dates, truncated
pub fn whole_months_between(start: NaiveDate, end: NaiveDate) -> u32 {
    if end <= start {
        return 0;
    }
    let mut months = (end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32;
    if end.day() < start.day() {
        months -= 1;
    }
    months.max(0) as u32
}

/// check if year is a leap year
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}
