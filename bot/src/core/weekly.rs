//! Mapping between weekly issue titles, periods, dates and document paths.
//!
//! Everything here is pure: the same title always yields the same period,
//! date and path, independent of the wall clock.

use std::fmt;
use std::sync::LazyLock;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, TimeDelta};
use regex::Regex;

use crate::core::error::IdentityError;
use crate::core::types::Issue;

/// Title prefix shared by every weekly tracking issue.
pub const TITLE_PREFIX: &str = "Weekly-";

/// Largest accepted period (roughly nineteen centuries of weeks).
pub const MAX_PERIOD: u32 = 100_000;

const ANCHOR_UTC_OFFSET_SECS: i32 = 8 * 3600;

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Weekly-([0-9]+)$").expect("weekly title regex should be valid"));

/// One weekly cadence unit. Always in `1..=MAX_PERIOD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period(u32);

impl Period {
    pub fn new(number: u32) -> Result<Self, IdentityError> {
        if number == 0 || number > MAX_PERIOD {
            return Err(IdentityError::PeriodOutOfRange {
                number: u64::from(number),
                max: MAX_PERIOD,
            });
        }
        Ok(Self(number))
    }

    pub fn number(self) -> u32 {
        self.0
    }

    /// The following period, or `None` past `MAX_PERIOD`.
    pub fn next(self) -> Option<Self> {
        Self::new(self.0 + 1).ok()
    }

    pub fn title(self) -> String {
        format!("{TITLE_PREFIX}{}", self.0)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Repository-relative path of a weekly document, e.g. `2019/2019-04-08-weekly.md`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentPath(String);

impl DocumentPath {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DocumentPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Extract the period from a `Weekly-<N>` title.
pub fn parse_title(title: &str) -> Result<Period, IdentityError> {
    let malformed = || IdentityError::MalformedTitle {
        title: title.to_string(),
    };
    let caps = TITLE_RE.captures(title).ok_or_else(malformed)?;
    let digits = &caps[1];
    let number: u32 = digits.parse().map_err(|_| malformed())?;
    if number == 0 {
        return Err(malformed());
    }
    Period::new(number)
}

pub fn parse_period(issue: &Issue) -> Result<Period, IdentityError> {
    parse_title(&issue.title)
}

/// Period 1 starts at noon on 2019-04-08, UTC+8.
pub fn anchor() -> DateTime<FixedOffset> {
    let offset =
        FixedOffset::east_opt(ANCHOR_UTC_OFFSET_SECS).expect("UTC+8 should be a valid offset");
    NaiveDate::from_ymd_opt(2019, 4, 8)
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .and_then(|naive| naive.and_local_timezone(offset).single())
        .expect("anchor date should be valid")
}

/// Calendar date of a period: the anchor plus one week per period after the first.
pub fn date_for_period(period: Period) -> DateTime<FixedOffset> {
    anchor() + TimeDelta::weeks(i64::from(period.number() - 1))
}

pub fn path_for_date<D: Datelike>(date: &D) -> DocumentPath {
    let year = date.year();
    DocumentPath(format!(
        "{year}/{year}-{:02}-{:02}-weekly.md",
        date.month(),
        date.day()
    ))
}

pub fn path_for_period(period: Period) -> DocumentPath {
    path_for_date(&date_for_period(period))
}

pub fn path_for_issue(issue: &Issue) -> Result<DocumentPath, IdentityError> {
    Ok(path_for_period(parse_period(issue)?))
}
