//! Date stamp shared by both output file names of a run.

use chrono::{NaiveDate, TimeDelta, Utc};
use std::fmt;
use std::str::FromStr;

use crate::error::IpGroupError;

const FORMAT: &str = "%Y%m%d";

/// A `YYYYMMDD` token, computed once per run.
///
/// Only file names carry it; group ids and names never depend on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RunDate(NaiveDate);

impl RunDate {
    /// Current UTC date shifted by `offset_days`.
    ///
    /// The upstream list is published for the following day, hence the
    /// default offset of one in [`crate::config::Config`]. Fails when the
    /// shifted date falls outside the representable calendar.
    pub fn today_with_offset(offset_days: i64) -> Result<Self, IpGroupError> {
        TimeDelta::try_days(offset_days)
            .and_then(|offset| Utc::now().checked_add_signed(offset))
            .map(|now| Self::from_date(now.date_naive()))
            .ok_or_else(|| {
                IpGroupError::Config(format!("date offset out of range: {} days", offset_days))
            })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }
}

impl fmt::Display for RunDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(FORMAT))
    }
}

impl FromStr for RunDate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(format!("Invalid date '{}'. Use format YYYYMMDD", s));
        }
        NaiveDate::parse_from_str(s, FORMAT)
            .map(Self)
            .map_err(|e| format!("Invalid date '{}': {}", s, e))
    }
}
