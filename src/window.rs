// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Optional `since`/`until` bounds used to filter which records count toward a
//! statistic.
//!
//! Both bounds are inclusive. A missing bound leaves that side of the window
//! open, so the default window accepts every timestamp.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;

use crate::error::Error;

/// Inclusive time window with optional bounds on either side.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use repostat::TimeWindow;
///
/// let since = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0,).unwrap();
/// let window = TimeWindow::new(Some(since,), None,)?;
/// assert!(window.contains(since));
/// assert_eq!(window.to_string(), "since 2020-01-01 to now");
/// # Ok::<(), repostat::Error>(())
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize,)]
pub struct TimeWindow
{
    since: Option<DateTime<Utc,>,>,
    until: Option<DateTime<Utc,>,>,
}

impl TimeWindow
{
    /// Window without bounds; every timestamp is contained.
    pub const fn unbounded() -> Self
    {
        Self {
            since: None, until: None,
        }
    }

    /// Creates a window from explicit bounds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Argument`] when both bounds are present and `since`
    /// lies after `until`.
    pub fn new(
        since: Option<DateTime<Utc,>,>,
        until: Option<DateTime<Utc,>,>,
    ) -> Result<Self, Error,>
    {
        if let (Some(start,), Some(end,),) = (since, until,) {
            if start > end {
                return Err(Error::argument(format!(
                    "since ({}) must not be later than until ({})",
                    start.format("%Y-%m-%d"),
                    end.format("%Y-%m-%d")
                ),),);
            }
        }

        Ok(Self {
            since,
            until,
        },)
    }

    /// Creates a window from calendar dates.
    ///
    /// `since` starts at midnight UTC and `until` covers its whole day, so a
    /// window built from the same date on both sides spans that full day.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Argument`] when `since` is after `until`.
    pub fn from_dates(since: Option<NaiveDate,>, until: Option<NaiveDate,>,) -> Result<Self, Error,>
    {
        let end_of_day = NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999,)
            .ok_or_else(|| Error::argument("unable to represent the end of day",),)?;

        Self::new(
            since.map(|date| date.and_time(NaiveTime::MIN,).and_utc(),),
            until.map(|date| date.and_time(end_of_day,).and_utc(),),
        )
    }

    /// Lower bound, if any.
    pub fn since(&self,) -> Option<DateTime<Utc,>,>
    {
        self.since
    }

    /// Upper bound, if any.
    pub fn until(&self,) -> Option<DateTime<Utc,>,>
    {
        self.until
    }

    /// Returns `true` when neither bound is set.
    pub fn is_unbounded(&self,) -> bool
    {
        self.since.is_none() && self.until.is_none()
    }

    /// Returns `true` when `moment` falls inside the window, bounds included.
    pub fn contains(&self, moment: DateTime<Utc,>,) -> bool
    {
        self.since.is_none_or(|since| since <= moment,) && self.until.is_none_or(|until| moment <= until,)
    }
}

impl fmt::Display for TimeWindow
{
    fn fmt(&self, f: &mut fmt::Formatter<'_,>,) -> fmt::Result
    {
        match (self.since, self.until,) {
            (None, None,) => write!(f, "for all time"),
            (None, Some(until,),) => write!(f, "until {}", until.format("%Y-%m-%d")),
            (Some(since,), None,) => write!(f, "since {} to now", since.format("%Y-%m-%d")),
            (Some(since,), Some(until,),) => {
                write!(f, "since {} until {}", since.format("%Y-%m-%d"), until.format("%Y-%m-%d"))
            }
        }
    }
}
