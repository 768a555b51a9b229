// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Open/closed/old counting shared by issues and pull requests.
//!
//! Window checks on `created_at` and `closed_at` are independent: a record
//! closed inside the window counts as closed even when it was opened before
//! it. A record is old when it is open, was opened inside the window and its
//! age in whole days is strictly greater than the threshold. The reference
//! instant is captured once per aggregator.

use std::{borrow::Borrow, collections::BTreeMap, fmt};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::{
    records::{EventKind, EventRecord, EventState, StatisticScope},
    window::TimeWindow,
};

const STATE_COLUMN_WIDTH: usize = 20;

/// Incremental counter of issue or pull request states.
///
/// # Example
///
/// ```
/// use chrono::{Duration, Utc};
/// use repostat::{EventKind, EventRecord, EventState, EventsAggregator, StatisticScope, TimeWindow};
///
/// let now = Utc::now();
/// let issue = EventRecord {
///     kind:       EventKind::Issue,
///     url:        "https://api.github.com/repos/o/r/issues/1".to_owned(),
///     state:      EventState::Open,
///     created_at: now - Duration::days(40,),
///     closed_at:  None,
///     is_draft:   None,
/// };
///
/// let mut aggregator = EventsAggregator::with_now(EventKind::Issue, TimeWindow::unbounded(), 14, now,);
/// aggregator.record(&issue,);
/// let summary = aggregator.finish(StatisticScope::new("o", "r", None, TimeWindow::unbounded(),),);
/// assert_eq!((summary.open, summary.closed, summary.old), (1, 0, 1));
/// ```
#[derive(Debug, Clone,)]
pub struct EventsAggregator
{
    kind:        EventKind,
    window:      TimeWindow,
    days_to_old: u32,
    now:         DateTime<Utc,>,
    open:        u64,
    closed:      u64,
    old:         u64,
}

impl EventsAggregator
{
    /// Creates an aggregator measuring age against the current instant.
    pub fn new(kind: EventKind, window: TimeWindow, days_to_old: u32,) -> Self
    {
        Self::with_now(kind, window, days_to_old, Utc::now(),)
    }

    /// Creates an aggregator measuring age against `now`.
    pub fn with_now(kind: EventKind, window: TimeWindow, days_to_old: u32, now: DateTime<Utc,>,) -> Self
    {
        Self {
            kind,
            window,
            days_to_old,
            now,
            open: 0,
            closed: 0,
            old: 0,
        }
    }

    /// Reference instant for staleness.
    pub fn now(&self,) -> DateTime<Utc,>
    {
        self.now
    }

    /// Folds one record into the counters.
    pub fn record(&mut self, event: &EventRecord,)
    {
        if event.state == EventState::Open && self.window.contains(event.created_at,) {
            self.open += 1;
            if self.is_old(event.created_at,) {
                self.old += 1;
            }
        }

        if event.closed_at.is_some_and(|closed_at| self.window.contains(closed_at,),) {
            self.closed += 1;
        }
    }

    /// Folds every record of `events`.
    pub fn consume<I,>(&mut self, events: I,)
    where
        I: IntoIterator,
        I::Item: Borrow<EventRecord,>,
    {
        for event in events {
            self.record(event.borrow(),);
        }
    }

    /// Freezes the counters into a summary.
    pub fn finish(self, scope: StatisticScope,) -> EventsSummary
    {
        info!(
            "{} of {}: {} open, {} closed, {} old",
            self.kind.label(),
            scope,
            self.open,
            self.closed,
            self.old
        );

        EventsSummary {
            kind: self.kind,
            scope,
            days_to_old: self.days_to_old,
            open: self.open,
            closed: self.closed,
            old: self.old,
        }
    }

    fn is_old(&self, created_at: DateTime<Utc,>,) -> bool
    {
        (self.now - created_at).num_days() > i64::from(self.days_to_old,)
    }
}

/// Finished issue or pull request statistic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize,)]
pub struct EventsSummary
{
    /// Issues or pull requests.
    pub kind:        EventKind,
    /// Repository, branch and window the counts were taken over.
    pub scope:       StatisticScope,
    /// Age threshold in whole days.
    pub days_to_old: u32,
    /// Open records created inside the window.
    pub open:        u64,
    /// Records closed inside the window.
    pub closed:      u64,
    /// Open records older than `days_to_old` whole days.
    pub old:         u64,
}

impl EventsSummary
{
    /// Mapping from state name (`open`, `closed`, `old`) to count.
    ///
    /// # Example
    ///
    /// ```
    /// use repostat::{EventKind, EventsAggregator, StatisticScope, TimeWindow};
    ///
    /// let summary = EventsAggregator::new(EventKind::PullRequest, TimeWindow::unbounded(), 30,)
    ///     .finish(StatisticScope::new("o", "r", None, TimeWindow::unbounded(),),);
    /// assert_eq!(summary.counts().get("old"), Some(&0));
    /// ```
    pub fn counts(&self,) -> BTreeMap<&'static str, u64,>
    {
        BTreeMap::from([("open", self.open,), ("closed", self.closed,), ("old", self.old,),],)
    }
}

impl fmt::Display for EventsSummary
{
    fn fmt(&self, f: &mut fmt::Formatter<'_,>,) -> fmt::Result
    {
        writeln!(f, "{} of {}", self.kind.label(), self.scope)?;
        writeln!(f, "{:<width$} {}", "open", self.open, width = STATE_COLUMN_WIDTH)?;
        writeln!(f, "{:<width$} {}", "closed", self.closed, width = STATE_COLUMN_WIDTH)?;
        writeln!(
            f,
            "{:<width$} {}",
            format!("old (> {} days)", self.days_to_old),
            self.old,
            width = STATE_COLUMN_WIDTH
        )
    }
}
