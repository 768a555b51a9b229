// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Statistic entry points: contributors, issues and pull requests, each in a
//! blocking and an asynchronous flavour.
//!
//! Every call builds its own filters, normalizer pass and aggregator. The
//! blocking flavour folds records while pages are still being requested; the
//! asynchronous flavour fetches every page first. Either way a summary is
//! only returned once the whole collection has been folded, and the first
//! failure aborts the call.

use serde_json::Value;
use tracing::debug;

use crate::{
    arguments::validate_top_n,
    blocking::BlockingClient,
    client::{FetchFilters, PageSource, fetch_all_paged},
    contributors::{ContributorsAggregator, ContributorsSummary},
    error::Error,
    events::{EventsAggregator, EventsSummary},
    normalizer::{is_listed_pull_request, normalize_commit, normalize_event},
    records::{EventKind, ResourceKind, StatisticScope},
    window::TimeWindow,
};

/// Ranks contributors by commit count.
///
/// # Arguments
///
/// * `client` - Blocking client
/// * `organisation` - Repository owner
/// * `repository` - Repository name
/// * `window` - Commits outside the window are not listed
/// * `branch` - Branch to list; the repository default when `None`
/// * `top_n` - Rows shown in the rendered table
///
/// # Errors
///
/// Returns [`Error::Argument`] when `top_n` is zero and otherwise the first
/// fetch or normalization error.
pub fn contributors_statistic<S: PageSource,>(
    client: &BlockingClient<S,>,
    organisation: &str,
    repository: &str,
    window: &TimeWindow,
    branch: Option<&str,>,
    top_n: usize,
) -> Result<ContributorsSummary, Error,>
{
    let top_n = validate_top_n(top_n,)?;
    let filters = FetchFilters::commits(branch, *window,);
    let records = client.fetch_paged(ResourceKind::Commits, organisation, repository, &filters,);

    fold_contributors(records, StatisticScope::new(organisation, repository, branch, *window,), top_n,)
}

/// Counts open, closed and old issues.
///
/// # Errors
///
/// Returns the first fetch or normalization error.
pub fn issues_statistic<S: PageSource,>(
    client: &BlockingClient<S,>,
    organisation: &str,
    repository: &str,
    window: &TimeWindow,
    days_to_old: u32,
) -> Result<EventsSummary, Error,>
{
    events_statistic(client, EventKind::Issue, organisation, repository, window, days_to_old,)
}

/// Counts open, closed and old pull requests.
///
/// # Errors
///
/// Returns the first fetch or normalization error.
pub fn pull_requests_statistic<S: PageSource,>(
    client: &BlockingClient<S,>,
    organisation: &str,
    repository: &str,
    window: &TimeWindow,
    days_to_old: u32,
) -> Result<EventsSummary, Error,>
{
    events_statistic(client, EventKind::PullRequest, organisation, repository, window, days_to_old,)
}

/// Asynchronous [`contributors_statistic`] fetching pages concurrently.
///
/// # Errors
///
/// Same as [`contributors_statistic`].
pub async fn contributors_statistic_async<S: PageSource,>(
    source: &S,
    organisation: &str,
    repository: &str,
    window: &TimeWindow,
    branch: Option<&str,>,
    top_n: usize,
) -> Result<ContributorsSummary, Error,>
{
    let top_n = validate_top_n(top_n,)?;
    let filters = FetchFilters::commits(branch, *window,);
    let records = fetch_all_paged(source, ResourceKind::Commits, organisation, repository, &filters,).await?;

    fold_contributors(
        records.into_iter().map(Ok,),
        StatisticScope::new(organisation, repository, branch, *window,),
        top_n,
    )
}

/// Asynchronous [`issues_statistic`] fetching pages concurrently.
///
/// # Errors
///
/// Same as [`issues_statistic`].
pub async fn issues_statistic_async<S: PageSource,>(
    source: &S,
    organisation: &str,
    repository: &str,
    window: &TimeWindow,
    days_to_old: u32,
) -> Result<EventsSummary, Error,>
{
    events_statistic_async(source, EventKind::Issue, organisation, repository, window, days_to_old,).await
}

/// Asynchronous [`pull_requests_statistic`] fetching pages concurrently.
///
/// # Errors
///
/// Same as [`pull_requests_statistic`].
pub async fn pull_requests_statistic_async<S: PageSource,>(
    source: &S,
    organisation: &str,
    repository: &str,
    window: &TimeWindow,
    days_to_old: u32,
) -> Result<EventsSummary, Error,>
{
    events_statistic_async(source, EventKind::PullRequest, organisation, repository, window, days_to_old,).await
}

fn events_statistic<S: PageSource,>(
    client: &BlockingClient<S,>,
    kind: EventKind,
    organisation: &str,
    repository: &str,
    window: &TimeWindow,
    days_to_old: u32,
) -> Result<EventsSummary, Error,>
{
    let filters = FetchFilters::events(*window,);
    let records = client.fetch_paged(kind.resource(), organisation, repository, &filters,);

    fold_events(records, kind, StatisticScope::new(organisation, repository, None, *window,), days_to_old,)
}

async fn events_statistic_async<S: PageSource,>(
    source: &S,
    kind: EventKind,
    organisation: &str,
    repository: &str,
    window: &TimeWindow,
    days_to_old: u32,
) -> Result<EventsSummary, Error,>
{
    let filters = FetchFilters::events(*window,);
    let records = fetch_all_paged(source, kind.resource(), organisation, repository, &filters,).await?;

    fold_events(
        records.into_iter().map(Ok,),
        kind,
        StatisticScope::new(organisation, repository, None, *window,),
        days_to_old,
    )
}

fn fold_contributors<I,>(records: I, scope: StatisticScope, top_n: usize,) -> Result<ContributorsSummary, Error,>
where
    I: IntoIterator<Item = Result<Value, Error,>,>,
{
    let mut aggregator = ContributorsAggregator::new();
    for raw in records {
        aggregator.record(&normalize_commit(&raw?,)?,);
    }
    debug!("Folded commits of {} contributors", aggregator.len());

    Ok(aggregator.finish(scope, top_n,),)
}

fn fold_events<I,>(records: I, kind: EventKind, scope: StatisticScope, days_to_old: u32,) -> Result<EventsSummary, Error,>
where
    I: IntoIterator<Item = Result<Value, Error,>,>,
{
    let mut aggregator = EventsAggregator::new(kind, scope.window, days_to_old,);
    let mut skipped = 0usize;
    for raw in records {
        let raw = raw?;
        if kind == EventKind::Issue && is_listed_pull_request(&raw,) {
            skipped += 1;
            continue;
        }
        aggregator.record(&normalize_event(&raw, kind,)?,);
    }
    if skipped > 0 {
        debug!("Skipped {} pull requests listed among issues", skipped);
    }

    Ok(aggregator.finish(scope,),)
}

#[cfg(test)]
mod tests
{
    use serde_json::{Value, json};

    use super::*;

    fn commit(login: &str,) -> Value
    {
        json!({ "url": "u", "author": { "login": login }, "commit": { "message": "m" } })
    }

    fn scope() -> StatisticScope
    {
        StatisticScope::new("o", "r", None, TimeWindow::unbounded(),)
    }

    #[test]
    fn contributor_fold_stops_on_first_error()
    {
        let records = vec![
            Ok(commit("alice",),),
            Err(Error::RepositoryNotFound {
                url: "u".to_string(),
            },),
            Ok(commit("bob",),),
        ];

        let outcome = fold_contributors(records, scope(), 30,);
        assert!(matches!(outcome, Err(Error::RepositoryNotFound { .. })));
    }

    #[test]
    fn malformed_record_aborts_event_fold()
    {
        let records = vec![
            Ok(json!({ "url": "u", "state": "open", "created_at": "2020-01-01T00:00:00Z" }),),
            Ok(json!({ "url": "u", "state": "reopened", "created_at": "2020-01-01T00:00:00Z" }),),
        ];

        let outcome = fold_events(records, EventKind::Issue, scope(), 14,);
        assert!(matches!(outcome, Err(Error::MalformedRecord { .. })));
    }

    #[test]
    fn issue_fold_skips_listed_pull_requests()
    {
        let pull = json!({
            "url": "p",
            "state": "open",
            "created_at": "2020-01-01T00:00:00Z",
            "pull_request": { "url": "https://api.github.com/repos/o/r/pulls/2" }
        });
        let records = || {
            vec![
                Ok(json!({ "url": "i", "state": "open", "created_at": "2020-01-01T00:00:00Z", "pull_request": null }),),
                Ok(pull.clone(),),
            ]
        };

        let issues = fold_events(records(), EventKind::Issue, scope(), 14,).expect("fold succeeds",);
        assert_eq!(issues.open, 1);

        let pulls = fold_events(records(), EventKind::PullRequest, scope(), 14,).expect("fold succeeds",);
        assert_eq!(pulls.open, 2);
    }

    #[test]
    fn event_fold_uses_scope_window()
    {
        let window = TimeWindow::from_dates(
            Some(chrono::NaiveDate::from_ymd_opt(2021, 1, 1,).expect("valid date",),),
            None,
        )
        .expect("valid window",);
        let records = vec![
            Ok(json!({ "url": "a", "state": "open", "created_at": "2020-01-01T00:00:00Z" }),),
            Ok(json!({ "url": "b", "state": "open", "created_at": "2021-01-02T00:00:00Z" }),),
        ];

        let summary = fold_events(records, EventKind::Issue, StatisticScope::new("o", "r", None, window,), 14,)
            .expect("fold succeeds",);
        assert_eq!(summary.open, 1);
    }
}
