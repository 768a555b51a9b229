// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Conversion of raw JSON records into typed domain records.
//!
//! Normalization is pure: the same raw value always yields the same record.
//! Missing author information is tolerated; only structurally required fields
//! (the commit body for commits; url, state and creation time for issues and
//! pull requests) cause [`Error::MalformedRecord`].

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::{
    error::Error,
    records::{CommitRecord, EventKind, EventRecord, EventState, ShortIdentity},
};

const COMMIT_RECORD: &str = "commit";

#[derive(Debug, Default, Deserialize,)]
#[serde(default)]
struct RawCommit
{
    url:       Option<String,>,
    author:    Option<RawAccount,>,
    committer: Option<RawAccount,>,
    commit:    Option<RawCommitBody,>,
}

#[derive(Debug, Default, Deserialize,)]
#[serde(default)]
struct RawAccount
{
    login: Option<String,>,
}

#[derive(Debug, Default, Deserialize,)]
#[serde(default)]
struct RawCommitBody
{
    url:       Option<String,>,
    author:    Option<RawIdentity,>,
    committer: Option<RawIdentity,>,
    message:   Option<String,>,
}

#[derive(Debug, Default, Deserialize,)]
#[serde(default)]
struct RawIdentity
{
    name:  Option<String,>,
    email: Option<String,>,
}

#[derive(Debug, Default, Deserialize,)]
#[serde(default)]
struct RawEvent
{
    url:        Option<String,>,
    state:      Option<String,>,
    created_at: Option<String,>,
    closed_at:  Option<String,>,
    draft:      Option<bool,>,
}

impl From<RawIdentity,> for ShortIdentity
{
    fn from(raw: RawIdentity,) -> Self
    {
        Self {
            name: raw.name, email: raw.email,
        }
    }
}

/// Normalizes one raw commit from the commits listing.
///
/// # Errors
///
/// Returns [`Error::MalformedRecord`] when the value is not an object of the
/// expected shape or lacks the embedded `commit` body.
///
/// # Examples
///
/// ```
/// use repostat::normalize_commit;
/// use serde_json::json;
///
/// let raw = json!({
///     "url": "https://api.github.com/repos/o/r/commits/1",
///     "author": null,
///     "commit": { "author": { "name": "Bob" }, "message": "fix" }
/// });
/// let commit = normalize_commit(&raw,)?;
/// assert_eq!(commit.contributor(), "Bob");
/// # Ok::<(), repostat::Error>(())
/// ```
pub fn normalize_commit(raw: &Value,) -> Result<CommitRecord, Error,>
{
    let parsed = RawCommit::deserialize(raw,).map_err(|e| Error::malformed(COMMIT_RECORD, e.to_string(),),)?;
    let body = parsed.commit.ok_or_else(|| Error::malformed(COMMIT_RECORD, "missing commit body",),)?;

    let login = |account: Option<RawAccount,>| account.and_then(|account| account.login,);

    Ok(CommitRecord {
        url:             parsed.url.or(body.url,).unwrap_or_default(),
        author:          body.author.map(ShortIdentity::from,),
        committer:       body.committer.map(ShortIdentity::from,),
        author_login:    login(parsed.author,),
        committer_login: login(parsed.committer,),
        message:         body.message.unwrap_or_default(),
    },)
}

/// Normalizes one raw issue or pull request.
///
/// # Errors
///
/// Returns [`Error::MalformedRecord`] when `url` is missing, `state` is not
/// `open` or `closed`, or a timestamp is absent (`created_at`) or not RFC 3339.
pub fn normalize_event(raw: &Value, kind: EventKind,) -> Result<EventRecord, Error,>
{
    let record = kind.record_name();
    let parsed = RawEvent::deserialize(raw,).map_err(|e| Error::malformed(record, e.to_string(),),)?;

    let url = parsed.url.ok_or_else(|| Error::malformed(record, "missing url",),)?;
    let state = parsed.state.as_deref().ok_or_else(|| Error::malformed(record, "missing state",),)?;
    let state = EventState::from_wire(state,)
        .ok_or_else(|| Error::malformed(record, format!("unknown state '{state}'"),),)?;
    let created_at = parsed
        .created_at
        .as_deref()
        .ok_or_else(|| Error::malformed(record, "missing created_at",),)
        .and_then(|value| parse_timestamp(record, "created_at", value,),)?;
    let closed_at = parsed
        .closed_at
        .as_deref()
        .map(|value| parse_timestamp(record, "closed_at", value,),)
        .transpose()?;

    Ok(EventRecord {
        kind,
        url,
        state,
        created_at,
        closed_at,
        is_draft: match kind {
            EventKind::Issue => None,
            EventKind::PullRequest => parsed.draft,
        },
    },)
}

/// Whether a raw record from the issues listing is a pull request.
///
/// GitHub lists pull requests under `/issues` too, marked by a non-null
/// `pull_request` object.
pub(crate) fn is_listed_pull_request(raw: &Value,) -> bool
{
    raw.get("pull_request",).is_some_and(|value| !value.is_null(),)
}

fn parse_timestamp(record: &'static str, field: &str, value: &str,) -> Result<DateTime<Utc,>, Error,>
{
    DateTime::parse_from_rfc3339(value,)
        .map(|moment| moment.with_timezone(&Utc,),)
        .map_err(|e| Error::malformed(record, format!("invalid {field} '{value}': {e}"),),)
}

#[cfg(test)]
mod tests
{
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    use super::{normalize_commit, normalize_event};
    use crate::{Error, EventKind, EventState};

    #[test]
    fn commit_with_linked_account_uses_login()
    {
        let raw = json!({
            "url": "https://api.github.com/repos/o/r/commits/abc",
            "author": { "login": "alice", "id": 1 },
            "committer": { "login": "web-flow" },
            "commit": {
                "author": { "name": "Alice", "email": "alice@example.com", "date": "2020-01-01T00:00:00Z" },
                "committer": { "name": "GitHub", "email": "noreply@github.com" },
                "message": "initial"
            }
        });

        let commit = normalize_commit(&raw,).expect("valid commit",);
        assert_eq!(commit.contributor(), "alice");
        assert_eq!(commit.committer_login.as_deref(), Some("web-flow"));
        assert_eq!(commit.author.as_ref().and_then(|a| a.email.as_deref()), Some("alice@example.com"));
        assert_eq!(commit.message, "initial");
    }

    #[test]
    fn commit_tolerates_missing_and_empty_accounts()
    {
        let null_author = json!({ "author": null, "commit": { "author": { "name": "Bob" } } });
        let empty_author = json!({ "author": {}, "commit": { "author": { "name": "Carol" } } });

        assert_eq!(normalize_commit(&null_author,).expect("valid",).contributor(), "Bob");
        assert_eq!(normalize_commit(&empty_author,).expect("valid",).contributor(), "Carol");
    }

    #[test]
    fn commit_without_body_is_malformed()
    {
        let error = normalize_commit(&json!({ "author": { "login": "alice" } }),).expect_err("no body",);
        match error {
            Error::MalformedRecord {
                kind,
                message,
            } => {
                assert_eq!(kind, "commit");
                assert_eq!(message, "missing commit body");
            }
            other => panic!("expected malformed record, got {other:?}"),
        }
    }

    #[test]
    fn non_object_commit_is_malformed()
    {
        assert!(matches!(normalize_commit(&json!(42)), Err(Error::MalformedRecord { .. })));
    }

    #[test]
    fn pull_request_keeps_draft_flag_and_timestamps()
    {
        let raw = json!({
            "url": "https://api.github.com/repos/o/r/pulls/1",
            "state": "closed",
            "created_at": "2020-01-01T10:00:00Z",
            "closed_at": "2020-01-02T10:00:00+02:00",
            "draft": true
        });

        let record = normalize_event(&raw, EventKind::PullRequest,).expect("valid pull request",);
        assert_eq!(record.state, EventState::Closed);
        assert_eq!(record.created_at, Utc.with_ymd_and_hms(2020, 1, 1, 10, 0, 0).unwrap());
        assert_eq!(record.closed_at, Some(Utc.with_ymd_and_hms(2020, 1, 2, 8, 0, 0).unwrap()));
        assert_eq!(record.is_draft, Some(true));
    }

    #[test]
    fn issue_ignores_draft_flag()
    {
        let raw = json!({
            "url": "u", "state": "open", "created_at": "2020-01-01T00:00:00Z", "closed_at": null, "draft": true
        });
        let record = normalize_event(&raw, EventKind::Issue,).expect("valid issue",);
        assert_eq!(record.is_draft, None);
        assert_eq!(record.closed_at, None);
    }

    #[test]
    fn unknown_state_is_malformed()
    {
        let raw = json!({ "url": "u", "state": "merged", "created_at": "2020-01-01T00:00:00Z" });
        let error = normalize_event(&raw, EventKind::PullRequest,).expect_err("unknown state",);
        match error {
            Error::MalformedRecord {
                kind,
                message,
            } => {
                assert_eq!(kind, "pull request");
                assert_eq!(message, "unknown state 'merged'");
            }
            other => panic!("expected malformed record, got {other:?}"),
        }
    }

    #[test]
    fn unparseable_created_at_is_malformed()
    {
        let raw = json!({ "url": "u", "state": "open", "created_at": "yesterday" });
        assert!(matches!(normalize_event(&raw, EventKind::Issue), Err(Error::MalformedRecord { .. })));

        let missing = json!({ "url": "u", "state": "open" });
        assert!(matches!(normalize_event(&missing, EventKind::Issue), Err(Error::MalformedRecord { .. })));
    }

    #[test]
    fn normalization_is_deterministic()
    {
        let raw = json!({ "url": "u", "state": "open", "created_at": "2021-05-05T05:05:05Z" });
        assert_eq!(
            normalize_event(&raw, EventKind::Issue,).expect("valid",),
            normalize_event(&raw, EventKind::Issue,).expect("valid",)
        );
    }
}
