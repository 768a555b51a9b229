// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Validation of caller-supplied inputs before they reach the collector.
//!
//! Every helper in this module reports failures as [`Error::Argument`], the
//! variant the presentation layer uses for user mistakes as opposed to
//! upstream failures.

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;
use url::Url;

use crate::error::Error;

/// Date layouts accepted on the command line, tried in order.
///
/// The two-digit year layout comes before the four-digit one because the
/// latter also accepts two digits and would map `12` to the year 12.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d.%m.%y", "%d.%m.%Y"];
const GITHUB_HOSTS: &[&str] = &["github.com", "www.github.com"];

/// Organisation and repository pair extracted from a repository URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize,)]
pub struct RepositorySlug
{
    /// Account or organisation that owns the repository.
    pub organisation: String,
    /// Repository name without a `.git` suffix.
    pub repository:   String,
}

impl RepositorySlug
{
    /// Parses `https://github.com/OWNER/REPOSITORY`, ignoring any trailing
    /// path such as `/tree/main/src`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Argument`] when the input is not an absolute URL,
    /// points to a different host, or lacks the owner or repository segment.
    ///
    /// # Examples
    ///
    /// ```
    /// use repostat::RepositorySlug;
    ///
    /// let slug = RepositorySlug::parse_url("https://github.com/rust-lang/cargo/tree/master",)?;
    /// assert_eq!(slug.organisation, "rust-lang");
    /// assert_eq!(slug.repository, "cargo");
    /// # Ok::<(), repostat::Error>(())
    /// ```
    pub fn parse_url(input: &str,) -> Result<Self, Error,>
    {
        let invalid = || Error::argument(format!("invalid GitHub repository URL: {input}"),);

        let url = Url::parse(input.trim(),).map_err(|_| invalid(),)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(),);
        }
        let host = url.host_str().ok_or_else(invalid,)?;
        if !GITHUB_HOSTS.contains(&host,) {
            return Err(invalid(),);
        }

        let mut segments = url.path_segments().ok_or_else(invalid,)?.filter(|segment| !segment.is_empty(),);
        let organisation = segments.next().ok_or_else(invalid,)?;
        let repository = segments.next().ok_or_else(invalid,)?;
        let repository = repository.strip_suffix(".git",).unwrap_or(repository,);

        if !is_valid_name(organisation,) || !is_valid_name(repository,) {
            return Err(invalid(),);
        }

        Ok(Self {
            organisation: organisation.to_owned(),
            repository:   repository.to_owned(),
        },)
    }
}

impl fmt::Display for RepositorySlug
{
    fn fmt(&self, f: &mut fmt::Formatter<'_,>,) -> fmt::Result
    {
        write!(f, "{}/{}", self.organisation, self.repository)
    }
}

fn is_valid_name(segment: &str,) -> bool
{
    !segment.is_empty()
        && segment.chars().all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.'),)
}

/// Parses a calendar date in `YYYY-MM-DD`, `DD.MM.YY` or `DD.MM.YYYY` form.
///
/// # Errors
///
/// Returns [`Error::Argument`] listing the accepted layouts when none match.
///
/// # Examples
///
/// ```
/// use repostat::parse_argument_date;
///
/// let date = parse_argument_date("10.11.12",)?;
/// assert_eq!(date.to_string(), "2012-11-10");
/// # Ok::<(), repostat::Error>(())
/// ```
pub fn parse_argument_date(input: &str,) -> Result<NaiveDate, Error,>
{
    let trimmed = input.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format,).ok(),)
        .ok_or_else(|| {
            Error::argument(format!(
                "can't parse {input} as a date; use one of DD.MM.YY | DD.MM.YYYY | YYYY-MM-DD"
            ),)
        },)
}

/// Ensures the contributors ranking shows at least one entry.
///
/// # Errors
///
/// Returns [`Error::Argument`] when `top_n` is zero.
pub fn validate_top_n(top_n: usize,) -> Result<usize, Error,>
{
    if top_n == 0 {
        return Err(Error::argument("top N contributors must be greater than 0",),);
    }
    Ok(top_n,)
}

/// Converts a signed staleness threshold supplied by a caller into days.
///
/// # Errors
///
/// Returns [`Error::Argument`] when the value is negative or exceeds
/// [`u32::MAX`].
pub fn validate_days_to_old(days: i64,) -> Result<u32, Error,>
{
    u32::try_from(days,).map_err(|_| {
        Error::argument(format!("days to old must be between 0 and {}, got {days}", u32::MAX),)
    },)
}
