// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Maps raw HTTP responses onto the typed failures of [`Error`].
//!
//! Checks run in a fixed order and the first match wins: `404`, `401`, an
//! exhausted rate-limit budget (regardless of status), any other non-success
//! status. Everything else proceeds to normalization.

use chrono::{DateTime, Utc};
use http::{HeaderMap, StatusCode};

use crate::error::Error;

const RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";
const RATE_LIMIT_LIMIT: &str = "x-ratelimit-limit";
const RATE_LIMIT_RESET: &str = "x-ratelimit-reset";
/// Longest body excerpt carried by transport errors.
const BODY_EXCERPT_LEN: usize = 512;

/// Classifies a response.
///
/// # Arguments
///
/// * `url` - Request URL, carried by the produced error
/// * `status` - Response status
/// * `headers` - Response headers
/// * `authenticated` - Whether the request carried a bearer token
/// * `body` - Response body, used for transport diagnostics
///
/// # Errors
///
/// Returns [`Error::RepositoryNotFound`], [`Error::InvalidCredentials`],
/// [`Error::RateLimitExceeded`] or [`Error::Transport`] per the check order
/// documented on the module.
///
/// # Example
///
/// ```
/// use http::{HeaderMap, HeaderValue, StatusCode};
/// use repostat::{Error, classify_response};
///
/// let mut headers = HeaderMap::new();
/// headers.insert("x-ratelimit-remaining", HeaderValue::from_static("0",),);
/// let outcome = classify_response("https://api.github.com/x", StatusCode::OK, &headers, false, "[]",);
/// assert!(matches!(outcome, Err(Error::RateLimitExceeded { .. })));
/// ```
pub fn classify_response(
    url: &str,
    status: StatusCode,
    headers: &HeaderMap,
    authenticated: bool,
    body: &str,
) -> Result<(), Error,>
{
    if status == StatusCode::NOT_FOUND {
        return Err(Error::RepositoryNotFound {
            url: url.to_owned(),
        },);
    }

    if status == StatusCode::UNAUTHORIZED {
        return Err(Error::InvalidCredentials {
            url: url.to_owned(),
        },);
    }

    if header_number::<u64,>(headers, RATE_LIMIT_REMAINING,) == Some(0,) {
        return Err(Error::RateLimitExceeded {
            url: url.to_owned(),
            limit: header_number::<u64,>(headers, RATE_LIMIT_LIMIT,).unwrap_or_default(),
            reset_at: header_number::<i64,>(headers, RATE_LIMIT_RESET,)
                .and_then(|epoch| DateTime::<Utc,>::from_timestamp(epoch, 0,),),
            authenticated,
        },);
    }

    if !status.is_success() {
        return Err(Error::transport(url, Some(status.as_u16(),), format!("{status}: {}", excerpt(body,)),),);
    }

    Ok((),)
}

fn header_number<T: std::str::FromStr,>(headers: &HeaderMap, name: &str,) -> Option<T,>
{
    headers.get(name,)?.to_str().ok()?.trim().parse::<T,>().ok()
}

fn excerpt(body: &str,) -> &str
{
    let trimmed = body.trim();
    if trimmed.len() <= BODY_EXCERPT_LEN {
        return trimmed;
    }
    let mut end = BODY_EXCERPT_LEN;
    while !trimmed.is_char_boundary(end,) {
        end -= 1;
    }
    &trimmed[..end]
}
