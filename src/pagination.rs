// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Page container and page-count discovery from the `link` response header.

use std::sync::LazyLock;

use http::HeaderMap;
use regex::Regex;

/// Records requested per page; the upstream maximum.
pub const PAGE_SIZE: u32 = 100;
/// Page count assumed when the `link` header is missing or unparseable.
pub const DEFAULT_LAST_PAGE: u32 = 1;

static LAST_PAGE_PATTERN: LazyLock<Regex,> = LazyLock::new(|| {
    Regex::new(r#"[?&]page=(?P<last_page>\d+)[^>]*>;\s*rel="last""#,).expect("valid last page pattern",)
},);

/// One page of raw records returned by a single request.
#[derive(Debug, Clone, PartialEq,)]
pub struct Page
{
    /// One-based index of this page.
    pub number:  u32,
    /// Last page index advertised by the response.
    pub last:    u32,
    /// Raw records in upstream order.
    pub records: Vec<serde_json::Value,>,
}

/// Extracts the `rel="last"` page number from a `link` header value.
///
/// Returns [`DEFAULT_LAST_PAGE`] when the value carries no usable hint.
///
/// # Examples
///
/// ```
/// use repostat::parse_last_page;
///
/// let header = r#"<https://api.github.com/repositories/1/commits?per_page=100&page=2>; rel="next", <https://api.github.com/repositories/1/commits?per_page=100&page=7>; rel="last""#;
/// assert_eq!(parse_last_page(Some(header,),), 7);
/// assert_eq!(parse_last_page(None,), 1);
/// ```
pub fn parse_last_page(link: Option<&str,>,) -> u32
{
    let Some(link,) = link else {
        return DEFAULT_LAST_PAGE;
    };
    link.split(',',)
        .find_map(|part| LAST_PAGE_PATTERN.captures(part,),)
        .and_then(|captures| captures.name("last_page",)?.as_str().parse::<u32,>().ok(),)
        .filter(|last| *last >= 1,)
        .unwrap_or(DEFAULT_LAST_PAGE,)
}

/// Reads the page count from response headers.
pub fn last_page(headers: &HeaderMap,) -> u32
{
    parse_last_page(headers.get(http::header::LINK,).and_then(|value| value.to_str().ok(),),)
}
