// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Paginated access to repository collections.
///
/// Pages are produced by a [`PageSource`]; [`GithubClient`] is the production
/// source backed by octocrab. Two strategies sit on top of any source: a lazy
/// sequential stream issuing one request per page on demand, and an eager
/// fan-out that discovers the page count from the first page and fetches the
/// rest concurrently while keeping page order.
use std::{fmt, future::Future};

use chrono::SecondsFormat;
use futures::{Stream, StreamExt, TryStreamExt, stream};
use octocrab::{Octocrab, service::middleware::retry::RetryConfig};
use serde_json::Value;
use tracing::{debug, info};
use url::form_urlencoded;

use crate::{
    classify::classify_response,
    config::{ClientConfig, DEFAULT_MAX_CONCURRENCY},
    error::Error,
    pagination::{self, PAGE_SIZE, Page},
    records::ResourceKind,
    window::TimeWindow,
};

/// Upstream `state` filter for issues and pull requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq,)]
pub enum StateFilter
{
    /// Open records only.
    Open,
    /// Closed records only.
    Closed,
    /// Every record regardless of state.
    #[default]
    All,
}

impl StateFilter
{
    /// Upstream wire value.
    pub const fn as_str(self,) -> &'static str
    {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::All => "all",
        }
    }
}

/// Query filters forwarded to the upstream API.
///
/// The aggregators re-apply the time window locally; upstream filtering only
/// reduces the number of pages transferred.
#[derive(Debug, Clone, Default, PartialEq, Eq,)]
pub struct FetchFilters
{
    /// Branch to list commits from. Ignored for issues and pull requests.
    pub branch: Option<String,>,
    /// Time window; commits send both bounds, issues send `since` only.
    pub window: TimeWindow,
    /// State filter; ignored for commits.
    pub state:  StateFilter,
}

impl FetchFilters
{
    /// Filters for listing commits of a branch (or the default branch).
    pub fn commits(branch: Option<&str,>, window: TimeWindow,) -> Self
    {
        Self {
            branch: branch.map(str::to_owned,),
            window,
            state: StateFilter::All,
        }
    }

    /// Filters for listing issues or pull requests in every state.
    pub fn events(window: TimeWindow,) -> Self
    {
        Self {
            branch: None,
            window,
            state: StateFilter::All,
        }
    }

    fn query(&self, kind: ResourceKind, page: u32,) -> String
    {
        let mut query = form_urlencoded::Serializer::new(String::new(),);
        query.append_pair("per_page", &PAGE_SIZE.to_string(),);
        query.append_pair("page", &page.to_string(),);

        let timestamp = |moment: chrono::DateTime<chrono::Utc,>| moment.to_rfc3339_opts(SecondsFormat::Secs, true,);
        match kind {
            ResourceKind::Commits => {
                if let Some(branch,) = self.branch.as_deref() {
                    query.append_pair("sha", branch,);
                }
                if let Some(since,) = self.window.since() {
                    query.append_pair("since", &timestamp(since,),);
                }
                if let Some(until,) = self.window.until() {
                    query.append_pair("until", &timestamp(until,),);
                }
            }
            ResourceKind::Issues => {
                query.append_pair("state", self.state.as_str(),);
                if let Some(since,) = self.window.since() {
                    query.append_pair("since", &timestamp(since,),);
                }
            }
            ResourceKind::Pulls => {
                query.append_pair("state", self.state.as_str(),);
            }
        }

        query.finish()
    }
}

/// Coordinates of a single page request.
#[derive(Debug, Clone, Copy,)]
pub struct PageRequest<'a,>
{
    /// Collection being listed.
    pub kind:         ResourceKind,
    /// Repository owner.
    pub organisation: &'a str,
    /// Repository name.
    pub repository:   &'a str,
    /// Query filters.
    pub filters:      &'a FetchFilters,
    /// One-based page index.
    pub page:         u32,
}

impl PageRequest<'_,>
{
    /// Route relative to the API base URL, query string included.
    ///
    /// # Examples
    ///
    /// ```
    /// use repostat::{FetchFilters, PageRequest, ResourceKind};
    ///
    /// let filters = FetchFilters::commits(Some("main",), Default::default(),);
    /// let request = PageRequest {
    ///     kind:         ResourceKind::Commits,
    ///     organisation: "octocat",
    ///     repository:   "hello-world",
    ///     filters:      &filters,
    ///     page:         2,
    /// };
    /// assert_eq!(request.route(), "/repos/octocat/hello-world/commits?per_page=100&page=2&sha=main");
    /// ```
    pub fn route(&self,) -> String
    {
        format!(
            "/repos/{}/{}/{}?{}",
            self.organisation,
            self.repository,
            self.kind.path(),
            self.filters.query(self.kind, self.page,)
        )
    }
}

/// Producer of raw pages.
///
/// Implementations must classify failed responses before returning them so
/// callers only ever observe the typed variants of [`Error`].
pub trait PageSource
{
    /// Fetches one page.
    fn fetch_page(&self, request: PageRequest<'_,>,) -> impl Future<Output = Result<Page, Error,>,> + Send;

    /// Upper bound on simultaneous requests in concurrent mode.
    fn max_concurrency(&self,) -> usize
    {
        DEFAULT_MAX_CONCURRENCY
    }
}

/// GitHub REST client.
#[derive(Clone,)]
pub struct GithubClient
{
    octocrab:        Octocrab,
    base_url:        String,
    authenticated:   bool,
    max_concurrency: usize,
}

impl fmt::Debug for GithubClient
{
    fn fmt(&self, f: &mut fmt::Formatter<'_,>,) -> fmt::Result
    {
        f.debug_struct("GithubClient",)
            .field("base_url", &self.base_url,)
            .field("authenticated", &self.authenticated,)
            .field("max_concurrency", &self.max_concurrency,)
            .finish_non_exhaustive()
    }
}

impl GithubClient
{
    /// Builds a client from configuration.
    ///
    /// Every request carries `Authorization: Bearer <token>` when a token is
    /// configured and is unauthenticated otherwise. Each page is requested
    /// exactly once; octocrab's retry layer is disabled. Must be called from
    /// within a tokio runtime context.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Argument`] when the base URL is rejected and
    /// [`Error::Transport`] when the HTTP stack cannot be initialised.
    pub fn new(config: &ClientConfig,) -> Result<Self, Error,>
    {
        let mut builder = Octocrab::builder()
            .add_retry_config(RetryConfig::None,)
            .base_uri(config.base_url.as_str(),)
            .map_err(|e| Error::argument(format!("invalid base_url '{}': {e}", config.base_url),),)?;
        if let Some(token,) = config.token.as_deref() {
            builder = builder.personal_token(token.to_owned(),);
        }
        let octocrab = builder.build().map_err(|e| {
            Error::transport(&config.base_url, None, format!("failed to initialize GitHub client: {e}"),)
        },)?;

        Ok(Self::from_octocrab(octocrab, config,),)
    }

    /// Wraps an existing octocrab instance.
    ///
    /// `config.token` is only used to record whether the instance is
    /// authenticated; credentials must already be installed on `octocrab`.
    pub fn from_octocrab(octocrab: Octocrab, config: &ClientConfig,) -> Self
    {
        Self {
            octocrab,
            base_url: config.base_url.trim_end_matches('/',).to_owned(),
            authenticated: config.token.is_some(),
            max_concurrency: config.max_concurrency.max(1,),
        }
    }

    /// Whether requests carry a bearer token.
    pub fn is_authenticated(&self,) -> bool
    {
        self.authenticated
    }
}

impl PageSource for GithubClient
{
    async fn fetch_page(&self, request: PageRequest<'_,>,) -> Result<Page, Error,>
    {
        let url = format!("{}{}", self.base_url, request.route());
        debug!(
            "Fetching {} page {} for {}/{}",
            request.kind, request.page, request.organisation, request.repository
        );

        let response = self
            .octocrab
            ._get(url.as_str(),)
            .await
            .map_err(|e| Error::transport(&url, None, format!("request failed: {e}"),),)?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = self
            .octocrab
            .body_to_string(response,)
            .await
            .map_err(|e| Error::transport(&url, Some(status.as_u16(),), format!("failed to read body: {e}"),),)?;

        classify_response(&url, status, &headers, self.authenticated, &body,)?;

        let records: Vec<Value,> = serde_json::from_str(&body,)
            .map_err(|e| Error::malformed("page", format!("{url} did not return a JSON array: {e}"),),)?;

        Ok(Page {
            number: request.page,
            last: pagination::last_page(&headers,),
            records,
        },)
    }

    fn max_concurrency(&self,) -> usize
    {
        self.max_concurrency
    }
}

/// Lazily streams every raw record of a collection, one request per page.
///
/// The page count is taken from the first response. A request is only issued
/// when the consumer polls past the records of the previous page, so dropping
/// the stream stops further requests. The first failed page ends the stream
/// with that error.
pub fn fetch_paged<'a, S,>(
    source: &'a S,
    kind: ResourceKind,
    organisation: &'a str,
    repository: &'a str,
    filters: &'a FetchFilters,
) -> impl Stream<Item = Result<Value, Error,>,> + 'a
where
    S: PageSource,
{
    stream::try_unfold((1u32, None::<u32,>,), move |(number, known_last,)| async move {
        if known_last.is_some_and(|last| number > last,) {
            return Ok(None,);
        }

        let page = source
            .fetch_page(PageRequest {
                kind,
                organisation,
                repository,
                filters,
                page: number,
            },)
            .await?;
        let last = known_last.unwrap_or(page.last,);
        debug!("Received {} page {}/{} with {} records", kind, number, last, page.records.len());

        Ok::<_, Error,>(Some((page.records, (number + 1, Some(last,),),),),)
    },)
    .map_ok(|records| stream::iter(records.into_iter().map(Ok::<Value, Error,>,),),)
    .try_flatten()
}

/// Fetches every raw record of a collection, pages 2..N concurrently.
///
/// At most [`PageSource::max_concurrency`] requests are in flight. Records
/// are concatenated in page order regardless of completion order. The first
/// failure aborts the whole fetch and drops the remaining requests.
///
/// # Errors
///
/// Propagates the first error reported by the source.
pub async fn fetch_all_paged<S,>(
    source: &S,
    kind: ResourceKind,
    organisation: &str,
    repository: &str,
    filters: &FetchFilters,
) -> Result<Vec<Value,>, Error,>
where
    S: PageSource,
{
    let request = |page: u32| PageRequest {
        kind,
        organisation,
        repository,
        filters,
        page,
    };

    let first = source.fetch_page(request(1,),).await?;
    let last = first.last.max(1,);
    let limit = source.max_concurrency().max(1,);
    debug!("Fetching {} pages of {} for {}/{} with up to {} in flight", last, kind, organisation, repository, limit);

    let rest: Vec<Page,> = stream::iter(2..=last,)
        .map(|number| source.fetch_page(request(number,),),)
        .buffered(limit,)
        .try_collect()
        .await?;

    let mut records = first.records;
    for page in rest {
        records.extend(page.records,);
    }

    info!("Fetched {} {} records in {} pages for {}/{}", records.len(), kind, last, organisation, repository);

    Ok(records,)
}
