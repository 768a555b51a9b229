//! Repository statistics collected from the GitHub REST API.
//!
//! The crate lists the commits, issues or pull requests of one repository,
//! normalizes the raw JSON into typed records and folds them into summaries:
//! commit counts per contributor, and open/closed/old counts for issues and
//! pull requests. Pages are fetched either lazily one at a time through
//! [`BlockingClient`], or eagerly with a bounded, order-preserving fan-out
//! through [`fetch_all_paged`]. Failed responses are classified into the
//! variants of [`Error`] and abort the whole statistic.
//!
//! # Example
//!
//! ```no_run
//! use repostat::{BlockingClient, ClientConfig, TimeWindow, contributors_statistic};
//!
//! let client = BlockingClient::new(&ClientConfig::default(),)?;
//! let summary = contributors_statistic(&client, "rust-lang", "rust", &TimeWindow::unbounded(), None, 10,)?;
//! print!("{summary}");
//! # Ok::<(), repostat::Error>(())
//! ```

mod arguments;
mod blocking;
mod classify;
mod client;
mod config;
mod contributors;
mod error;
mod events;
mod normalizer;
mod pagination;
mod records;
mod stopwatch;
mod usecases;
mod window;

pub use arguments::{RepositorySlug, parse_argument_date, validate_days_to_old, validate_top_n};
pub use blocking::{BlockingClient, BlockingPages};
pub use classify::classify_response;
pub use client::{
    FetchFilters, GithubClient, PageRequest, PageSource, StateFilter, fetch_all_paged, fetch_paged,
};
pub use config::{
    ClientConfig, CollectorConfig, DEFAULT_BASE_URL, DEFAULT_ISSUE_DAYS_TO_OLD, DEFAULT_MAX_CONCURRENCY,
    DEFAULT_PR_DAYS_TO_OLD, DEFAULT_TOP_CONTRIBUTORS, load_config, parse_config,
};
pub use contributors::{ContributorCount, ContributorsAggregator, ContributorsSummary};
pub use error::{Error, config_io_error};
pub use events::{EventsAggregator, EventsSummary};
pub use normalizer::{normalize_commit, normalize_event};
pub use pagination::{DEFAULT_LAST_PAGE, PAGE_SIZE, Page, last_page, parse_last_page};
pub use records::{
    CommitRecord, EventKind, EventRecord, EventState, ResourceKind, ShortIdentity, StatisticScope,
    UNKNOWN_CONTRIBUTOR,
};
pub use stopwatch::{timed, timed_blocking};
pub use usecases::{
    contributors_statistic, contributors_statistic_async, issues_statistic, issues_statistic_async,
    pull_requests_statistic, pull_requests_statistic_async,
};
pub use window::TimeWindow;
