//! Command-line interface for the repostat binary.
//!
//! The CLI exposes one subcommand per statistic. Each takes a repository URL
//! and an optional time window, collects the statistic and prints either the
//! rendered table or JSON.

use std::{
    io::{self, Write},
    path::PathBuf,
    process,
    time::Duration,
};

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use repostat::{
    BlockingClient, CollectorConfig, ContributorsSummary, Error, EventKind, EventsSummary, GithubClient,
    RepositorySlug, TimeWindow, contributors_statistic, contributors_statistic_async, issues_statistic,
    issues_statistic_async, load_config, parse_argument_date, pull_requests_statistic,
    pull_requests_statistic_async, timed, timed_blocking, validate_days_to_old, validate_top_n,
};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Command line interface for collecting repository statistics.
#[derive(Debug, Parser,)]
#[command(name = "repostat", version, about = "Collect GitHub repository statistics")]
struct Cli
{
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand,)]
/// Supported statistics.
enum Command
{
    /// Rank contributors by commit count.
    Contributors(ContributorsArgs,),
    /// Count open, closed and old issues.
    Issues(EventsArgs,),
    /// Count open, closed and old pull requests.
    Pulls(EventsArgs,),
}

/// Strategy used to fetch pages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum,)]
enum Mode
{
    /// One request per page, folded while fetching.
    #[default]
    Sequential,
    /// First page, then the remaining pages concurrently.
    Concurrent,
}

/// Arguments shared by every statistic.
#[derive(Debug, Args,)]
struct CommonArgs
{
    /// Repository URL, e.g. https://github.com/owner/repo.
    #[arg(value_name = "URL")]
    url: String,

    /// Start of the time window (YYYY-MM-DD, DD.MM.YYYY or DD.MM.YY).
    #[arg(long = "since", value_name = "DATE")]
    since: Option<String,>,

    /// End of the time window, inclusive of the whole day.
    #[arg(long = "until", value_name = "DATE")]
    until: Option<String,>,

    /// API token; overrides the configuration file.
    #[arg(long = "token", env = "GITHUB_TOKEN", hide_env_values = true, value_name = "TOKEN")]
    token: Option<String,>,

    /// Path to a YAML configuration file.
    #[arg(long = "config", value_name = "PATH")]
    config: Option<PathBuf,>,

    /// Page fetching strategy.
    #[arg(long = "mode", value_enum, default_value_t = Mode::Sequential)]
    mode: Mode,

    /// Output formatted JSON instead of a table.
    #[arg(long = "json", action = ArgAction::SetTrue)]
    json: bool,
}

#[derive(Debug, Args,)]
struct ContributorsArgs
{
    #[command(flatten)]
    common: CommonArgs,

    /// Branch to list commits from; the repository default when omitted.
    #[arg(long = "branch", value_name = "NAME")]
    branch: Option<String,>,

    /// Number of contributors to render.
    #[arg(long = "top", value_name = "N")]
    top: Option<usize,>,
}

#[derive(Debug, Args,)]
struct EventsArgs
{
    #[command(flatten)]
    common: CommonArgs,

    /// Days after which an open record counts as old.
    #[arg(long = "days-to-old", value_name = "DAYS", allow_negative_numbers = true)]
    days_to_old: Option<i64,>,
}

impl Command
{
    fn common(&self,) -> &CommonArgs
    {
        match self {
            Self::Contributors(args,) => &args.common,
            Self::Issues(args,) | Self::Pulls(args,) => &args.common,
        }
    }
}

/// Statistic produced by one invocation.
#[derive(Debug, Serialize,)]
#[serde(untagged)]
enum Report
{
    Contributors(ContributorsSummary,),
    Events(EventsSummary,),
}

impl std::fmt::Display for Report
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_,>,) -> std::fmt::Result
    {
        match self {
            Self::Contributors(summary,) => std::fmt::Display::fmt(summary, f,),
            Self::Events(summary,) => std::fmt::Display::fmt(summary, f,),
        }
    }
}

/// Entry point that reports errors and sets the appropriate exit status.
fn main()
{
    init_tracing();

    if let Err(error,) = run() {
        eprintln!("{}", error.to_display_string());
        if let Some(hint,) = error.hint() {
            eprintln!("hint: {hint}");
        }
        process::exit(1,);
    }
}

fn init_tracing()
{
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn",),);
    tracing_subscriber::fmt().with_env_filter(filter,).with_target(false,).with_writer(io::stderr,).init();
}

/// Executes the CLI using parsed arguments.
///
/// # Errors
///
/// Propagates argument, configuration, fetch and serialization errors.
fn run() -> Result<(), Error,>
{
    let cli = Cli::parse();
    let common = cli.command.common();

    let config = resolve_config(common,)?;
    let slug = RepositorySlug::parse_url(&common.url,)?;
    let window = parse_window(common.since.as_deref(), common.until.as_deref(),)?;
    debug!("Collecting statistics for {} {}", slug, window);

    let spinner = spinner(&cli.command, &slug,);
    let report = collect(&cli.command, &config, &slug, &window,);
    spinner.finish_and_clear();
    let report = report?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    write_report(&mut handle, &report, common.json,)
}

fn resolve_config(args: &CommonArgs,) -> Result<CollectorConfig, Error,>
{
    let mut config = match args.config.as_deref() {
        Some(path,) => load_config(path,)?,
        None => CollectorConfig::default(),
    };
    if let Some(token,) = args.token.as_deref() {
        config.token = Some(token.to_owned(),);
    }
    config.validate()?;

    Ok(config,)
}

fn parse_window(since: Option<&str,>, until: Option<&str,>,) -> Result<TimeWindow, Error,>
{
    let since = since.map(parse_argument_date,).transpose()?;
    let until = until.map(parse_argument_date,).transpose()?;

    TimeWindow::from_dates(since, until,)
}

fn spinner(command: &Command, slug: &RepositorySlug,) -> ProgressBar
{
    let label = match command {
        Command::Contributors(_,) => "contributors",
        Command::Issues(_,) => "issues",
        Command::Pulls(_,) => "pull requests",
    };

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.yellow} [{elapsed_precise}] {msg}",)
            .expect("valid template",),
    );
    pb.set_message(format!("Collecting {label} of {slug}..."),);
    pb.enable_steady_tick(Duration::from_millis(100,),);
    pb
}

fn collect(
    command: &Command,
    config: &CollectorConfig,
    slug: &RepositorySlug,
    window: &TimeWindow,
) -> Result<Report, Error,>
{
    match command.common().mode {
        Mode::Sequential => collect_sequential(command, config, slug, window,),
        Mode::Concurrent => collect_concurrent(command, config, slug, window,),
    }
}

fn collect_sequential(
    command: &Command,
    config: &CollectorConfig,
    slug: &RepositorySlug,
    window: &TimeWindow,
) -> Result<Report, Error,>
{
    let client = BlockingClient::new(&config.client(),)?;
    let (owner, repo,) = (slug.organisation.as_str(), slug.repository.as_str(),);

    match command {
        Command::Contributors(args,) => {
            let top_n = validate_top_n(args.top.unwrap_or(config.top_contributors,),)?;
            timed_blocking("contributors statistic", || {
                contributors_statistic(&client, owner, repo, window, args.branch.as_deref(), top_n,)
            },)
            .map(Report::Contributors,)
        }
        Command::Issues(args,) => {
            let days = days_to_old(args, EventKind::Issue, config,)?;
            timed_blocking("issues statistic", || issues_statistic(&client, owner, repo, window, days,),)
                .map(Report::Events,)
        }
        Command::Pulls(args,) => {
            let days = days_to_old(args, EventKind::PullRequest, config,)?;
            timed_blocking("pull requests statistic", || {
                pull_requests_statistic(&client, owner, repo, window, days,)
            },)
            .map(Report::Events,)
        }
    }
}

fn collect_concurrent(
    command: &Command,
    config: &CollectorConfig,
    slug: &RepositorySlug,
    window: &TimeWindow,
) -> Result<Report, Error,>
{
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|source| Error::Runtime {
            source,
        },)?;

    runtime.block_on(collect_async(command, config, slug, window,),)
}

async fn collect_async(
    command: &Command,
    config: &CollectorConfig,
    slug: &RepositorySlug,
    window: &TimeWindow,
) -> Result<Report, Error,>
{
    let client = GithubClient::new(&config.client(),)?;
    let (owner, repo,) = (slug.organisation.as_str(), slug.repository.as_str(),);

    match command {
        Command::Contributors(args,) => {
            let top_n = validate_top_n(args.top.unwrap_or(config.top_contributors,),)?;
            timed(
                "contributors statistic",
                contributors_statistic_async(&client, owner, repo, window, args.branch.as_deref(), top_n,),
            )
            .await
            .map(Report::Contributors,)
        }
        Command::Issues(args,) => {
            let days = days_to_old(args, EventKind::Issue, config,)?;
            timed("issues statistic", issues_statistic_async(&client, owner, repo, window, days,),)
                .await
                .map(Report::Events,)
        }
        Command::Pulls(args,) => {
            let days = days_to_old(args, EventKind::PullRequest, config,)?;
            timed("pull requests statistic", pull_requests_statistic_async(&client, owner, repo, window, days,),)
                .await
                .map(Report::Events,)
        }
    }
}

fn days_to_old(args: &EventsArgs, kind: EventKind, config: &CollectorConfig,) -> Result<u32, Error,>
{
    match args.days_to_old {
        Some(days,) => validate_days_to_old(days,),
        None => Ok(match kind {
            EventKind::Issue => config.issue_days_to_old,
            EventKind::PullRequest => config.pr_days_to_old,
        },),
    }
}

fn write_report<W: Write,>(writer: &mut W, report: &Report, json: bool,) -> Result<(), Error,>
{
    if json {
        serde_json::to_writer_pretty(&mut *writer, report,)?;
        writeln!(writer).map_err(|source| Error::Output {
            source,
        },)?;
    } else {
        write!(writer, "{report}").map_err(|source| Error::Output {
            source,
        },)?;
    }

    Ok((),)
}
