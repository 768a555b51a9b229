// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

use std::{
    collections::HashMap,
    io::{BufRead, BufReader, Write},
    net::TcpListener,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    thread,
};

use chrono::{SecondsFormat, Utc};
use http::{HeaderMap, HeaderValue, StatusCode, header::LINK};
use repostat::{
    BlockingClient, ClientConfig, Error, Page, PageRequest, PageSource, ResourceKind, TimeWindow, classify_response,
    contributors_statistic, contributors_statistic_async, issues_statistic, issues_statistic_async, last_page,
    pull_requests_statistic, pull_requests_statistic_async,
};
use serde_json::{Value, json};

const API: &str = "https://api.github.com";

struct Response
{
    status:  StatusCode,
    headers: HeaderMap,
    body:    String,
}

/// In-memory stand-in for the REST API that answers with scripted raw
/// responses and runs them through the same classification as the real
/// client.
struct FakeGithub
{
    responses: HashMap<(ResourceKind, u32,), Response,>,
    requests:  Mutex<Vec<String,>,>,
}

impl FakeGithub
{
    fn new() -> Self
    {
        Self {
            responses: HashMap::new(),
            requests:  Mutex::new(Vec::new(),),
        }
    }

    fn pages(mut self, kind: ResourceKind, pages: Vec<Vec<Value,>,>,) -> Self
    {
        let last = pages.len();
        for (index, records,) in pages.into_iter().enumerate() {
            let number = index as u32 + 1;
            let mut headers = HeaderMap::new();
            headers.insert("x-ratelimit-remaining", HeaderValue::from_static("4999",),);
            let link = format!(
                "<{API}/repos/o/r/{kind}?per_page=100&page={last}>; rel=\"last\", <{API}/repos/o/r/{kind}?per_page=100&page=1>; rel=\"first\""
            );
            headers.insert(LINK, HeaderValue::from_str(&link,).expect("valid link header",),);
            self.responses.insert(
                (kind, number,),
                Response {
                    status: StatusCode::OK,
                    headers,
                    body: Value::Array(records,).to_string(),
                },
            );
        }
        self
    }

    fn respond(mut self, kind: ResourceKind, page: u32, status: StatusCode, headers: HeaderMap,) -> Self
    {
        self.responses.insert(
            (kind, page,),
            Response {
                status,
                headers,
                body: "{\"message\":\"scripted\"}".to_string(),
            },
        );
        self
    }

    fn requested(&self,) -> Vec<String,>
    {
        self.requests.lock().expect("requests lock",).clone()
    }
}

impl PageSource for FakeGithub
{
    async fn fetch_page(&self, request: PageRequest<'_,>,) -> Result<Page, Error,>
    {
        let url = format!("{API}{}", request.route());
        self.requests.lock().expect("requests lock",).push(url.clone(),);

        let response = self
            .responses
            .get(&(request.kind, request.page,),)
            .ok_or_else(|| Error::transport(&url, None, "no scripted response",),)?;
        classify_response(&url, response.status, &response.headers, false, &response.body,)?;

        let records: Vec<Value,> =
            serde_json::from_str(&response.body,).map_err(|e| Error::malformed("page", e.to_string(),),)?;
        Ok(Page {
            number: request.page,
            last: last_page(&response.headers,),
            records,
        },)
    }

    fn max_concurrency(&self,) -> usize
    {
        2
    }
}

fn commit(login: Option<&str,>, name: &str,) -> Value
{
    json!({
        "url": format!("{API}/repos/o/r/commits/{name}"),
        "author": login.map(|login| json!({ "login": login })),
        "commit": { "author": { "name": name, "email": "dev@example.com" }, "message": "change" }
    })
}

fn issue(state: &str, created_at: &str, closed_at: Option<&str,>,) -> Value
{
    json!({
        "url": format!("{API}/repos/o/r/issues/{created_at}"),
        "state": state,
        "created_at": created_at,
        "closed_at": closed_at
    })
}

fn contributor_pages() -> FakeGithub
{
    FakeGithub::new().pages(
        ResourceKind::Commits,
        vec![
            vec![commit(Some("alice",), "Alice",), commit(None, "Bob",)],
            vec![commit(Some("alice",), "Alice",)],
            vec![commit(Some("carol",), "Carol",), commit(Some("carol",), "Carol",), commit(None, "Bob",)],
        ],
    )
}

fn issue_pages() -> FakeGithub
{
    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true,);
    FakeGithub::new().pages(
        ResourceKind::Issues,
        vec![
            vec![issue("closed", "2020-01-01T00:00:00Z", Some("2020-01-01T00:00:00Z",),)],
            vec![issue("open", "2020-02-01T00:00:00Z", None,), issue("open", &now, None,)],
        ],
    )
}

fn exhausted_budget() -> HeaderMap
{
    let mut headers = HeaderMap::new();
    headers.insert("x-ratelimit-remaining", HeaderValue::from_static("0",),);
    headers.insert("x-ratelimit-limit", HeaderValue::from_static("60",),);
    headers
}

/// Serves `500 Internal Server Error` to every connection and counts them.
fn failing_server() -> (String, Arc<AtomicUsize,>,)
{
    let listener = TcpListener::bind("127.0.0.1:0",).expect("bind listener",);
    let base_url = format!("http://{}", listener.local_addr().expect("local address",));
    let hits = Arc::new(AtomicUsize::new(0,),);

    let counter = Arc::clone(&hits,);
    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream,) = stream else { continue };
            let mut reader = BufReader::new(stream.try_clone().expect("clone stream",),);
            let mut line = String::new();
            while reader.read_line(&mut line,).is_ok_and(|read| read > 0,) && line != "\r\n" {
                line.clear();
            }
            counter.fetch_add(1, Ordering::SeqCst,);
            let _ = stream.write_all(
                b"HTTP/1.1 500 Internal Server Error\r\nContent-Length: 2\r\nConnection: close\r\n\r\n{}",
            );
        }
    },);

    (base_url, hits,)
}

#[test]
fn github_client_requests_a_failing_page_once()
{
    let (base_url, hits,) = failing_server();
    let config = ClientConfig {
        base_url,
        ..ClientConfig::default()
    };
    let client = BlockingClient::new(&config,).expect("client",);

    let outcome = issues_statistic(&client, "o", "r", &TimeWindow::unbounded(), 14,);
    match outcome {
        Err(Error::Transport {
            status, ..
        },) => assert_eq!(status, Some(500)),
        other => panic!("expected transport error, got {other:?}"),
    }
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[test]
fn blocking_contributors_fold_every_page()
{
    let client = BlockingClient::with_source(contributor_pages(),).expect("runtime",);
    let summary = contributors_statistic(&client, "o", "r", &TimeWindow::unbounded(), Some("main",), 2,)
        .expect("statistic succeeds",);

    assert_eq!(summary.get("alice",), Some(2));
    assert_eq!(summary.get("Bob",), Some(2));
    assert_eq!(summary.get("carol",), Some(2));
    assert_eq!(summary.top().len(), 2);
    assert_eq!(summary.ranked().len(), 3);

    let requests = client.source().requested();
    assert_eq!(requests.len(), 3);
    assert!(requests[0].ends_with("/repos/o/r/commits?per_page=100&page=1&sha=main"));
}

#[test]
fn concurrent_contributors_match_blocking_result()
{
    let client = BlockingClient::with_source(contributor_pages(),).expect("runtime",);
    let blocking = contributors_statistic(&client, "o", "r", &TimeWindow::unbounded(), Some("main",), 2,)
        .expect("statistic succeeds",);

    let source = contributor_pages();
    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().expect("runtime",);
    let concurrent = runtime
        .block_on(contributors_statistic_async(&source, "o", "r", &TimeWindow::unbounded(), Some("main",), 2,),)
        .expect("statistic succeeds",);

    assert_eq!(concurrent, blocking);
    assert_eq!(concurrent.ranked()[0].login, "alice");
    assert_eq!(source.requested().len(), 3);
}

#[test]
fn blocking_issues_count_open_closed_and_old()
{
    let client = BlockingClient::with_source(issue_pages(),).expect("runtime",);
    let summary = issues_statistic(&client, "o", "r", &TimeWindow::unbounded(), 30,).expect("statistic succeeds",);

    assert_eq!((summary.open, summary.closed, summary.old), (2, 1, 1));
    assert!(client.source().requested()[0].contains("state=all"));
}

#[tokio::test]
async fn concurrent_issues_count_open_closed_and_old()
{
    let summary = issues_statistic_async(&issue_pages(), "o", "r", &TimeWindow::unbounded(), 30,)
        .await
        .expect("statistic succeeds",);

    assert_eq!(summary.counts().get("open"), Some(&2));
    assert_eq!(summary.counts().get("closed"), Some(&1));
    assert_eq!(summary.counts().get("old"), Some(&1));
}

#[test]
fn missing_repository_aborts_without_summary()
{
    let source = FakeGithub::new()
        .pages(ResourceKind::Pulls, vec![vec![issue("open", "2020-01-01T00:00:00Z", None,)], vec![]],)
        .respond(ResourceKind::Pulls, 2, StatusCode::NOT_FOUND, HeaderMap::new(),);
    let client = BlockingClient::with_source(source,).expect("runtime",);

    let outcome = pull_requests_statistic(&client, "o", "r", &TimeWindow::unbounded(), 30,);
    assert!(matches!(outcome, Err(Error::RepositoryNotFound { .. })));
}

#[tokio::test]
async fn rate_limit_on_successful_status_aborts_concurrent_fetch()
{
    let source = contributor_pages().respond(ResourceKind::Commits, 3, StatusCode::OK, exhausted_budget(),);

    let outcome = contributors_statistic_async(&source, "o", "r", &TimeWindow::unbounded(), None, 10,).await;
    match outcome {
        Err(Error::RateLimitExceeded {
            limit,
            authenticated,
            ..
        },) => {
            assert_eq!(limit, 60);
            assert!(!authenticated);
        }
        other => panic!("expected rate limit error, got {other:?}"),
    }
}

#[tokio::test]
async fn invalid_credentials_surface_from_first_page()
{
    let source = FakeGithub::new().respond(ResourceKind::Pulls, 1, StatusCode::UNAUTHORIZED, HeaderMap::new(),);

    let outcome = pull_requests_statistic_async(&source, "o", "r", &TimeWindow::unbounded(), 30,).await;
    assert!(matches!(outcome, Err(Error::InvalidCredentials { .. })));
    assert_eq!(source.requested().len(), 1);
}

#[test]
fn empty_repository_yields_empty_summaries()
{
    let source = FakeGithub::new().pages(ResourceKind::Commits, vec![vec![]],);
    let client = BlockingClient::with_source(source,).expect("runtime",);

    let summary = contributors_statistic(&client, "o", "r", &TimeWindow::unbounded(), None, 30,)
        .expect("statistic succeeds",);
    assert!(summary.ranked().is_empty());
    assert_eq!(summary.total_commits(), 0);
}

#[test]
fn zero_top_n_is_rejected_before_fetching()
{
    let client = BlockingClient::with_source(contributor_pages(),).expect("runtime",);

    let outcome = contributors_statistic(&client, "o", "r", &TimeWindow::unbounded(), None, 0,);
    assert!(matches!(outcome, Err(Error::Argument { .. })));
    assert!(client.source().requested().is_empty());
}
