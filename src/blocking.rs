// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Blocking façade over the asynchronous page stream.
//!
//! [`BlockingClient`] owns a current-thread tokio runtime and drives the lazy
//! sequential stream one item at a time, so synchronous callers consume
//! records through a plain [`Iterator`]. A page is only requested once the
//! iterator has been advanced past every record of the previous page.
//!
//! The façade must not be used from inside another tokio runtime.

use futures::{StreamExt, stream::LocalBoxStream};
use serde_json::Value;
use tokio::runtime::{Builder, Runtime};

use crate::{
    client::{self, FetchFilters, GithubClient, PageSource},
    config::ClientConfig,
    error::Error,
    records::ResourceKind,
};

/// Synchronous client driving a [`PageSource`] on a private runtime.
#[derive(Debug,)]
pub struct BlockingClient<S = GithubClient,>
{
    runtime: Runtime,
    source:  S,
}

impl BlockingClient<GithubClient,>
{
    /// Builds a blocking GitHub client.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Runtime`] when the runtime cannot start and the
    /// errors of [`GithubClient::new`] otherwise.
    pub fn new(config: &ClientConfig,) -> Result<Self, Error,>
    {
        let runtime = current_thread_runtime()?;
        let source = {
            let _guard = runtime.enter();
            GithubClient::new(config,)?
        };

        Ok(Self {
            runtime,
            source,
        },)
    }
}

impl<S: PageSource,> BlockingClient<S,>
{
    /// Wraps an arbitrary page source.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Runtime`] when the runtime cannot start.
    pub fn with_source(source: S,) -> Result<Self, Error,>
    {
        Ok(Self {
            runtime: current_thread_runtime()?,
            source,
        },)
    }

    /// Underlying page source.
    pub fn source(&self,) -> &S
    {
        &self.source
    }

    /// Lazily iterates every raw record of a collection.
    ///
    /// The iterator yields the first error it meets and then stops.
    pub fn fetch_paged<'a,>(
        &'a self,
        kind: ResourceKind,
        organisation: &'a str,
        repository: &'a str,
        filters: &'a FetchFilters,
    ) -> BlockingPages<'a,>
    {
        BlockingPages {
            runtime: &self.runtime,
            stream:  client::fetch_paged(&self.source, kind, organisation, repository, filters,).boxed_local(),
            done:    false,
        }
    }
}

/// Iterator returned by [`BlockingClient::fetch_paged`].
pub struct BlockingPages<'a,>
{
    runtime: &'a Runtime,
    stream:  LocalBoxStream<'a, Result<Value, Error,>,>,
    done:    bool,
}

impl Iterator for BlockingPages<'_,>
{
    type Item = Result<Value, Error,>;

    fn next(&mut self,) -> Option<Self::Item,>
    {
        if self.done {
            return None;
        }
        let item = self.runtime.block_on(self.stream.next(),);
        self.done = !matches!(item, Some(Ok(_,),));
        item
    }
}

fn current_thread_runtime() -> Result<Runtime, Error,>
{
    Builder::new_current_thread().enable_all().build().map_err(|source| Error::Runtime {
        source,
    },)
}
