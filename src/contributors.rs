// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Commit counting per contributor.
///
/// [`ContributorsAggregator`] folds [`CommitRecord`]s into per-identity counts
/// and produces a [`ContributorsSummary`] ranked by commit count. Ties keep
/// first-seen order. The top-N cut only applies to rendering; accumulation and
/// the machine-readable accessors always see every contributor.
use std::{
    borrow::Borrow,
    collections::{BTreeMap, HashMap},
    fmt,
};

use serde::Serialize;
use tracing::info;

use crate::records::{CommitRecord, StatisticScope};

const LOGIN_COLUMN_WIDTH: usize = 40;

/// Commit count of one contributor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize,)]
pub struct ContributorCount
{
    pub login:   String,
    pub commits: u64,
}

/// Incremental per-contributor commit counter.
///
/// # Example
///
/// ```
/// use repostat::{CommitRecord, ContributorsAggregator, StatisticScope, TimeWindow};
///
/// let commit = |login: &str| CommitRecord {
///     url:             String::new(),
///     author:          None,
///     committer:       None,
///     author_login:    Some(login.to_owned(),),
///     committer_login: None,
///     message:         String::new(),
/// };
///
/// let mut aggregator = ContributorsAggregator::new();
/// aggregator.consume(&[commit("alice",), commit("bob",), commit("alice",)],);
/// let summary = aggregator.finish(StatisticScope::new("o", "r", None, TimeWindow::unbounded(),), 30,);
/// assert_eq!(summary.get("alice",), Some(2));
/// assert_eq!(summary.ranked()[0].login, "alice");
/// ```
#[derive(Debug, Clone, Default,)]
pub struct ContributorsAggregator
{
    counts: Vec<ContributorCount,>,
    index:  HashMap<String, usize,>,
}

impl ContributorsAggregator
{
    /// Creates an empty aggregator.
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Credits one commit to its contributor.
    pub fn record(&mut self, commit: &CommitRecord,)
    {
        let login = commit.contributor();
        match self.index.get(login,) {
            Some(&position,) => self.counts[position].commits += 1,
            None => {
                self.index.insert(login.to_owned(), self.counts.len(),);
                self.counts.push(ContributorCount {
                    login:   login.to_owned(),
                    commits: 1,
                },);
            }
        }
    }

    /// Credits every commit of `commits`.
    pub fn consume<I,>(&mut self, commits: I,)
    where
        I: IntoIterator,
        I::Item: Borrow<CommitRecord,>,
    {
        for commit in commits {
            self.record(commit.borrow(),);
        }
    }

    /// Number of distinct contributors seen so far.
    pub fn len(&self,) -> usize
    {
        self.counts.len()
    }

    /// Whether no commit has been recorded.
    pub fn is_empty(&self,) -> bool
    {
        self.counts.is_empty()
    }

    /// Ranks the accumulated counts into a summary.
    ///
    /// `top_n` bounds the rendered table only.
    pub fn finish(self, scope: StatisticScope, top_n: usize,) -> ContributorsSummary
    {
        let mut ranked = self.counts;
        ranked.sort_by(|left, right| right.commits.cmp(&left.commits,),);

        info!("Ranked {} contributors for {}", ranked.len(), scope);

        ContributorsSummary {
            scope,
            top_n,
            contributors: ranked,
        }
    }
}

/// Ranked contributor statistic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize,)]
pub struct ContributorsSummary
{
    pub scope:    StatisticScope,
    pub top_n:    usize,
    contributors: Vec<ContributorCount,>,
}

impl ContributorsSummary
{
    /// Every contributor, highest count first, ties in first-seen order.
    pub fn ranked(&self,) -> &[ContributorCount]
    {
        &self.contributors
    }

    /// Contributors shown in the rendered table.
    pub fn top(&self,) -> &[ContributorCount]
    {
        &self.contributors[..self.top_n.min(self.contributors.len(),)]
    }

    /// Mapping from login to commit count over every contributor.
    pub fn counts(&self,) -> BTreeMap<String, u64,>
    {
        self.contributors.iter().map(|entry| (entry.login.clone(), entry.commits,),).collect()
    }

    /// Commit count of one contributor.
    pub fn get(&self, login: &str,) -> Option<u64,>
    {
        self.contributors.iter().find(|entry| entry.login == login,).map(|entry| entry.commits,)
    }

    /// Total number of commits counted.
    pub fn total_commits(&self,) -> u64
    {
        self.contributors.iter().map(|entry| entry.commits,).sum()
    }
}

impl fmt::Display for ContributorsSummary
{
    fn fmt(&self, f: &mut fmt::Formatter<'_,>,) -> fmt::Result
    {
        writeln!(f, "Contributors of {}", self.scope)?;
        writeln!(f, "{:<width$} commits", "Login", width = LOGIN_COLUMN_WIDTH)?;
        for entry in self.top() {
            writeln!(f, "{:<width$} {}", entry.login, entry.commits, width = LOGIN_COLUMN_WIDTH)?;
        }
        Ok((),)
    }
}
