// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Elapsed-time logging around whole statistic calls.
///
/// The wrappers are composed explicitly at call sites and leave the wrapped
/// result untouched.
use std::{future::Future, time::Instant};

use tracing::info;

/// Awaits `future` and logs how long it took.
///
/// # Arguments
///
/// * `label` - Operation name used in the log line
/// * `future` - Operation to time
///
/// # Example
///
/// ```
/// use repostat::timed;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let answer = timed("answer", async { 42 },).await;
/// assert_eq!(answer, 42);
/// # }
/// ```
pub async fn timed<F, T,>(label: &str, future: F,) -> T
where
    F: Future<Output = T,>,
{
    let started = Instant::now();
    let output = future.await;
    info!("{} run in {:.3}s", label, started.elapsed().as_secs_f64());
    output
}

/// Runs `f` and logs how long it took.
pub fn timed_blocking<F, T,>(label: &str, f: F,) -> T
where
    F: FnOnce() -> T,
{
    let started = Instant::now();
    let output = f();
    info!("{} run in {:.3}s", label, started.elapsed().as_secs_f64());
    output
}
