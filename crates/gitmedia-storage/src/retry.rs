// Copyright (C) 2026  winnyboy5
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.
use crate::error::TransportResult;
use crate::oid::Oid;
use crate::Transport;
use async_trait::async_trait;
use std::future::Future;
use std::path::Path;
use std::time::Duration;
use tracing::warn;

/// Bounded exponential backoff for unreachable remotes
///
/// Only [`TransportError::Unreachable`](crate::TransportError::Unreachable)
/// is retried. Every other error is returned immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 3,
            initial_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Policy for `git-media.retries`: attempts after the first; zero disables retrying
    pub fn from_retries(retries: u32) -> Self {
        RetryPolicy {
            max_attempts: retries.saturating_add(1),
            ..Self::default()
        }
    }

    pub async fn run<T, F, Fut>(&self, what: &str, mut operation: F) -> TransportResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = TransportResult<T>>,
    {
        let mut attempt = 1;
        let mut delay = self.initial_delay;

        loop {
            match operation().await {
                Err(e) if e.is_retryable() && attempt < self.max_attempts => {
                    warn!(
                        "{} failed (attempt {}/{}), retrying in {}ms: {}",
                        what,
                        attempt,
                        self.max_attempts,
                        delay.as_millis(),
                        e
                    );
                    tokio::time::sleep(delay).await;
                    delay = (delay * 2).min(self.max_delay);
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}

/// Applies a [`RetryPolicy`] to every call of the wrapped transport
#[derive(Debug)]
pub struct RetryingTransport<T> {
    inner: T,
    policy: RetryPolicy,
}

impl<T: Transport> RetryingTransport<T> {
    pub fn new(inner: T, policy: RetryPolicy) -> Self {
        RetryingTransport { inner, policy }
    }
}

#[async_trait]
impl<T: Transport> Transport for RetryingTransport<T> {
    async fn exists(&self, oid: &Oid) -> TransportResult<bool> {
        self.policy
            .run("exists", || self.inner.exists(oid))
            .await
    }

    async fn get_file(&self, oid: &Oid, dest: &Path) -> TransportResult<()> {
        self.policy
            .run("download", || self.inner.get_file(oid, dest))
            .await
    }

    async fn put_file(&self, oid: &Oid, src: &Path) -> TransportResult<()> {
        self.policy
            .run("upload", || self.inner.put_file(oid, src))
            .await
    }
}
