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
use crate::retry::{RetryPolicy, RetryingTransport};
use crate::{open_transport, Transport};
use gitmedia_config::{ConfigError, MediaConfig, TransportConfig};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Lazily connected transport for one invocation
///
/// Commands that may not need the remote at all (smudge with a warm cache,
/// `check` on a healthy store) hold a handle instead of a connection. The
/// first call to [`get`](Self::get) resolves the configured backend; later
/// calls reuse it.
#[derive(Debug)]
pub struct TransportHandle {
    config: Option<TransportConfig>,
    policy: RetryPolicy,
    transport: OnceCell<Arc<dyn Transport>>,
}

impl TransportHandle {
    pub fn new(config: &MediaConfig) -> Self {
        TransportHandle {
            config: config.transport.clone(),
            policy: RetryPolicy::from_retries(config.retries),
            transport: OnceCell::new(),
        }
    }

    /// Handle around an already connected transport
    pub fn connected(transport: Arc<dyn Transport>) -> Self {
        TransportHandle {
            config: None,
            policy: RetryPolicy::default(),
            transport: OnceCell::new_with(Some(transport)),
        }
    }

    /// Whether a connection has been made
    pub fn is_connected(&self) -> bool {
        self.transport.initialized()
    }

    /// The transport, connecting on first use
    pub async fn get(&self) -> TransportResult<Arc<dyn Transport>> {
        let transport = self
            .transport
            .get_or_try_init(|| async {
                let config = self.config.as_ref().ok_or(ConfigError::NotConfigured)?;
                let inner = open_transport(config).await?;
                Ok::<_, crate::TransportError>(
                    Arc::new(RetryingTransport::new(inner, self.policy)) as Arc<dyn Transport>
                )
            })
            .await?;
        Ok(Arc::clone(transport))
    }
}
