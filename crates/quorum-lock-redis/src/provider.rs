//! Builder wiring Redis servers into a quorum manager.

use fred::error::RedisError;
use fred::prelude::*;
use quorum_lock_core::{ConfigError, Redlock, RedlockBuilder};
use thiserror::Error;

use crate::client::RedisScriptClient;

/// Errors raised while assembling a Redis-backed manager.
#[derive(Debug, Error)]
pub enum ConnectError {
    /// A server URL could not be parsed.
    #[error("invalid server URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: RedisError,
    },

    /// A server did not accept the connection.
    #[error("failed to connect to {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: RedisError,
    },

    /// The manager configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Builder for a [`Redlock`] manager backed by Redis servers.
///
/// Quorum safety comes from server independence: add an odd number of
/// unrelated servers, ideally 3 or 5. A single URL gives plain single-server
/// locking with the same API.
///
/// # Example
///
/// ```rust,no_run
/// use quorum_lock_redis::RedisRedlockBuilder;
///
/// # async fn doc() -> Result<(), Box<dyn std::error::Error>> {
/// let manager = RedisRedlockBuilder::new()
///     .url("redis://127.0.0.1:6379")
///     .url("redis://127.0.0.1:6380")
///     .url("redis://127.0.0.1:6381")
///     .build()
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct RedisRedlockBuilder {
    urls: Vec<String>,
    clients: Vec<RedisClient>,
    options: RedlockBuilder,
}

impl RedisRedlockBuilder {
    /// Creates a builder with no servers and the default manager options.
    pub fn new() -> Self {
        Self {
            urls: vec![],
            clients: vec![],
            options: RedlockBuilder::new(),
        }
    }

    /// Adds a server URL to connect during [`build`](Self::build).
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.urls.push(url.into());
        self
    }

    /// Adds multiple server URLs.
    pub fn urls(mut self, urls: &[impl AsRef<str>]) -> Self {
        for url in urls {
            self.urls.push(url.as_ref().to_string());
        }
        self
    }

    /// Uses an existing connected client as one quorum participant.
    pub fn client(mut self, client: RedisClient) -> Self {
        self.clients.push(client);
        self
    }

    /// Overrides the manager configuration (drift, retries, scripts).
    pub fn options(mut self, options: RedlockBuilder) -> Self {
        self.options = options;
        self
    }

    /// Connects any pending URLs and builds the manager.
    pub async fn build(self) -> Result<Redlock<RedisScriptClient>, ConnectError> {
        let mut participants: Vec<RedisScriptClient> = self
            .clients
            .into_iter()
            .map(RedisScriptClient::new)
            .collect();

        for url in self.urls {
            let config = RedisConfig::from_url(&url).map_err(|source| {
                ConnectError::InvalidUrl {
                    url: url.clone(),
                    source,
                }
            })?;

            let client = RedisClient::new(config, None, None, None);
            client.connect();
            client
                .wait_for_connect()
                .await
                .map_err(|source| ConnectError::Connect {
                    url: url.clone(),
                    source,
                })?;

            participants.push(RedisScriptClient::new(client));
        }

        Ok(self.options.build(participants)?)
    }
}

impl Default for RedisRedlockBuilder {
    fn default() -> Self {
        Self::new()
    }
}
