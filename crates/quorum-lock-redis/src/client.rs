//! Redis implementation of the server-client capability.

use fred::error::RedisError;
use fred::prelude::*;
use fred::types::CustomCommand;
use quorum_lock_core::{ScriptArg, ScriptClient};
use tracing::debug;

/// One Redis server participating in the quorum.
///
/// Wraps a connected fred client. Scripts are submitted with EVAL on every
/// call, so servers need no preloaded script cache.
#[derive(Clone)]
pub struct RedisScriptClient {
    client: RedisClient,
}

impl RedisScriptClient {
    /// Wraps an already-connected client.
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    /// Connects to `url` and waits for the connection to come up.
    pub async fn connect(url: &str) -> Result<Self, RedisError> {
        let config = RedisConfig::from_url(url)?;
        let client = RedisClient::new(config, None, None, None);
        client.connect();
        client.wait_for_connect().await?;
        debug!(url, "connected quorum participant");
        Ok(Self { client })
    }

    /// The underlying fred client.
    pub fn inner(&self) -> &RedisClient {
        &self.client
    }
}

impl ScriptClient for RedisScriptClient {
    type Error = RedisError;

    async fn evaluate(
        &self,
        script: &str,
        keys: &[String],
        args: &[ScriptArg],
    ) -> Result<i64, RedisError> {
        let mut command_args: Vec<RedisValue> = Vec::with_capacity(2 + keys.len() + args.len());
        command_args.push(script.to_string().into());
        command_args.push((keys.len() as i64).into());
        for key in keys {
            command_args.push(key.clone().into());
        }
        for arg in args {
            command_args.push(match arg {
                ScriptArg::Text(text) => text.clone().into(),
                ScriptArg::Int(value) => (*value).into(),
            });
        }

        let eval = CustomCommand::new_static("EVAL", None, false);
        self.client.custom(eval, command_args).await
    }

    async fn quit(&self) -> Result<(), RedisError> {
        self.client.quit().await
    }
}
