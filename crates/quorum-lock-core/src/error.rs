//! Error types for quorum lock operations.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// Errors raised while constructing a manager.
///
/// Kept separate from [`LockError`]: a bad configuration is a usage bug, not
/// a runtime lock outcome.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The manager needs at least one server client to form a quorum.
    #[error("at least one server client is required")]
    NoClients,
}

/// Errors that can occur during acquire, extend, and release.
#[derive(Debug, Error)]
pub enum LockError {
    /// Acquire or extend exhausted every round without reaching quorum.
    #[error("unable to secure a quorum for \"{resource}\" within {attempts} attempt(s)")]
    Unavailable {
        /// The keys the operation was trying to cover.
        resource: String,
        /// Rounds spent before giving up.
        attempts: u32,
    },

    /// Extend was called on a handle whose lease had already lapsed, or whose
    /// value no longer matched on any server.
    #[error("the lease on \"{resource}\" has already lapsed")]
    Stale {
        /// The keys the lapsed lease covered.
        resource: String,
    },

    /// A quorum of servers did not confirm the release.
    #[error("unable to confirm the release of \"{resource}\" on a quorum of servers")]
    ReleaseFailed {
        /// The keys the release targeted.
        resource: String,
    },
}

impl LockError {
    /// Rounds the failed operation used: `retry_count + 1` for an exhausted
    /// acquire or extend, `1` for a failed release, `0` for a stale extend.
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Unavailable { attempts, .. } => *attempts,
            Self::Stale { .. } => 0,
            Self::ReleaseFailed { .. } => 1,
        }
    }
}

/// Result type for lock operations.
pub type LockResult<T> = Result<T, LockError>;

/// A single server's reply or transport failure, as published to
/// `client_errors` subscribers.
///
/// Failures never abort a broadcast; they only reduce the vote count, so the
/// event stream is the only place per-server causes are visible.
#[derive(Debug, Clone)]
pub struct ClientError {
    /// Index of the failing client in the manager's client list.
    pub client: usize,
    /// The underlying error, shared so the event can fan out to subscribers.
    pub error: Arc<dyn std::error::Error + Send + Sync>,
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "server client #{}: {}", self.client, self.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attempts_follow_the_failure_kind() {
        let unavailable = LockError::Unavailable {
            resource: "r".to_string(),
            attempts: 4,
        };
        assert_eq!(unavailable.attempts(), 4);

        let stale = LockError::Stale {
            resource: "r".to_string(),
        };
        assert_eq!(stale.attempts(), 0);

        let release = LockError::ReleaseFailed {
            resource: "r".to_string(),
        };
        assert_eq!(release.attempts(), 1);
    }

    #[test]
    fn client_error_displays_the_source() {
        let event = ClientError {
            client: 2,
            error: Arc::new(std::io::Error::other("connection reset")),
        };
        assert_eq!(event.to_string(), "server client #2: connection reset");
    }
}
