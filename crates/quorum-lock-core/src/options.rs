//! Manager configuration.

use std::time::Duration;

use crate::client::ScriptClient;
use crate::error::ConfigError;
use crate::manager::Redlock;
use crate::scripts;

/// Default fraction of the TTL budgeted for clock drift.
pub const DEFAULT_DRIFT_FACTOR: f64 = 0.01;
/// Default number of retries after the first acquire/extend round.
pub const DEFAULT_RETRY_COUNT: u32 = 3;
/// Default base backoff between rounds.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(200);
/// Default symmetric jitter added to each backoff.
pub const DEFAULT_RETRY_JITTER: Duration = Duration::from_millis(100);

/// Builder for a [`Redlock`] manager.
///
/// All knobs have defaults; `build` only fails when the client list is
/// empty. The three server-side scripts can be replaced wholesale or derived
/// from the built-in bodies with the `map_*` variants, which apply their
/// transform to the built-in body exactly once, here at configuration time.
///
/// # Example
///
/// ```rust,ignore
/// let manager = Redlock::builder()
///     .retry_count(5)
///     .retry_delay(Duration::from_millis(100))
///     .map_lock_script(|body| format!("{body}\nredis.call(\"incr\", \"locks:taken\")"))
///     .build(clients)?;
/// ```
#[derive(Debug)]
pub struct RedlockBuilder {
    pub(crate) drift_factor: f64,
    pub(crate) retry_count: u32,
    pub(crate) retry_delay: Duration,
    pub(crate) retry_jitter: Duration,
    pub(crate) lock_script: String,
    pub(crate) unlock_script: String,
    pub(crate) extend_script: String,
}

impl RedlockBuilder {
    /// Creates a builder with the default configuration.
    pub fn new() -> Self {
        Self {
            drift_factor: DEFAULT_DRIFT_FACTOR,
            retry_count: DEFAULT_RETRY_COUNT,
            retry_delay: DEFAULT_RETRY_DELAY,
            retry_jitter: DEFAULT_RETRY_JITTER,
            lock_script: scripts::LOCK_SCRIPT.to_string(),
            unlock_script: scripts::UNLOCK_SCRIPT.to_string(),
            extend_script: scripts::EXTEND_SCRIPT.to_string(),
        }
    }

    /// Sets the fraction of each TTL deducted as clock-drift allowance.
    pub fn drift_factor(mut self, drift_factor: f64) -> Self {
        self.drift_factor = drift_factor;
        self
    }

    /// Sets how many times acquire and extend retry after their first round.
    pub fn retry_count(mut self, retry_count: u32) -> Self {
        self.retry_count = retry_count;
        self
    }

    /// Sets the base backoff between rounds.
    pub fn retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    /// Sets the symmetric jitter added to each backoff.
    pub fn retry_jitter(mut self, retry_jitter: Duration) -> Self {
        self.retry_jitter = retry_jitter;
        self
    }

    /// Replaces the acquire script with a literal body.
    pub fn lock_script(mut self, body: impl Into<String>) -> Self {
        self.lock_script = body.into();
        self
    }

    /// Derives the acquire script from the built-in body.
    pub fn map_lock_script(mut self, transform: impl FnOnce(&str) -> String) -> Self {
        self.lock_script = transform(scripts::LOCK_SCRIPT);
        self
    }

    /// Replaces the release script with a literal body.
    pub fn unlock_script(mut self, body: impl Into<String>) -> Self {
        self.unlock_script = body.into();
        self
    }

    /// Derives the release script from the built-in body.
    pub fn map_unlock_script(mut self, transform: impl FnOnce(&str) -> String) -> Self {
        self.unlock_script = transform(scripts::UNLOCK_SCRIPT);
        self
    }

    /// Replaces the extend script with a literal body.
    pub fn extend_script(mut self, body: impl Into<String>) -> Self {
        self.extend_script = body.into();
        self
    }

    /// Derives the extend script from the built-in body.
    pub fn map_extend_script(mut self, transform: impl FnOnce(&str) -> String) -> Self {
        self.extend_script = transform(scripts::EXTEND_SCRIPT);
        self
    }

    /// Builds the manager over the given quorum participants.
    pub fn build<C: ScriptClient + 'static>(
        self,
        clients: Vec<C>,
    ) -> Result<Redlock<C>, ConfigError> {
        Redlock::from_builder(self, clients)
    }
}

impl Default for RedlockBuilder {
    fn default() -> Self {
        Self::new()
    }
}
