//! The quorum lock manager.
//!
//! Implements the Redlock algorithm over a fixed set of independent server
//! clients. See <https://redis.io/topics/distlock> for the algorithm
//! specification.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use futures::future::join_all;
use rand::Rng;
use tokio::sync::broadcast;
use tokio::time::Instant;
use tracing::{Span, debug, instrument};

use crate::client::{ScriptArg, ScriptClient};
use crate::error::{ClientError, ConfigError, LockError, LockResult};
use crate::lock::{Lock, Resource};
use crate::options::RedlockBuilder;

/// Buffered client-error events per subscriber before a slow subscriber lags.
const CLIENT_ERROR_CAPACITY: usize = 32;

/// Milliseconds added to the computed drift to absorb server expiry
/// granularity. Fixed for compatibility with existing deployments.
const DRIFT_FLOOR_MS: i64 = 2;

/// Wall-clock milliseconds since the Unix epoch.
pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis() as u64
}

/// Timestamp-prefixed random token identifying one acquisition.
///
/// The same token is reused across the retries of a single acquisition so a
/// rollback can match what an earlier round reserved; every new acquisition
/// draws a fresh one.
fn new_lock_value() -> String {
    let mut rng = rand::thread_rng();
    format!("{}:{:032x}", now_millis(), rng.r#gen::<u128>())
}

/// Conservative upper bound on clock skew plus script execution time for a
/// lease of `ttl_ms`.
pub(crate) fn drift(ttl_ms: u64, drift_factor: f64) -> i64 {
    (ttl_ms as f64 * drift_factor).floor() as i64 + DRIFT_FLOOR_MS
}

/// Outcome of one broadcast round across every server client.
#[derive(Debug, Default)]
struct Tally {
    /// Servers whose reply covered every key of the resource.
    votes: usize,
    /// Servers that raised a reply or transport error.
    faults: usize,
    /// Servers whose reply matched at least one key.
    hits: usize,
}

/// Quorum lock manager over a fixed set of server clients.
///
/// Every acquire, extend, and release broadcasts a server-side script to all
/// clients in parallel, waits for every reply, and compares the number of
/// full-coverage replies against the majority quorum `N/2 + 1`. Individual
/// server failures never surface to the caller directly; they reduce the
/// vote count and are published as [`ClientError`] events.
///
/// Concurrent operations on the same resource are allowed; exclusivity is
/// enforced by the server-side compare-and-set scripts, not by in-process
/// state.
pub struct Redlock<C: ScriptClient> {
    clients: Arc<Vec<C>>,
    quorum: usize,
    drift_factor: f64,
    retry_count: u32,
    retry_delay: Duration,
    retry_jitter: Duration,
    lock_script: Arc<str>,
    unlock_script: Arc<str>,
    extend_script: Arc<str>,
    error_tx: broadcast::Sender<ClientError>,
}

impl<C: ScriptClient + 'static> Redlock<C> {
    /// Creates a manager with the default configuration.
    ///
    /// Fails if `clients` is empty: a quorum cannot exist without at least
    /// one participant.
    pub fn new(clients: Vec<C>) -> Result<Self, ConfigError> {
        RedlockBuilder::new().build(clients)
    }

    /// Returns a builder for a customized manager.
    pub fn builder() -> RedlockBuilder {
        RedlockBuilder::new()
    }

    pub(crate) fn from_builder(
        builder: RedlockBuilder,
        clients: Vec<C>,
    ) -> Result<Self, ConfigError> {
        if clients.is_empty() {
            return Err(ConfigError::NoClients);
        }

        let quorum = clients.len() / 2 + 1;
        let (error_tx, _) = broadcast::channel(CLIENT_ERROR_CAPACITY);

        Ok(Self {
            clients: Arc::new(clients),
            quorum,
            drift_factor: builder.drift_factor,
            retry_count: builder.retry_count,
            retry_delay: builder.retry_delay,
            retry_jitter: builder.retry_jitter,
            lock_script: builder.lock_script.into(),
            unlock_script: builder.unlock_script.into(),
            extend_script: builder.extend_script.into(),
            error_tx,
        })
    }

    /// Number of server clients in the quorum set.
    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    /// Votes required for an operation to be considered correct.
    pub fn quorum(&self) -> usize {
        self.quorum
    }

    /// Subscribes to per-server failure events.
    ///
    /// Each reply or transport error from an individual server during any
    /// operation produces exactly one event. Emission never blocks an
    /// in-flight operation, and subscribers may come and go freely.
    pub fn client_errors(&self) -> broadcast::Receiver<ClientError> {
        self.error_tx.subscribe()
    }

    /// Acquires a lease of `ttl` over `resource`.
    ///
    /// Runs up to `retry_count + 1` rounds. A round succeeds when a quorum
    /// of servers set every key of the resource and the lease still has
    /// validity left after deducting elapsed time and drift. Failed rounds
    /// dispatch a best-effort rollback of any partially set keys before the
    /// jittered backoff.
    #[instrument(
        skip(self, resource),
        fields(
            resource = tracing::field::Empty,
            ttl_ms = ttl.as_millis() as u64,
            servers = self.clients.len(),
            attempts = tracing::field::Empty,
        )
    )]
    pub async fn acquire(
        &self,
        resource: impl Into<Resource>,
        ttl: Duration,
    ) -> LockResult<Lock<'_, C>> {
        let resource = resource.into();
        Span::current().record("resource", tracing::field::display(&resource));

        let ttl_ms = ttl.as_millis() as u64;
        let value = new_lock_value();
        let args = [ScriptArg::text(value.as_str()), ScriptArg::int(ttl_ms as i64)];
        let rounds = self.retry_count + 1;

        for round in 1..=rounds {
            let started = Instant::now();
            let started_ms = now_millis();
            let replies = self
                .broadcast(&self.lock_script, resource.keys(), &args)
                .await;
            let tally = self.count_votes(replies, resource.key_count() as i64);
            let validity = self.validity(ttl_ms, started.elapsed());

            if tally.votes >= self.quorum && validity > 0 {
                Span::current().record("attempts", round);
                return Ok(Lock {
                    manager: self,
                    resource,
                    value,
                    expiration: started_ms + validity as u64,
                    attempts: round,
                });
            }

            debug!(round, votes = tally.votes, faults = tally.faults, validity, "acquire round failed");
            self.dispatch_rollback(&resource, &value);
            if round < rounds {
                self.backoff().await;
            }
        }

        Err(LockError::Unavailable {
            resource: resource.to_string(),
            attempts: rounds,
        })
    }

    /// Extends `lock` by a fresh `ttl`, updating the handle in place.
    ///
    /// A handle whose lease already lapsed is rejected without any server
    /// round: re-establishing the keys could steal the resource from its
    /// current owner. Likewise, when the first round comes back with every
    /// server answering and none recognizing the value, the lease is gone
    /// for good and the extend fails immediately. Rounds that fail on
    /// transient server errors retry like acquire.
    #[instrument(
        skip(self, lock),
        fields(
            resource = %lock.resource,
            ttl_ms = ttl.as_millis() as u64,
            servers = self.clients.len(),
        )
    )]
    pub async fn extend(&self, lock: &mut Lock<'_, C>, ttl: Duration) -> LockResult<()> {
        if lock.expiration <= now_millis() {
            return Err(LockError::Stale {
                resource: lock.resource.to_string(),
            });
        }

        let ttl_ms = ttl.as_millis() as u64;
        let args = [
            ScriptArg::text(lock.value.as_str()),
            ScriptArg::int(ttl_ms as i64),
        ];
        let rounds = self.retry_count + 1;

        for round in 1..=rounds {
            let started = Instant::now();
            let started_ms = now_millis();
            let replies = self
                .broadcast(&self.extend_script, lock.resource.keys(), &args)
                .await;
            let tally = self.count_votes(replies, lock.resource.key_count() as i64);
            let validity = self.validity(ttl_ms, started.elapsed());

            if tally.votes >= self.quorum && validity > 0 {
                lock.expiration = started_ms + validity as u64;
                lock.attempts = round;
                return Ok(());
            }

            if round == 1 && tally.hits == 0 && tally.faults == 0 {
                return Err(LockError::Stale {
                    resource: lock.resource.to_string(),
                });
            }

            debug!(round, votes = tally.votes, faults = tally.faults, validity, "extend round failed");
            self.dispatch_rollback(&lock.resource, &lock.value);
            if round < rounds {
                self.backoff().await;
            }
        }

        Err(LockError::Unavailable {
            resource: lock.resource.to_string(),
            attempts: rounds,
        })
    }

    /// Releases `lock` on every server and requires a quorum of
    /// confirmations.
    ///
    /// A single round, no retries: a release that cannot reach quorum is
    /// usually racing an expiration the caller cannot repair anyway. Every
    /// server is always attempted, even after the quorum outcome is decided.
    #[instrument(skip(self, lock), fields(resource = %lock.resource, servers = self.clients.len()))]
    pub async fn release(&self, lock: &Lock<'_, C>) -> LockResult<()> {
        let args = [ScriptArg::text(lock.value.as_str())];
        let replies = self
            .broadcast(&self.unlock_script, lock.resource.keys(), &args)
            .await;
        let tally = self.count_votes(replies, lock.resource.key_count() as i64);

        if tally.votes >= self.quorum {
            Ok(())
        } else {
            Err(LockError::ReleaseFailed {
                resource: lock.resource.to_string(),
            })
        }
    }

    /// Disconnects every server client in parallel.
    ///
    /// Per-client failures are returned in the list rather than raised, so
    /// callers see every outcome uniformly. The manager must not be used
    /// afterwards.
    #[instrument(skip(self), fields(servers = self.clients.len()))]
    pub async fn quit(&self) -> Vec<Result<(), C::Error>> {
        join_all(self.clients.iter().map(|client| client.quit())).await
    }

    /// Runs `script` on every client concurrently and waits for all replies.
    ///
    /// No early-quorum shortcut: elapsed time feeds the validity
    /// calculation, so it must reflect the slowest participant.
    async fn broadcast(
        &self,
        script: &str,
        keys: &[String],
        args: &[ScriptArg],
    ) -> Vec<Result<i64, C::Error>> {
        join_all(
            self.clients
                .iter()
                .map(|client| client.evaluate(script, keys, args)),
        )
        .await
    }

    /// Tallies one round of replies. A reply is a vote only when it covers
    /// every key; errors are published to `client_errors` subscribers.
    fn count_votes(&self, replies: Vec<Result<i64, C::Error>>, needed: i64) -> Tally {
        let mut tally = Tally::default();
        for (client, reply) in replies.into_iter().enumerate() {
            match reply {
                Ok(covered) => {
                    if covered == needed {
                        tally.votes += 1;
                    }
                    if covered > 0 {
                        tally.hits += 1;
                    }
                }
                Err(error) => {
                    tally.faults += 1;
                    let _ = self.error_tx.send(ClientError {
                        client,
                        error: Arc::new(error),
                    });
                }
            }
        }
        tally
    }

    /// Remaining lease once elapsed broadcast time and drift are deducted.
    fn validity(&self, ttl_ms: u64, elapsed: Duration) -> i64 {
        ttl_ms as i64 - elapsed.as_millis() as i64 - drift(ttl_ms, self.drift_factor)
    }

    /// Best-effort release of whatever a failed round may have reserved.
    ///
    /// The broadcast is dispatched before the next round begins but never
    /// awaited, and failures stay silent: an unreachable server's leftover
    /// reservation expires on its own TTL.
    fn dispatch_rollback(&self, resource: &Resource, value: &str) {
        let clients = Arc::clone(&self.clients);
        let script = Arc::clone(&self.unlock_script);
        let keys = resource.keys().to_vec();
        let args = [ScriptArg::text(value)];
        tokio::spawn(async move {
            let _ = join_all(
                clients
                    .iter()
                    .map(|client| client.evaluate(&script, &keys, &args)),
            )
            .await;
        });
    }

    /// Sleeps for the configured delay plus a uniform jitter, clamped at
    /// zero when the jitter exceeds the delay.
    async fn backoff(&self) {
        let base = self.retry_delay.as_millis() as i64;
        let jitter = self.retry_jitter.as_millis() as i64;
        let offset = rand::thread_rng().gen_range(-jitter..=jitter);
        tokio::time::sleep(Duration::from_millis((base + offset).max(0) as u64)).await;
    }
}
