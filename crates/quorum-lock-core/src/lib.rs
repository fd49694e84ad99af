//! Quorum locking over independent script-capable key-value servers.
//!
//! This crate implements the Redlock algorithm: a lease over a resource (one
//! key, or a key set locked atomically) is held only while a majority of N
//! independent servers agree, with elapsed time and clock drift deducted
//! from the advertised TTL. See <https://redis.io/topics/distlock> for the
//! algorithm specification.
//!
//! The manager is generic over [`ScriptClient`], the two-method capability
//! it needs from each server: run a script atomically, and disconnect. The
//! `quorum-lock-redis` crate provides the Redis-backed client.
//!
//! # Example
//!
//! ```rust,ignore
//! let manager = Redlock::new(clients)?;
//!
//! let mut lock = manager.acquire("jobs:nightly-report", Duration::from_secs(30)).await?;
//! // Critical section; renew while the work is still running.
//! lock.extend(Duration::from_secs(30)).await?;
//! lock.unlock().await?;
//! ```

pub mod client;
pub mod error;
pub mod lock;
pub mod manager;
pub mod options;
pub mod prelude;
pub mod scripts;

pub use client::{ScriptArg, ScriptClient};
pub use error::{ClientError, ConfigError, LockError, LockResult};
pub use lock::{Lock, Resource};
pub use manager::Redlock;
pub use options::RedlockBuilder;
