//! Redlock-style quorum locking across independent key-value servers.
//!
//! A caller names a resource (one key, or a key set that must be locked
//! atomically) and requests a lease of bounded duration. The lease holds
//! only while a majority of N independent servers agree, with elapsed time
//! and clock drift deducted from the advertised TTL; the returned handle can
//! be released or extended until its expiration.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::time::Duration;
//!
//! use quorum_lock::RedisRedlockBuilder;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Three independent servers; quorum is 2.
//!     let manager = RedisRedlockBuilder::new()
//!         .url("redis://127.0.0.1:6379")
//!         .url("redis://127.0.0.1:6380")
//!         .url("redis://127.0.0.1:6381")
//!         .build()
//!         .await?;
//!
//!     let mut lock = manager
//!         .acquire("jobs:nightly-report", Duration::from_secs(30))
//!         .await?;
//!
//!     // Critical section; renew while the work is still running.
//!     lock.extend(Duration::from_secs(30)).await?;
//!
//!     lock.unlock().await?;
//!     manager.quit().await;
//!     Ok(())
//! }
//! ```
//!
//! # Guarantees
//!
//! - **Quorum**: every acquire, extend, and release requires `N/2 + 1`
//!   servers to confirm full coverage of the resource's key set.
//! - **Validity accounting**: the handle's expiration is the round start
//!   plus `ttl - elapsed - drift`, never later than `start + ttl`.
//! - **Multi-key atomicity**: a multi-key resource is taken entirely or not
//!   at all; partial reservations are rolled back between rounds.
//!
//! Redlock's well-known caveats apply: this reproduces the algorithm's
//! stated guarantees, not strict linearizability under arbitrary failures.
//! There are no fencing tokens and no automatic renewal.
//!
//! # Crate Organization
//!
//! This is a meta-crate that re-exports:
//! - `quorum-lock-core`: the manager, lock handles, errors, and the
//!   [`ScriptClient`] trait for custom backends.
//! - `quorum-lock-redis`: fred-backed Redis clients and the connection
//!   builder.

pub use quorum_lock_core::*;
pub use quorum_lock_redis::*;
