//! Redis server clients for the quorum lock manager.
//!
//! Provides [`RedisScriptClient`], a fred-backed implementation of the
//! manager's server-client capability, and [`RedisRedlockBuilder`], which
//! connects a set of independent Redis servers and assembles a ready
//! `Redlock` manager over them.

mod client;
mod provider;

pub use client::RedisScriptClient;
pub use provider::{ConnectError, RedisRedlockBuilder};
