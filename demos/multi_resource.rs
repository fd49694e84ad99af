//! Example: locking a set of keys atomically
//!
//! Run with: `cargo run --example multi_resource`
//!
//! A multi-key resource is indivisible: either every key is covered by the
//! lease or none is, so two transfers touching overlapping accounts can
//! never interleave.

use std::time::Duration;

use quorum_lock::{LockError, RedisRedlockBuilder, Redlock, RedisScriptClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let redis_url =
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());

    let manager = RedisRedlockBuilder::new().url(&redis_url).build().await?;

    let accounts = ["accounts:alice", "accounts:bob"];
    let lock = manager.acquire(accounts, Duration::from_secs(2)).await?;
    println!("Locked {:?} in one shot", lock.resource().keys());

    // A contender without retries fails fast while the set is held.
    let contender = RedisRedlockBuilder::new()
        .url(&redis_url)
        .options(Redlock::<RedisScriptClient>::builder().retry_count(0))
        .build()
        .await?;
    match contender
        .acquire(["accounts:bob", "accounts:carol"], Duration::from_secs(2))
        .await
    {
        Err(LockError::Unavailable { attempts, .. }) => {
            println!("Overlapping transfer blocked after {attempts} attempt(s)")
        }
        Err(err) => println!("Overlapping transfer failed: {err}"),
        Ok(_) => println!("Unexpected: overlapping transfer went through"),
    }

    lock.unlock().await?;
    println!("Released; overlapping transfers may proceed");

    manager.quit().await;
    contender.quit().await;
    Ok(())
}
