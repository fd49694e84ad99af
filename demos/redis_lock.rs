//! Example: quorum locking over Redis
//!
//! Run with: `cargo run --example redis_lock`
//!
//! Requires a Redis server. Set the REDIS_URL environment variable or
//! modify the URL below; add more `.url(...)` calls for a real quorum.

use std::time::Duration;

use quorum_lock::RedisRedlockBuilder;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let redis_url =
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());

    println!("Connecting to {redis_url}...");
    let manager = RedisRedlockBuilder::new().url(&redis_url).build().await?;
    println!(
        "Quorum of {} across {} server(s)",
        manager.quorum(),
        manager.client_count()
    );

    // Acquire a 2 second lease.
    let mut lock = manager
        .acquire("example-resource", Duration::from_secs(2))
        .await?;
    println!(
        "Lock acquired in {} attempt(s), valid until {} ms",
        lock.attempts(),
        lock.expiration()
    );

    println!("Doing some work...");
    tokio::time::sleep(Duration::from_millis(500)).await;

    // Still working; push the expiration out.
    lock.extend(Duration::from_secs(2)).await?;
    println!("Lease extended, now valid until {} ms", lock.expiration());

    lock.unlock().await?;
    println!("Lock released");

    manager.quit().await;
    Ok(())
}
