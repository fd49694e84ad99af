//! Built-in server-side script bodies.
//!
//! Each script runs atomically on a single server and reports how many of the
//! provided keys it affected. The manager compares that count against the
//! size of the key set: a server either covers the whole resource for the
//! caller's value or its reply does not count as a vote.

/// Sets every key to ARGV[1] with a TTL of ARGV[2] milliseconds, skipping
/// keys that already exist. Returns the number of keys newly set.
pub const LOCK_SCRIPT: &str = r#"local set = 0
for _, key in ipairs(KEYS) do
  if redis.call("set", key, ARGV[1], "NX", "PX", ARGV[2]) then
    set = set + 1
  end
end
return set"#;

/// Deletes every key whose current value equals ARGV[1]. Returns the number
/// of keys deleted.
pub const UNLOCK_SCRIPT: &str = r#"local removed = 0
for _, key in ipairs(KEYS) do
  if redis.call("get", key) == ARGV[1] then
    redis.call("del", key)
    removed = removed + 1
  end
end
return removed"#;

/// Resets the TTL of every key whose current value equals ARGV[1] to ARGV[2]
/// milliseconds. Returns the number of keys whose TTL was reset.
pub const EXTEND_SCRIPT: &str = r#"local touched = 0
for _, key in ipairs(KEYS) do
  if redis.call("get", key) == ARGV[1] then
    redis.call("pexpire", key, ARGV[2])
    touched = touched + 1
  end
end
return touched"#;
