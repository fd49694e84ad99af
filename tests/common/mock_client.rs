//! In-memory server client for quorum tests.
//!
//! One `MockServerClient` stands in for one independent server. It
//! implements the three built-in script contracts over a keyed store with
//! millisecond expiry, records every script body it evaluates, and can be
//! told to treat chosen keys as wrong-typed so evaluations error like a real
//! server reply error.

#![allow(dead_code)] // Not every test file uses every helper.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use quorum_lock::{ScriptArg, ScriptClient, scripts};
use thiserror::Error;

/// Reply error produced by the mock server.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct MockError(pub String);

#[derive(Debug, Clone)]
struct StoredValue {
    value: String,
    expires_at: u64,
}

#[derive(Debug, Default)]
struct MockState {
    entries: HashMap<String, StoredValue>,
    fail_keys: HashSet<String>,
    scripts_seen: Vec<String>,
    values_seen: Vec<String>,
    eval_calls: u32,
    quit_calls: u32,
}

/// One simulated quorum participant. Clones share the same server state, so
/// tests can keep a handle for inspection after the manager takes ownership.
#[derive(Clone, Default)]
pub struct MockServerClient {
    state: Arc<Mutex<MockState>>,
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis() as u64
}

impl MockServerClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every evaluation touching `key` fail like a wrong-typed key.
    pub fn fail_key(&self, key: &str) {
        self.state.lock().unwrap().fail_keys.insert(key.to_string());
    }

    /// Plants an entry as if another owner had locked `key`.
    pub fn seed(&self, key: &str, value: &str, ttl_ms: u64) {
        self.state.lock().unwrap().entries.insert(
            key.to_string(),
            StoredValue {
                value: value.to_string(),
                expires_at: now_millis() + ttl_ms,
            },
        );
    }

    /// Drops an entry behind the manager's back.
    pub fn remove_key(&self, key: &str) {
        self.state.lock().unwrap().entries.remove(key);
    }

    /// The live value stored under `key`, if any.
    pub fn stored_value(&self, key: &str) -> Option<String> {
        let state = self.state.lock().unwrap();
        state
            .entries
            .get(key)
            .filter(|entry| entry.expires_at > now_millis())
            .map(|entry| entry.value.clone())
    }

    /// Every script body evaluated so far, in order.
    pub fn scripts_seen(&self) -> Vec<String> {
        self.state.lock().unwrap().scripts_seen.clone()
    }

    /// ARGV[1] of every evaluation so far, in order. For all three built-in
    /// scripts this is the acquisition value.
    pub fn values_seen(&self) -> Vec<String> {
        self.state.lock().unwrap().values_seen.clone()
    }

    /// Number of evaluations this server has handled.
    pub fn eval_calls(&self) -> u32 {
        self.state.lock().unwrap().eval_calls
    }

    /// Number of times the manager asked this server to disconnect.
    pub fn quit_calls(&self) -> u32 {
        self.state.lock().unwrap().quit_calls
    }
}

fn arg_text(arg: &ScriptArg) -> String {
    match arg {
        ScriptArg::Text(text) => text.clone(),
        ScriptArg::Int(value) => value.to_string(),
    }
}

fn arg_int(arg: &ScriptArg) -> u64 {
    match arg {
        ScriptArg::Int(value) => *value as u64,
        ScriptArg::Text(text) => text.parse().unwrap(),
    }
}

impl ScriptClient for MockServerClient {
    type Error = MockError;

    async fn evaluate(
        &self,
        script: &str,
        keys: &[String],
        args: &[ScriptArg],
    ) -> Result<i64, MockError> {
        let mut state = self.state.lock().unwrap();
        state.eval_calls += 1;
        state.scripts_seen.push(script.to_string());
        if let Some(first) = args.first() {
            state.values_seen.push(arg_text(first));
        }

        let now = now_millis();
        state.entries.retain(|_, entry| entry.expires_at > now);

        if keys.iter().any(|key| state.fail_keys.contains(key)) {
            return Err(MockError(
                "WRONGTYPE Operation against a key holding the wrong kind of value".to_string(),
            ));
        }

        // Custom bodies built by transforms start with the built-in body, so
        // prefix matching dispatches them to the same contract.
        if script.starts_with(scripts::LOCK_SCRIPT) {
            let value = arg_text(&args[0]);
            let ttl_ms = arg_int(&args[1]);
            let mut set = 0;
            for key in keys {
                if !state.entries.contains_key(key) {
                    state.entries.insert(
                        key.clone(),
                        StoredValue {
                            value: value.clone(),
                            expires_at: now + ttl_ms,
                        },
                    );
                    set += 1;
                }
            }
            Ok(set)
        } else if script.starts_with(scripts::UNLOCK_SCRIPT) {
            let value = arg_text(&args[0]);
            let mut removed = 0;
            for key in keys {
                if state
                    .entries
                    .get(key)
                    .is_some_and(|entry| entry.value == value)
                {
                    state.entries.remove(key);
                    removed += 1;
                }
            }
            Ok(removed)
        } else if script.starts_with(scripts::EXTEND_SCRIPT) {
            let value = arg_text(&args[0]);
            let ttl_ms = arg_int(&args[1]);
            let mut touched = 0;
            for key in keys {
                if let Some(entry) = state.entries.get_mut(key) {
                    if entry.value == value {
                        entry.expires_at = now + ttl_ms;
                        touched += 1;
                    }
                }
            }
            Ok(touched)
        } else {
            Err(MockError(format!(
                "NOSCRIPT unrecognized script body: {script:?}"
            )))
        }
    }

    async fn quit(&self) -> Result<(), MockError> {
        self.state.lock().unwrap().quit_calls += 1;
        Ok(())
    }
}
