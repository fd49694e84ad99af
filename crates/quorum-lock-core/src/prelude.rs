//! Convenience prelude for quorum lock types.

pub use crate::client::{ScriptArg, ScriptClient};
pub use crate::error::{ClientError, ConfigError, LockError, LockResult};
pub use crate::lock::{Lock, Resource};
pub use crate::manager::Redlock;
pub use crate::options::RedlockBuilder;
