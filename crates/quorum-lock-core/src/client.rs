//! The server-client capability the quorum manager is built over.

use std::fmt;
use std::future::Future;

/// One argument of a server-side script invocation.
///
/// Servers receive script arguments as flat strings or integers; this keeps
/// the marshaling explicit at the trait boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptArg {
    /// An opaque string argument, e.g. a lock value.
    Text(String),
    /// An integer argument, e.g. a TTL in milliseconds.
    Int(i64),
}

impl ScriptArg {
    /// Creates a string argument.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Creates an integer argument.
    pub fn int(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for ScriptArg {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ScriptArg {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for ScriptArg {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl fmt::Display for ScriptArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Int(value) => write!(f, "{value}"),
        }
    }
}

/// Capability set the manager requires from each quorum participant.
///
/// An implementation wraps one connection to one independent server. The
/// manager only ever asks a client to run a script atomically and, at
/// shutdown, to disconnect; everything else about the connection lifecycle is
/// the implementation's business.
///
/// # Example
///
/// ```rust,ignore
/// impl ScriptClient for MyClient {
///     type Error = MyTransportError;
///
///     async fn evaluate(&self, script: &str, keys: &[String], args: &[ScriptArg]) -> Result<i64, Self::Error> {
///         self.send_eval(script, keys, args).await
///     }
///
///     async fn quit(&self) -> Result<(), Self::Error> {
///         self.disconnect().await
///     }
/// }
/// ```
pub trait ScriptClient: Send + Sync {
    /// Reply or transport error reported by this client.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Executes `script` atomically on the server and returns its integer
    /// reply. `keys` and `args` map to the script's KEYS and ARGV tables.
    fn evaluate(
        &self,
        script: &str,
        keys: &[String],
        args: &[ScriptArg],
    ) -> impl Future<Output = Result<i64, Self::Error>> + Send;

    /// Closes the connection to the server.
    fn quit(&self) -> impl Future<Output = Result<(), Self::Error>> + Send;
}
