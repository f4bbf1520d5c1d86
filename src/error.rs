use std::io;
use std::net::SocketAddr;

/// A configuration update was refused. Nothing was applied.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid `{field}`: {reason}")]
pub struct InvalidConfiguration {
    field: &'static str,
    reason: String,
}

impl InvalidConfiguration {
    pub(crate) fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }

    /// The name of the offending field, as spelled on the control channel (`"body"` if the
    /// payload itself could not be read).
    pub fn field(&self) -> &'static str {
        self.field
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// Failures that stop a server from running.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to bind {address}")]
    Bind {
        address: SocketAddr,
        #[source]
        source: io::Error,
    },
    #[error("failed to hand the listener over to the async runtime")]
    Listener(#[source] io::Error),
    #[error("failed to build the server runtime")]
    Runtime(#[source] io::Error),
}
