use std::fmt;

use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    #[error("invalid subnet format {input:?}, reason: {source}")]
    InvalidSubnetFormat {
        input: String,
        #[source]
        source: ipnet::AddrParseError,
    },
}
pub type Result<T> = std::result::Result<T, Error>;

/// Classification of a failed host query.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum FailureKind {
    /// Host unreachable, timed out or refused the exchange. Retried.
    Transport,
    /// The device answered with an error status, or the answer could not be
    /// used. Never retried.
    Protocol,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Transport => f.write_str("TransportError"),
            FailureKind::Protocol => f.write_str("ProtocolError"),
        }
    }
}

#[derive(ThisError, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {detail}")]
pub struct QueryError {
    pub kind: FailureKind,
    pub detail: String,
}

impl QueryError {
    /// A failure to deliver or receive an exchange, retried by the coordinator.
    pub fn transport(detail: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Transport,
            detail: detail.into(),
        }
    }

    /// An error status or unusable answer from the device, never retried.
    pub fn protocol(detail: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Protocol,
            detail: detail.into(),
        }
    }

    /// Whether another attempt against the same host may succeed.
    pub fn is_retryable(&self) -> bool {
        self.kind == FailureKind::Transport
    }
}
