use std::fmt;
use std::net::IpAddr;

use crate::error::{FailureKind, QueryError};

/// Interface speed in bits per second, or the raw value when the agent
/// reports something that is not a number.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum InterfaceSpeed {
    Bps(u64),
    Other(String),
}

impl fmt::Display for InterfaceSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterfaceSpeed::Bps(bps) => write!(f, "{}", bps),
            InterfaceSpeed::Other(raw) => f.write_str(raw),
        }
    }
}

/// One network interface on one device.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct InterfaceRecord {
    pub host: IpAddr,
    pub index: u64,
    pub name: String,
    pub description: String,
    pub speed: InterfaceSpeed,
}

/// The final result of querying one host.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum QueryOutcome {
    /// The walk completed. `records` may be empty; `skipped` counts table
    /// rows that lacked a required column.
    Success {
        host: IpAddr,
        records: Vec<InterfaceRecord>,
        skipped: usize,
    },
    Failure {
        host: IpAddr,
        kind: FailureKind,
        detail: String,
    },
}

impl QueryOutcome {
    /// Wraps `err` as the failed outcome of `host`.
    pub fn failure(host: IpAddr, err: QueryError) -> Self {
        QueryOutcome::Failure {
            host,
            kind: err.kind,
            detail: err.detail,
        }
    }

    /// The host this outcome belongs to.
    pub fn host(&self) -> IpAddr {
        match self {
            QueryOutcome::Success { host, .. } | QueryOutcome::Failure { host, .. } => *host,
        }
    }

    /// `None` for a success.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            QueryOutcome::Success { .. } => None,
            QueryOutcome::Failure { kind, .. } => Some(*kind),
        }
    }
}
