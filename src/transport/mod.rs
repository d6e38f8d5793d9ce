//! The seam between the query client and the protocol library.
//!
//! A [`BulkTransport`] is created once per run and shared by every host task.
//! It opens one [`BulkSession`] per host query; the session owns whatever
//! network resources the exchange needs and releases them when dropped.

use std::future::Future;
use std::net::SocketAddr;

use crate::error::QueryError;
use crate::oid::ObjectId;

#[cfg(test)]
pub(crate) mod mock;
mod snmp;

pub use snmp::{SnmpSession, SnmpTransport};

/// A decoded variable binding value.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum VarValue {
    Integer(i64),
    /// Counter32, Gauge32/Unsigned32, TimeTicks and Counter64.
    Unsigned(u64),
    OctetString(Vec<u8>),
    ObjectId(ObjectId),
    Null,
    EndOfMibView,
    NoSuchObject,
    NoSuchInstance,
    /// A type this crate does not interpret.
    Unsupported,
}

impl VarValue {
    /// `true` for the SNMPv2 exception values that carry no data.
    pub fn is_exception(&self) -> bool {
        matches!(
            self,
            VarValue::EndOfMibView | VarValue::NoSuchObject | VarValue::NoSuchInstance
        )
    }

    /// Reads numeric values; negative integers yield `None`.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            VarValue::Unsigned(value) => Some(*value),
            VarValue::Integer(value) => u64::try_from(*value).ok(),
            _ => None,
        }
    }

    /// Decodes an octet string lossily as UTF-8, dropping trailing NULs.
    pub fn as_text(&self) -> Option<String> {
        match self {
            VarValue::OctetString(bytes) => {
                Some(String::from_utf8_lossy(bytes).trim_end_matches('\0').to_string())
            }
            _ => None,
        }
    }
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct VarBind {
    pub oid: ObjectId,
    pub value: VarValue,
}

impl VarBind {
    pub fn new(oid: impl Into<ObjectId>, value: VarValue) -> Self {
        Self {
            oid: oid.into(),
            value,
        }
    }
}

/// One open exchange context against a single agent.
pub trait BulkSession: Send {
    /// Sends one GETBULK for the bindings following `start` and returns the
    /// page the agent answered with.
    ///
    /// # Errors
    /// Returns [`crate::FailureKind::Transport`] when the request could not
    /// be delivered or answered, and [`crate::FailureKind::Protocol`] when
    /// the agent reported an error status or sent an unusable response.
    fn get_bulk(
        &mut self,
        start: &ObjectId,
        max_repetitions: u32,
    ) -> impl Future<Output = Result<Vec<VarBind>, QueryError>> + Send;
}

/// Factory for [`BulkSession`]s, shared read-only across host tasks.
pub trait BulkTransport: Send + Sync + 'static {
    type Session: BulkSession;

    fn open(
        &self,
        target: SocketAddr,
        community: &str,
    ) -> impl Future<Output = Result<Self::Session, QueryError>> + Send;
}
