use std::future::Future;
use std::net::SocketAddr;

use log::debug;
use snmp2::{AsyncSession, Oid, Value};

use super::{BulkSession, BulkTransport, VarBind, VarValue};
use crate::error::QueryError;
use crate::oid::ObjectId;

/// SNMPv2c transport backed by [`snmp2::AsyncSession`].
///
/// Each opened session binds its own UDP socket, which is closed when the
/// session is dropped. The transport itself holds no sockets and can be
/// shared by any number of concurrent host queries.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnmpTransport;

impl SnmpTransport {
    pub fn new() -> Self {
        Self
    }
}

pub struct SnmpSession {
    target: SocketAddr,
    session: AsyncSession,
}

impl BulkTransport for SnmpTransport {
    type Session = SnmpSession;

    fn open(
        &self,
        target: SocketAddr,
        community: &str,
    ) -> impl Future<Output = Result<SnmpSession, QueryError>> + Send {
        let community = community.as_bytes().to_vec();
        async move {
            let session = AsyncSession::new_v2c(target, &community, 0)
                .await
                .map_err(|err| {
                    QueryError::transport(format!(
                        "failed to open session to {}, reason: {}",
                        target, err
                    ))
                })?;
            Ok(SnmpSession { target, session })
        }
    }
}

impl BulkSession for SnmpSession {
    fn get_bulk(
        &mut self,
        start: &ObjectId,
        max_repetitions: u32,
    ) -> impl Future<Output = Result<Vec<VarBind>, QueryError>> + Send {
        let start = start.clone();
        async move {
            let target = self.target;
            let oid = Oid::from(start.arcs()).map_err(|_| {
                QueryError::protocol(format!("cannot encode OID {}", start))
            })?;
            debug!("GETBULK {} from {} (max-repetitions {})", start, target, max_repetitions);
            let pdu = self
                .session
                .getbulk(&[&oid], 0, max_repetitions)
                .await
                .map_err(|err| classify(target, err))?;

            if pdu.error_status != 0 {
                return Err(QueryError::protocol(format!(
                    "{} returned error status {} ({}) at index {}",
                    target,
                    pdu.error_status,
                    error_status_name(pdu.error_status),
                    pdu.error_index
                )));
            }

            let mut varbinds = Vec::new();
            for (name, value) in pdu.varbinds {
                let oid = object_id(&name).ok_or_else(|| {
                    QueryError::protocol(format!("{} returned an OID with an oversized arc", target))
                })?;
                varbinds.push(VarBind::new(oid, var_value(value)));
            }
            Ok(varbinds)
        }
    }
}

fn classify(target: SocketAddr, err: snmp2::Error) -> QueryError {
    match err {
        snmp2::Error::Send | snmp2::Error::Receive => {
            QueryError::transport(format!("exchange with {} failed: {:?}", target, err))
        }
        err => QueryError::protocol(format!("unusable response from {}: {:?}", target, err)),
    }
}

fn object_id(oid: &Oid<'_>) -> Option<ObjectId> {
    oid.iter().map(|arcs| ObjectId::new(arcs.collect()))
}

fn var_value(value: Value<'_>) -> VarValue {
    match value {
        Value::Integer(value) => VarValue::Integer(value),
        Value::Counter32(value) | Value::Unsigned32(value) | Value::Timeticks(value) => {
            VarValue::Unsigned(value.into())
        }
        Value::Counter64(value) => VarValue::Unsigned(value),
        Value::OctetString(bytes) => VarValue::OctetString(bytes.to_vec()),
        Value::ObjectIdentifier(oid) => {
            object_id(&oid).map_or(VarValue::Unsupported, VarValue::ObjectId)
        }
        Value::Null => VarValue::Null,
        Value::EndOfMibView => VarValue::EndOfMibView,
        Value::NoSuchObject => VarValue::NoSuchObject,
        Value::NoSuchInstance => VarValue::NoSuchInstance,
        _ => VarValue::Unsupported,
    }
}

fn error_status_name(status: u32) -> &'static str {
    match status {
        1 => "tooBig",
        2 => "noSuchName",
        3 => "badValue",
        4 => "readOnly",
        5 => "genErr",
        6 => "noAccess",
        7 => "wrongType",
        8 => "wrongLength",
        9 => "wrongEncoding",
        10 => "wrongValue",
        11 => "noCreation",
        12 => "inconsistentValue",
        13 => "resourceUnavailable",
        14 => "commitFailed",
        15 => "undoFailed",
        16 => "authorizationError",
        17 => "notWritable",
        18 => "inconsistentName",
        _ => "unknown",
    }
}
