use std::collections::BTreeMap;
use std::future::Future;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use log::debug;

use crate::constants::{
    IF_DESCR, IF_HIGH_SPEED, IF_INDEX, IF_NAME, IF_SPEED, IF_SPEED_SATURATED, MAX_REPETITIONS,
    MBPS, RESPONSE_TIMEOUT, SNMP_PORT,
};
use crate::error::QueryError;
use crate::interface::{InterfaceRecord, InterfaceSpeed, QueryOutcome};
use crate::oid::ObjectId;
use crate::transport::{BulkSession, BulkTransport, VarBind, VarValue};

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub community: String,
    pub port: u16,
    /// GETBULK max-repetitions, i.e. bindings requested per page.
    pub max_repetitions: u32,
    /// Deadline for each single exchange, session setup included.
    pub response_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct ClientConfigBuilder {
    community: String,
    port: u16,
    max_repetitions: u32,
    response_timeout: Duration,
}

impl ClientConfigBuilder {
    /// Starts a config for `community` with the default port 161, 25
    /// bindings per page and a 2 second response timeout.
    pub fn new(community: &str) -> Self {
        Self {
            community: community.into(),
            port: SNMP_PORT,
            max_repetitions: MAX_REPETITIONS,
            response_timeout: RESPONSE_TIMEOUT,
        }
    }

    /// Sets the UDP port the agents listen on.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Values below 1 are raised to 1.
    pub fn with_max_repetitions(mut self, max_repetitions: u32) -> Self {
        self.max_repetitions = max_repetitions.max(1);
        self
    }

    /// Sets the deadline for each single exchange, session setup included.
    pub fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }

    /// Finishes the builder.
    pub fn build(self) -> ClientConfig {
        ClientConfig {
            community: self.community,
            port: self.port,
            max_repetitions: self.max_repetitions,
            response_timeout: self.response_timeout,
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum Column {
    Index,
    Descr,
    Speed,
    Name,
    HighSpeed,
}

impl Column {
    const ALL: [Column; 5] = [
        Column::Index,
        Column::Descr,
        Column::Speed,
        Column::Name,
        Column::HighSpeed,
    ];

    fn root(self) -> ObjectId {
        let arcs = match self {
            Column::Index => IF_INDEX,
            Column::Descr => IF_DESCR,
            Column::Speed => IF_SPEED,
            Column::Name => IF_NAME,
            Column::HighSpeed => IF_HIGH_SPEED,
        };
        ObjectId::from(arcs)
    }
}

#[derive(Default, Debug)]
struct Row {
    index: Option<VarValue>,
    descr: Option<VarValue>,
    speed: Option<VarValue>,
    name: Option<VarValue>,
    high_speed: Option<VarValue>,
}

impl Row {
    fn set(&mut self, column: Column, value: VarValue) {
        let slot = match column {
            Column::Index => &mut self.index,
            Column::Descr => &mut self.descr,
            Column::Speed => &mut self.speed,
            Column::Name => &mut self.name,
            Column::HighSpeed => &mut self.high_speed,
        };
        *slot = Some(value);
    }

    fn into_record(self, host: IpAddr) -> Option<InterfaceRecord> {
        let index = self.index.as_ref().and_then(VarValue::as_u64)?;
        let description = self.descr.as_ref().and_then(VarValue::as_text)?;
        let speed = match self.speed? {
            value if value.is_exception() => return None,
            value => match value.as_u64() {
                Some(IF_SPEED_SATURATED) => match self.high_speed.as_ref().and_then(VarValue::as_u64) {
                    Some(mbps) => InterfaceSpeed::Bps(mbps.saturating_mul(MBPS)),
                    None => InterfaceSpeed::Bps(IF_SPEED_SATURATED),
                },
                Some(bps) => InterfaceSpeed::Bps(bps),
                None => InterfaceSpeed::Other(value.as_text()?),
            },
        };
        let name = self
            .name
            .as_ref()
            .and_then(VarValue::as_text)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| description.clone());
        Some(InterfaceRecord {
            host,
            index,
            name,
            description,
            speed,
        })
    }
}

/// Collects the interface table of one host at a time.
///
/// The client never retries; a failed exchange is reported in the returned
/// [`QueryOutcome`] and retry policy is left to the caller.
#[derive(Debug)]
pub struct Client<T> {
    transport: Arc<T>,
    config: ClientConfig,
}

impl<T> Clone for Client<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            config: self.config.clone(),
        }
    }
}

impl<T: BulkTransport> Client<T> {
    /// Creates a client that opens its sessions through `transport`.
    pub fn new(transport: Arc<T>, config: ClientConfig) -> Self {
        Self { transport, config }
    }

    /// Returns the configuration the client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Walks the interface columns of `host` and decodes them into records
    /// ordered by interface index.
    ///
    /// Every column is paged with successive GETBULK requests until the walk
    /// leaves the column, so tables larger than one page come back whole.
    /// Rows missing the index, description or speed are counted as skipped.
    pub async fn query(&self, host: IpAddr) -> QueryOutcome {
        match self.collect(host).await {
            Ok(rows) => {
                let total = rows.len();
                let mut records: Vec<InterfaceRecord> = rows
                    .into_values()
                    .filter_map(|row| row.into_record(host))
                    .collect();
                records.sort_by_key(|record| record.index);
                let skipped = total - records.len();
                debug!("{}: {} interfaces, {} rows skipped", host, records.len(), skipped);
                QueryOutcome::Success {
                    host,
                    records,
                    skipped,
                }
            }
            Err(err) => {
                debug!("{}: query failed, {}", host, err);
                QueryOutcome::failure(host, err)
            }
        }
    }

    async fn collect(&self, host: IpAddr) -> Result<BTreeMap<u64, Row>, QueryError> {
        let target = SocketAddr::new(host, self.config.port);
        let mut session = self
            .deadline(target, self.transport.open(target, &self.config.community))
            .await?;

        let mut rows: BTreeMap<u64, Row> = BTreeMap::new();
        for column in Column::ALL {
            for varbind in self.walk(&mut session, target, &column.root()).await? {
                if let Some(row) = varbind.oid.last_arc() {
                    rows.entry(row).or_default().set(column, varbind.value);
                }
            }
        }
        Ok(rows)
    }

    async fn walk(
        &self,
        session: &mut T::Session,
        target: SocketAddr,
        root: &ObjectId,
    ) -> Result<Vec<VarBind>, QueryError> {
        let mut bindings = Vec::new();
        let mut cursor = root.clone();
        loop {
            let page = self
                .deadline(target, session.get_bulk(&cursor, self.config.max_repetitions))
                .await?;
            if page.is_empty() {
                return Ok(bindings);
            }
            for varbind in page {
                if varbind.value == VarValue::EndOfMibView || !varbind.oid.is_descendant_of(root) {
                    return Ok(bindings);
                }
                if varbind.oid <= cursor {
                    return Err(QueryError::protocol(format!(
                        "{} returned non-increasing OID {} after {}",
                        target, varbind.oid, cursor
                    )));
                }
                cursor = varbind.oid.clone();
                bindings.push(varbind);
            }
        }
    }

    async fn deadline<F, R>(&self, target: SocketAddr, exchange: F) -> Result<R, QueryError>
    where
        F: Future<Output = Result<R, QueryError>>,
    {
        tokio::time::timeout(self.config.response_timeout, exchange)
            .await
            .map_err(|_| {
                QueryError::transport(format!(
                    "no response from {} within {:?}",
                    target, self.config.response_timeout
                ))
            })?
    }
}
