//! Scripted in-memory agents for exercising the client and coordinator.

use std::collections::HashMap;
use std::future::Future;
use std::net::{IpAddr, SocketAddr};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{BulkSession, BulkTransport, VarBind, VarValue};
use crate::constants::{IF_DESCR, IF_INDEX, IF_NAME, IF_SPEED};
use crate::error::QueryError;
use crate::oid::ObjectId;

/// How a mocked host behaves.
#[derive(Clone, Debug)]
pub(crate) enum Agent {
    /// Serves GETBULK from this table, sorted by OID.
    Table(Vec<VarBind>),
    /// Answers every request with the same page.
    Stuck(Vec<VarBind>),
    /// Accepts the session but never answers.
    Silent,
    /// Session cannot be opened.
    Unreachable,
    /// Answers every request with `genErr`.
    ErrorStatus,
    /// Stays silent for the first `n` attempts, then behaves as the inner agent.
    Flaky(u32, Box<Agent>),
    /// Answers like the inner agent, each page after the given latency.
    Delayed(Duration, Box<Agent>),
}

#[derive(Default)]
struct Inner {
    agents: HashMap<IpAddr, Agent>,
    opens: HashMap<IpAddr, u32>,
    exchanges: HashMap<IpAddr, u32>,
    open_sessions: usize,
    peak_sessions: usize,
}

#[derive(Clone, Default)]
pub(crate) struct MockTransport {
    inner: Arc<Mutex<Inner>>,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Hosts without an agent stay silent.
    pub(crate) fn with_agent(self, host: IpAddr, agent: Agent) -> Self {
        self.inner.lock().unwrap().agents.insert(host, agent);
        self
    }

    /// Number of sessions opened against `host`, one per query attempt.
    pub(crate) fn opens(&self, host: IpAddr) -> u32 {
        *self.inner.lock().unwrap().opens.get(&host).unwrap_or(&0)
    }

    pub(crate) fn exchanges(&self, host: IpAddr) -> u32 {
        *self.inner.lock().unwrap().exchanges.get(&host).unwrap_or(&0)
    }

    /// Sessions currently alive.
    pub(crate) fn open_sessions(&self) -> usize {
        self.inner.lock().unwrap().open_sessions
    }

    /// Highest number of sessions alive at the same time.
    pub(crate) fn peak_sessions(&self) -> usize {
        self.inner.lock().unwrap().peak_sessions
    }
}

pub(crate) struct MockSession {
    host: IpAddr,
    agent: Agent,
    latency: Duration,
    inner: Arc<Mutex<Inner>>,
}

impl Drop for MockSession {
    fn drop(&mut self) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.open_sessions -= 1;
        }
    }
}

impl BulkTransport for MockTransport {
    type Session = MockSession;

    fn open(
        &self,
        target: SocketAddr,
        _community: &str,
    ) -> impl Future<Output = Result<MockSession, QueryError>> + Send {
        let host = target.ip();
        let result = {
            let mut guard = self.inner.lock().unwrap();
            let inner = &mut *guard;
            let attempt = {
                let opens = inner.opens.entry(host).or_insert(0);
                *opens += 1;
                *opens
            };
            let mut next = inner.agents.get(&host).cloned().unwrap_or(Agent::Silent);
            let mut latency = Duration::ZERO;
            let agent = loop {
                next = match next {
                    Agent::Flaky(failures, _) if attempt <= failures => Agent::Silent,
                    Agent::Flaky(_, then) => *then,
                    Agent::Delayed(delay, then) => {
                        latency += delay;
                        *then
                    }
                    agent => break agent,
                };
            };
            match agent {
                Agent::Unreachable => Err(QueryError::transport(format!(
                    "failed to open session to {}, reason: host unreachable",
                    target
                ))),
                agent => {
                    inner.open_sessions += 1;
                    inner.peak_sessions = inner.peak_sessions.max(inner.open_sessions);
                    Ok(MockSession {
                        host,
                        agent,
                        latency,
                        inner: Arc::clone(&self.inner),
                    })
                }
            }
        };
        async move { result }
    }
}

impl BulkSession for MockSession {
    fn get_bulk(
        &mut self,
        start: &ObjectId,
        max_repetitions: u32,
    ) -> impl Future<Output = Result<Vec<VarBind>, QueryError>> + Send {
        *self
            .inner
            .lock()
            .unwrap()
            .exchanges
            .entry(self.host)
            .or_insert(0) += 1;
        let answer = match &self.agent {
            Agent::Table(table) => Some(Ok(page(table, start, max_repetitions))),
            Agent::Stuck(page) => Some(Ok(page.clone())),
            Agent::ErrorStatus => Some(Err(QueryError::protocol(format!(
                "{} returned error status 5 (genErr) at index 1",
                self.host
            )))),
            _ => None,
        };
        let latency = self.latency;
        async move {
            if !latency.is_zero() {
                tokio::time::sleep(latency).await;
            }
            match answer {
                Some(answer) => answer,
                None => std::future::pending().await,
            }
        }
    }
}

fn page(table: &[VarBind], start: &ObjectId, max_repetitions: u32) -> Vec<VarBind> {
    let page: Vec<VarBind> = table
        .iter()
        .filter(|varbind| varbind.oid > *start)
        .take(max_repetitions as usize)
        .cloned()
        .collect();
    if page.is_empty() {
        vec![VarBind::new(start.clone(), VarValue::EndOfMibView)]
    } else {
        page
    }
}

/// Builds a sorted interface table from `(index, name, description, speed)` rows.
pub(crate) fn interface_table(rows: &[(u64, &str, &str, u64)]) -> Vec<VarBind> {
    let mut table = Vec::new();
    for (index, name, description, speed) in rows {
        let index = *index;
        table.push(VarBind::new(
            ObjectId::from(IF_INDEX).child(index),
            VarValue::Integer(index as i64),
        ));
        table.push(VarBind::new(
            ObjectId::from(IF_DESCR).child(index),
            VarValue::OctetString(description.as_bytes().to_vec()),
        ));
        table.push(VarBind::new(
            ObjectId::from(IF_SPEED).child(index),
            VarValue::Unsigned(*speed),
        ));
        table.push(VarBind::new(
            ObjectId::from(IF_NAME).child(index),
            VarValue::OctetString(name.as_bytes().to_vec()),
        ));
    }
    table.sort_by(|a, b| a.oid.cmp(&b.oid));
    table
}
