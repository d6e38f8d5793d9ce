use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::sync::Semaphore;
use tokio::task::{Id, JoinError, JoinSet};
use tokio_util::sync::CancellationToken;

use crate::client::{Client, ClientConfig};
use crate::constants::CONCURRENCY;
use crate::error::{FailureKind, QueryError, Result};
use crate::interface::QueryOutcome;
use crate::report::{HostResult, Report, RunStatus};
use crate::retry::Retry;
use crate::subnet;
use crate::transport::BulkTransport;

#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Maximum number of hosts queried at the same time.
    pub concurrency: usize,
    pub retry: Retry,
    /// Deadline for one whole attempt against a host, all pages included.
    pub attempt_timeout: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct CoordinatorConfigBuilder {
    concurrency: usize,
    retry: Retry,
    attempt_timeout: Option<Duration>,
}

impl Default for CoordinatorConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CoordinatorConfigBuilder {
    /// Starts from the defaults: 32 concurrent hosts, [`Retry::default`] and
    /// no whole-attempt deadline.
    pub fn new() -> Self {
        Self {
            concurrency: CONCURRENCY,
            retry: Retry::default(),
            attempt_timeout: None,
        }
    }

    /// Values below 1 are raised to 1.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Sets how transport failures are retried.
    pub fn with_retry(mut self, retry: Retry) -> Self {
        self.retry = retry;
        self
    }

    /// Caps one whole attempt against a host, session setup and all pages
    /// included. An attempt that runs out is a transport failure.
    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = Some(timeout);
        self
    }

    /// Finishes the builder.
    pub fn build(self) -> CoordinatorConfig {
        CoordinatorConfig {
            concurrency: self.concurrency,
            retry: self.retry,
            attempt_timeout: self.attempt_timeout,
        }
    }
}

/// Queries many hosts concurrently and assembles their interfaces into one
/// [`Report`].
///
/// At most `concurrency` attempts are in flight at once. A host that fails
/// with a transport error is retried according to the [`Retry`] policy; the
/// admission permit is given back while the host waits out its backoff.
/// Failures stay confined to their host.
#[derive(Debug)]
pub struct Coordinator<T> {
    client: Client<T>,
    config: CoordinatorConfig,
}

impl<T: BulkTransport> Coordinator<T> {
    /// Creates a coordinator that queries every host through `client`.
    pub fn new(client: Client<T>, config: CoordinatorConfig) -> Self {
        Self { client, config }
    }

    /// Runs one pass over `hosts`.
    ///
    /// Returns once every host has a final outcome, or as soon as `cancel`
    /// fires. On cancellation the in-flight queries are aborted (dropping
    /// their sessions) and the report is marked [`RunStatus::Cancelled`],
    /// keeping every outcome finalized so far.
    pub async fn run(&self, hosts: &[IpAddr], cancel: &CancellationToken) -> Report {
        info!(
            "querying {} hosts, concurrency {}, up to {} attempts each",
            hosts.len(),
            self.config.concurrency,
            self.config.retry.max_attempts()
        );
        let gate = Arc::new(Semaphore::new(self.config.concurrency));
        let mut tasks = JoinSet::new();
        let mut owners: HashMap<Id, usize> = HashMap::with_capacity(hosts.len());
        for (slot, &host) in hosts.iter().enumerate() {
            let client = self.client.clone();
            let gate = Arc::clone(&gate);
            let config = self.config.clone();
            let handle =
                tasks.spawn(async move { query_host(&client, &gate, &config, host).await });
            owners.insert(handle.id(), slot);
        }

        let mut slots: Vec<Option<HostResult>> = hosts.iter().map(|_| None).collect();
        let status = loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("run cancelled, abandoning in-flight queries");
                    tasks.abort_all();
                    break RunStatus::Cancelled;
                }
                joined = tasks.join_next_with_id() => match joined {
                    Some(joined) => record(hosts, &owners, &mut slots, joined),
                    None => break RunStatus::Complete,
                },
            }
        };
        // Wait for aborted tasks to drop their sessions. Queries that finished
        // before the abort reached them are kept.
        while let Some(joined) = tasks.join_next_with_id().await {
            record(hosts, &owners, &mut slots, joined);
        }

        let report = Report::assemble(hosts, slots, status);
        info!(
            "{} interfaces from {} hosts, {} failed, {} unfinished",
            report.records().len(),
            report.hosts().len() - report.failures().len(),
            report.failures().len(),
            report.unfinished().len()
        );
        report
    }
}

/// Stores a finished task's result in the slot of the host it was spawned for.
///
/// A task that panicked still finalizes its host, as a protocol failure.
/// Tasks aborted by cancellation leave their slot empty.
fn record(
    hosts: &[IpAddr],
    owners: &HashMap<Id, usize>,
    slots: &mut [Option<HostResult>],
    joined: std::result::Result<(Id, HostResult), JoinError>,
) {
    let (id, result) = match joined {
        Ok(joined) => joined,
        Err(err) if err.is_cancelled() => return,
        Err(err) => {
            let Some(&slot) = owners.get(&err.id()) else {
                warn!("query task {} failed: {}", err.id(), err);
                return;
            };
            let host = hosts[slot];
            warn!("{}: query task failed: {}", host, err);
            let result = HostResult {
                outcome: QueryOutcome::failure(host, QueryError::protocol("query task panicked")),
                attempts: 1,
            };
            (err.id(), result)
        }
    };
    let Some(&slot) = owners.get(&id) else {
        return;
    };
    if let QueryOutcome::Failure { host, kind, detail } = &result.outcome {
        warn!(
            "{}: {} after {} attempt(s): {}",
            host, kind, result.attempts, detail
        );
    }
    slots[slot] = Some(result);
}

async fn query_host<T: BulkTransport>(
    client: &Client<T>,
    gate: &Semaphore,
    config: &CoordinatorConfig,
    host: IpAddr,
) -> HostResult {
    let mut attempts = 0;
    loop {
        attempts += 1;
        let outcome = match gate.acquire().await {
            Ok(_permit) => attempt(client, config.attempt_timeout, host).await,
            Err(_) => QueryOutcome::failure(host, QueryError::transport("admission gate closed")),
        };
        match outcome {
            QueryOutcome::Failure {
                kind: FailureKind::Transport,
                ref detail,
                ..
            } if attempts < config.retry.max_attempts() => {
                let delay = config.retry.delay(attempts - 1);
                debug!(
                    "{}: attempt {} failed ({}), retrying in {:?}",
                    host, attempts, detail, delay
                );
                tokio::time::sleep(delay).await;
            }
            outcome => return HostResult { outcome, attempts },
        }
    }
}

async fn attempt<T: BulkTransport>(
    client: &Client<T>,
    timeout: Option<Duration>,
    host: IpAddr,
) -> QueryOutcome {
    let Some(timeout) = timeout else {
        return client.query(host).await;
    };
    tokio::time::timeout(timeout, client.query(host))
        .await
        .unwrap_or_else(|_| {
            QueryOutcome::failure(
                host,
                QueryError::transport(format!("query of {} exceeded {:?}", host, timeout)),
            )
        })
}

/// Enumerates `subnet` and queries every host in it.
///
/// # Errors
/// Returns [`crate::Error::InvalidSubnetFormat`] before any network activity
/// when `subnet` is not a CIDR block. Per-host failures never surface here;
/// they are listed in the returned [`Report`].
pub async fn discover<T: BulkTransport>(
    subnet: &str,
    transport: Arc<T>,
    client_config: ClientConfig,
    config: CoordinatorConfig,
    cancel: &CancellationToken,
) -> Result<Report> {
    let hosts = subnet::hosts(subnet)?;
    let coordinator = Coordinator::new(Client::new(transport, client_config), config);
    Ok(coordinator.run(&hosts, cancel).await)
}
