//! Collects the interface table (index, name, description, speed) of every
//! SNMP-reachable device in a subnet.
//!
//! Hosts are queried concurrently behind an admission gate. Each host walks
//! the IF-MIB columns with paged GETBULK requests; transport failures are
//! retried with backoff, while failures reported by the device are recorded
//! as they are. One host failing never affects another, and the whole pass
//! can be cancelled, yielding a partial report marked as such.
//!
//! ## Example
//! ```no_run
//! use std::sync::Arc;
//! use async_ifscan::{discover, ClientConfigBuilder, CoordinatorConfigBuilder, SnmpTransport};
//! use tokio_util::sync::CancellationToken;
//!
//! tokio_test::block_on(async {
//!     let report = discover(
//!         "192.168.1.0/24",
//!         Arc::new(SnmpTransport::new()),
//!         ClientConfigBuilder::new("public").build(),
//!         CoordinatorConfigBuilder::new().with_concurrency(16).build(),
//!         &CancellationToken::new(),
//!     )
//!     .await
//!     .unwrap();
//!     for line in report.lines() {
//!         println!("{}", line);
//!     }
//! })
//! ```

pub mod client;
pub mod coordinator;
pub mod error;
pub mod interface;
pub mod oid;
pub mod report;
pub mod retry;
pub mod subnet;
pub mod transport;

pub(crate) mod constants;

pub use client::{Client, ClientConfig, ClientConfigBuilder};
pub use coordinator::{discover, Coordinator, CoordinatorConfig, CoordinatorConfigBuilder};
pub use error::{Error, FailureKind, QueryError, Result};
pub use interface::{InterfaceRecord, InterfaceSpeed, QueryOutcome};
pub use report::{HostFailure, HostResult, HostSummary, Report, RunStatus};
pub use retry::{Backoff, Retry};
pub use transport::SnmpTransport;
