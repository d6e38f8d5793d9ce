use std::net::IpAddr;

use crate::error::FailureKind;
use crate::interface::{InterfaceRecord, QueryOutcome};

/// Whether a run reached every host or was cut short.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum RunStatus {
    Complete,
    Cancelled,
}

/// The final outcome of one host together with the attempts it took.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct HostResult {
    pub outcome: QueryOutcome,
    pub attempts: u32,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct HostFailure {
    pub host: IpAddr,
    pub kind: FailureKind,
    pub detail: String,
    pub attempts: u32,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct HostSummary {
    pub host: IpAddr,
    pub attempts: u32,
    pub interfaces: usize,
    pub skipped: usize,
    pub failure: Option<FailureKind>,
}

/// Interfaces of every host that answered, grouped by host in enumeration
/// order, plus the hosts that could not be queried.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Report {
    records: Vec<InterfaceRecord>,
    failures: Vec<HostFailure>,
    hosts: Vec<HostSummary>,
    unfinished: Vec<IpAddr>,
    status: RunStatus,
}

impl Report {
    /// Builds a report from one slot per enumerated host.
    ///
    /// Hosts whose slot is empty are listed as unfinished.
    pub fn assemble(hosts: &[IpAddr], slots: Vec<Option<HostResult>>, status: RunStatus) -> Self {
        let mut report = Report {
            records: Vec::new(),
            failures: Vec::new(),
            hosts: Vec::new(),
            unfinished: Vec::new(),
            status,
        };
        let mut slots = slots.into_iter();
        for &host in hosts {
            let Some(HostResult { outcome, attempts }) = slots.next().flatten() else {
                report.unfinished.push(host);
                continue;
            };
            match outcome {
                QueryOutcome::Success {
                    records, skipped, ..
                } => {
                    report.hosts.push(HostSummary {
                        host,
                        attempts,
                        interfaces: records.len(),
                        skipped,
                        failure: None,
                    });
                    report.records.extend(records);
                }
                QueryOutcome::Failure { kind, detail, .. } => {
                    report.hosts.push(HostSummary {
                        host,
                        attempts,
                        interfaces: 0,
                        skipped: 0,
                        failure: Some(kind),
                    });
                    report.failures.push(HostFailure {
                        host,
                        kind,
                        detail,
                        attempts,
                    });
                }
            }
        }
        report
    }

    /// Every decoded interface, grouped by host in enumeration order and
    /// ordered by interface index within a host.
    pub fn records(&self) -> &[InterfaceRecord] {
        &self.records
    }

    /// Hosts whose final attempt failed, in enumeration order.
    pub fn failures(&self) -> &[HostFailure] {
        &self.failures
    }

    /// One entry per host that reached a final outcome, in enumeration order.
    pub fn hosts(&self) -> &[HostSummary] {
        &self.hosts
    }

    /// Hosts abandoned by cancellation before reaching a final outcome.
    pub fn unfinished(&self) -> &[IpAddr] {
        &self.unfinished
    }

    /// Whether the run finished or was cancelled.
    pub fn status(&self) -> RunStatus {
        self.status
    }

    pub fn is_complete(&self) -> bool {
        self.status == RunStatus::Complete
    }

    /// Renders one line per interface:
    /// `"{host} Interface {index}: {name} ({description}) at {speed} bps"`.
    pub fn lines(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|record| {
                format!(
                    "{} Interface {}: {} ({}) at {} bps",
                    record.host, record.index, record.name, record.description, record.speed
                )
            })
            .collect()
    }

    /// Renders one line per failed host with its failure kind, attempt
    /// count and detail.
    pub fn failure_lines(&self) -> Vec<String> {
        self.failures
            .iter()
            .map(|failure| {
                format!(
                    "{} {} after {} attempt(s): {}",
                    failure.host, failure.kind, failure.attempts, failure.detail
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};

    use super::{HostResult, Report, RunStatus};
    use crate::error::FailureKind;
    use crate::interface::{InterfaceRecord, InterfaceSpeed, QueryOutcome};

    fn ip(d: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(10, 0, 0, d))
    }

    fn record(host: IpAddr, index: u64, name: &str) -> InterfaceRecord {
        InterfaceRecord {
            host,
            index,
            name: name.into(),
            description: "Ethernet".into(),
            speed: InterfaceSpeed::Bps(1_000_000_000),
        }
    }

    fn success(host: IpAddr, records: Vec<InterfaceRecord>) -> Option<HostResult> {
        Some(HostResult {
            outcome: QueryOutcome::Success {
                host,
                records,
                skipped: 0,
            },
            attempts: 1,
        })
    }

    #[test]
    fn test_assemble_groups_by_host_order() {
        let hosts = [ip(1), ip(2), ip(3)];
        let slots = vec![
            success(ip(1), vec![record(ip(1), 1, "eth0"), record(ip(1), 2, "eth1")]),
            Some(HostResult {
                outcome: QueryOutcome::Failure {
                    host: ip(2),
                    kind: FailureKind::Transport,
                    detail: "no response".into(),
                },
                attempts: 2,
            }),
            success(ip(3), Vec::new()),
        ];
        let report = Report::assemble(&hosts, slots, RunStatus::Complete);

        assert!(report.is_complete());
        assert!(report.unfinished().is_empty());
        assert_eq!(report.records().len(), 2);
        assert_eq!(report.failures().len(), 1);
        assert_eq!(report.failures()[0].host, ip(2));
        assert_eq!(report.failures()[0].attempts, 2);
        // zero interfaces is a success, not a failure
        assert_eq!(report.hosts()[2].failure, None);
        assert_eq!(report.hosts()[2].interfaces, 0);
        assert_eq!(
            report.lines(),
            vec![
                "10.0.0.1 Interface 1: eth0 (Ethernet) at 1000000000 bps",
                "10.0.0.1 Interface 2: eth1 (Ethernet) at 1000000000 bps",
            ]
        );
        assert_eq!(
            report.failure_lines(),
            vec!["10.0.0.2 TransportError after 2 attempt(s): no response"]
        );
    }

    #[test]
    fn test_assemble_marks_missing_slots_unfinished() {
        let hosts = [ip(1), ip(2), ip(3)];
        let slots = vec![success(ip(1), vec![record(ip(1), 1, "eth0")]), None];
        let report = Report::assemble(&hosts, slots, RunStatus::Cancelled);

        assert!(!report.is_complete());
        assert_eq!(report.status(), RunStatus::Cancelled);
        assert_eq!(report.hosts().len(), 1);
        assert_eq!(report.unfinished(), &[ip(2), ip(3)]);
    }
}
