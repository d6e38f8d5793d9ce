use std::time::Duration;

pub(crate) const SNMP_PORT: u16 = 161;
pub(crate) const MAX_REPETITIONS: u32 = 25;
pub(crate) const RESPONSE_TIMEOUT: Duration = Duration::from_secs(2);
pub(crate) const CONCURRENCY: usize = 32;

// IF-MIB::ifTable columns
pub(crate) const IF_INDEX: &[u64] = &[1, 3, 6, 1, 2, 1, 2, 2, 1, 1];
pub(crate) const IF_DESCR: &[u64] = &[1, 3, 6, 1, 2, 1, 2, 2, 1, 2];
pub(crate) const IF_SPEED: &[u64] = &[1, 3, 6, 1, 2, 1, 2, 2, 1, 5];

// IF-MIB::ifXTable columns
pub(crate) const IF_NAME: &[u64] = &[1, 3, 6, 1, 2, 1, 31, 1, 1, 1, 1];
pub(crate) const IF_HIGH_SPEED: &[u64] = &[1, 3, 6, 1, 2, 1, 31, 1, 1, 1, 15];

/// ifSpeed reports this value when the real speed does not fit a Gauge32.
pub(crate) const IF_SPEED_SATURATED: u64 = u32::MAX as u64;
pub(crate) const MBPS: u64 = 1_000_000;
