use std::net::IpAddr;

use ipnet::IpNet;

use crate::error::{Error, Result};

/// Expands a CIDR block into its usable host addresses, in ascending order.
///
/// Host bits set in the input are ignored (`10.0.0.7/30` is read as
/// `10.0.0.4/30`). For IPv4 prefixes up to /30 the network and broadcast
/// addresses are excluded; /31 and /32 yield every address in the block.
///
/// # Errors
/// Returns [`Error::InvalidSubnetFormat`] when `subnet` is not a CIDR block.
pub fn hosts(subnet: &str) -> Result<Vec<IpAddr>> {
    let net: IpNet = subnet
        .trim()
        .parse()
        .map_err(|source| Error::InvalidSubnetFormat {
            input: subnet.into(),
            source,
        })?;
    Ok(net.hosts().collect())
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr};

    use super::hosts;
    use crate::error::Error;

    #[test]
    fn test_host_count_excludes_network_and_broadcast() {
        for prefix in 20..=30u32 {
            let subnet = format!("192.168.0.0/{}", prefix);
            let hosts = hosts(&subnet).unwrap();
            assert_eq!(hosts.len(), (1usize << (32 - prefix)) - 2, "{}", subnet);
            assert!(!hosts.contains(&IpAddr::V4(Ipv4Addr::new(192, 168, 0, 0))));
        }
    }

    #[test]
    fn test_slash_30() {
        assert_eq!(
            hosts("10.0.0.0/30").unwrap(),
            vec![
                IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)),
                IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2)),
            ]
        );
    }

    #[test]
    fn test_host_bits_ignored() {
        assert_eq!(hosts("10.0.0.7/30").unwrap(), hosts("10.0.0.4/30").unwrap());
        assert_eq!(
            hosts("10.0.0.7/30").unwrap(),
            vec![
                IpAddr::V4(Ipv4Addr::new(10, 0, 0, 5)),
                IpAddr::V4(Ipv4Addr::new(10, 0, 0, 6)),
            ]
        );
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(hosts("172.16.4.0/27").unwrap(), hosts("172.16.4.0/27").unwrap());
    }

    #[test]
    fn test_invalid_subnet() {
        for input in ["", "10.0.0.0", "10.0.0.0/33", "not-a-subnet", "10.0.0/24"] {
            assert!(
                matches!(hosts(input), Err(Error::InvalidSubnetFormat { .. })),
                "{:?}",
                input
            );
        }
    }
}
