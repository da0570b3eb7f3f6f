//! Trigger allow-list
//!
//! The run endpoint is restricted to callers whose TCP peer address is listed in
//! `server.allowed_ips`. Forwarded headers are ignored.

use std::collections::HashSet;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Set of peer addresses allowed to trigger a run
#[derive(Debug, Clone, Default)]
pub struct AllowList {
    addrs: HashSet<IpAddr>,
}

impl AllowList {
    /// Build the list from configured entries
    ///
    /// `localhost` expands to both loopback addresses. Entries that are neither an IP address
    /// nor `localhost` are skipped with a warning.
    pub fn from_entries<S: AsRef<str>>(entries: &[S]) -> Self {
        let mut addrs = HashSet::new();

        for entry in entries {
            let entry = entry.as_ref().trim();
            if entry.eq_ignore_ascii_case("localhost") {
                addrs.insert(IpAddr::V4(Ipv4Addr::LOCALHOST));
                addrs.insert(IpAddr::V6(Ipv6Addr::LOCALHOST));
                continue;
            }

            match entry.parse::<IpAddr>() {
                Ok(ip) => {
                    addrs.insert(ip.to_canonical());
                }
                Err(_) => tracing::warn!(entry = entry, "Ignoring invalid allow-list entry"),
            }
        }

        Self { addrs }
    }

    /// Whether the peer may trigger a run
    ///
    /// IPv4-mapped IPv6 peers such as `::ffff:127.0.0.1` match their IPv4 entry.
    pub fn permits(&self, peer: IpAddr) -> bool {
        self.addrs.contains(&peer.to_canonical())
    }

    pub fn len(&self) -> usize {
        self.addrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addrs.is_empty()
    }
}
