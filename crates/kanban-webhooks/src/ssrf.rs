//! SSRF guard (spec §4.8 step 1-2).
//!
//! No teacher or pack file implements outbound URL validation; this module
//! is written directly from the spec's enumerated blocked-range list rather
//! than an imitated pattern (see DESIGN.md).

use kanban_domain::DomainError;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use tokio::net::lookup_host;

const BLOCKED_HOSTS: &[&str] = &[
    "localhost",
    "0.0.0.0",
    "169.254.169.254",
    "metadata.google.internal",
];

/// A webhook URL, validated and pinned to one concrete address to close the
/// TOCTOU gap between DNS resolution and the outbound connect (spec §4.8
/// step 2).
#[derive(Debug)]
pub struct ResolvedTarget {
    pub host: String,
    pub port: u16,
    pub ip: IpAddr,
}

fn invalid_url(message: &str) -> DomainError {
    DomainError::validation("url", message)
}

/// Validates scheme and hostname, resolves DNS, and rejects every address
/// in a private/loopback/link-local/ULA/CGNAT range (spec §4.8 step 1).
pub async fn validate_and_resolve(url: &reqwest::Url, allow_http: bool) -> Result<ResolvedTarget, DomainError> {
    match url.scheme() {
        "https" => {}
        "http" if allow_http => {}
        "http" => return Err(invalid_url("plain http is not allowed in this environment")),
        _ => return Err(invalid_url("url must use http or https")),
    }

    let host = url.host_str().ok_or_else(|| invalid_url("url has no host"))?;
    if BLOCKED_HOSTS.contains(&host.to_lowercase().as_str()) {
        return Err(invalid_url("host is blocked"));
    }

    let port = url
        .port_or_known_default()
        .ok_or_else(|| invalid_url("url has no resolvable port"))?;

    let addrs: Vec<SocketAddr> = lookup_host((host, port))
        .await
        .map_err(|_| invalid_url("dns resolution failed"))?
        .collect();
    if addrs.is_empty() {
        return Err(invalid_url("dns resolution returned no addresses"));
    }

    if addrs.iter().any(|addr| !is_public_ip(addr.ip())) {
        return Err(invalid_url("host resolves to a blocked address range"));
    }

    Ok(ResolvedTarget {
        host: host.to_owned(),
        port,
        ip: addrs[0].ip(),
    })
}

fn is_public_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_public_v4(v4),
        IpAddr::V6(v6) => is_public_v6(v6),
    }
}

fn is_public_v4(ip: Ipv4Addr) -> bool {
    if ip.is_loopback()
        || ip.is_link_local()
        || ip.is_unspecified()
        || ip.is_broadcast()
        || ip.is_documentation()
    {
        return false;
    }
    let [a, b, ..] = ip.octets();
    if a == 0 || a == 10 {
        return false;
    }
    if a == 172 && (16..=31).contains(&b) {
        return false;
    }
    if a == 192 && b == 168 {
        return false;
    }
    if a == 100 && (64..=127).contains(&b) {
        return false;
    }
    true
}

fn is_public_v6(ip: Ipv6Addr) -> bool {
    if ip.is_loopback() || ip.is_unspecified() {
        return false;
    }
    if let Some(v4) = ip.to_ipv4_mapped() {
        return is_public_v4(v4);
    }
    let segments = ip.segments();
    if segments[0] & 0xffc0 == 0xfe80 {
        return false; // fe80::/10 link-local
    }
    if segments[0] & 0xfe00 == 0xfc00 {
        return false; // fc00::/7 unique local
    }
    if segments[0] == 0x2002 {
        // 6to4 embeds an IPv4 address in the next 32 bits.
        let embedded = Ipv4Addr::new(
            (segments[1] >> 8) as u8,
            (segments[1] & 0xff) as u8,
            (segments[2] >> 8) as u8,
            (segments[2] & 0xff) as u8,
        );
        return is_public_v4(embedded);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn private_v4_ranges_are_rejected() {
        assert!(!is_public_v4(Ipv4Addr::new(10, 0, 0, 1)));
        assert!(!is_public_v4(Ipv4Addr::new(172, 16, 0, 1)));
        assert!(!is_public_v4(Ipv4Addr::new(172, 31, 255, 255)));
        assert!(!is_public_v4(Ipv4Addr::new(192, 168, 1, 1)));
        assert!(!is_public_v4(Ipv4Addr::new(127, 0, 0, 1)));
        assert!(!is_public_v4(Ipv4Addr::new(169, 254, 169, 254)));
        assert!(!is_public_v4(Ipv4Addr::new(100, 64, 0, 1)));
        assert!(!is_public_v4(Ipv4Addr::new(0, 0, 0, 0)));
    }

    #[test]
    fn public_v4_is_allowed() {
        assert!(is_public_v4(Ipv4Addr::new(93, 184, 216, 34)));
    }

    #[test]
    fn v6_loopback_and_unique_local_are_rejected() {
        assert!(!is_public_v6(Ipv6Addr::LOCALHOST));
        assert!(!is_public_v6(Ipv6Addr::new(0xfc00, 0, 0, 0, 0, 0, 0, 1)));
        assert!(!is_public_v6(Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 1)));
    }

    #[test]
    fn v6_mapped_private_v4_is_rejected() {
        let mapped = Ipv4Addr::new(10, 0, 0, 5).to_ipv6_mapped();
        assert!(!is_public_v6(mapped));
    }

    #[tokio::test]
    async fn plain_http_rejected_outside_allow_http() {
        let url = reqwest::Url::parse("http://example.com/hook").unwrap();
        let err = validate_and_resolve(&url, false).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));
    }

    #[tokio::test]
    async fn blocked_hostname_is_rejected() {
        let url = reqwest::Url::parse("https://localhost/hook").unwrap();
        let err = validate_and_resolve(&url, false).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));
    }
}
