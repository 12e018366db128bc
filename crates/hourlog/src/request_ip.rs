//! Client IP resolution for HTTP request metadata
//!
//! Used only to build access/error lines. The resolution order is:
//! 1. the first `X-Forwarded-For` entry, if it is a public address
//! 2. the peer address, if it is public
//! 3. the last public `X-Forwarded-For` entry, scanning right to left
//! 4. the peer address as given
//!
//! Forwarded entries are split on commas only, so IPv6 literals stay whole.

use http::header::{HeaderMap, HeaderName};
use http::{Request, Uri};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

/// Header carrying the proxy chain
pub const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");

/// Request metadata needed by the line formatters
#[derive(Debug, Clone, Copy)]
pub struct RequestContext<'a> {
    pub headers: &'a HeaderMap,
    /// Peer address as seen by the server, `ip:port` or bare ip
    pub remote_addr: &'a str,
    pub uri: &'a Uri,
}

impl<'a> RequestContext<'a> {
    pub fn new(headers: &'a HeaderMap, remote_addr: &'a str, uri: &'a Uri) -> Self {
        Self {
            headers,
            remote_addr,
            uri,
        }
    }

    pub fn from_request<B>(request: &'a Request<B>, remote_addr: &'a str) -> Self {
        Self::new(request.headers(), remote_addr, request.uri())
    }

    pub fn client_ip(&self) -> String {
        client_ip(self.headers, self.remote_addr)
    }
}

/// Resolve the originating client address for a request
pub fn client_ip(headers: &HeaderMap, remote_addr: &str) -> String {
    let remote = parse_ip(remote_addr).map(normalize);
    let remote_text = match remote {
        Some(ip) => ip.to_string(),
        None => remote_addr.trim().to_string(),
    };

    let forwarded = forwarded_for(headers);
    if forwarded.is_empty() {
        return remote_text;
    }

    if let Some(first) = forwarded[0].filter(|ip| is_public_ip(*ip)) {
        return first.to_string();
    }

    if remote.is_some_and(is_public_ip) {
        return remote_text;
    }

    forwarded
        .iter()
        .rev()
        .flatten()
        .find(|ip| is_public_ip(**ip))
        .map(|ip| ip.to_string())
        .unwrap_or(remote_text)
}

/// Whether `ip` is a globally routable unicast address
pub fn is_public_ip(ip: IpAddr) -> bool {
    match normalize(ip) {
        IpAddr::V4(v4) => is_public_v4(v4),
        IpAddr::V6(v6) => is_public_v6(v6),
    }
}

/// Parse `ip`, `ip:port` or `[ipv6]:port`
pub fn parse_ip(s: &str) -> Option<IpAddr> {
    let s = s.trim();
    if let Ok(ip) = s.parse::<IpAddr>() {
        return Some(ip);
    }
    if let Ok(addr) = s.parse::<SocketAddr>() {
        return Some(addr.ip());
    }
    s.strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .and_then(|inner| inner.parse::<Ipv6Addr>().ok())
        .map(IpAddr::V6)
}

/// Entries of every `X-Forwarded-For` header, in order; `None` for junk
fn forwarded_for(headers: &HeaderMap) -> Vec<Option<IpAddr>> {
    headers
        .get_all(X_FORWARDED_FOR)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| parse_ip(entry).map(normalize))
        .collect()
}

/// IPv4-mapped IPv6 addresses become plain IPv4
fn normalize(ip: IpAddr) -> IpAddr {
    match ip {
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => IpAddr::V4(v4),
            None => IpAddr::V6(v6),
        },
        v4 => v4,
    }
}

fn is_public_v4(ip: Ipv4Addr) -> bool {
    let [a, b, _, _] = ip.octets();
    let special = ip.is_private()
        || ip.is_loopback()
        || ip.is_link_local()
        || ip.is_unspecified()
        || ip.is_broadcast()
        || ip.is_multicast()
        || ip.is_documentation()
        || a == 0
        // shared address space, 100.64.0.0/10
        || (a == 100 && (64..=127).contains(&b))
        // benchmarking, 198.18.0.0/15
        || (a == 198 && (b == 18 || b == 19))
        // reserved, 240.0.0.0/4
        || a >= 240;
    !special
}

fn is_public_v6(ip: Ipv6Addr) -> bool {
    let segments = ip.segments();
    let special = ip.is_loopback()
        || ip.is_unspecified()
        || ip.is_multicast()
        // unique local, fc00::/7
        || (segments[0] & 0xfe00) == 0xfc00
        // link local, fe80::/10
        || (segments[0] & 0xffc0) == 0xfe80
        // documentation, 2001:db8::/32
        || (segments[0] == 0x2001 && segments[1] == 0x0db8);
    !special
}
