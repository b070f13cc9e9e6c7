//! Value Objects - Immutable domain primitives
//!
//! Value objects are identified by their value rather than identity.
//! They are immutable and can be freely shared.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Classification of a raw source address string.
///
/// chronyd reports NTP peers as IP literals and local reference clocks
/// (GPS, PPS, SHM segments) as short identifiers. Reference clocks are
/// never resolved and never geolocated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceAddress {
    /// A routable or local IP address
    Ip(IpAddr),
    /// A local reference-clock identifier such as `PPS` or `NMEA0`
    RefClock(String),
}

impl SourceAddress {
    /// Classify a raw address string.
    ///
    /// Anything that parses as an IPv4/IPv6 literal is an IP source;
    /// everything else is treated as a reference-clock identifier.
    pub fn parse(raw: &str) -> Self {
        match raw.parse::<IpAddr>() {
            Ok(ip) => Self::Ip(ip),
            Err(_) => Self::RefClock(raw.to_string()),
        }
    }

    /// The IP address, if this is an IP source.
    pub fn ip(&self) -> Option<IpAddr> {
        match self {
            Self::Ip(ip) => Some(*ip),
            Self::RefClock(_) => None,
        }
    }
}

/// Whether an address belongs to public, geolocatable IP space.
///
/// Private, loopback, link-local, multicast, documentation, and other
/// special-purpose ranges are never geolocated; the pipeline skips the
/// country database entirely for them.
pub fn is_publicly_routable(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_routable_v4(v4),
        IpAddr::V6(v6) => is_routable_v6(v6),
    }
}

fn is_routable_v4(ip: Ipv4Addr) -> bool {
    if ip.is_unspecified()
        || ip.is_loopback()
        || ip.is_private()
        || ip.is_link_local()
        || ip.is_broadcast()
        || ip.is_multicast()
        || ip.is_documentation()
    {
        return false;
    }

    // Shared address space 100.64.0.0/10 (CGNAT)
    let octets = ip.octets();
    if octets[0] == 100 && (octets[1] & 0xc0) == 64 {
        return false;
    }

    true
}

fn is_routable_v6(ip: Ipv6Addr) -> bool {
    // IPv4-mapped addresses classify as their embedded IPv4 address
    if let Some(v4) = ip.to_ipv4_mapped() {
        return is_routable_v4(v4);
    }

    if ip.is_unspecified() || ip.is_loopback() || ip.is_multicast() {
        return false;
    }

    let segments = ip.segments();
    // Unique local fc00::/7
    if (segments[0] & 0xfe00) == 0xfc00 {
        return false;
    }
    // Link local fe80::/10
    if (segments[0] & 0xffc0) == 0xfe80 {
        return false;
    }
    // Documentation 2001:db8::/32
    if segments[0] == 0x2001 && segments[1] == 0x0db8 {
        return false;
    }

    true
}

/// Derive the regional-indicator flag glyph for an ISO 3166-1 alpha-2
/// country code. Returns `None` for anything that is not two ASCII
/// letters.
pub fn flag_glyph(code: &str) -> Option<String> {
    if code.len() != 2 {
        return None;
    }

    let mut flag = String::with_capacity(8);
    for c in code.chars() {
        let c = c.to_ascii_uppercase();
        if !c.is_ascii_uppercase() {
            return None;
        }
        // 'A' maps to REGIONAL INDICATOR SYMBOL LETTER A (U+1F1E6)
        flag.push(char::from_u32(0x1F1E6 + (c as u32 - 'A' as u32))?);
    }
    Some(flag)
}
