//! Hostname Resolver Port
//!
//! Defines the interface for reverse-DNS resolution of IP addresses.

use async_trait::async_trait;
use std::net::IpAddr;
use thiserror::Error;

/// Failure modes of a single reverse lookup.
///
/// The gate collapses every variant into the `Unresolvable` outcome;
/// the distinction exists only for diagnostics.
#[derive(Debug, Error)]
pub enum LookupError {
    /// The address has no PTR record
    #[error("no PTR record for address")]
    NotFound,
    /// The resolver itself failed (network, protocol, upstream servfail)
    #[error("resolver failure: {0}")]
    Upstream(String),
}

/// Reverse-DNS resolver for IP addresses.
///
/// This is an outbound port that abstracts the external DNS service.
/// Implementations issue a single PTR-style query per call and apply no
/// timeout of their own; admission control and the per-call deadline
/// belong to the resolution gate.
#[async_trait]
pub trait HostnameResolver: Send + Sync {
    /// Resolve an IP address to its PTR hostname.
    async fn reverse_lookup(&self, ip: IpAddr) -> Result<String, LookupError>;
}
