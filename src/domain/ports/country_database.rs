//! Country Database Port
//!
//! Defines the interface for resolving IP addresses to country metadata.

use crate::domain::entities::CountryInfo;
use std::net::IpAddr;

/// Lookup of IP address to country metadata.
///
/// This is an outbound port that abstracts the GeoIP database.
/// Implementations may use MaxMind GeoLite2, IP2Location, or other
/// databases. Lookups are synchronous and infallible after load: a miss
/// is a normal `None`, never an error. Implementations must be safe to
/// call concurrently without external synchronization.
pub trait CountryDatabase: Send + Sync {
    /// Resolve an IP address to country metadata.
    ///
    /// Returns `None` when the database has no record for the address.
    /// Callers are expected to pre-filter non-routable addresses; the
    /// pipeline never probes this port with private or special-purpose
    /// IP space.
    fn lookup(&self, ip: IpAddr) -> Option<CountryInfo>;
}
