//! Domain Entities - Core business objects
//!
//! These entities represent the core concepts of the enrichment domain.
//! They have no external dependencies and contain only business logic.

use crate::domain::value_objects::flag_glyph;
use serde::{Deserialize, Serialize};

/// A raw NTP source record as reported by the chrony collaborator.
///
/// The enrichment core only interprets `address`; the synchronization
/// metadata is carried through untouched for the rendering layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    /// IP literal or local reference-clock identifier
    pub address: String,
    /// Stratum of the source (0 for reference clocks)
    pub stratum: u8,
    /// Polling interval exponent (interval = 2^poll seconds)
    pub poll: i8,
    /// Reachability register (last 8 samples, octal by convention)
    pub reachability: u8,
    /// Seconds since the last sample was received
    pub last_sample_ago: u64,
    /// Latest measured offset in seconds
    pub latest_meas: f64,
    /// Estimated error of the latest measurement in seconds
    pub latest_meas_err: f64,
}

impl Source {
    /// Create a source with only an address; metadata defaults to zero.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            stratum: 0,
            poll: 0,
            reachability: 0,
            last_sample_ago: 0,
            latest_meas: 0.0,
            latest_meas_err: 0.0,
        }
    }
}

/// Outcome of a hostname resolution attempt.
///
/// Timeouts, NXDOMAIN, and transport errors all collapse into
/// `Unresolvable`; the distinction never crosses the gate boundary.
/// Both variants are cached so a failed lookup is not retried until
/// its cache entry expires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolveOutcome {
    /// The address resolved to this hostname
    Hostname(String),
    /// The address could not be resolved (terminal for this TTL window)
    Unresolvable,
}

impl ResolveOutcome {
    /// The resolved hostname, if any.
    pub fn hostname(&self) -> Option<&str> {
        match self {
            Self::Hostname(name) => Some(name),
            Self::Unresolvable => None,
        }
    }
}

/// Country metadata resolved from the GeoIP database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryInfo {
    /// Country code (ISO 3166-1 alpha-2)
    pub code: String,
    /// Country name in English
    pub name: String,
    /// Regional-indicator flag glyph derived from the code.
    /// `None` when the code is not a two-letter ISO code.
    pub flag: Option<String>,
}

impl CountryInfo {
    pub fn new(code: String, name: String) -> Self {
        let flag = flag_glyph(&code);
        Self { code, name, flag }
    }
}

/// A source annotated with resolved hostname and country metadata.
///
/// Created fresh per pipeline call and owned by the caller; only the
/// cache and database singletons outlive the call that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedSource {
    /// The original source record
    pub source: Source,
    /// Resolved hostname, absent for reference clocks and failed lookups
    pub hostname: Option<String>,
    /// Country metadata, absent for non-public addresses and database misses
    pub country: Option<CountryInfo>,
}

impl EnrichedSource {
    pub fn new(source: Source, hostname: Option<String>, country: Option<CountryInfo>) -> Self {
        Self {
            source,
            hostname,
            country,
        }
    }

    /// Display label for the source: `"hostname (address)"` when a
    /// hostname is known, otherwise the bare address.
    pub fn display_name(&self) -> String {
        match &self.hostname {
            Some(hostname) => format!("{} ({})", hostname, self.source.address),
            None => self.source.address.clone(),
        }
    }
}
