//! chronydash Library
//!
//! Source enrichment core of the chrony dashboard: annotates raw NTP
//! source records with reverse-DNS hostnames and GeoIP country data.
//! Exposed for the dashboard binary and for integration tests.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

// Re-export commonly used types
pub use application::EnrichmentService;
pub use config::load_config;
pub use domain::entities::{CountryInfo, EnrichedSource, ResolveOutcome, Source};
pub use domain::ports::{CountryDatabase, HostnameResolver, LookupError};
pub use domain::value_objects::SourceAddress;
pub use infrastructure::{CacheConfig, GateConfig, ResolutionCache, ResolutionGate};
