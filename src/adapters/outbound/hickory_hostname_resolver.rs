//! Hickory Hostname Resolver
//!
//! Implements HostnameResolver with PTR queries via hickory-resolver.

use crate::domain::ports::{HostnameResolver, LookupError};
use async_trait::async_trait;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::error::ResolveErrorKind;
use hickory_resolver::TokioAsyncResolver;
use std::net::IpAddr;

/// Reverse-DNS resolver backed by hickory.
///
/// Uses the host's resolver configuration so homelab reverse zones on
/// the local DNS server are honored; falls back to the library defaults
/// when the system configuration cannot be read.
pub struct HickoryHostnameResolver {
    resolver: TokioAsyncResolver,
}

impl HickoryHostnameResolver {
    /// Build a resolver from the system configuration.
    pub fn from_system_conf() -> Self {
        let resolver = match TokioAsyncResolver::tokio_from_system_conf() {
            Ok(resolver) => resolver,
            Err(err) => {
                tracing::warn!(
                    "failed to read system resolver config, using defaults: {}",
                    err
                );
                TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default())
            }
        };
        Self { resolver }
    }
}

#[async_trait]
impl HostnameResolver for HickoryHostnameResolver {
    async fn reverse_lookup(&self, ip: IpAddr) -> Result<String, LookupError> {
        let lookup = self.resolver.reverse_lookup(ip).await.map_err(|err| {
            match err.kind() {
                ResolveErrorKind::NoRecordsFound { .. } => LookupError::NotFound,
                _ => LookupError::Upstream(err.to_string()),
            }
        })?;

        let name = lookup.iter().next().ok_or(LookupError::NotFound)?;
        let mut hostname = name.to_utf8();
        if hostname.ends_with('.') {
            hostname.pop();
        }
        Ok(hostname)
    }
}
