//! Enrichment Service - Main application use case
//!
//! Orchestrates source enrichment: inline country lookups, cached
//! hostname resolution, and gated external lookups for cache misses.
//! This is the primary interface for the rendering collaborator.

use crate::domain::entities::{EnrichedSource, ResolveOutcome, Source};
use crate::domain::ports::CountryDatabase;
use crate::domain::value_objects::{is_publicly_routable, SourceAddress};
use crate::infrastructure::{ResolutionCache, ResolutionGate};
use std::collections::HashMap;
use std::sync::Arc;

/// Enrichment service - main application use case.
///
/// For every input source it:
/// 1. Classifies the address (IP vs reference clock)
/// 2. Resolves country metadata inline for public IPs
/// 3. Resolves hostnames through the cache, gating external lookups
///
/// The output is always index-aligned with the input and the call as a
/// whole never fails; a source that cannot be enriched simply keeps its
/// bare address.
pub struct EnrichmentService {
    country_db: Option<Arc<dyn CountryDatabase>>,
    cache: Arc<ResolutionCache>,
    gate: Arc<ResolutionGate>,
}

impl EnrichmentService {
    /// Create a new enrichment service.
    ///
    /// `country_db` is optional: without it (degraded startup) every
    /// country lookup is absent but hostname enrichment still runs.
    pub fn new(
        country_db: Option<Arc<dyn CountryDatabase>>,
        cache: Arc<ResolutionCache>,
        gate: Arc<ResolutionGate>,
    ) -> Self {
        Self {
            country_db,
            cache,
            gate,
        }
    }

    /// Enrich an ordered batch of sources.
    ///
    /// All needed external resolutions are issued up front as detached
    /// tasks and awaited together, so one slow or failing lookup never
    /// delays another's result beyond its own timeout window. Detached
    /// tasks also mean an abandoned caller leaves the lookups running:
    /// their outcomes still land in the cache for the next page load.
    pub async fn enrich(&self, sources: &[Source]) -> Vec<EnrichedSource> {
        let addresses: Vec<SourceAddress> = sources
            .iter()
            .map(|source| SourceAddress::parse(&source.address))
            .collect();

        // 1. Issue every needed resolution up front, one task per
        //    distinct cache-missed address
        let mut outcomes: HashMap<String, ResolveOutcome> = HashMap::new();
        let mut lookups = Vec::new();
        for (source, address) in sources.iter().zip(&addresses) {
            let Some(ip) = address.ip() else {
                continue; // reference clocks are never resolved
            };
            if outcomes.contains_key(&source.address)
                || lookups.iter().any(|(a, _)| a == &source.address)
            {
                continue;
            }
            if let Some(outcome) = self.cache.get(&source.address) {
                outcomes.insert(source.address.clone(), outcome);
                continue;
            }

            let gate = Arc::clone(&self.gate);
            let addr = source.address.clone();
            let task = tokio::spawn(async move { gate.resolve(&addr, ip).await });
            lookups.push((source.address.clone(), task));
        }

        tracing::debug!(
            "enriching {} sources ({} cached, {} lookups issued)",
            sources.len(),
            outcomes.len(),
            lookups.len()
        );

        // 2. Wait for the whole batch to settle
        for (address, task) in lookups {
            let outcome = match task.await {
                Ok(outcome) => outcome,
                Err(err) => {
                    tracing::warn!("resolution task for {} failed: {}", address, err);
                    ResolveOutcome::Unresolvable
                }
            };
            outcomes.insert(address, outcome);
        }

        // 3. Assemble output, index-aligned with the input
        sources
            .iter()
            .zip(&addresses)
            .map(|(source, address)| {
                let Some(ip) = address.ip() else {
                    return EnrichedSource::new(source.clone(), None, None);
                };

                let hostname = outcomes
                    .get(&source.address)
                    .and_then(|outcome| outcome.hostname())
                    .map(str::to_string);

                // Private space is never geolocated
                let country = if is_publicly_routable(ip) {
                    self.country_db.as_ref().and_then(|db| db.lookup(ip))
                } else {
                    None
                };

                EnrichedSource::new(source.clone(), hostname, country)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{HostnameResolver, LookupError};
    use crate::infrastructure::{CacheConfig, GateConfig};
    use async_trait::async_trait;
    use std::net::IpAddr;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct NeverResolves {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl HostnameResolver for NeverResolves {
        async fn reverse_lookup(&self, _ip: IpAddr) -> Result<String, LookupError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(LookupError::NotFound)
        }
    }

    fn service_without_db() -> (EnrichmentService, Arc<NeverResolves>) {
        let resolver = Arc::new(NeverResolves {
            calls: AtomicUsize::new(0),
        });
        let cache = Arc::new(ResolutionCache::new(CacheConfig::default()));
        let gate = Arc::new(ResolutionGate::new(
            resolver.clone(),
            cache.clone(),
            GateConfig::default(),
        ));
        (EnrichmentService::new(None, cache, gate), resolver)
    }

    #[tokio::test]
    async fn test_empty_input_yields_empty_output() {
        let (service, _) = service_without_db();
        assert!(service.enrich(&[]).await.is_empty());
    }

    #[tokio::test]
    async fn test_reference_clocks_skip_all_lookups() {
        let (service, resolver) = service_without_db();
        let sources = vec![Source::new("PPS"), Source::new("NMEA0")];

        let enriched = service.enrich(&sources).await;

        assert_eq!(enriched.len(), 2);
        assert!(enriched.iter().all(|e| e.hostname.is_none()));
        assert!(enriched.iter().all(|e| e.country.is_none()));
        assert_eq!(enriched[0].display_name(), "PPS");
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_duplicate_addresses_resolve_once() {
        let (service, resolver) = service_without_db();
        let sources = vec![
            Source::new("192.0.2.1"),
            Source::new("192.0.2.1"),
            Source::new("192.0.2.1"),
        ];

        let enriched = service.enrich(&sources).await;

        assert_eq!(enriched.len(), 3);
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 1);
    }
}
