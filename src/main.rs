//! chronydash - NTP source enrichment
//!
//! This is the composition root that wires the enrichment singletons
//! together. The dashboard's HTTP layer feeds source batches into the
//! same service; this binary enriches addresses given on the command
//! line, which doubles as a smoke check for a deployment.

use chronydash::adapters::outbound::{HickoryHostnameResolver, MaxMindCountryDatabase};
use chronydash::config::load_config;
use chronydash::domain::ports::CountryDatabase;
use chronydash::infrastructure::{CacheConfig, GateConfig, ResolutionCache, ResolutionGate};
use chronydash::{EnrichmentService, Source};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment
    let cfg = load_config()?;

    // Setup logging
    let log_level = if cfg.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt().with_max_level(log_level).init();

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let json_output = args.iter().any(|a| a == "--json");
    args.retain(|a| a != "--json");

    if args.is_empty() {
        eprintln!("usage: chronydash [--json] <address>...");
        return Ok(());
    }

    // ===== COMPOSITION ROOT =====

    // Country database (MaxMind); a load failure degrades to absent
    // country lookups rather than refusing to start
    let country_db: Option<Arc<dyn CountryDatabase>> = match &cfg.geoip_path {
        Some(path) => match MaxMindCountryDatabase::from_file(path) {
            Ok(db) => {
                tracing::info!("GeoIP DB loaded from {}", path);
                Some(Arc::new(db) as Arc<dyn CountryDatabase>)
            }
            Err(e) => {
                tracing::error!("failed to load GeoIP DB from {}: {:?}", path, e);
                None
            }
        },
        None => {
            tracing::info!("no GeoIP DB configured, country lookups disabled");
            None
        }
    };

    // Resolution cache and gate (process-wide singletons)
    let cache = Arc::new(ResolutionCache::new(CacheConfig {
        capacity: cfg.dns_cache_capacity,
        ttl: Duration::from_secs(cfg.dns_cache_ttl_secs),
    }));
    let resolver = Arc::new(HickoryHostnameResolver::from_system_conf());
    let gate = Arc::new(ResolutionGate::new(
        resolver,
        cache.clone(),
        GateConfig {
            max_concurrent: cfg.dns_max_concurrent,
            timeout: Duration::from_secs(cfg.dns_timeout_secs),
        },
    ));

    let service = EnrichmentService::new(country_db, cache.clone(), gate.clone());

    let sources: Vec<Source> = args.iter().map(|a| Source::new(a.as_str())).collect();
    let enriched = service.enrich(&sources).await;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&enriched)?);
    } else {
        for entry in &enriched {
            let country = entry
                .country
                .as_ref()
                .map(|c| {
                    let flag = c.flag.as_deref().unwrap_or("");
                    format!("{} {} {}", flag, c.code, c.name).trim_start().to_string()
                })
                .unwrap_or_else(|| "-".to_string());
            println!("{:<40} {}", entry.display_name(), country);
        }
    }

    let stats = cache.stats();
    tracing::debug!(
        "cache: {} entries, {} hits, {} misses; {} lookup failures",
        stats.len,
        stats.hits,
        stats.misses,
        gate.failure_count()
    );

    Ok(())
}
