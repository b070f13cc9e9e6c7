use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    // Resolution gate settings
    pub dns_max_concurrent: usize,
    pub dns_timeout_secs: u64,

    // Resolution cache settings
    pub dns_cache_capacity: usize,
    pub dns_cache_ttl_secs: u64,

    // GeoIP settings
    pub geoip_path: Option<String>,

    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dns_max_concurrent: 10,
            dns_timeout_secs: 3,
            dns_cache_capacity: 1024,
            dns_cache_ttl_secs: 3600,
            geoip_path: None,
            debug: false,
        }
    }
}

pub fn load_config() -> anyhow::Result<Config> {
    let dns_max_concurrent = std::env::var("CHRONYDASH_DNS_MAX_CONCURRENT")
        .unwrap_or_else(|_| "10".to_string())
        .parse()
        .unwrap_or(10);

    let dns_timeout_secs = std::env::var("CHRONYDASH_DNS_TIMEOUT_SECS")
        .unwrap_or_else(|_| "3".to_string())
        .parse()
        .unwrap_or(3);

    let dns_cache_capacity = std::env::var("CHRONYDASH_DNS_CACHE_CAPACITY")
        .unwrap_or_else(|_| "1024".to_string())
        .parse()
        .unwrap_or(1024);

    let dns_cache_ttl_secs = std::env::var("CHRONYDASH_DNS_CACHE_TTL_SECS")
        .unwrap_or_else(|_| "3600".to_string())
        .parse()
        .unwrap_or(3600);

    let geoip_path = std::env::var("CHRONYDASH_GEOIP_PATH").ok();

    let debug = std::env::var("DEBUG").is_ok();

    Ok(Config {
        dns_max_concurrent,
        dns_timeout_secs,
        dns_cache_capacity,
        dns_cache_ttl_secs,
        geoip_path,
        debug,
    })
}
