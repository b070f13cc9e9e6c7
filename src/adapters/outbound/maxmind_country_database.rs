//! MaxMind Country Database
//!
//! Implements CountryDatabase using a MaxMind GeoLite2-Country file.

use crate::domain::entities::CountryInfo;
use crate::domain::ports::CountryDatabase;
use maxminddb::Reader;
use serde::Deserialize;
use std::net::IpAddr;
use std::sync::atomic::{AtomicU64, Ordering};

/// MaxMind GeoIP country database.
///
/// Loads the GeoLite2-Country database fully into memory at startup;
/// lookups after that are read-only and lock-free. A database miss for
/// a public address is a normal `None` (counted for diagnostics), never
/// an error.
pub struct MaxMindCountryDatabase {
    reader: Reader<Vec<u8>>,
    misses: AtomicU64,
}

impl MaxMindCountryDatabase {
    /// Load a GeoIP database from a file path.
    ///
    /// A missing or malformed file is the one fatal error of this
    /// adapter, raised here and never again: after a successful load
    /// every lookup is infallible.
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let reader = Reader::open_readfile(path)?;
        Ok(Self {
            reader,
            misses: AtomicU64::new(0),
        })
    }

    /// Number of lookups that found no record (diagnostic only).
    pub fn miss_count(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    fn probe(&self, ip: IpAddr) -> Option<CountryInfo> {
        #[derive(Debug, Deserialize)]
        struct Names {
            en: Option<String>,
        }

        #[derive(Debug, Deserialize)]
        struct Country {
            iso_code: Option<String>,
            names: Option<Names>,
        }

        #[derive(Debug, Deserialize)]
        struct CountryResp {
            country: Option<Country>,
        }

        let resp: CountryResp = self.reader.lookup(ip).ok()?;
        let country = resp.country?;
        let code = country.iso_code?;
        let name = country
            .names
            .and_then(|names| names.en)
            .unwrap_or_else(|| code.clone());

        Some(CountryInfo::new(code, name))
    }
}

impl CountryDatabase for MaxMindCountryDatabase {
    fn lookup(&self, ip: IpAddr) -> Option<CountryInfo> {
        let info = self.probe(ip);
        if info.is_none() {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        info
    }
}
