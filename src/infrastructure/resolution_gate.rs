//! Resolution Gate
//!
//! Admission control and request coalescing for external hostname
//! lookups.

use crate::domain::entities::ResolveOutcome;
use crate::domain::ports::HostnameResolver;
use crate::infrastructure::ResolutionCache;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::net::IpAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Semaphore};

/// Gate configuration.
#[derive(Debug, Clone)]
pub struct GateConfig {
    /// Maximum number of external resolutions outstanding at once
    pub max_concurrent: usize,
    /// Deadline for a single external resolution
    pub timeout: Duration,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 10,
            timeout: Duration::from_secs(3),
        }
    }
}

type PendingOutcome = watch::Receiver<Option<ResolveOutcome>>;

/// Concurrency gate for external hostname resolution.
///
/// At most `max_concurrent` lookups are in flight at once; callers
/// beyond the limit wait FIFO for a slot. Concurrent requests for the
/// same address coalesce onto one pending lookup: the first caller
/// (the leader) performs the external call, late callers subscribe to
/// its broadcast outcome instead of issuing work of their own. Every
/// settled outcome, including failures, is written to the resolution
/// cache before followers are woken.
pub struct ResolutionGate {
    resolver: Arc<dyn HostnameResolver>,
    cache: Arc<ResolutionCache>,
    permits: Semaphore,
    pending: DashMap<String, PendingOutcome>,
    timeout: Duration,
    failures: AtomicU64,
}

/// Roles a caller can end up with for a given address.
enum Role {
    Leader(watch::Sender<Option<ResolveOutcome>>),
    Follower(PendingOutcome),
}

/// Removes the pending token when the leader finishes or is dropped
/// mid-flight, so the map cannot wedge on a cancelled caller.
struct PendingGuard<'a> {
    pending: &'a DashMap<String, PendingOutcome>,
    address: &'a str,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.pending.remove(self.address);
    }
}

impl ResolutionGate {
    /// Create a gate in front of the given resolver and cache.
    pub fn new(
        resolver: Arc<dyn HostnameResolver>,
        cache: Arc<ResolutionCache>,
        config: GateConfig,
    ) -> Self {
        Self {
            resolver,
            cache,
            permits: Semaphore::new(config.max_concurrent.max(1)),
            pending: DashMap::new(),
            timeout: config.timeout,
            failures: AtomicU64::new(0),
        }
    }

    /// Resolve an address, subject to admission control and coalescing.
    ///
    /// Intended for cache misses only; the outcome is written to the
    /// cache before this returns. Never fails: timeouts and resolver
    /// errors yield `ResolveOutcome::Unresolvable`.
    pub async fn resolve(&self, address: &str, ip: IpAddr) -> ResolveOutcome {
        let role = match self.pending.entry(address.to_string()) {
            Entry::Occupied(slot) => Role::Follower(slot.get().clone()),
            Entry::Vacant(slot) => {
                let (tx, rx) = watch::channel(None);
                slot.insert(rx);
                Role::Leader(tx)
            }
        };

        match role {
            Role::Follower(rx) => Self::join(rx).await,
            Role::Leader(tx) => self.lead(address, ip, tx).await,
        }
    }

    /// Number of lookups that settled as failures (diagnostic only).
    pub fn failure_count(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    /// Perform the external lookup as the leader for this address.
    async fn lead(
        &self,
        address: &str,
        ip: IpAddr,
        tx: watch::Sender<Option<ResolveOutcome>>,
    ) -> ResolveOutcome {
        let guard = PendingGuard {
            pending: &self.pending,
            address,
        };

        let permit = match self.permits.acquire().await {
            Ok(permit) => permit,
            Err(_) => {
                // Gate torn down during shutdown; nothing to report
                let _ = tx.send(Some(ResolveOutcome::Unresolvable));
                return ResolveOutcome::Unresolvable;
            }
        };

        let outcome = match tokio::time::timeout(self.timeout, self.resolver.reverse_lookup(ip))
            .await
        {
            Ok(Ok(hostname)) => ResolveOutcome::Hostname(hostname),
            Ok(Err(err)) => {
                tracing::debug!("reverse lookup failed for {}: {}", ip, err);
                self.failures.fetch_add(1, Ordering::Relaxed);
                ResolveOutcome::Unresolvable
            }
            Err(_) => {
                tracing::debug!("reverse lookup timed out for {} after {:?}", ip, self.timeout);
                self.failures.fetch_add(1, Ordering::Relaxed);
                ResolveOutcome::Unresolvable
            }
        };

        // Cache before releasing the slot or waking followers, so no
        // later caller can miss the cache after observing the outcome.
        self.cache.put(address, outcome.clone());
        drop(permit);
        drop(guard);
        let _ = tx.send(Some(outcome.clone()));

        outcome
    }

    /// Wait for the leader's broadcast for an already-pending address.
    async fn join(mut rx: PendingOutcome) -> ResolveOutcome {
        loop {
            if let Some(outcome) = rx.borrow_and_update().clone() {
                return outcome;
            }
            if rx.changed().await.is_err() {
                // Leader dropped without settling; degrade rather than retry
                return ResolveOutcome::Unresolvable;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::LookupError;
    use crate::infrastructure::CacheConfig;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::AtomicUsize;

    /// Scripted resolver that records call and concurrency counts.
    struct ScriptedResolver {
        hosts: HashMap<IpAddr, String>,
        delay: Duration,
        calls: AtomicUsize,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl ScriptedResolver {
        fn new(hosts: &[(&str, &str)], delay: Duration) -> Self {
            Self {
                hosts: hosts
                    .iter()
                    .map(|(ip, name)| (ip.parse().unwrap(), name.to_string()))
                    .collect(),
                delay,
                calls: AtomicUsize::new(0),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn max_in_flight(&self) -> usize {
            self.max_in_flight.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl HostnameResolver for ScriptedResolver {
        async fn reverse_lookup(&self, ip: IpAddr) -> Result<String, LookupError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            tokio::time::sleep(self.delay).await;

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.hosts
                .get(&ip)
                .cloned()
                .ok_or(LookupError::NotFound)
        }
    }

    fn gate_with(
        resolver: Arc<ScriptedResolver>,
        max_concurrent: usize,
    ) -> (Arc<ResolutionGate>, Arc<ResolutionCache>) {
        let cache = Arc::new(ResolutionCache::new(CacheConfig::default()));
        let gate = Arc::new(ResolutionGate::new(
            resolver,
            cache.clone(),
            GateConfig {
                max_concurrent,
                timeout: Duration::from_secs(3),
            },
        ));
        (gate, cache)
    }

    #[tokio::test]
    async fn test_resolves_and_caches_hostname() {
        let resolver = Arc::new(ScriptedResolver::new(
            &[("8.8.8.8", "dns.google")],
            Duration::ZERO,
        ));
        let (gate, cache) = gate_with(resolver, 10);

        let outcome = gate.resolve("8.8.8.8", "8.8.8.8".parse().unwrap()).await;

        assert_eq!(outcome, ResolveOutcome::Hostname("dns.google".to_string()));
        assert_eq!(cache.get("8.8.8.8"), Some(outcome));
    }

    #[tokio::test]
    async fn test_not_found_maps_to_unresolvable_and_is_cached() {
        let resolver = Arc::new(ScriptedResolver::new(&[], Duration::ZERO));
        let (gate, cache) = gate_with(resolver, 10);

        let outcome = gate.resolve("192.0.2.7", "192.0.2.7".parse().unwrap()).await;

        assert_eq!(outcome, ResolveOutcome::Unresolvable);
        assert_eq!(cache.get("192.0.2.7"), Some(ResolveOutcome::Unresolvable));
        assert_eq!(gate.failure_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_lookup_times_out_as_unresolvable() {
        let resolver = Arc::new(ScriptedResolver::new(
            &[("203.0.113.9", "slow.example")],
            Duration::from_secs(30),
        ));
        let (gate, cache) = gate_with(resolver, 10);

        let started = tokio::time::Instant::now();
        let outcome = gate
            .resolve("203.0.113.9", "203.0.113.9".parse().unwrap())
            .await;

        assert_eq!(outcome, ResolveOutcome::Unresolvable);
        assert_eq!(cache.get("203.0.113.9"), Some(ResolveOutcome::Unresolvable));
        assert_eq!(gate.failure_count(), 1);
        // Bounded by the gate timeout, not the resolver's latency
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_same_address_coalesces() {
        let resolver = Arc::new(ScriptedResolver::new(
            &[("8.8.8.8", "dns.google")],
            Duration::from_millis(200),
        ));
        let (gate, _cache) = gate_with(resolver.clone(), 10);

        let ip: IpAddr = "8.8.8.8".parse().unwrap();
        let (a, b, c) = tokio::join!(
            gate.resolve("8.8.8.8", ip),
            gate.resolve("8.8.8.8", ip),
            gate.resolve("8.8.8.8", ip),
        );

        let expected = ResolveOutcome::Hostname("dns.google".to_string());
        assert_eq!(a, expected);
        assert_eq!(b, expected);
        assert_eq!(c, expected);
        assert_eq!(resolver.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_distinct_addresses_do_not_coalesce() {
        let resolver = Arc::new(ScriptedResolver::new(
            &[("8.8.8.8", "dns.google"), ("1.1.1.1", "one.one.one.one")],
            Duration::from_millis(50),
        ));
        let (gate, _cache) = gate_with(resolver.clone(), 10);

        tokio::join!(
            gate.resolve("8.8.8.8", "8.8.8.8".parse().unwrap()),
            gate.resolve("1.1.1.1", "1.1.1.1".parse().unwrap()),
        );

        assert_eq!(resolver.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_admission_is_bounded() {
        let resolver = Arc::new(ScriptedResolver::new(&[], Duration::from_millis(100)));
        let (gate, _cache) = gate_with(resolver.clone(), 2);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let gate = gate.clone();
                let address = format!("192.0.2.{i}");
                tokio::spawn(async move {
                    let ip: IpAddr = address.parse().unwrap();
                    gate.resolve(&address, ip).await
                })
            })
            .collect();
        futures::future::join_all(handles).await;

        assert_eq!(resolver.calls(), 8);
        assert!(resolver.max_in_flight() <= 2);
    }
}
