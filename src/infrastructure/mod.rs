//! Infrastructure Layer
//!
//! Process-wide components shared by every enrichment call: the
//! resolution cache and the concurrency gate.

pub mod resolution_cache;
pub mod resolution_gate;

pub use resolution_cache::{CacheConfig, CacheStats, ResolutionCache};
pub use resolution_gate::{GateConfig, ResolutionGate};
