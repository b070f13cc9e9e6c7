//! Adapters Layer
//!
//! Concrete implementations of the domain ports. Only outbound adapters
//! exist here; the dashboard's HTTP layer lives outside this crate.

pub mod outbound;
