//! Application Layer
//!
//! Use cases that orchestrate domain logic through the ports.

pub mod enrichment_service;

pub use enrichment_service::EnrichmentService;
