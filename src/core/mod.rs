//! In-memory contact stores, their indices, and the named registry.

/// Secondary index buckets.
pub mod indices;
/// Named registry of contact stores with fan-out queries.
pub mod registry;
/// Contact store with city/state indices.
pub mod store;
