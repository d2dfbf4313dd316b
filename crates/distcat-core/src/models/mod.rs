//! Data models for distcat

pub mod distribution;
pub mod stats;

pub use distribution::{Distribution, IndexEntry, RelatedModel};
pub use stats::CacheStats;
