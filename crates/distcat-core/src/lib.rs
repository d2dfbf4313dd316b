//! distcat-core - Core library for distcat
//!
//! Lazy loading of the statistical distribution catalog: a resident index,
//! group payloads fetched on demand, and in-memory caches over both.

pub mod config;
pub mod error;
pub mod event;
pub mod index;
pub mod loader;
pub mod models;
pub mod source;
pub mod split;

pub use config::{HttpSourceConfig, LoaderConfig};
pub use error::{CoreError, LoaderError, LookupStage, SourceError};
pub use event::{EventBus, LoaderEvent};
pub use index::IndexTable;
pub use loader::{DistributionGroup, DistributionLoader};
pub use models::{CacheStats, Distribution, IndexEntry, RelatedModel};
pub use split::{read_catalog, split_catalog, write_split, SplitCatalog, SplitReport};
