//! Lazy distribution loader with DashMap + parking_lot::RwLock caches
//!
//! The index table is resident; full records are fetched one group at a
//! time through a [`GroupSource`] and memoized in two caches:
//! - group cache: group number -> every record of that group
//! - distribution cache: id -> record, filled as a side effect of group loads
//!
//! Both caches share the same `Arc<Distribution>` allocations and are only
//! written by a successful group load or emptied by [`DistributionLoader::clear_cache`].

use crate::config::LoaderConfig;
use crate::error::{CoreError, LoaderError, LookupStage, SourceError};
use crate::event::{EventBus, LoaderEvent};
use crate::index::IndexTable;
use crate::models::{CacheStats, Distribution, IndexEntry};
use crate::source::{EmbeddedSource, GroupSource};
use dashmap::DashMap;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info, warn};

/// Every record of one group, in payload order
pub type DistributionGroup = Arc<[Arc<Distribution>]>;

/// Resolves distributions by id, fetching whole groups on demand
pub struct DistributionLoader {
    /// Resident index (never cleared)
    index: IndexTable,

    /// Where group payloads come from
    source: Arc<dyn GroupSource>,

    config: LoaderConfig,

    /// group -> records (low contention, read-mostly)
    groups: RwLock<HashMap<u32, DistributionGroup>>,

    /// id -> record (point lookups from many callers)
    distributions: DashMap<u32, Arc<Distribution>>,

    /// Per-group gates for single-flight fetches. One entry per distinct
    /// group number ever requested, including numbers absent from the index.
    inflight: DashMap<u32, Arc<Mutex<()>>>,

    event_bus: EventBus,
}

impl DistributionLoader {
    pub fn new(index: IndexTable, source: Arc<dyn GroupSource>, config: LoaderConfig) -> Self {
        let event_bus = EventBus::new(config.event_capacity);

        Self {
            index,
            source,
            config,
            groups: RwLock::new(HashMap::new()),
            distributions: DashMap::new(),
            inflight: DashMap::new(),
            event_bus,
        }
    }

    /// Create with default configuration
    pub fn with_defaults(index: IndexTable, source: Arc<dyn GroupSource>) -> Self {
        Self::new(index, source, LoaderConfig::default())
    }

    /// Loader over the catalog compiled into the crate
    pub fn bundled(config: LoaderConfig) -> Result<Self, CoreError> {
        Ok(Self::new(
            IndexTable::bundled()?,
            Arc::new(EmbeddedSource::new()),
            config,
        ))
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn index(&self) -> &IndexTable {
        &self.index
    }

    /// Every index entry; the same resident slice on each call
    pub fn get_index(&self) -> &[IndexEntry] {
        self.index.entries()
    }

    /// Get the event bus for subscribing to cache changes
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    // ===================
    // Loading
    // ===================

    /// Load every record of `group`, fetching at most once per cache lifetime
    pub async fn load_group(&self, group: u32) -> Result<DistributionGroup, LoaderError> {
        if let Some(cached) = self.cached_group(group) {
            return Ok(cached);
        }

        if !self.config.single_flight {
            return self.fetch_and_store(group).await;
        }

        let gate = Arc::clone(
            self.inflight
                .entry(group)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .value(),
        );
        let _guard = gate.lock().await;

        // Another caller may have finished the fetch while we waited
        if let Some(cached) = self.cached_group(group) {
            debug!(group, "Group filled by concurrent load");
            return Ok(cached);
        }

        self.fetch_and_store(group).await
    }

    /// Resolve one distribution, loading its group if needed
    pub async fn load_distribution(&self, id: u32) -> Result<Arc<Distribution>, LoaderError> {
        if let Some(cached) = self.cached_distribution(id) {
            return Ok(cached);
        }

        let Some(entry) = self.index.entry(id) else {
            warn!(id, "Distribution missing from index");
            return Err(LoaderError::NotFound {
                stage: LookupStage::Index,
                id,
            });
        };
        let group = entry.group;

        let records = self.load_group(group).await?;

        match records.iter().find(|d| d.id == id) {
            Some(found) => Ok(Arc::clone(found)),
            None => {
                warn!(id, group, "Index points at a group that lacks the distribution");
                Err(LoaderError::NotFound {
                    stage: LookupStage::Group(group),
                    id,
                })
            }
        }
    }

    /// Warm the cache for `group` in the background
    ///
    /// Failures are logged and never surfaced. The handle may be dropped.
    pub fn preload_group(self: &Arc<Self>, group: u32) -> JoinHandle<()> {
        let loader = Arc::clone(self);

        tokio::spawn(async move {
            if let Err(e) = loader.load_group(group).await {
                warn!(group, error = %e, "Failed to preload distribution group");
            }
        })
    }

    /// Load every group named by the index concurrently, ordered by group number
    pub async fn load_all(self: &Arc<Self>) -> Result<Vec<(u32, DistributionGroup)>, LoaderError> {
        let mut tasks = JoinSet::new();

        for group in self.index.groups() {
            let loader = Arc::clone(self);
            tasks.spawn(async move { (group, loader.load_group(group).await) });
        }

        let mut loaded = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            let (group, result) = joined?;
            loaded.push((group, result?));
        }
        loaded.sort_by_key(|(group, _)| *group);

        info!(groups = loaded.len(), "All distribution groups loaded");
        Ok(loaded)
    }

    async fn fetch_and_store(&self, group: u32) -> Result<DistributionGroup, LoaderError> {
        debug!(group, location = %self.source.location(group), "Fetching distribution group");

        let records = match self.fetch_group(group).await {
            Ok(records) => records,
            Err(source) => {
                warn!(group, error = %source, "Failed to load distribution group");
                self.event_bus.publish(LoaderEvent::GroupLoadFailed {
                    group,
                    message: source.to_string(),
                });
                return Err(LoaderError::GroupLoad { group, source });
            }
        };

        let records: DistributionGroup = records.into_iter().map(Arc::new).collect();

        {
            // Both maps change under the group write lock so a concurrent
            // clear_cache or cache_stats never sees half a group
            let mut groups = self.groups.write();
            groups.insert(group, Arc::clone(&records));
            for record in records.iter() {
                self.distributions.insert(record.id, Arc::clone(record));
            }
        }

        debug!(group, count = records.len(), "Distribution group cached");
        self.event_bus.publish(LoaderEvent::GroupLoaded {
            group,
            count: records.len(),
        });

        Ok(records)
    }

    /// Fetch, decode and validate one payload without touching the caches
    async fn fetch_group(&self, group: u32) -> Result<Vec<Distribution>, SourceError> {
        let payload = self.source.fetch_group(group).await?;

        let records: Vec<Distribution> =
            serde_json::from_slice(&payload).map_err(|source| SourceError::Json {
                location: self.source.location(group),
                source,
            })?;

        validate_group(group, &records)?;
        Ok(records)
    }

    // ===================
    // Cache access
    // ===================

    /// Cached group without fetching
    pub fn cached_group(&self, group: u32) -> Option<DistributionGroup> {
        self.groups.read().get(&group).cloned()
    }

    /// Cached distribution without fetching
    pub fn cached_distribution(&self, id: u32) -> Option<Arc<Distribution>> {
        self.distributions.get(&id).map(|r| Arc::clone(r.value()))
    }

    pub fn is_group_cached(&self, group: u32) -> bool {
        self.groups.read().contains_key(&group)
    }

    /// Empty both caches; the index is kept
    ///
    /// Loads already in flight still complete and repopulate the caches.
    pub fn clear_cache(&self) {
        {
            let mut groups = self.groups.write();
            groups.clear();
            self.distributions.clear();
        }

        debug!("Distribution caches cleared");
        self.event_bus.publish(LoaderEvent::CacheCleared);
    }

    pub fn cache_stats(&self) -> CacheStats {
        let (groups_cached, distributions_cached, mut cached_groups) = {
            let groups = self.groups.read();
            (
                groups.len(),
                self.distributions.len(),
                groups.keys().copied().collect::<Vec<_>>(),
            )
        };
        cached_groups.sort_unstable();

        CacheStats {
            groups_cached,
            distributions_cached,
            cached_groups,
        }
    }
}

/// Every record must belong to `group` and appear once
fn validate_group(group: u32, records: &[Distribution]) -> Result<(), SourceError> {
    let mut seen = HashSet::with_capacity(records.len());

    for record in records {
        if record.group != group {
            return Err(SourceError::GroupMismatch {
                expected: group,
                found: record.group,
                id: record.id,
            });
        }
        if !seen.insert(record.id) {
            return Err(SourceError::DuplicateId { id: record.id });
        }
    }

    Ok(())
}
