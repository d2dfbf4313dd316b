//! Always-resident index table
//!
//! Maps distribution id to its lightweight metadata and owning group.
//! Built once, never mutated; cloning shares the underlying storage.

use crate::error::CoreError;
use crate::models::IndexEntry;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Index payload compiled into the binary
const BUNDLED_INDEX: &str = include_str!("../data/distributions/index.json");

/// Read-only table of [`IndexEntry`] values with O(1) lookup by id
#[derive(Debug, Clone)]
pub struct IndexTable {
    entries: Arc<[IndexEntry]>,
    positions: Arc<HashMap<u32, usize>>,
}

impl IndexTable {
    /// Build from entries, rejecting duplicate ids and group 0
    pub fn new(entries: Vec<IndexEntry>) -> Result<Self, CoreError> {
        let mut positions = HashMap::with_capacity(entries.len());

        for (pos, entry) in entries.iter().enumerate() {
            if entry.group == 0 {
                return Err(CoreError::InvalidIndex {
                    message: format!("distribution {} has group 0", entry.id),
                });
            }
            if positions.insert(entry.id, pos).is_some() {
                return Err(CoreError::InvalidIndex {
                    message: format!("duplicate distribution id {}", entry.id),
                });
            }
        }

        Ok(Self {
            entries: entries.into(),
            positions: Arc::new(positions),
        })
    }

    /// Index shipped with the crate
    pub fn bundled() -> Result<Self, CoreError> {
        Self::from_json_named(BUNDLED_INDEX, "bundled index.json")
    }

    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        Self::from_json_named(json, "index")
    }

    /// Load an `index.json` file from disk
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| CoreError::read(path, e))?;
        let table = Self::from_json_named(&content, &path.display().to_string())?;
        debug!(path = %path.display(), entries = table.len(), "Index loaded");
        Ok(table)
    }

    fn from_json_named(json: &str, origin: &str) -> Result<Self, CoreError> {
        let entries: Vec<IndexEntry> =
            serde_json::from_str(json).map_err(|e| CoreError::json(origin, e))?;
        Self::new(entries)
    }

    /// All entries in payload order
    ///
    /// Returns the same resident slice on every call.
    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn entry(&self, id: u32) -> Option<&IndexEntry> {
        self.positions.get(&id).map(|&pos| &self.entries[pos])
    }

    pub fn contains(&self, id: u32) -> bool {
        self.positions.contains_key(&id)
    }

    /// Distinct group numbers, ascending
    pub fn groups(&self) -> Vec<u32> {
        let mut groups: Vec<u32> = self.entries.iter().map(|e| e.group).collect();
        groups.sort_unstable();
        groups.dedup();
        groups
    }

    /// Entries belonging to one group, in payload order
    pub fn entries_in_group(&self, group: u32) -> impl Iterator<Item = &IndexEntry> {
        self.entries.iter().filter(move |e| e.group == group)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
