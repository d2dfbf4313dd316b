//! Catalog splitter
//!
//! Turns one full catalog (JSON array of [`Distribution`]) into the lazy
//! loading layout: a small `index.json` plus one `group-<N>.json` per group.

use crate::error::CoreError;
use crate::models::{Distribution, IndexEntry};
use crate::source::group_file_name;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Index file name inside a data directory
pub const INDEX_FILE_NAME: &str = "index.json";

/// In-memory result of splitting a catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitCatalog {
    /// One entry per record, in catalog order
    pub index: Vec<IndexEntry>,
    /// Records per group, each in catalog order
    pub groups: BTreeMap<u32, Vec<Distribution>>,
}

/// One written file
#[derive(Debug, Clone)]
pub struct WrittenFile {
    pub path: PathBuf,
    pub entries: usize,
    pub bytes: usize,
}

/// Summary of [`write_split`]
#[derive(Debug, Clone)]
pub struct SplitReport {
    pub index: WrittenFile,
    /// Ascending by group number
    pub groups: Vec<(u32, WrittenFile)>,
}

impl SplitReport {
    pub fn total_bytes(&self) -> usize {
        self.index.bytes + self.groups.iter().map(|(_, f)| f.bytes).sum::<usize>()
    }
}

/// Read a full catalog file
pub fn read_catalog(path: &Path) -> Result<Vec<Distribution>, CoreError> {
    let content = std::fs::read_to_string(path).map_err(|e| CoreError::read(path, e))?;
    serde_json::from_str(&content).map_err(|e| CoreError::json(path.display().to_string(), e))
}

/// Partition a catalog by group, rejecting duplicate ids and group 0
pub fn split_catalog(catalog: &[Distribution]) -> Result<SplitCatalog, CoreError> {
    let mut seen = HashSet::with_capacity(catalog.len());
    let mut index = Vec::with_capacity(catalog.len());
    let mut groups: BTreeMap<u32, Vec<Distribution>> = BTreeMap::new();

    for record in catalog {
        if record.group == 0 {
            return Err(CoreError::InvalidCatalog {
                message: format!("distribution {} has group 0", record.id),
            });
        }
        if !seen.insert(record.id) {
            return Err(CoreError::InvalidCatalog {
                message: format!("duplicate distribution id {}", record.id),
            });
        }

        index.push(record.index_entry());
        groups.entry(record.group).or_default().push(record.clone());
    }

    debug!(
        distributions = index.len(),
        groups = groups.len(),
        "Catalog split"
    );

    Ok(SplitCatalog { index, groups })
}

/// Split `catalog` and write `index.json` and `group-<N>.json` into `out_dir`
pub fn write_split(catalog: &[Distribution], out_dir: &Path) -> Result<SplitReport, CoreError> {
    let split = split_catalog(catalog)?;

    std::fs::create_dir_all(out_dir).map_err(|e| CoreError::FileWrite {
        path: out_dir.to_path_buf(),
        source: e,
    })?;

    let index = write_json(&out_dir.join(INDEX_FILE_NAME), &split.index)?;

    let mut groups = Vec::with_capacity(split.groups.len());
    for (group, records) in &split.groups {
        let file = write_json(&out_dir.join(group_file_name(*group)), records)?;
        groups.push((*group, file));
    }

    info!(
        out_dir = %out_dir.display(),
        entries = index.entries,
        groups = groups.len(),
        "Catalog written"
    );

    Ok(SplitReport { index, groups })
}

fn write_json<T: serde::Serialize>(path: &Path, items: &[T]) -> Result<WrittenFile, CoreError> {
    let json = serde_json::to_string_pretty(items)
        .map_err(|e| CoreError::json(path.display().to_string(), e))?;

    std::fs::write(path, &json).map_err(|e| CoreError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(WrittenFile {
        path: path.to_path_buf(),
        entries: items.len(),
        bytes: json.len(),
    })
}
