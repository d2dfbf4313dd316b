//! Sample catalog payloads compiled into the binary

use super::{group_file_name, GroupSource};
use crate::error::SourceError;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use std::collections::BTreeMap;

/// Bundled `group-<N>.json` payloads, keyed by group number
static EMBEDDED_GROUPS: Lazy<BTreeMap<u32, &'static str>> = Lazy::new(|| {
    let mut m = BTreeMap::new();
    m.insert(1, include_str!("../../data/distributions/group-1.json"));
    m.insert(2, include_str!("../../data/distributions/group-2.json"));
    m.insert(3, include_str!("../../data/distributions/group-3.json"));
    m
});

/// Serves the bundled sample catalog; pairs with [`crate::IndexTable::bundled`]
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedSource;

impl EmbeddedSource {
    pub fn new() -> Self {
        Self
    }

    /// Group numbers with a bundled payload
    pub fn groups(&self) -> Vec<u32> {
        EMBEDDED_GROUPS.keys().copied().collect()
    }
}

#[async_trait]
impl GroupSource for EmbeddedSource {
    async fn fetch_group(&self, group: u32) -> Result<Vec<u8>, SourceError> {
        EMBEDDED_GROUPS
            .get(&group)
            .map(|payload| payload.as_bytes().to_vec())
            .ok_or_else(|| SourceError::NotFound {
                location: self.location(group),
            })
    }

    fn location(&self, group: u32) -> String {
        format!("embedded:{}", group_file_name(group))
    }
}
