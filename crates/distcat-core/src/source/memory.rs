//! In-memory group payloads with fetch accounting
//!
//! Useful for tests and for hosts that already hold payloads in memory.

use super::{group_file_name, GroupSource};
use crate::error::SourceError;
use crate::models::Distribution;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Group payloads held in a map, counting every fetch
#[derive(Debug, Default)]
pub struct MemorySource {
    payloads: RwLock<HashMap<u32, Vec<u8>>>,
    fetches: RwLock<HashMap<u32, usize>>,
    /// Remaining fetches per group that fail before the payload is served
    failures: RwLock<HashMap<u32, usize>>,
    total_fetches: AtomicUsize,
    /// Simulated latency before each fetch returns
    latency: Option<Duration>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Serialize `records` as the payload for `group`
    pub fn with_group(self, group: u32, records: &[Distribution]) -> Self {
        self.set_group(group, records);
        self
    }

    pub fn set_group(&self, group: u32, records: &[Distribution]) {
        // Vec<Distribution> serialization cannot fail: plain strings and integers only
        let payload = serde_json::to_vec(records).unwrap_or_default();
        self.set_raw(group, payload);
    }

    /// Store an arbitrary payload, valid or not
    pub fn set_raw(&self, group: u32, payload: impl Into<Vec<u8>>) {
        self.payloads.write().insert(group, payload.into());
    }

    pub fn remove_group(&self, group: u32) {
        self.payloads.write().remove(&group);
    }

    /// Make the next `times` fetches of `group` fail with a 503 status
    pub fn fail_next(&self, group: u32, times: usize) {
        self.failures.write().insert(group, times);
    }

    /// Number of fetches issued across all groups
    pub fn fetch_count(&self) -> usize {
        self.total_fetches.load(Ordering::SeqCst)
    }

    pub fn fetch_count_for(&self, group: u32) -> usize {
        self.fetches.read().get(&group).copied().unwrap_or(0)
    }
}

#[async_trait]
impl GroupSource for MemorySource {
    async fn fetch_group(&self, group: u32) -> Result<Vec<u8>, SourceError> {
        self.total_fetches.fetch_add(1, Ordering::SeqCst);
        *self.fetches.write().entry(group).or_insert(0) += 1;

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        if let Some(remaining) = self.failures.write().get_mut(&group).filter(|n| **n > 0) {
            *remaining -= 1;
            return Err(SourceError::Status {
                url: self.location(group),
                status: 503,
            });
        }

        self.payloads
            .read()
            .get(&group)
            .cloned()
            .ok_or_else(|| SourceError::NotFound {
                location: self.location(group),
            })
    }

    fn location(&self, group: u32) -> String {
        format!("memory:{}", group_file_name(group))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_counts_fetches_per_group() {
        let source = MemorySource::new();
        source.set_raw(1, "[]");

        source.fetch_group(1).await.unwrap();
        source.fetch_group(1).await.unwrap();
        assert!(source.fetch_group(2).await.is_err());

        assert_eq!(source.fetch_count(), 3);
        assert_eq!(source.fetch_count_for(1), 2);
        assert_eq!(source.fetch_count_for(2), 1);
    }

    #[tokio::test]
    async fn test_fail_next_then_serve() {
        let source = MemorySource::new();
        source.set_raw(1, "[]");
        source.fail_next(1, 1);

        assert!(matches!(
            source.fetch_group(1).await,
            Err(SourceError::Status { status: 503, .. })
        ));
        assert_eq!(source.fetch_group(1).await.unwrap(), b"[]");
        assert_eq!(source.fetch_count_for(1), 2);
    }

    #[tokio::test]
    async fn test_remove_group() {
        let source = MemorySource::new();
        source.set_raw(1, "[]");
        source.remove_group(1);

        assert!(matches!(
            source.fetch_group(1).await,
            Err(SourceError::NotFound { .. })
        ));
    }
}
