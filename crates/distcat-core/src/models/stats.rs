//! Cache introspection snapshot

use serde::{Deserialize, Serialize};

/// Point-in-time view of the loader caches
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub groups_cached: usize,
    pub distributions_cached: usize,
    /// Sorted ascending
    pub cached_groups: Vec<u32>,
}

impl CacheStats {
    pub fn is_empty(&self) -> bool {
        self.groups_cached == 0 && self.distributions_cached == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_camel_case() {
        let stats = CacheStats {
            groups_cached: 1,
            distributions_cached: 2,
            cached_groups: vec![1],
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["groupsCached"], 1);
        assert_eq!(json["distributionsCached"], 2);
        assert_eq!(json["cachedGroups"][0], 1);
    }
}
