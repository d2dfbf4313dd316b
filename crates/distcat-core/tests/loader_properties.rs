//! Behavioural tests for DistributionLoader
//!
//! Covers:
//! - Fetch-once caching and reference sharing between caches
//! - Not-found handling at index and group level
//! - Failure isolation, cache reset, preload
//! - Single-flight vs. independent concurrent fetches
//! - Cache snapshots stay whole while a clear races a large store
//!
//! Run with:
//! ```bash
//! cargo test --test loader_properties
//! ```

use distcat_core::source::MemorySource;
use distcat_core::{
    Distribution, DistributionLoader, IndexEntry, IndexTable, LoaderConfig, LoaderError,
    LoaderEvent, LookupStage, SourceError,
};
use std::sync::Arc;
use std::time::Duration;

fn dist(id: u32, name: &str, group: u32) -> Distribution {
    Distribution {
        id,
        name: name.to_string(),
        title: format!("{} for clinics", name),
        description: "description".to_string(),
        parameters: "parameters".to_string(),
        formula: "formula".to_string(),
        application: vec!["scheduling".to_string(), "pricing".to_string()],
        takeaway: "takeaway".to_string(),
        group,
        related_models: None,
    }
}

fn entry(id: u32, name: &str, group: u32) -> IndexEntry {
    IndexEntry {
        id,
        name: name.to_string(),
        title: format!("{} for clinics", name),
        group,
    }
}

/// Index: ids 5, 6 in group 1 and 7 in group 2
fn fixture(config: LoaderConfig) -> (Arc<DistributionLoader>, Arc<MemorySource>) {
    let index = IndexTable::new(vec![
        entry(5, "正态分布", 1),
        entry(6, "泊松分布", 1),
        entry(7, "帕累托分布", 2),
    ])
    .unwrap();

    let source = Arc::new(
        MemorySource::new()
            .with_group(1, &[dist(5, "正态分布", 1), dist(6, "泊松分布", 1)])
            .with_group(2, &[dist(7, "帕累托分布", 2)]),
    );

    let loader = Arc::new(DistributionLoader::new(index, source.clone(), config));
    (loader, source)
}

mod caching {
    use super::*;

    #[tokio::test]
    async fn test_sequential_group_loads_fetch_once() {
        let (loader, source) = fixture(LoaderConfig::default());

        let first = loader.load_group(1).await.unwrap();
        let second = loader.load_group(1).await.unwrap();

        assert_eq!(source.fetch_count_for(1), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_group_and_distribution_caches_share_records() {
        let (loader, _source) = fixture(LoaderConfig::default());

        let group = loader.load_group(1).await.unwrap();

        assert!(Arc::ptr_eq(&loader.cached_group(1).unwrap(), &group));
        for record in group.iter() {
            let cached = loader.cached_distribution(record.id).unwrap();
            assert!(Arc::ptr_eq(&cached, record));
        }
    }

    #[tokio::test]
    async fn test_every_index_entry_resolves() {
        let (loader, _source) = fixture(LoaderConfig::default());

        let entries = loader.get_index().to_vec();
        for e in entries {
            let d = loader.load_distribution(e.id).await.unwrap();
            assert_eq!(d.id, e.id);
            assert_eq!(d.group, e.group);
        }
    }

    #[tokio::test]
    async fn test_end_to_end_scenario() {
        let (loader, source) = fixture(LoaderConfig::default());

        let five = loader.load_distribution(5).await.unwrap();
        assert_eq!(five.id, 5);
        assert_eq!(five.name, "正态分布");
        assert_eq!(loader.cache_stats().distributions_cached, 2);
        assert_eq!(source.fetch_count(), 1);

        let six = loader.load_distribution(6).await.unwrap();
        assert_eq!(six.id, 6);
        assert_eq!(source.fetch_count(), 1);
    }
}

mod not_found {
    use super::*;

    #[tokio::test]
    async fn test_unknown_id_fails_without_fetch() {
        let (loader, source) = fixture(LoaderConfig::default());

        let err = loader.load_distribution(404).await.unwrap_err();

        assert!(matches!(
            err,
            LoaderError::NotFound {
                stage: LookupStage::Index,
                id: 404
            }
        ));
        assert!(!err.is_retryable());
        assert_eq!(source.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_index_and_payload_disagree() {
        let index = IndexTable::new(vec![entry(5, "正态分布", 1), entry(8, "线性回归", 1)]).unwrap();
        let source = Arc::new(MemorySource::new().with_group(1, &[dist(5, "正态分布", 1)]));
        let loader = DistributionLoader::with_defaults(index, source);

        let err = loader.load_distribution(8).await.unwrap_err();

        assert!(matches!(
            err,
            LoaderError::NotFound {
                stage: LookupStage::Group(1),
                id: 8
            }
        ));
        // The group itself loaded fine
        assert!(loader.is_group_cached(1));
    }
}

mod failures {
    use super::*;

    #[tokio::test]
    async fn test_failed_load_leaves_no_cache_entry() {
        let (loader, source) = fixture(LoaderConfig::default());
        source.remove_group(2);

        let err = loader.load_distribution(7).await.unwrap_err();
        assert!(matches!(
            err,
            LoaderError::GroupLoad {
                group: 2,
                source: SourceError::NotFound { .. }
            }
        ));
        assert!(err.is_retryable());
        assert!(!loader.is_group_cached(2));
        assert!(loader.cached_distribution(7).is_none());

        // Payload becomes available: the next call fetches again
        source.set_group(2, &[dist(7, "帕累托分布", 2)]);
        let seven = loader.load_distribution(7).await.unwrap();

        assert_eq!(seven.id, 7);
        assert_eq!(source.fetch_count_for(2), 2);
    }

    #[tokio::test]
    async fn test_preload_swallows_errors() {
        let (loader, source) = fixture(LoaderConfig::default());
        let mut events = loader.event_bus().subscribe();

        loader.preload_group(99).await.unwrap();

        assert_eq!(source.fetch_count_for(99), 1);
        assert!(matches!(
            events.recv().await.unwrap(),
            LoaderEvent::GroupLoadFailed { group: 99, .. }
        ));
        assert!(loader.cache_stats().is_empty());
    }

    #[tokio::test]
    async fn test_preload_warms_cache() {
        let (loader, source) = fixture(LoaderConfig::default());

        loader.preload_group(1).await.unwrap();
        assert!(loader.is_group_cached(1));

        loader.load_distribution(6).await.unwrap();
        assert_eq!(source.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_load_all_propagates_failure() {
        let (loader, source) = fixture(LoaderConfig::default());
        source.remove_group(1);

        let err = loader.load_all().await.unwrap_err();
        assert!(matches!(err, LoaderError::GroupLoad { group: 1, .. }));
    }
}

mod reset {
    use super::*;

    #[tokio::test]
    async fn test_clear_cache_forces_refetch() {
        let (loader, source) = fixture(LoaderConfig::default());

        loader.load_distribution(5).await.unwrap();
        loader.clear_cache();

        let stats = loader.cache_stats();
        assert_eq!(stats.groups_cached, 0);
        assert_eq!(stats.distributions_cached, 0);
        assert!(stats.cached_groups.is_empty());
        assert_eq!(loader.get_index().len(), 3);

        loader.load_distribution(5).await.unwrap();
        assert_eq!(source.fetch_count_for(1), 2);
    }

    #[tokio::test]
    async fn test_load_all_orders_groups() {
        let (loader, _source) = fixture(LoaderConfig::default());

        let loaded = loader.load_all().await.unwrap();
        let groups: Vec<u32> = loaded.iter().map(|(g, _)| *g).collect();

        assert_eq!(groups, vec![1, 2]);
        let stats = loader.cache_stats();
        assert_eq!(stats.cached_groups, vec![1, 2]);
        assert_eq!(stats.distributions_cached, 3);
    }
}

mod concurrency {
    use super::*;

    fn slow_fixture(single_flight: bool) -> (Arc<DistributionLoader>, Arc<MemorySource>) {
        let index = IndexTable::new(vec![entry(5, "正态分布", 1), entry(6, "泊松分布", 1)]).unwrap();
        let source = Arc::new(
            MemorySource::new()
                .with_latency(Duration::from_millis(50))
                .with_group(1, &[dist(5, "正态分布", 1), dist(6, "泊松分布", 1)]),
        );
        let config = LoaderConfig::default().with_single_flight(single_flight);
        let loader = Arc::new(DistributionLoader::new(index, source.clone(), config));
        (loader, source)
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_flight_shares_fetch() {
        let (loader, source) = slow_fixture(true);

        let (a, b) = tokio::join!(loader.load_distribution(5), loader.load_distribution(6));

        assert_eq!(a.unwrap().id, 5);
        assert_eq!(b.unwrap().id, 6);
        assert_eq!(source.fetch_count_for(1), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_without_single_flight_each_call_fetches() {
        let (loader, source) = slow_fixture(false);

        let (a, b) = tokio::join!(loader.load_group(1), loader.load_group(1));
        let (a, b) = (a.unwrap(), b.unwrap());

        assert_eq!(source.fetch_count_for(1), 2);
        assert_eq!(a.len(), b.len());
        // Last write wins; the cached records equal both results
        let cached = loader.cached_group(1).unwrap();
        assert_eq!(cached.len(), 2);
        assert_eq!(loader.cache_stats().distributions_cached, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_fetch_is_not_shared_with_waiters() {
        let (loader, source) = slow_fixture(true);
        source.fail_next(1, 1);

        let (a, b) = tokio::join!(loader.load_group(1), loader.load_group(1));

        assert!(matches!(
            a,
            Err(LoaderError::GroupLoad {
                group: 1,
                source: SourceError::Status { status: 503, .. }
            })
        ));
        assert_eq!(b.unwrap().len(), 2);
        // The waiter fetched for itself once the failed load released the gate
        assert_eq!(source.fetch_count_for(1), 2);
        assert!(loader.is_group_cached(1));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_clear_racing_large_store_never_tears() {
        const RECORDS: usize = 40_000;

        let records: Vec<Distribution> = (1..=RECORDS as u32)
            .map(|id| dist(id, "正态分布", 1))
            .collect();
        let index = IndexTable::new(records.iter().map(Distribution::index_entry).collect()).unwrap();
        let source = Arc::new(MemorySource::new().with_group(1, &records));
        let loader = Arc::new(DistributionLoader::with_defaults(index, source));

        for _ in 0..5 {
            loader.clear_cache();

            let clearer = {
                let loader = Arc::clone(&loader);
                tokio::spawn(async move {
                    loop {
                        let stats = loader.cache_stats();
                        assert!(
                            (stats.groups_cached, stats.distributions_cached) == (0, 0)
                                || (stats.groups_cached, stats.distributions_cached)
                                    == (1, RECORDS),
                            "torn snapshot: {:?}",
                            stats
                        );
                        if stats.groups_cached == 1 {
                            loader.clear_cache();
                            return;
                        }
                        tokio::task::yield_now().await;
                    }
                })
            };

            loader.load_group(1).await.unwrap();
            clearer.await.unwrap();

            let stats = loader.cache_stats();
            assert_eq!(stats.groups_cached, 0);
            assert_eq!(stats.distributions_cached, 0);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_during_flight_repopulates() {
        let (loader, _source) = slow_fixture(true);

        let pending = loader.preload_group(1);
        tokio::task::yield_now().await;
        loader.clear_cache();
        pending.await.unwrap();

        assert!(loader.is_group_cached(1));
        assert_eq!(loader.cache_stats().distributions_cached, 2);
    }
}
