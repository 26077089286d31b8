//! Tests for partition module

use super::*;
use crate::cache::{CacheEntry, CacheKey, ConnectionCache};
use crate::catalog::Catalog;
use crate::error::Error;
use crate::types::Scope;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

fn resolver() -> PartitionResolver {
    PartitionResolver::new("test", Arc::new(ConnectionCache::new()), Catalog::default())
}

fn invalid_patterns(err: Error) -> Vec<String> {
    match err {
        Error::InvalidPartitionPattern { patterns, .. } => patterns,
        other => panic!("expected InvalidPartitionPattern, got {other:?}"),
    }
}

// ============================================================================
// Pattern Matching Tests
// ============================================================================

#[test]
fn test_match_prefix_and_literal() {
    let catalog = strings(&["fr-par", "nl-ams", "pl-waw"]);
    let resolved = match_patterns(Scope::Region, &strings(&["fr-*", "pl-waw"]), &catalog).unwrap();
    assert_eq!(resolved, strings(&["fr-par", "pl-waw"]));
}

#[test]
fn test_match_dedupes_in_first_seen_order() {
    let catalog = strings(&["fr-par", "nl-ams", "pl-waw"]);
    let resolved =
        match_patterns(Scope::Region, &strings(&["pl-waw", "*", "fr-par"]), &catalog).unwrap();
    assert_eq!(resolved, strings(&["pl-waw", "fr-par", "nl-ams"]));
}

#[test]
fn test_match_nothing_is_fatal() {
    let catalog = strings(&["fr-par", "nl-ams", "pl-waw"]);
    let err = match_patterns(Scope::Region, &strings(&["us-*"]), &catalog).unwrap_err();
    assert!(err.is_config());
    assert_eq!(invalid_patterns(err), strings(&["us-*"]));
}

#[test]
fn test_every_offending_pattern_is_reported() {
    let catalog = strings(&["fr-par", "nl-ams", "pl-waw"]);
    let err = match_patterns(
        Scope::Region,
        &strings(&["fr-*", "us-east", "fr-[", "eu-*"]),
        &catalog,
    )
    .unwrap_err();
    assert_eq!(invalid_patterns(err), strings(&["us-east", "fr-[", "eu-*"]));
}

#[test]
fn test_resolve_uncached_without_patterns_uses_default() {
    let catalog = strings(&["fr-par", "nl-ams"]);
    let source = PartitionSource {
        scope: Scope::Region,
        patterns: &[],
        catalog: &catalog,
        default: "nl-ams",
    };
    assert_eq!(resolve_uncached(&source).unwrap(), strings(&["nl-ams"]));
}

// ============================================================================
// Default Tests
// ============================================================================

#[test]
fn test_default_partition_prefers_valid_env() {
    let regions = Catalog::default().regions();
    assert_eq!(
        default_partition(Some("nl-ams"), &regions, Scope::Region),
        "nl-ams"
    );
}

#[test]
fn test_default_partition_ignores_invalid_env() {
    let regions = Catalog::default().regions();
    assert_eq!(
        default_partition(Some("mars-1"), &regions, Scope::Region),
        "fr-par"
    );
    assert_eq!(default_partition(None, &regions, Scope::Region), "fr-par");

    let zones = Catalog::default().zones();
    assert_eq!(default_partition(Some("fr-par"), &zones, Scope::Zone), "fr-par-1");
}

// ============================================================================
// Resolver Tests
// ============================================================================

#[test]
fn test_regions_without_patterns_returns_exactly_one() {
    let r = resolver();
    let list = r.regions(&[], Some("pl-waw")).unwrap();
    assert_eq!(&*list, &["pl-waw".to_string()]);

    let r = resolver();
    let list = r.regions(&[], Some("nowhere")).unwrap();
    assert_eq!(&*list, &["fr-par".to_string()]);
}

#[test]
fn test_regions_with_patterns() {
    let r = resolver();
    let list = r.regions(&strings(&["fr-*", "pl-waw"]), None).unwrap();
    assert_eq!(&*list, &strings(&["fr-par", "pl-waw"])[..]);
}

#[test]
fn test_regions_no_match_is_not_cached() {
    let cache = Arc::new(ConnectionCache::new());
    let r = PartitionResolver::new("c", Arc::clone(&cache), Catalog::default());

    assert!(r.regions(&strings(&["xx-*"]), None).is_err());
    assert!(cache.partitions().is_empty());
}

#[test]
fn test_resolve_is_memoized_even_if_catalog_changes() {
    let r = resolver();
    let key = CacheKey::new("test", CacheEntry::RegionMatrix);

    let first_catalog = strings(&["fr-par", "nl-ams"]);
    let first = r
        .resolve(
            &PartitionSource {
                scope: Scope::Region,
                patterns: &strings(&["*"]),
                catalog: &first_catalog,
                default: "fr-par",
            },
            &key,
        )
        .unwrap();

    let second_catalog = strings(&["pl-waw"]);
    let second = r
        .resolve(
            &PartitionSource {
                scope: Scope::Region,
                patterns: &strings(&["*"]),
                catalog: &second_catalog,
                default: "pl-waw",
            },
            &key,
        )
        .unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(&*second, &strings(&["fr-par", "nl-ams"])[..]);
}

#[test]
fn test_zones_default() {
    let r = resolver();
    let list = r.zones(&[], &[], Some("nl-ams-2")).unwrap();
    assert_eq!(&*list, &["nl-ams-2".to_string()]);

    let r = resolver();
    let list = r.zones(&[], &[], None).unwrap();
    assert_eq!(&*list, &["fr-par-1".to_string()]);
}

#[test]
fn test_zones_from_zone_patterns() {
    let r = resolver();
    let list = r
        .zones(&strings(&["*-1", "fr-par-[23]"]), &strings(&["pl-waw"]), None)
        .unwrap();
    assert_eq!(
        &*list,
        &strings(&["fr-par-1", "nl-ams-1", "pl-waw-1", "fr-par-2", "fr-par-3"])[..]
    );
}

#[test]
fn test_zones_expand_region_patterns() {
    let r = resolver();
    let list = r.zones(&[], &strings(&["nl-*", "fr-par"]), None).unwrap();
    assert_eq!(
        &*list,
        &strings(&["nl-ams-1", "nl-ams-2", "nl-ams-3", "fr-par-1", "fr-par-2", "fr-par-3"])[..]
    );
}

#[test]
fn test_zones_do_not_append_default() {
    let r = resolver();
    let list = r.zones(&strings(&["pl-waw-2"]), &[], Some("fr-par-1")).unwrap();
    assert_eq!(&*list, &["pl-waw-2".to_string()]);
}

#[test]
fn test_zones_invalid_pattern() {
    let r = resolver();
    let err = r.zones(&strings(&["fr-par-9"]), &[], None).unwrap_err();
    assert_eq!(invalid_patterns(err), strings(&["fr-par-9"]));

    let r = resolver();
    let err = r.zones(&[], &strings(&["zz-*"]), None).unwrap_err();
    assert_eq!(invalid_patterns(err), strings(&["zz-*"]));
}

#[test]
fn test_region_and_zone_matrices_cached_separately() {
    let r = resolver();
    let regions = r.regions(&strings(&["nl-ams"]), None).unwrap();
    let zones = r.zones(&[], &strings(&["nl-ams"]), None).unwrap();
    assert_eq!(regions.len(), 1);
    assert_eq!(zones.len(), 3);
}

#[test]
fn test_custom_catalog() {
    let catalog = Catalog::new(vec![(
        "it-mil".to_string(),
        vec!["it-mil-1".to_string()],
    )]);
    let r = PartitionResolver::new("c", Arc::new(ConnectionCache::new()), catalog);
    let list = r.zones(&[], &strings(&["it-*"]), None).unwrap();
    assert_eq!(&*list, &["it-mil-1".to_string()]);
}

// ============================================================================
// Router Tests
// ============================================================================

#[test]
fn test_matrix_item_for_scope() {
    let item = MatrixItem::for_scope(Scope::Zone, "fr-par-2");
    assert_eq!(item.id, "fr-par-2");
    assert_eq!(item.get("zone"), Some("fr-par-2"));
    assert_eq!(item.partition(Scope::Zone), Some("fr-par-2"));
    assert_eq!(item.partition(Scope::Region), None);

    assert_eq!(MatrixItem::for_scope(Scope::Global, "x"), MatrixItem::global());
}

#[test]
fn test_matrix_router() {
    let list: PartitionList = strings(&["fr-par", "pl-waw"]).into();
    let router = MatrixRouter::new(Scope::Region, list);
    let items = router.partitions().unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(items[1].get("region"), Some("pl-waw"));
    assert_eq!(router.partition_field(), "region");
}

#[test]
fn test_global_router_yields_one_item() {
    let router = MatrixRouter::global();
    let items = router.partitions().unwrap();
    assert_eq!(items, vec![MatrixItem::global()]);
    assert_eq!(router.partition_field(), "global");
}

#[test]
fn test_parent_router() {
    let base = MatrixItem::for_scope(Scope::Region, "fr-par");
    let parents = vec![
        json!({"id": "c1", "name": "one"}),
        json!({"id": "c2"}),
        json!({"id": "c1"}),
        json!({"name": "no id"}),
    ];
    let router = ParentRouter::new(base, parents, "id", "parent");
    let items = router.partitions().unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].id, "fr-par/c1");
    assert_eq!(items[0].get("parent"), Some("c1"));
    assert_eq!(items[0].get("region"), Some("fr-par"));
    assert_eq!(items[1].get("parent"), Some("c2"));
    assert_eq!(router.partition_field(), "parent");
}

#[test]
fn test_parent_router_nested_key() {
    let base = MatrixItem::global();
    let parents = vec![json!({"meta": {"uid": 7}})];
    let router = ParentRouter::new(base, parents, "meta.uid", "parent");
    let items = router.partitions().unwrap();
    assert_eq!(items[0].get("parent"), Some("7"));
}
