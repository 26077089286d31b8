//! Partition resolution
//!
//! Turns configured region/zone patterns and the static catalog into the
//! concrete list of partitions a query fans out over, and memoizes the result
//! in the connection cache.

use super::glob::GlobPattern;
use super::types::{PartitionList, PartitionSource};
use crate::cache::{CacheEntry, CacheKey, ConnectionCache};
use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::types::Scope;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

/// Resolves region and zone matrices for one connection
#[derive(Debug, Clone)]
pub struct PartitionResolver {
    connection: String,
    cache: Arc<ConnectionCache>,
    catalog: Catalog,
}

impl PartitionResolver {
    /// Create a resolver bound to a connection's cache
    pub fn new(connection: impl Into<String>, cache: Arc<ConnectionCache>, catalog: Catalog) -> Self {
        Self {
            connection: connection.into(),
            cache,
            catalog,
        }
    }

    /// The catalog partitions are validated against
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Resolve a partition list, reusing the cached result for `key`
    pub fn resolve(&self, source: &PartitionSource<'_>, key: &CacheKey) -> Result<PartitionList> {
        self.cache.partitions().get_or_try_init(key, || {
            let list = resolve_uncached(source)?;
            debug!(key = %key, partitions = ?list, "Resolved {} matrix", source.scope);
            Ok(list.into())
        })
    }

    /// Region matrix for the connection
    pub fn regions(&self, patterns: &[String], env_default: Option<&str>) -> Result<PartitionList> {
        let catalog = self.catalog.regions();
        let default = default_partition(env_default, &catalog, Scope::Region);
        let source = PartitionSource {
            scope: Scope::Region,
            patterns,
            catalog: &catalog,
            default: &default,
        };
        self.resolve(&source, &self.key(CacheEntry::RegionMatrix))
    }

    /// Zone matrix for the connection
    ///
    /// Zone patterns win. Without them, configured region patterns expand to
    /// every zone of the matched regions. With neither, the default zone.
    pub fn zones(
        &self,
        zone_patterns: &[String],
        region_patterns: &[String],
        env_default: Option<&str>,
    ) -> Result<PartitionList> {
        let key = self.key(CacheEntry::ZoneMatrix);
        let catalog = self.catalog.zones();
        let default = default_partition(env_default, &catalog, Scope::Zone);

        if !zone_patterns.is_empty() || region_patterns.is_empty() {
            let source = PartitionSource {
                scope: Scope::Zone,
                patterns: zone_patterns,
                catalog: &catalog,
                default: &default,
            };
            return self.resolve(&source, &key);
        }

        self.cache.partitions().get_or_try_init(&key, || {
            let regions = match_patterns(Scope::Region, region_patterns, &self.catalog.regions())?;
            let zones: Vec<String> = regions
                .iter()
                .flat_map(|region| self.catalog.zones_of(region).iter().cloned())
                .collect();
            let zones = dedup(zones);
            ensure_known(Scope::Zone, &zones, &catalog)?;
            debug!(key = %key, partitions = ?zones, "Resolved zone matrix from regions");
            Ok(zones.into())
        })
    }

    fn key(&self, entry: CacheEntry) -> CacheKey {
        CacheKey::new(self.connection.clone(), entry)
    }
}

/// Resolve without touching any cache
pub fn resolve_uncached(source: &PartitionSource<'_>) -> Result<Vec<String>> {
    if source.patterns.is_empty() {
        return Ok(vec![source.default.to_string()]);
    }
    match_patterns(source.scope, source.patterns, source.catalog)
}

/// Match every pattern against the catalog
///
/// Matches accumulate in pattern order then catalog order, and are
/// deduplicated keeping the first occurrence. A malformed pattern or one that
/// matches nothing is an error naming that pattern.
pub fn match_patterns(scope: Scope, patterns: &[String], catalog: &[String]) -> Result<Vec<String>> {
    let mut matched = Vec::new();
    let mut invalid = Vec::new();

    for pattern in patterns {
        let Some(glob) = GlobPattern::new(pattern) else {
            invalid.push(pattern.clone());
            continue;
        };

        let before = matched.len();
        matched.extend(catalog.iter().filter(|entry| glob.matches(entry)).cloned());
        if matched.len() == before {
            invalid.push(pattern.clone());
        }
    }

    if !invalid.is_empty() {
        return Err(Error::invalid_patterns(scope.to_string(), invalid));
    }

    let unique = dedup(matched);
    ensure_known(scope, &unique, catalog)?;
    Ok(unique)
}

/// Pick the default partition: the environment value when it is a catalog
/// entry, otherwise the hard-coded fallback
pub fn default_partition(env_value: Option<&str>, catalog: &[String], scope: Scope) -> String {
    match env_value {
        Some(value) if catalog.iter().any(|c| c == value) => value.to_string(),
        _ => Catalog::fallback(scope).to_string(),
    }
}

/// Remove duplicates keeping first-seen order
fn dedup(items: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

/// Fail if any entry is absent from the canonical catalog
fn ensure_known(scope: Scope, entries: &[String], catalog: &[String]) -> Result<()> {
    let unknown: Vec<String> = entries
        .iter()
        .filter(|e| !catalog.contains(e))
        .cloned()
        .collect();

    if unknown.is_empty() {
        Ok(())
    } else {
        Err(Error::invalid_patterns(scope.to_string(), unknown))
    }
}
