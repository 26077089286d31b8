//! Static region and zone catalog
//!
//! The provider publishes a fixed list of regions, each with a fixed set of
//! availability zones. Every partition the connector queries must come from
//! here.

use crate::types::Scope;

/// Region used when nothing valid is configured
pub const DEFAULT_REGION: &str = "fr-par";

/// Zone used when nothing valid is configured
pub const DEFAULT_ZONE: &str = "fr-par-1";

/// Regions and the zones they contain, in catalog order
const REGIONS: &[(&str, &[&str])] = &[
    ("fr-par", &["fr-par-1", "fr-par-2", "fr-par-3"]),
    ("nl-ams", &["nl-ams-1", "nl-ams-2", "nl-ams-3"]),
    ("pl-waw", &["pl-waw-1", "pl-waw-2", "pl-waw-3"]),
];

/// Ordered set of known regions and zones
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    regions: Vec<RegionEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct RegionEntry {
    name: String,
    zones: Vec<String>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(REGIONS.iter().map(|(region, zones)| {
            (
                (*region).to_string(),
                zones.iter().map(|z| (*z).to_string()).collect(),
            )
        }))
    }
}

impl Catalog {
    /// Build a catalog from `(region, zones)` pairs
    pub fn new(entries: impl IntoIterator<Item = (String, Vec<String>)>) -> Self {
        Self {
            regions: entries
                .into_iter()
                .map(|(name, zones)| RegionEntry { name, zones })
                .collect(),
        }
    }

    /// All regions, in catalog order
    pub fn regions(&self) -> Vec<String> {
        self.regions.iter().map(|r| r.name.clone()).collect()
    }

    /// All zones, in catalog order
    pub fn zones(&self) -> Vec<String> {
        self.regions
            .iter()
            .flat_map(|r| r.zones.iter().cloned())
            .collect()
    }

    /// Entries for the given scope (empty for global)
    pub fn entries(&self, scope: Scope) -> Vec<String> {
        match scope {
            Scope::Global => Vec::new(),
            Scope::Region => self.regions(),
            Scope::Zone => self.zones(),
        }
    }

    /// Zones belonging to a region
    pub fn zones_of(&self, region: &str) -> &[String] {
        self.regions
            .iter()
            .find(|r| r.name == region)
            .map(|r| r.zones.as_slice())
            .unwrap_or_default()
    }

    /// Region containing a zone
    pub fn region_of(&self, zone: &str) -> Option<&str> {
        self.regions
            .iter()
            .find(|r| r.zones.iter().any(|z| z == zone))
            .map(|r| r.name.as_str())
    }

    /// Check whether a region is known
    pub fn is_region(&self, region: &str) -> bool {
        self.regions.iter().any(|r| r.name == region)
    }

    /// Check whether a zone is known
    pub fn is_zone(&self, zone: &str) -> bool {
        self.region_of(zone).is_some()
    }

    /// Check membership for the given scope
    pub fn contains(&self, scope: Scope, partition: &str) -> bool {
        match scope {
            Scope::Global => false,
            Scope::Region => self.is_region(partition),
            Scope::Zone => self.is_zone(partition),
        }
    }

    /// Hard-coded fallback partition for a scope
    pub fn fallback(scope: Scope) -> &'static str {
        match scope {
            Scope::Zone => DEFAULT_ZONE,
            _ => DEFAULT_REGION,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog() {
        let catalog = Catalog::default();
        assert_eq!(catalog.regions(), vec!["fr-par", "nl-ams", "pl-waw"]);
        assert_eq!(catalog.zones().len(), 9);
        assert_eq!(catalog.zones()[0], "fr-par-1");
    }

    #[test]
    fn test_zones_of_and_region_of() {
        let catalog = Catalog::default();
        assert_eq!(catalog.zones_of("nl-ams"), ["nl-ams-1", "nl-ams-2", "nl-ams-3"]);
        assert!(catalog.zones_of("us-east").is_empty());
        assert_eq!(catalog.region_of("pl-waw-2"), Some("pl-waw"));
        assert_eq!(catalog.region_of("pl-waw"), None);
    }

    #[test]
    fn test_contains() {
        let catalog = Catalog::default();
        assert!(catalog.contains(Scope::Region, "fr-par"));
        assert!(!catalog.contains(Scope::Region, "fr-par-1"));
        assert!(catalog.contains(Scope::Zone, "fr-par-1"));
        assert!(!catalog.contains(Scope::Global, "fr-par"));
    }

    #[test]
    fn test_fallback() {
        assert_eq!(Catalog::fallback(Scope::Region), "fr-par");
        assert_eq!(Catalog::fallback(Scope::Zone), "fr-par-1");
    }
}
