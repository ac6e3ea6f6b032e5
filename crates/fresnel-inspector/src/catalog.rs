//! The selectable-resource catalog.
//!
//! Rebuilt wholesale when a capture loads; the filter key is the composite
//! "<kind> <name>" string so typing either the type or the name narrows the
//! list.

use facet::Facet;
use fresnel_replay::CaptureAnalysis;
use fresnel_types::{ResourceId, ResourceKind};

/// One selectable resource.
#[derive(Facet, Debug, Clone, PartialEq, Eq)]
pub struct CatalogRow {
    pub id: ResourceId,
    pub kind: ResourceKind,
    pub name: String,
}

impl CatalogRow {
    fn filter_key(&self) -> String {
        format!("{} {}", self.kind, self.name).to_lowercase()
    }
}

/// Filterable, name-sorted view over every resource in the loaded capture.
pub struct ResourceCatalog {
    rows: Vec<CatalogRow>,
}

impl ResourceCatalog {
    /// Build the catalog from a capture's resource table, sorted
    /// case-insensitively by display name (id as tie-break so the order is
    /// stable across rebuilds).
    pub fn from_analysis(analysis: &CaptureAnalysis) -> Self {
        let mut rows: Vec<CatalogRow> = analysis
            .resources()
            .iter()
            .map(|desc| CatalogRow {
                id: desc.id,
                kind: desc.kind,
                name: desc.name.clone(),
            })
            .collect();
        rows.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.id.cmp(&b.id))
        });
        Self { rows }
    }

    pub fn rows(&self) -> &[CatalogRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Case-insensitive substring filter over the "<kind> <name>" composite
    /// key. An empty pattern matches everything.
    pub fn filtered(&self, pattern: &str) -> Vec<&CatalogRow> {
        let needle = pattern.to_lowercase();
        self.rows
            .iter()
            .filter(|row| row.filter_key().contains(&needle))
            .collect()
    }

    /// Map a picked id back to its row.
    pub fn resolve(&self, id: ResourceId) -> Option<&CatalogRow> {
        self.rows.iter().find(|row| row.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fresnel_types::ResourceDescription;

    fn analysis() -> CaptureAnalysis {
        let desc = |id: u64, kind: ResourceKind, name: &str| ResourceDescription {
            id: ResourceId::new(id),
            kind,
            name: name.to_string(),
            parent_resources: vec![],
            derived_resources: vec![],
            initialisation_chunks: vec![],
        };
        CaptureAnalysis::new(
            vec![
                desc(3, ResourceKind::Texture, "Shadow Map"),
                desc(1, ResourceKind::Buffer, "scene vertices"),
                desc(2, ResourceKind::Texture, "Backbuffer"),
            ],
            vec![],
        )
    }

    #[test]
    fn rows_are_sorted_by_name_case_insensitively() {
        let catalog = ResourceCatalog::from_analysis(&analysis());
        let names: Vec<&str> = catalog.rows().iter().map(|row| row.name.as_str()).collect();
        assert_eq!(names, vec!["Backbuffer", "scene vertices", "Shadow Map"]);
    }

    #[test]
    fn filter_matches_name_and_kind_case_insensitively() {
        let catalog = ResourceCatalog::from_analysis(&analysis());

        let by_name = catalog.filtered("shadow");
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].id, ResourceId::new(3));

        // The composite key makes the type part of the match.
        let by_kind = catalog.filtered("TEXTURE");
        assert_eq!(by_kind.len(), 2);

        assert_eq!(catalog.filtered("").len(), 3);
        assert!(catalog.filtered("no such thing").is_empty());
    }

    #[test]
    fn resolve_maps_an_id_back_to_its_row() {
        let catalog = ResourceCatalog::from_analysis(&analysis());
        assert_eq!(
            catalog.resolve(ResourceId::new(1)).map(|row| row.name.as_str()),
            Some("scene vertices")
        );
        assert!(catalog.resolve(ResourceId::new(42)).is_none());
        assert!(catalog.resolve(ResourceId::NONE).is_none());
    }
}
