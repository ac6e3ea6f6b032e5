//! Relationship and initialization projections.
//!
//! Pure reads over a `ResourceDescription` plus the capture's chunk table;
//! the session recomputes these synchronously whenever the inspected
//! resource changes.

use facet::Facet;
use fresnel_replay::CaptureAnalysis;
use fresnel_types::{ResourceDescription, ResourceId, SdChunk};

/// How a related resource connects to the inspected one.
#[derive(Facet, Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
#[facet(rename_all = "snake_case")]
pub enum RelationKind {
    Parent,
    Derived,
}

/// One row of the relationship view.
#[derive(Facet, Debug, Clone, PartialEq, Eq)]
pub struct RelatedResource {
    pub link: RelationKind,
    pub id: ResourceId,
    pub name: String,
}

/// One entry of the initialization view: a chunk resolved against the
/// capture's chunk table, or an explicit marker for an index outside it.
#[derive(Facet, Debug, Clone, PartialEq)]
#[repr(u8)]
#[facet(rename_all = "snake_case")]
pub enum InitChunkNode {
    Resolved { index: u32, chunk: SdChunk },
    Invalid { index: u32 },
}

/// Project the parent and derived resource lists, parents first, with
/// display names resolved against the analysis tables.
pub fn related_resources(
    desc: &ResourceDescription,
    analysis: &CaptureAnalysis,
) -> Vec<RelatedResource> {
    let mut rows = Vec::with_capacity(desc.parent_resources.len() + desc.derived_resources.len());
    for &parent in &desc.parent_resources {
        rows.push(RelatedResource {
            link: RelationKind::Parent,
            id: parent,
            name: display_name(analysis, parent),
        });
    }
    for &derived in &desc.derived_resources {
        rows.push(RelatedResource {
            link: RelationKind::Derived,
            id: derived,
            name: display_name(analysis, derived),
        });
    }
    rows
}

fn display_name(analysis: &CaptureAnalysis, id: ResourceId) -> String {
    match analysis.resource(id) {
        Some(desc) => desc.name.clone(),
        None => id.to_string(),
    }
}

/// Resolve a description's initialization chunks. An index outside the
/// chunk table becomes an `Invalid` marker rather than a fault.
pub fn init_chunks(desc: &ResourceDescription, analysis: &CaptureAnalysis) -> Vec<InitChunkNode> {
    desc.initialisation_chunks
        .iter()
        .map(|&index| match analysis.chunk(index) {
            Some(chunk) => InitChunkNode::Resolved {
                index,
                chunk: chunk.clone(),
            },
            None => InitChunkNode::Invalid { index },
        })
        .collect()
}
