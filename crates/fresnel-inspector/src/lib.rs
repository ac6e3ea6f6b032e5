//! Inspector core for fresnel.
//!
//! Given a selected resource in a captured frame: report what it was created
//! from and what was created from it, the parameters it was created with,
//! and every point in the command sequence where it was used.
//!
//! Split:
//! - `coalesce`: merges raw usage observations into display ranges
//! - `session`: async orchestration with stale-result protection
//! - `related`: parent/derived and initialization-chunk projection
//! - `catalog`: filterable resource list for selection

pub mod catalog;
pub mod coalesce;
pub mod related;
pub mod session;

pub use catalog::{CatalogRow, ResourceCatalog};
pub use coalesce::coalesce_usage;
pub use related::{InitChunkNode, RelatedResource, RelationKind, init_chunks, related_resources};
pub use session::{InspectionSession, UsageReply};
