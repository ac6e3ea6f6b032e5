//! The boundary between the inspector core and a capture-replay backend.
//!
//! A loaded capture exposes two read surfaces: the synchronous analysis
//! tables (`CaptureAnalysis`: resource descriptions plus the structured
//! chunk table, read-only for the capture's lifetime) and the asynchronous
//! usage query (`UsageQuery`: "where was this resource used", potentially
//! slow because it replays the capture). `InMemoryReplay` is the reference
//! backend used by the CLI and by tests.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;

use async_trait::async_trait;
use fresnel_types::{EventUsage, ResourceDescription, ResourceId, SdChunk};
use parking_lot::Mutex;
use tokio::sync::oneshot;

#[derive(Debug)]
pub enum ReplayError {
    /// The backend has no record of this resource.
    ResourceNotFound { resource: ResourceId },
    /// The capture was unloaded while the query was in flight.
    CaptureClosed,
}

impl fmt::Display for ReplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ResourceNotFound { resource } => {
                write!(f, "no such resource in capture: {resource}")
            }
            Self::CaptureClosed => write!(f, "capture closed while query was in flight"),
        }
    }
}

impl Error for ReplayError {}

/// Read-only view over a loaded capture's analysis tables.
///
/// Built once when a capture is loaded and never mutated afterwards; the
/// inspector shares it behind an `Arc`.
pub struct CaptureAnalysis {
    resources: Vec<ResourceDescription>,
    chunks: Vec<SdChunk>,
    by_id: HashMap<ResourceId, usize>,
}

impl CaptureAnalysis {
    pub fn new(resources: Vec<ResourceDescription>, chunks: Vec<SdChunk>) -> Self {
        let by_id = resources
            .iter()
            .enumerate()
            .map(|(index, desc)| (desc.id, index))
            .collect();
        Self {
            resources,
            chunks,
            by_id,
        }
    }

    /// Look up one resource description. `None` for unknown ids and for
    /// `ResourceId::NONE`.
    pub fn resource(&self, id: ResourceId) -> Option<&ResourceDescription> {
        if id.is_none() {
            return None;
        }
        self.by_id.get(&id).map(|&index| &self.resources[index])
    }

    /// Every resource in the capture, in capture order.
    pub fn resources(&self) -> &[ResourceDescription] {
        &self.resources
    }

    /// Bounds-checked chunk-table lookup.
    pub fn chunk(&self, index: u32) -> Option<&SdChunk> {
        self.chunks.get(index as usize)
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }
}

/// The sole asynchronous boundary: fetch the raw usage observations for one
/// resource, ordered by event id non-decreasing.
///
/// Implementations run the query wherever they like (replay worker thread,
/// task pool); callers never block on it directly.
#[async_trait]
pub trait UsageQuery: Send + Sync {
    async fn fetch_usage(&self, id: ResourceId) -> Result<Vec<EventUsage>, ReplayError>;
}

/// In-memory reference backend serving prebuilt usage lists.
///
/// Per-resource gates let tests hold a query open and control completion
/// order; an ungated query completes on the first poll.
pub struct InMemoryReplay {
    usage: HashMap<ResourceId, Vec<EventUsage>>,
    gates: Mutex<HashMap<ResourceId, oneshot::Receiver<()>>>,
}

impl InMemoryReplay {
    pub fn new(usage: HashMap<ResourceId, Vec<EventUsage>>) -> Self {
        Self {
            usage,
            gates: Mutex::new(HashMap::new()),
        }
    }

    /// Hold back the next `fetch_usage(id)` until the returned sender fires
    /// (or is dropped).
    pub fn gate(&self, id: ResourceId) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().insert(id, rx);
        tx
    }
}

#[async_trait]
impl UsageQuery for InMemoryReplay {
    async fn fetch_usage(&self, id: ResourceId) -> Result<Vec<EventUsage>, ReplayError> {
        let gate = self.gates.lock().remove(&id);
        if let Some(gate) = gate {
            // Released or dropped, either way the query proceeds.
            let _ = gate.await;
        }
        Ok(self.usage.get(&id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fresnel_types::{ResourceKind, UsageKind};

    fn desc(id: u64, name: &str) -> ResourceDescription {
        ResourceDescription {
            id: ResourceId::new(id),
            kind: ResourceKind::Texture,
            name: name.to_string(),
            parent_resources: vec![],
            derived_resources: vec![],
            initialisation_chunks: vec![],
        }
    }

    #[test]
    fn resource_lookup_by_id() {
        let analysis = CaptureAnalysis::new(
            vec![desc(1, "Backbuffer"), desc(2, "Depth")],
            vec![],
        );
        assert_eq!(
            analysis.resource(ResourceId::new(2)).map(|d| d.name.as_str()),
            Some("Depth")
        );
        assert!(analysis.resource(ResourceId::new(9)).is_none());
        assert!(analysis.resource(ResourceId::NONE).is_none());
    }

    #[test]
    fn chunk_lookup_is_bounds_checked() {
        let analysis = CaptureAnalysis::new(
            vec![],
            vec![SdChunk {
                name: "vkCreateImage".to_string(),
                params: vec![],
            }],
        );
        assert!(analysis.chunk(0).is_some());
        assert!(analysis.chunk(1).is_none());
        assert!(analysis.chunk(u32::MAX).is_none());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn ungated_fetch_serves_prebuilt_events() {
        let id = ResourceId::new(4);
        let mut usage = HashMap::new();
        usage.insert(id, vec![EventUsage::new(10, UsageKind::ShaderRead)]);
        let replay = InMemoryReplay::new(usage);

        let events = replay.fetch_usage(id).await.expect("fetch should succeed");
        assert_eq!(events, vec![EventUsage::new(10, UsageKind::ShaderRead)]);

        let empty = replay
            .fetch_usage(ResourceId::new(99))
            .await
            .expect("unknown resources fetch as empty");
        assert!(empty.is_empty());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn gated_fetch_waits_for_release() {
        let id = ResourceId::new(4);
        let mut usage = HashMap::new();
        usage.insert(id, vec![EventUsage::new(10, UsageKind::ShaderRead)]);
        let replay = std::sync::Arc::new(InMemoryReplay::new(usage));

        let release = replay.gate(id);
        let fetch = {
            let replay = std::sync::Arc::clone(&replay);
            tokio::spawn(async move { replay.fetch_usage(id).await })
        };

        tokio::task::yield_now().await;
        assert!(!fetch.is_finished());

        release.send(()).expect("gated fetch should be waiting");
        let events = fetch
            .await
            .expect("fetch task should not panic")
            .expect("fetch should succeed");
        assert_eq!(events.len(), 1);
    }
}
