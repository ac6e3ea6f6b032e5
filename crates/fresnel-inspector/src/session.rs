//! The inspection session: which resource is being looked at, and the
//! asynchronous fetch of its usage timeline.
//!
//! All state mutation happens on the caller's context. Spawned queries never
//! touch session state; they post a [`UsageReply`] into the session's
//! channel and [`InspectionSession::pump`] applies it, dropping any reply
//! whose token was superseded by a later `inspect` or `close`. Last request
//! wins, not last completion: a slow first query cannot clobber a fast
//! second one.

use std::sync::Arc;

use fresnel_replay::{CaptureAnalysis, UsageQuery};
use fresnel_types::{EventUsage, ResourceId, UsageRange};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::coalesce::coalesce_usage;
use crate::related::{InitChunkNode, RelatedResource, init_chunks, related_resources};

/// Completion message posted by a spawned usage query.
#[derive(Debug)]
pub struct UsageReply {
    pub token: u64,
    pub resource: ResourceId,
    pub events: Vec<EventUsage>,
}

/// Lives on the control context inside a tokio runtime; `inspect` spawns
/// the usage fetch onto that runtime.
pub struct InspectionSession<Q: UsageQuery + 'static> {
    analysis: Arc<CaptureAnalysis>,
    query: Arc<Q>,

    current: ResourceId,
    /// Monotonic request token; replies carrying an older token are stale.
    token: u64,
    /// Current replay position, fed by `on_position_changed`.
    cursor: u32,

    related: Vec<RelatedResource>,
    init_params: Vec<InitChunkNode>,
    usage: Vec<UsageRange>,
    usage_pending: bool,

    reply_tx: mpsc::UnboundedSender<UsageReply>,
    reply_rx: mpsc::UnboundedReceiver<UsageReply>,
}

impl<Q: UsageQuery + 'static> InspectionSession<Q> {
    pub fn new(analysis: Arc<CaptureAnalysis>, query: Arc<Q>) -> Self {
        let (reply_tx, reply_rx) = mpsc::unbounded_channel();
        Self {
            analysis,
            query,
            current: ResourceId::NONE,
            token: 0,
            cursor: 0,
            related: Vec::new(),
            init_params: Vec::new(),
            usage: Vec::new(),
            usage_pending: false,
            reply_tx,
            reply_rx,
        }
    }

    /// Switch the inspected resource. No-op when `id` is already current.
    /// Never blocks: relationship and initialization data are projected
    /// synchronously from the analysis tables, the usage timeline arrives
    /// later through [`Self::pump`].
    pub fn inspect(&mut self, id: ResourceId) {
        if id == self.current {
            return;
        }

        self.token += 1;
        self.clear_views();

        let analysis = Arc::clone(&self.analysis);
        let Some(desc) = analysis.resource(id) else {
            // Absent from the capture (or the NONE sentinel): "no resource
            // selected", not an error. No query is issued.
            if !id.is_none() {
                debug!(resource = id.get(), "inspect: resource not in capture");
            }
            self.current = ResourceId::NONE;
            return;
        };

        self.current = id;
        self.related = related_resources(desc, &analysis);
        self.init_params = init_chunks(desc, &analysis);
        self.usage_pending = true;

        let token = self.token;
        let query = Arc::clone(&self.query);
        let reply_tx = self.reply_tx.clone();
        tokio::spawn(async move {
            let events = match query.fetch_usage(id).await {
                Ok(events) => events,
                Err(error) => {
                    // Degrades to an empty timeline; never surfaced upward.
                    warn!(resource = id.get(), %error, "usage query failed");
                    Vec::new()
                }
            };
            // A dead channel means the session is gone; nothing to do.
            let _ = reply_tx.send(UsageReply {
                token,
                resource: id,
                events,
            });
        });
    }

    /// The replay position moved. Only the derived active range changes; the
    /// usage query is not re-issued (the inspected resource is unchanged).
    pub fn on_position_changed(&mut self, event_id: u32) {
        self.cursor = event_id;
    }

    /// Capture unloaded: invalidate any in-flight fetch and reset to "no
    /// resource".
    pub fn close(&mut self) {
        self.token += 1;
        self.current = ResourceId::NONE;
        self.clear_views();
    }

    /// Apply every completion that has arrived, on the caller's context.
    /// Returns how many replies were applied; stale replies are dropped
    /// silently and not counted.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(reply) = self.reply_rx.try_recv() {
            if self.apply(reply) {
                applied += 1;
            }
        }
        applied
    }

    fn apply(&mut self, reply: UsageReply) -> bool {
        if reply.token != self.token {
            // Superseded by a later inspect() or close(). Expected and
            // frequent, so not worth more than a debug trace.
            debug!(
                resource = reply.resource.get(),
                stale_token = reply.token,
                current_token = self.token,
                "dropping stale usage reply"
            );
            return false;
        }
        self.usage = coalesce_usage(&reply.events);
        self.usage_pending = false;
        true
    }

    fn clear_views(&mut self) {
        self.related.clear();
        self.init_params.clear();
        self.usage.clear();
        self.usage_pending = false;
    }

    // ── Read model ──────────────────────────────────────────────

    pub fn current(&self) -> ResourceId {
        self.current
    }

    pub fn cursor(&self) -> u32 {
        self.cursor
    }

    pub fn related(&self) -> &[RelatedResource] {
        &self.related
    }

    pub fn init_params(&self) -> &[InitChunkNode] {
        &self.init_params
    }

    /// The coalesced usage timeline. Empty while a fetch is pending, and
    /// empty after a fetch that found no usage (or failed).
    pub fn usage(&self) -> &[UsageRange] {
        &self.usage
    }

    /// True while a usage fetch is in flight for the current resource.
    pub fn usage_pending(&self) -> bool {
        self.usage_pending
    }

    /// The range containing the replay cursor, if any. Derived on demand,
    /// never stored; a tie at a shared event id goes to the range with the
    /// smallest start.
    pub fn active_range(&self) -> Option<&UsageRange> {
        self.usage.iter().find(|range| range.contains(self.cursor))
    }
}
