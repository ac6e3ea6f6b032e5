//! Data model shared between the replay boundary and the inspector core.
//!
//! Everything here is plain data: no I/O, no async. `ResourceDescription`
//! and the structured chunk types are owned by the loaded capture and read
//! through `fresnel-replay`; `EventUsage` is what the replay backend hands
//! back for a usage query; `UsageRange` is the coalesced display form.

use std::fmt;

use facet::Facet;

/// Identifies a capture-time GPU-API object (texture, buffer, view, ...).
///
/// The zero value is the "no resource" sentinel; a fresh inspection session
/// points at `ResourceId::NONE`.
#[derive(Facet, Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[facet(transparent)]
pub struct ResourceId(u64);

impl ResourceId {
    pub const NONE: ResourceId = ResourceId(0);

    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// True for the "no resource" sentinel.
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            write!(f, "<none>")
        } else {
            write!(f, "ResourceId({})", self.0)
        }
    }
}

/// Capture-time object class.
#[derive(Facet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
#[facet(rename_all = "snake_case")]
pub enum ResourceKind {
    Buffer,
    Texture,
    View,
    Sampler,
    Shader,
    PipelineState,
    RenderPass,
    CommandBuffer,
    Queue,
    Descriptor,
    SwapchainImage,
    Unknown,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Buffer => "Buffer",
            Self::Texture => "Texture",
            Self::View => "View",
            Self::Sampler => "Sampler",
            Self::Shader => "Shader",
            Self::PipelineState => "Pipeline State",
            Self::RenderPass => "Render Pass",
            Self::CommandBuffer => "Command Buffer",
            Self::Queue => "Queue",
            Self::Descriptor => "Descriptor",
            Self::SwapchainImage => "Swapchain Image",
            Self::Unknown => "Unknown",
        };
        f.write_str(label)
    }
}

/// How a resource was used at one event.
///
/// The set is defined by the replay backend; the inspector core only ever
/// compares values for equality.
#[derive(Facet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
#[facet(rename_all = "snake_case")]
pub enum UsageKind {
    VertexBuffer,
    IndexBuffer,
    ConstantBuffer,
    ShaderRead,
    ShaderWrite,
    ColorTarget,
    DepthStencilTarget,
    CopySource,
    CopyDestination,
    ResolveSource,
    ResolveDestination,
    Barrier,
    Clear,
    Indirect,
    GenMips,
}

impl fmt::Display for UsageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::VertexBuffer => "Vertex Buffer",
            Self::IndexBuffer => "Index Buffer",
            Self::ConstantBuffer => "Constant Buffer",
            Self::ShaderRead => "Shader Read",
            Self::ShaderWrite => "Shader Write",
            Self::ColorTarget => "Color Target",
            Self::DepthStencilTarget => "Depth-Stencil Target",
            Self::CopySource => "Copy Source",
            Self::CopyDestination => "Copy Destination",
            Self::ResolveSource => "Resolve Source",
            Self::ResolveDestination => "Resolve Destination",
            Self::Barrier => "Barrier",
            Self::Clear => "Clear",
            Self::Indirect => "Indirect Arguments",
            Self::GenMips => "Generate Mips",
        };
        f.write_str(label)
    }
}

/// One raw observation from the replay backend: at event `event_id`, the
/// queried resource was used as `usage`.
///
/// Sequences are ordered by `event_id` non-decreasing; duplicates at the
/// same event id are legal (a resource can be used two ways by one event).
#[derive(Facet, Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventUsage {
    /// Position in the capture's linear command sequence.
    pub event_id: u32,
    /// Usage classification at that event.
    pub usage: UsageKind,
}

impl EventUsage {
    pub fn new(event_id: u32, usage: UsageKind) -> Self {
        Self { event_id, usage }
    }
}

/// A coalesced span of same-kind usage, `start <= end`.
///
/// Produced fresh each time a resource is inspected; never persisted.
#[derive(Facet, Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageRange {
    pub start: u32,
    pub end: u32,
    pub usage: UsageKind,
}

impl UsageRange {
    /// Whether `event_id` falls inside `[start, end]`.
    pub fn contains(&self, event_id: u32) -> bool {
        self.start <= event_id && event_id <= self.end
    }
}

impl fmt::Display for UsageRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "EID {}", self.start)
        } else {
            write!(f, "EID {}-{}", self.start, self.end)
        }
    }
}

/// Immutable per-capture record describing one resource.
///
/// Owned by the capture analysis; the inspector only ever reads it.
#[derive(Facet, Debug, Clone, PartialEq)]
pub struct ResourceDescription {
    pub id: ResourceId,
    pub kind: ResourceKind,
    /// Display name, materialized upstream (custom names already applied).
    pub name: String,
    /// Resources this one was created from.
    pub parent_resources: Vec<ResourceId>,
    /// Resources created from this one.
    pub derived_resources: Vec<ResourceId>,
    /// Indices into the capture's structured chunk table for the commands
    /// that created/initialized this resource.
    pub initialisation_chunks: Vec<u32>,
}

/// A structured record of the parameters captured for one resource-creating
/// command.
#[derive(Facet, Debug, Clone, PartialEq)]
pub struct SdChunk {
    /// Command name, e.g. `vkCreateImage`.
    pub name: String,
    pub params: Vec<SdParam>,
}

/// One named parameter inside a chunk.
#[derive(Facet, Debug, Clone, PartialEq)]
pub struct SdParam {
    pub name: String,
    pub value: SdValue,
}

/// A captured parameter value.
#[derive(Facet, Debug, Clone, PartialEq)]
#[repr(u8)]
#[facet(rename_all = "snake_case")]
pub enum SdValue {
    Unsigned(u64),
    Signed(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    /// Reference to another capture resource.
    Resource(ResourceId),
    Struct(Vec<SdParam>),
    Array(Vec<SdValue>),
}
