//! Demonstration CLI: builds a small synthetic capture, then either lists
//! the resource catalog or drives an inspection session to completion and
//! prints the read model as JSON.

use std::collections::HashMap;
use std::sync::Arc;

use facet::Facet;
use figue as args;
use fresnel_inspector::{
    CatalogRow, InitChunkNode, InspectionSession, RelatedResource, ResourceCatalog,
};
use fresnel_replay::{CaptureAnalysis, InMemoryReplay};
use fresnel_types::{
    EventUsage, ResourceDescription, ResourceId, ResourceKind, SdChunk, SdParam, SdValue,
    UsageKind, UsageRange,
};
use tracing::info;

#[derive(Facet, Debug)]
struct Cli {
    #[facet(flatten)]
    builtins: args::FigueBuiltins,
    #[facet(args::subcommand)]
    command: Command,
}

#[derive(Facet, Debug)]
#[repr(u8)]
enum Command {
    List {
        #[facet(args::named, default)]
        filter: Option<String>,
    },
    Inspect {
        #[facet(args::named)]
        resource: u64,
        #[facet(args::named, default)]
        eid: Option<u32>,
    },
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let cli = parse_cli()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match cli.command {
        Command::List { filter } => run_list(filter),
        Command::Inspect { resource, eid } => run_inspect(resource, eid),
    }
}

fn parse_cli() -> Result<Cli, String> {
    let figue_config = args::builder::<Cli>()
        .map_err(|e| format!("failed to build CLI schema: {e}"))?
        .cli(|cli| cli.strict())
        .help(|h| {
            h.program_name("fresnel")
                .description("Inspect resources in a captured frame")
                .version(option_env!("CARGO_PKG_VERSION").unwrap_or("dev"))
        })
        .build();
    let cli = args::Driver::new(figue_config)
        .run()
        .into_result()
        .map_err(|e| e.to_string())?;
    Ok(cli.value)
}

fn run_list(filter: Option<String>) -> Result<(), String> {
    let (analysis, _replay) = demo_capture();
    let catalog = ResourceCatalog::from_analysis(&analysis);

    let rows: Vec<CatalogRow> = match filter.as_deref() {
        Some(pattern) => catalog.filtered(pattern).into_iter().cloned().collect(),
        None => catalog.rows().to_vec(),
    };
    info!(total = catalog.len(), shown = rows.len(), "resource catalog");

    let json =
        facet_json::to_string_pretty(&rows).map_err(|e| format!("encode catalog rows: {e}"))?;
    println!("{json}");
    Ok(())
}

#[derive(Facet)]
struct InspectReport {
    resource: ResourceId,
    name: Option<String>,
    related: Vec<RelatedResource>,
    init_chunks: Vec<InitChunkNode>,
    usage: Vec<UsageRow>,
    active: Option<UsageRow>,
}

/// The two-column EID/Usage row the usage table displays.
#[derive(Facet)]
struct UsageRow {
    eid: String,
    usage: String,
}

impl UsageRow {
    fn from_range(range: &UsageRange) -> Self {
        Self {
            eid: range.to_string(),
            usage: range.usage.to_string(),
        }
    }
}

fn run_inspect(resource: u64, eid: Option<u32>) -> Result<(), String> {
    let (analysis, replay) = demo_capture();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to build tokio runtime: {e}"))?;

    runtime.block_on(async move {
        let mut session = InspectionSession::new(Arc::clone(&analysis), replay);
        session.inspect(ResourceId::new(resource));
        if let Some(eid) = eid {
            session.on_position_changed(eid);
        }

        while session.usage_pending() {
            tokio::task::yield_now().await;
            session.pump();
        }

        let name = analysis
            .resource(session.current())
            .map(|desc| desc.name.clone());
        let report = InspectReport {
            resource: session.current(),
            name,
            related: session.related().to_vec(),
            init_chunks: session.init_params().to_vec(),
            usage: session.usage().iter().map(UsageRow::from_range).collect(),
            active: session.active_range().map(UsageRow::from_range),
        };

        let json = facet_json::to_string_pretty(&report)
            .map_err(|e| format!("encode inspect report: {e}"))?;
        println!("{json}");
        Ok(())
    })
}

/// A hand-built frame: shadow pass into a shadow map, main pass reading it,
/// with the usual swapchain/depth/geometry resources around it.
fn demo_capture() -> (Arc<CaptureAnalysis>, Arc<InMemoryReplay>) {
    let desc = |id: u64,
                kind: ResourceKind,
                name: &str,
                parents: &[u64],
                derived: &[u64],
                chunks: &[u32]| ResourceDescription {
        id: ResourceId::new(id),
        kind,
        name: name.to_string(),
        parent_resources: parents.iter().map(|&raw| ResourceId::new(raw)).collect(),
        derived_resources: derived.iter().map(|&raw| ResourceId::new(raw)).collect(),
        initialisation_chunks: chunks.to_vec(),
    };

    let image_chunk = |name: &str, width: u64, height: u64, format: &str| SdChunk {
        name: name.to_string(),
        params: vec![
            SdParam {
                name: "Width".to_string(),
                value: SdValue::Unsigned(width),
            },
            SdParam {
                name: "Height".to_string(),
                value: SdValue::Unsigned(height),
            },
            SdParam {
                name: "Format".to_string(),
                value: SdValue::Str(format.to_string()),
            },
        ],
    };
    let view_chunk = |image: u64| SdChunk {
        name: "vkCreateImageView".to_string(),
        params: vec![SdParam {
            name: "image".to_string(),
            value: SdValue::Resource(ResourceId::new(image)),
        }],
    };
    let buffer_chunk = |size: u64| SdChunk {
        name: "vkCreateBuffer".to_string(),
        params: vec![SdParam {
            name: "size".to_string(),
            value: SdValue::Unsigned(size),
        }],
    };

    let analysis = CaptureAnalysis::new(
        vec![
            desc(1, ResourceKind::SwapchainImage, "Backbuffer", &[], &[2], &[0]),
            desc(2, ResourceKind::View, "Backbuffer RTV", &[1], &[], &[1]),
            desc(3, ResourceKind::Texture, "Depth Buffer", &[], &[4], &[2]),
            desc(4, ResourceKind::View, "Depth DSV", &[3], &[], &[3]),
            desc(5, ResourceKind::Buffer, "Scene Vertices", &[], &[], &[4]),
            desc(6, ResourceKind::Buffer, "Scene Indices", &[], &[], &[5]),
            desc(7, ResourceKind::Texture, "Shadow Map", &[], &[8], &[6]),
            desc(8, ResourceKind::View, "Shadow Map SRV", &[7], &[], &[7]),
        ],
        vec![
            image_chunk("vkGetSwapchainImagesKHR", 1920, 1080, "B8G8R8A8_UNORM"),
            view_chunk(1),
            image_chunk("vkCreateImage", 1920, 1080, "D32_SFLOAT"),
            view_chunk(3),
            buffer_chunk(1_572_864),
            buffer_chunk(393_216),
            image_chunk("vkCreateImage", 2048, 2048, "D16_UNORM"),
            view_chunk(7),
        ],
    );

    let mut usage = HashMap::new();
    usage.insert(
        ResourceId::new(1),
        vec![
            EventUsage::new(120, UsageKind::Clear),
            EventUsage::new(130, UsageKind::ColorTarget),
            EventUsage::new(152, UsageKind::ColorTarget),
            EventUsage::new(163, UsageKind::Barrier),
        ],
    );
    usage.insert(
        ResourceId::new(3),
        vec![
            EventUsage::new(120, UsageKind::Clear),
            EventUsage::new(130, UsageKind::DepthStencilTarget),
            EventUsage::new(152, UsageKind::DepthStencilTarget),
        ],
    );
    usage.insert(
        ResourceId::new(5),
        vec![
            EventUsage::new(33, UsageKind::CopyDestination),
            EventUsage::new(72, UsageKind::VertexBuffer),
            EventUsage::new(130, UsageKind::VertexBuffer),
            EventUsage::new(152, UsageKind::VertexBuffer),
        ],
    );
    usage.insert(
        ResourceId::new(6),
        vec![
            EventUsage::new(34, UsageKind::CopyDestination),
            EventUsage::new(72, UsageKind::IndexBuffer),
            EventUsage::new(130, UsageKind::IndexBuffer),
            EventUsage::new(152, UsageKind::IndexBuffer),
        ],
    );
    usage.insert(
        ResourceId::new(7),
        vec![
            EventUsage::new(60, UsageKind::Clear),
            EventUsage::new(72, UsageKind::DepthStencilTarget),
            EventUsage::new(96, UsageKind::DepthStencilTarget),
            EventUsage::new(130, UsageKind::ShaderRead),
            EventUsage::new(152, UsageKind::ShaderRead),
        ],
    );

    (Arc::new(analysis), Arc::new(InMemoryReplay::new(usage)))
}
