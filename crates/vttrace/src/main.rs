//! Convert a map image plus pre-painted feature images into a
//! Universal VTT document.
//!
//! The hosted image-edit service is not called from the command line;
//! instead the wall-outline and portal-highlight images it would have
//! produced are supplied as files. Everything downstream of generation
//! runs exactly as in the service flow: extraction, rescaling, UVTT
//! assembly, and the diagnostic overlay.

use std::path::PathBuf;

use clap::Parser;
use vttrace_flow::{
    BlobClient, FixtureOutlineService, FlowConfig, MemoryBlobClient, TracingProgress,
    detect_map_features,
};

/// Convert a painted map into a Universal VTT document.
#[derive(Parser)]
#[command(version)]
struct Args {
    /// Original map image path.
    input: PathBuf,

    /// Wall-outline image: thick black lines over impassable areas,
    /// at one of the service resolutions (1024x1024, 1536x1024,
    /// 1024x1536).
    #[arg(long, value_name = "IMAGE")]
    wall_outline: PathBuf,

    /// Portal-highlight image: one straight black line per doorway,
    /// at the same resolution as the wall outline.
    #[arg(long, value_name = "IMAGE")]
    portal_highlight: PathBuf,

    /// Output path for the UVTT document.
    #[arg(short, long)]
    output: PathBuf,

    /// Optional output path for the diagnostic overlay PNG.
    #[arg(long, value_name = "PATH")]
    overlay: Option<PathBuf>,

    /// Grid scale recorded in the document.
    #[arg(long, default_value_t = 70)]
    pixels_per_grid: u32,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let map = std::fs::read(&args.input)?;
    let wall_outline = std::fs::read(&args.wall_outline)?;
    let portal_highlight = std::fs::read(&args.portal_highlight)?;

    let blobs = MemoryBlobClient::new();
    let url = blobs.seed("map", map, "image/png");
    let outlines = FixtureOutlineService::new(wall_outline, portal_highlight);

    let config = FlowConfig {
        pixels_per_grid: args.pixels_per_grid,
        ..FlowConfig::default()
    };

    let report = detect_map_features(&url, &blobs, &outlines, &TracingProgress, &config)?;

    std::fs::write(&args.output, &report.uvtt)?;
    tracing::info!(
        path = %args.output.display(),
        walls = report.wall_count,
        portals = report.portal_count,
        bucket = %report.bucket,
        "wrote UVTT document"
    );

    if let Some(overlay_path) = args.overlay {
        let overlay = blobs.fetch(&report.overlay_ref)?;
        std::fs::write(&overlay_path, overlay)?;
        tracing::info!(path = %overlay_path.display(), "wrote feature overlay");
    }

    Ok(())
}
