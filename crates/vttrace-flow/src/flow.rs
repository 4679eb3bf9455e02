//! The end-to-end map feature-detection flow.
//!
//! Sequences the pipeline stages against the collaborator interfaces:
//!
//! fetch -> resize -> outline generation (walls, portals) ->
//! extraction (walls, portals) -> rescale -> UVTT assembly ->
//! overlay render -> artifact storage.
//!
//! The two extraction stages are mutually independent; they run
//! sequentially here but share no state and their relative order
//! carries no meaning. Failure anywhere aborts the run: no partial
//! document is ever stored.

use vttrace_export as export;
use vttrace_pipeline as pipeline;
use vttrace_pipeline::{DetectConfig, Dimensions, ScaleFactors, SizeBucket};

use crate::collab::{
    BlobClient, OutlineService, PORTAL_HIGHLIGHT_PROMPT, ProgressSink, WALL_OUTLINE_PROMPT,
};
use crate::stage::stages;
use crate::FlowError;

/// Configuration for one flow run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowConfig {
    /// Grid scale for the produced document.
    pub pixels_per_grid: u32,
    /// Feature-extraction tuning.
    pub detect: DetectConfig,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            pixels_per_grid: export::uvtt::DEFAULT_PIXELS_PER_GRID,
            detect: DetectConfig::default(),
        }
    }
}

/// Summary of a completed flow run.
#[derive(Debug, Clone)]
pub struct FlowReport {
    /// Serialized UVTT document.
    pub uvtt: Vec<u8>,
    /// Reference to the stored UVTT artifact.
    pub uvtt_ref: String,
    /// Reference to the stored overlay image.
    pub overlay_ref: String,
    /// Number of wall polylines in the document.
    pub wall_count: usize,
    /// Number of portals in the document.
    pub portal_count: usize,
    /// Original image dimensions.
    pub original_size: Dimensions,
    /// Bucket the image was resized to.
    pub bucket: SizeBucket,
    /// Grid scale used.
    pub pixels_per_grid: u32,
}

/// Run the feature-detection flow for the image behind `image_url`.
///
/// # Errors
///
/// Returns the first stage failure; a terminal failed progress update
/// is reported before returning. See [`FlowError`] for the taxonomy.
pub fn detect_map_features(
    image_url: &str,
    blobs: &dyn BlobClient,
    outlines: &dyn OutlineService,
    progress: &dyn ProgressSink,
    config: &FlowConfig,
) -> Result<FlowReport, FlowError> {
    progress.report("start", 0.0, "Starting feature detection workflow");

    let result = run_flow(image_url, blobs, outlines, progress, config);
    match &result {
        Ok(report) => {
            tracing::info!(
                walls = report.wall_count,
                portals = report.portal_count,
                "feature detection completed"
            );
            progress.report(
                "done",
                100.0,
                "Feature detection workflow completed successfully",
            );
        }
        Err(err) => {
            progress.report(
                "failed",
                0.0,
                &format!("Feature detection workflow failed: {err}"),
            );
        }
    }
    result
}

fn run_flow(
    image_url: &str,
    blobs: &dyn BlobClient,
    outlines: &dyn OutlineService,
    progress: &dyn ProgressSink,
    config: &FlowConfig,
) -> Result<FlowReport, FlowError> {
    // Fetch the source image.
    let original_bytes = blobs.fetch(image_url)?;
    progress.report("fetch", 10.0, "Image fetched successfully");

    let original = pipeline::resize::decode(&original_bytes)?;
    let original_size = Dimensions {
        width: original.width(),
        height: original.height(),
    };

    // Resize to a service bucket.
    let (resized, bucket) =
        stages::RESIZE_IMAGE.run(|| Ok(pipeline::resize::resize_image(&original)))?;
    let resized_size = bucket.dimensions();
    let resized_png = export::encode_png(&resized.to_rgba8())?;
    progress.report("resize", 15.0, &format!("Image resized to {bucket}"));

    // Generate the painted feature images.
    progress.report("outline", 20.0, "Generating wall outlines");
    let wall_outline = stages::OUTLINE_WALLS
        .run(|| outlines.edit_image(&resized_png, WALL_OUTLINE_PROMPT))?;

    progress.report("highlight", 30.0, "Generating portal highlights");
    let portal_highlight = stages::HIGHLIGHT_PORTALS
        .run(|| outlines.edit_image(&resized_png, PORTAL_HIGHLIGHT_PROMPT))?;
    progress.report("generated", 45.0, "Generated outline images");

    // Extract features in the resized pixel space.
    progress.report("walls", 50.0, "Detecting wall segments");
    let walls = stages::DETECT_WALLS
        .run(|| Ok(pipeline::extract_walls(&wall_outline, &config.detect)?))?;

    progress.report("portals", 60.0, "Detecting portal segments");
    let portals = stages::DETECT_PORTALS
        .run(|| Ok(pipeline::extract_portals(&portal_highlight, &config.detect)?))?;

    progress.report(
        "detected",
        70.0,
        &format!(
            "Detected {} wall segments and {} portal segments",
            walls.len(),
            portals.len()
        ),
    );

    // Map geometry back to original pixel space.
    let factors = ScaleFactors::between(resized_size, original_size)?;
    let scaled_walls = pipeline::rescale::rescale_polylines(&walls, factors);
    let scaled_portals = pipeline::rescale::rescale_segments(&portals, factors);

    // Assemble the document.
    progress.report("uvtt", 80.0, "Creating UVTT file");
    let uvtt = stages::ASSEMBLE_UVTT.run(|| {
        let doc = export::assemble(
            &scaled_walls,
            &scaled_portals,
            &original,
            config.pixels_per_grid,
        )?;
        Ok(doc.to_json_bytes()?)
    })?;

    // Render the diagnostic overlay.
    progress.report("overlay", 85.0, "Drawing features on original image");
    let overlay_png = stages::RENDER_OVERLAY.run(|| {
        let overlay = export::render_overlay(&original, &scaled_walls, &scaled_portals, factors);
        Ok(export::encode_png(&overlay)?)
    })?;

    // Persist deliverables.
    let uvtt_ref = blobs.store("uvtt-file", &uvtt, "application/uvtt")?;
    let overlay_ref = blobs.store("feature-overlay", &overlay_png, "image/png")?;
    blobs.store("wall-outline", &wall_outline, "image/png")?;
    blobs.store("portal-highlight", &portal_highlight, "image/png")?;

    Ok(FlowReport {
        uvtt,
        uvtt_ref,
        overlay_ref,
        wall_count: walls.len(),
        portal_count: portals.len(),
        original_size,
        bucket,
        pixels_per_grid: config.pixels_per_grid,
    })
}
