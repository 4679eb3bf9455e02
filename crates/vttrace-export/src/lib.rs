//! vttrace-export: Pure serializers and renderers (sans-IO).
//!
//! Turns rescaled map geometry into deliverables: the Universal VTT
//! interchange document and the diagnostic feature overlay image.

pub mod overlay;
pub mod uvtt;

pub use overlay::{encode_png, render_overlay};
pub use uvtt::{UvttDocument, assemble};

/// Errors that can occur while assembling or encoding deliverables.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// Re-encoding an image (embedded map or overlay) failed.
    #[error("failed to encode image: {0}")]
    ImageEncode(#[from] image::ImageError),

    /// JSON serialization of the document failed.
    #[error("failed to serialize document: {0}")]
    Json(#[from] serde_json::Error),
}
