//! Collaborator interfaces for external services.
//!
//! The flow never talks to the network directly; it goes through
//! these traits. Production deployments plug in HTTP-backed
//! implementations, tests and the CLI use the in-memory/fixture ones.
//! Injecting a fake outline service replaces the old in-line "mock
//! mode" branches: the deterministic geometric core stays fully
//! unit-testable without the hosted image-edit dependency.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::FlowError;

/// Prompt sent to the image-edit service to paint walls.
pub const WALL_OUTLINE_PROMPT: &str = "Draw thick black lines around all walls and impassable \
     areas in this map. Make the lines clear, precise, and very thick (at least 5 pixels wide). \
     The lines should be black with 100% opacity. Remove everything else in the image except \
     the black lines.";

/// Prompt sent to the image-edit service to paint portals.
pub const PORTAL_HIGHLIGHT_PROMPT: &str = "Draw thick black lines to mark all doorways, portals, \
     and passages between rooms in this map. Each doorway or portal should be marked with a \
     single straight line at the transition point between rooms. The lines should be black with \
     100% opacity. Remove everything else in the image except the black lines.";

/// Fetch and store opaque blobs.
pub trait BlobClient {
    /// Fetch the bytes behind a reference.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::Fetch`] when the resource is unavailable.
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FlowError>;

    /// Store bytes under a name; returns a retrievable reference.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::Store`] when the artifact cannot be kept.
    fn store(&self, name: &str, bytes: &[u8], content_type: &str) -> Result<String, FlowError>;
}

/// The hosted image-edit service: given an image and a prompt
/// describing lines to paint, returns an edited image.
pub trait OutlineService {
    /// Run one image-edit call.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::UpstreamService`] when the service fails
    /// or returns an unusable result.
    fn edit_image(&self, image: &[u8], prompt: &str) -> Result<Vec<u8>, FlowError>;
}

/// Best-effort progress reporting.
///
/// Implementations must not fail the flow: swallow transport errors
/// internally. Reports are fire-and-forget.
pub trait ProgressSink {
    /// Report progress for a stage.
    fn report(&self, stage: &str, percent: f64, message: &str);
}

/// In-memory blob store keyed by name; references use a `memory://`
/// scheme. Suitable for tests and single-process CLI runs.
#[derive(Debug, Default)]
pub struct MemoryBlobClient {
    blobs: Mutex<HashMap<String, (Vec<u8>, String)>>,
}

impl MemoryBlobClient {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with a named blob and return its reference.
    pub fn seed(&self, name: &str, bytes: Vec<u8>, content_type: &str) -> String {
        let reference = format!("memory://{name}");
        if let Ok(mut blobs) = self.blobs.lock() {
            blobs.insert(reference.clone(), (bytes, content_type.to_owned()));
        }
        reference
    }
}

impl BlobClient for MemoryBlobClient {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FlowError> {
        let blobs = self.blobs.lock().map_err(|_| FlowError::Fetch {
            url: url.to_owned(),
            reason: "store poisoned".to_owned(),
        })?;
        blobs
            .get(url)
            .map(|(bytes, _)| bytes.clone())
            .ok_or_else(|| FlowError::Fetch {
                url: url.to_owned(),
                reason: "not found".to_owned(),
            })
    }

    fn store(&self, name: &str, bytes: &[u8], content_type: &str) -> Result<String, FlowError> {
        Ok(self.seed(name, bytes.to_vec(), content_type))
    }
}

/// Outline service that returns canned images instead of calling the
/// hosted service: the wall fixture for the wall prompt, the portal
/// fixture for the portal prompt.
#[derive(Debug, Clone)]
pub struct FixtureOutlineService {
    wall_outline: Vec<u8>,
    portal_highlight: Vec<u8>,
}

impl FixtureOutlineService {
    /// Create a fixture service from pre-painted images.
    #[must_use]
    pub const fn new(wall_outline: Vec<u8>, portal_highlight: Vec<u8>) -> Self {
        Self {
            wall_outline,
            portal_highlight,
        }
    }
}

impl OutlineService for FixtureOutlineService {
    fn edit_image(&self, _image: &[u8], prompt: &str) -> Result<Vec<u8>, FlowError> {
        if prompt == WALL_OUTLINE_PROMPT {
            Ok(self.wall_outline.clone())
        } else if prompt == PORTAL_HIGHLIGHT_PROMPT {
            Ok(self.portal_highlight.clone())
        } else {
            Err(FlowError::UpstreamService(format!(
                "no fixture for prompt: {prompt:.40}"
            )))
        }
    }
}

/// Progress sink that drops every report.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn report(&self, _stage: &str, _percent: f64, _message: &str) {}
}

/// Progress sink that logs reports through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn report(&self, stage: &str, percent: f64, message: &str) {
        tracing::info!(stage, percent, "{message}");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trips() {
        let blobs = MemoryBlobClient::new();
        let reference = blobs.store("map", &[1, 2, 3], "image/png").unwrap();
        assert_eq!(reference, "memory://map");
        assert_eq!(blobs.fetch(&reference).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn missing_blob_is_a_fetch_error() {
        let blobs = MemoryBlobClient::new();
        let result = blobs.fetch("memory://absent");
        assert!(matches!(result, Err(FlowError::Fetch { .. })));
    }

    #[test]
    fn fixture_service_selects_by_prompt() {
        let service = FixtureOutlineService::new(vec![1], vec![2]);
        assert_eq!(
            service.edit_image(&[], WALL_OUTLINE_PROMPT).unwrap(),
            vec![1]
        );
        assert_eq!(
            service.edit_image(&[], PORTAL_HIGHLIGHT_PROMPT).unwrap(),
            vec![2]
        );
    }

    #[test]
    fn fixture_service_rejects_unknown_prompts() {
        let service = FixtureOutlineService::new(vec![], vec![]);
        let result = service.edit_image(&[], "paint everything purple");
        assert!(matches!(result, Err(FlowError::UpstreamService(_))));
    }
}
