use std::sync::Arc;

use ferrite_style::Pipeline;

/// Process-wide state shared by every request thread.
///
/// Everything here is read-only after startup; the pipeline hands out
/// engines through its own pools.
pub struct AppState {
    pub pipeline:         Pipeline,
    /// Largest accepted request body in bytes.
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(pipeline: Pipeline, max_upload_bytes: usize) -> Self {
        AppState { pipeline, max_upload_bytes }
    }
}

/// Shared state type, an `Arc<AppState>` passed to every handler.
pub type SharedState = Arc<AppState>;
