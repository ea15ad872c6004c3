use std::sync::Arc;

use crate::agent::NotesWorker;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Read-only after startup. Worker credentials are taken from here per request.
    pub config: Config,
    /// Pluggable notes worker. Default: `AgentProcess` (one child process per call).
    pub worker: Arc<dyn NotesWorker>,
}
