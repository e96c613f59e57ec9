use std::sync::Arc;

use matchlens_jobs::{JobRegistry, WorkerContext};

use crate::config::ServerConfig;

/// Shared application state injected into all handlers.
///
/// Cheap to clone: every field is an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// In-memory job registry shared with the workers.
    pub registry: Arc<JobRegistry>,
    /// Collaborators handed to each spawned worker.
    pub worker: Arc<WorkerContext>,
    pub config: Arc<ServerConfig>,
}
