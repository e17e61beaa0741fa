//! Application state for the API server

use crate::{Config, TubeTools};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Shared application state accessible to all route handlers
///
/// Cloned for each request (cheap Arc clones).
#[derive(Clone)]
pub struct AppState {
    /// The service facade every handler delegates to
    pub tools: Arc<TubeTools>,

    /// Configuration (read-only)
    pub config: Arc<Config>,

    /// Cancelled when the server begins shutting down; open progress
    /// streams end on it
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Create a new AppState sharing the service's configuration
    pub fn new(tools: Arc<TubeTools>, shutdown: CancellationToken) -> Self {
        let config = tools.config_arc();
        Self {
            tools,
            config,
            shutdown,
        }
    }
}
