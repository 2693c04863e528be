//! Application state for the API server

use crate::DocHarvester;
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// Cloned for each request.
#[derive(Clone)]
pub struct AppState {
    /// The harvester that runs each requested batch
    pub harvester: Arc<DocHarvester>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(harvester: Arc<DocHarvester>) -> Self {
        Self { harvester }
    }
}
