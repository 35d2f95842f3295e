use std::sync::Arc;

use application::TagManager;
use infrastructure::BroadcastEventPublisher;

/// Shared state behind the HTTP API.
pub struct AppState {
    pub manager: Arc<TagManager>,
    pub events: BroadcastEventPublisher,
}

impl AppState {
    pub fn new(manager: Arc<TagManager>, events: BroadcastEventPublisher) -> Self {
        Self { manager, events }
    }
}
