use std::sync::Arc;

use crate::application::RelayChatUseCase;

/// Shared state handed to every HTTP handler.
#[derive(Clone)]
pub struct HttpState {
    pub relay: Arc<RelayChatUseCase>,
}

impl HttpState {
    pub fn new(relay: Arc<RelayChatUseCase>) -> Self {
        Self { relay }
    }
}
