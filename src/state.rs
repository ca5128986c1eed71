// src/state.rs
use std::sync::Arc;

use crate::services::adapter::ChatAdapter;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub adapter: ChatAdapter,
}

impl AppState {
    pub fn new(adapter: ChatAdapter) -> Self {
        Self { adapter }
    }
}
