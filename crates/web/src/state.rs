use std::sync::Arc;

use storage::{repository::RecordStore, services::personal_best::OverwritePolicy};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
    pub policy: OverwritePolicy,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>, policy: OverwritePolicy) -> Self {
        Self { store, policy }
    }
}
