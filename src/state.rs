use std::sync::Arc;

use crate::flags::FlagService;

#[derive(Clone)]
pub struct AppState {
    pub flags: Arc<FlagService>,
}

impl AppState {
    pub fn new(flags: FlagService) -> Self {
        Self { flags: Arc::new(flags) }
    }
}
