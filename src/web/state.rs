use std::sync::Arc;

use crate::config::Config;
use crate::service::Services;

/// Shared application state handed to every handler.
///
/// Built once at startup; holds no per-request mutable state.
pub struct AppState {
    pub services: Arc<Services>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(services: Arc<Services>, config: Arc<Config>) -> Self {
        Self { services, config }
    }
}
