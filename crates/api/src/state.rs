use std::sync::Arc;

use rally_core::store::FunnelStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Campaign, page, and user lookups.
    pub store: Arc<dyn FunnelStore>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}
