use std::sync::Arc;

use ppewatch_storage::ObjectStore;
use ppewatch_vision::VisionClient;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything is behind `Arc` or is already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: ppewatch_db::DbPool,
    /// Server configuration (auth, limits).
    pub config: Arc<ServerConfig>,
    /// Client for the multimodal inference gateway.
    pub vision: Arc<VisionClient>,
    /// Where uploaded images are written.
    pub store: Arc<dyn ObjectStore>,
}
