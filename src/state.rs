use search_backend::config::AppConfig;
use search_backend::search::{InMemorySearchEngine, QueryDispatcher};
use std::sync::Arc;

/// Shared application state / 应用共享状态
///
/// Read-only after startup; every query is request-scoped.
pub struct AppState {
    pub config: AppConfig,
    pub dispatcher: QueryDispatcher,
    /// Local index, for health/statistics only / 本地索引
    pub index: Arc<InMemorySearchEngine>,
}

impl AppState {
    /// Filtering switch, resolved once per request / 是否启用权限过滤
    pub fn filtering_enabled(&self) -> bool {
        self.config.permission.enabled
    }
}
