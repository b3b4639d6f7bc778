//! 应用状态

use std::sync::Arc;

use uos_bootstrap::MetricsRecorder;
use uos_config::SessionConfig;

use crate::application::SalesHandler;
use crate::views::Views;

/// 所有路由共享的只读状态
#[derive(Clone)]
pub struct AppState {
    pub handler: Arc<SalesHandler>,
    pub views: Arc<Views>,
    pub session: SessionConfig,
    pub metrics: Option<MetricsRecorder>,
}

impl AppState {
    pub fn new(handler: SalesHandler, views: Views, session: SessionConfig) -> Self {
        Self {
            handler: Arc::new(handler),
            views: Arc::new(views),
            session,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Option<MetricsRecorder>) -> Self {
        self.metrics = metrics;
        self
    }
}
