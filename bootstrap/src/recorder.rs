//! Metrics 模块
//!
//! 提供 Prometheus metrics 导出与远程调用计时

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusHandle;
use std::time::Instant;
use tracing::warn;

/// Metrics 记录器
#[derive(Clone)]
pub struct MetricsRecorder {
    handle: PrometheusHandle,
}

impl MetricsRecorder {
    /// 安装全局 recorder
    ///
    /// 安装失败时返回 None，服务继续运行但不导出 metrics
    pub fn install() -> Option<Self> {
        match uos_telemetry::init_metrics() {
            Ok(handle) => Some(Self { handle }),
            Err(e) => {
                warn!(error = %e, "Failed to install Prometheus recorder");
                None
            }
        }
    }

    /// 获取 Prometheus 格式的 metrics
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// 记录远程调用（认证、数据存储、PDF 生成）
pub fn record_remote_call(collaborator: &str, operation: &str, success: bool, duration_ms: f64) {
    let labels = [
        ("collaborator", collaborator.to_string()),
        ("operation", operation.to_string()),
        ("success", success.to_string()),
    ];

    counter!("remote_calls_total", &labels).increment(1);
    histogram!("remote_call_duration_ms", &labels).record(duration_ms);
}

/// 记录登录结果
pub fn record_login(success: bool) {
    let labels = [("success", success.to_string())];
    counter!("logins_total", &labels).increment(1);
}

/// 记录报价生成
pub fn record_offer_generated(success: bool, items: usize) {
    let labels = [("success", success.to_string())];
    counter!("offers_generated_total", &labels).increment(1);
    histogram!("offer_items", &labels).record(items as f64);
}

/// 远程调用计时器
pub struct RemoteCallTimer {
    start: Instant,
    collaborator: &'static str,
    operation: &'static str,
}

impl RemoteCallTimer {
    pub fn new(collaborator: &'static str, operation: &'static str) -> Self {
        Self {
            start: Instant::now(),
            collaborator,
            operation,
        }
    }

    pub fn finish(self, success: bool) {
        let duration = self.start.elapsed().as_secs_f64() * 1000.0;
        record_remote_call(self.collaborator, self.operation, success, duration);
    }

    /// 按结果记录并原样返回
    pub fn observe<T, E>(self, result: Result<T, E>) -> Result<T, E> {
        self.finish(result.is_ok());
        result
    }
}
