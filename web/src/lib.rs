//! Uniform OS 销售仪表盘（服务端渲染）

pub mod application;
pub mod auth;
pub mod dashboard;
pub mod layout;
pub mod offers;
pub mod routing;
pub mod security_headers;
pub mod session;
pub mod state;
pub mod views;

use std::time::Duration;

use axum::{
    Router,
    http::StatusCode,
    middleware,
    routing::{get, post},
};
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::state::AppState;

/// 表单请求体上限（200 行明细也远小于此值）
const BODY_LIMIT_BYTES: usize = 256 * 1024;

/// 构建路由（受保护路由先经过会话门禁）
pub fn app(state: AppState) -> Router {
    let protected = Router::new()
        .route("/", get(dashboard::show))
        .route("/leads", post(dashboard::create_lead))
        .route(
            "/offers/new/{lead_id}",
            get(offers::show).post(offers::submit),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            session::require_session,
        ));

    Router::new()
        .merge(protected)
        .merge(auth::auth_routes())
        .merge(routing::api_routes())
        .layer(middleware::from_fn(
            security_headers::security_headers_middleware,
        ))
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES))
        .with_state(state)
}

/// 外层中间件：请求超时（408）与访问日志
pub fn with_server_layers(router: Router, request_timeout: Duration) -> Router {
    router
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(TraceLayer::new_for_http())
}
