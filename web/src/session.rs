//! 会话门禁
//!
//! 受保护路由在处理器运行前解析一次会话：
//! `Checking` → `Resolved(Authenticated | Refreshed | Unauthenticated)`。
//! 不跨请求缓存，每个请求重新向远端认证服务确认。
//! 访问令牌失效时用刷新令牌续期一次，并在响应中写回新的 cookie。

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{
        HeaderMap, HeaderValue,
        header::{COOKIE, SET_COOKIE},
        request::Parts,
    },
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::{debug, warn};
use uos_config::SessionConfig;
use uos_domain_core::{AccessToken, RefreshToken, Session};
use uos_errors::{AppError, AppResult};

use crate::application::SalesHandler;
use crate::state::AppState;

pub const LOGIN_PATH: &str = "/login";

/// 生成报价后把文档地址带回仪表盘的一次性 cookie
pub const OFFER_PDF_COOKIE: &str = "uos_offer_pdf";

const OFFER_PDF_MAX_AGE_SECS: u64 = 60;

/// 会话检查结果
#[derive(Debug, Clone)]
pub enum GateOutcome {
    Authenticated(Session),
    /// 访问令牌已失效，刷新令牌换到了新会话
    Refreshed(Session),
    Unauthenticated,
}

/// 会话门禁状态
#[derive(Debug, Clone)]
pub enum SessionGate {
    Checking,
    Resolved(GateOutcome),
}

/// 请求中携带的会话 cookie
#[derive(Debug, Clone, Default)]
pub struct SessionCookies {
    pub access: Option<AccessToken>,
    pub refresh: Option<RefreshToken>,
}

impl SessionCookies {
    pub fn from_headers(headers: &HeaderMap, config: &SessionConfig) -> Self {
        Self {
            access: session_token(headers, &config.cookie_name),
            refresh: cookie_value(headers, &refresh_cookie_name(config)).map(RefreshToken::new),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.access.is_none() && self.refresh.is_none()
    }
}

impl SessionGate {
    /// 解析会话，每个令牌最多查询一次远端，不重试
    ///
    /// 没有 cookie 时不发起网络请求；远端出错视为未登录
    pub async fn resolve(self, handler: &SalesHandler, cookies: SessionCookies) -> Self {
        if let Self::Resolved(_) = self {
            return self;
        }
        if cookies.is_empty() {
            debug!("No session cookie");
            return Self::Resolved(GateOutcome::Unauthenticated);
        }

        if let Some(token) = &cookies.access {
            match handler.current_session(token).await {
                Ok(Some(session)) => return Self::Resolved(GateOutcome::Authenticated(session)),
                Ok(None) => debug!("Session token rejected"),
                Err(e) => {
                    warn!(error = %e, "Session check failed, treating as signed out");
                    return Self::Resolved(GateOutcome::Unauthenticated);
                }
            }
        }

        let Some(refresh_token) = &cookies.refresh else {
            return Self::Resolved(GateOutcome::Unauthenticated);
        };
        match handler.refresh_session(refresh_token).await {
            Ok(Some(session)) => Self::Resolved(GateOutcome::Refreshed(session)),
            Ok(None) => {
                debug!("Refresh token rejected");
                Self::Resolved(GateOutcome::Unauthenticated)
            }
            Err(e) => {
                warn!(error = %e, "Session refresh failed, treating as signed out");
                Self::Resolved(GateOutcome::Unauthenticated)
            }
        }
    }
}

/// 受保护路由的中间件
///
/// 未登录时重定向到 /login 并清除 cookie，处理器不会运行
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let cookies = SessionCookies::from_headers(request.headers(), &state.session);
    let gate = SessionGate::Checking.resolve(&state.handler, cookies).await;

    match gate {
        SessionGate::Resolved(GateOutcome::Authenticated(session)) => {
            request.extensions_mut().insert(session);
            next.run(request).await
        }
        SessionGate::Resolved(GateOutcome::Refreshed(session)) => {
            let cookies = session_cookies(&state.session, &session);
            request.extensions_mut().insert(session);
            let response = next.run(request).await;
            match cookies {
                Ok(cookies) => with_cookies(response, cookies),
                Err(e) => {
                    warn!(error = %e, "Failed to build refreshed session cookies");
                    response
                }
            }
        }
        _ => redirect_to_login(&state.session),
    }
}

/// 当前会话提取器
///
/// 应该在 require_session 之后使用
pub struct CurrentSession(pub Session);

impl CurrentSession {
    pub fn token(&self) -> &AccessToken {
        &self.0.access_token
    }
}

impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .map(CurrentSession)
            .ok_or_else(|| Redirect::to(LOGIN_PATH))
    }
}

/// 按名称读取 cookie，空值视为不存在
pub fn cookie_value(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == cookie_name)
        .map(|(_, value)| urlencoding::decode(value).map(|v| v.into_owned()).unwrap_or_default())
        .filter(|value| !value.is_empty())
}

/// 从请求 cookie 中读取访问令牌
pub fn session_token(headers: &HeaderMap, cookie_name: &str) -> Option<AccessToken> {
    cookie_value(headers, cookie_name).map(AccessToken::new)
}

fn refresh_cookie_name(config: &SessionConfig) -> String {
    format!("{}_refresh", config.cookie_name)
}

fn cookie_header(
    config: &SessionConfig,
    name: &str,
    value: &str,
    max_age_secs: u64,
) -> AppResult<HeaderValue> {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        name,
        urlencoding::encode(value),
        max_age_secs
    );
    if config.secure {
        cookie.push_str("; Secure");
    }

    HeaderValue::from_str(&cookie)
        .map_err(|e| AppError::internal(format!("Invalid cookie {}: {}", name, e)))
}

/// 登录或续期后写入的 cookie
///
/// 访问令牌有效期不超过配置上限；刷新令牌按 `refresh_max_age_secs` 保存
pub fn session_cookies(config: &SessionConfig, session: &Session) -> AppResult<Vec<HeaderValue>> {
    let max_age = session
        .expires_in
        .map_or(config.max_age_secs, |expires_in| expires_in.min(config.max_age_secs));

    let mut cookies = vec![cookie_header(
        config,
        &config.cookie_name,
        session.access_token.expose(),
        max_age,
    )?];
    if let Some(refresh_token) = &session.refresh_token {
        cookies.push(cookie_header(
            config,
            &refresh_cookie_name(config),
            refresh_token.expose(),
            config.refresh_max_age_secs,
        )?);
    }
    Ok(cookies)
}

/// 清除会话的 cookie
pub fn clear_session_cookies(config: &SessionConfig) -> AppResult<Vec<HeaderValue>> {
    Ok(vec![
        cookie_header(config, &config.cookie_name, "", 0)?,
        cookie_header(config, &refresh_cookie_name(config), "", 0)?,
    ])
}

/// 携带刚生成文档地址的 cookie，只读取一次
pub fn offer_pdf_cookie(config: &SessionConfig, pdf_url: &str) -> AppResult<HeaderValue> {
    cookie_header(config, OFFER_PDF_COOKIE, pdf_url, OFFER_PDF_MAX_AGE_SECS)
}

pub fn clear_offer_pdf_cookie(config: &SessionConfig) -> AppResult<HeaderValue> {
    cookie_header(config, OFFER_PDF_COOKIE, "", 0)
}

/// 追加 Set-Cookie 头，保留已有的
pub fn with_cookies(mut response: Response, cookies: Vec<HeaderValue>) -> Response {
    for cookie in cookies {
        response.headers_mut().append(SET_COOKIE, cookie);
    }
    response
}

/// 重定向到登录页并清除 cookie
pub fn redirect_to_login(config: &SessionConfig) -> Response {
    let response = Redirect::to(LOGIN_PATH).into_response();
    match clear_session_cookies(config) {
        Ok(cookies) => with_cookies(response, cookies),
        Err(e) => {
            warn!(error = %e, "Failed to build clearing cookie");
            response
        }
    }
}
