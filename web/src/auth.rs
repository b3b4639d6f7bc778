//! 登录路由

use axum::{
    Form, Router,
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tracing::debug;
use uos_errors::AppResult;

use crate::application::SignInCommand;
use crate::layout::Layout;
use crate::session::{LOGIN_PATH, redirect_to_login, session_cookies, session_token, with_cookies};
use crate::state::AppState;
use crate::views::LoginPage;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route(LOGIN_PATH, get(show_login).post(login))
        .route("/logout", post(logout))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

async fn show_login(State(state): State<AppState>, layout: Layout) -> AppResult<Response> {
    let page = LoginPage {
        layout,
        ..Default::default()
    };
    Ok(state.views.login(&page)?.into_response())
}

/// 登录失败时原样展示远端消息并保留邮箱，不重定向
async fn login(
    State(state): State<AppState>,
    layout: Layout,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    let cmd = SignInCommand::new(form.email, form.password);
    let email = cmd.email.clone();

    match state.handler.sign_in(cmd).await {
        Ok(session) => {
            let cookies = session_cookies(&state.session, &session)?;
            Ok(with_cookies(Redirect::to("/").into_response(), cookies))
        }
        Err(e) => {
            let page = LoginPage {
                layout,
                email,
                error: Some(e.message().to_string()),
            };
            Ok((e.http_status(), state.views.login(&page)?).into_response())
        }
    }
}

/// 退出登录，远端失败也照常清除本地会话
async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    match session_token(&headers, &state.session.cookie_name) {
        Some(token) => state.handler.sign_out(&token).await,
        None => debug!("Logout without session cookie"),
    }
    redirect_to_login(&state.session)
}
