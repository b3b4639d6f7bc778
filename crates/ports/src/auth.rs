//! 认证 trait 定义

use async_trait::async_trait;
use uos_domain_core::{AccessToken, RefreshToken, Session};
use uos_errors::AppResult;

/// 远端认证服务
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// 邮箱密码登录
    ///
    /// 失败时返回 `AppError::Unauthenticated`，消息为远端原文
    async fn sign_in_with_password(&self, email: &str, password: &str) -> AppResult<Session>;

    /// 查询令牌对应的活动会话，令牌无效时返回 None
    async fn get_session(&self, token: &AccessToken) -> AppResult<Option<Session>>;

    /// 用刷新令牌换取新会话，刷新令牌无效时返回 None
    async fn refresh_session(&self, refresh_token: &RefreshToken) -> AppResult<Option<Session>>;

    /// 注销
    async fn sign_out(&self, token: &AccessToken) -> AppResult<()>;

    /// 健康检查
    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}
