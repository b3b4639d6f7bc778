//! 认证会话

use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};

/// 远端认证服务签发的访问令牌
#[derive(Debug, Clone)]
pub struct AccessToken(Secret<String>);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Secret::new(token.into()))
    }

    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

/// 用于换取新访问令牌的刷新令牌
#[derive(Debug, Clone)]
pub struct RefreshToken(Secret<String>);

impl RefreshToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Secret::new(token.into()))
    }

    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

/// 已认证用户
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// 活动会话
#[derive(Debug, Clone)]
pub struct Session {
    pub access_token: AccessToken,
    /// 令牌剩余有效期（秒），未知时为 None
    pub expires_in: Option<u64>,
    /// 只有登录和刷新时远端才会返回
    pub refresh_token: Option<RefreshToken>,
    pub user: AuthUser,
}
