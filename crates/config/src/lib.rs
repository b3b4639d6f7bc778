//! uos-config - 配置加载库
//!
//! 加载顺序：`default.toml` → `<APP_ENV>.toml` → `UOS_` 前缀环境变量
//! （嵌套字段用 `__` 分隔，例如 `UOS_SUPABASE__ANON_KEY`）。

use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use secrecy::Secret;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    Load(#[from] Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Load(Box::new(err))
    }
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// 遥测配置
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Supabase（数据存储 + 认证）配置
#[derive(Debug, Clone, Deserialize)]
pub struct SupabaseConfig {
    pub url: Url,
    pub anon_key: Secret<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// PDF 生成函数配置
#[derive(Debug, Clone, Deserialize)]
pub struct PdfGeneratorConfig {
    pub endpoint: Url,
    /// 为空时沿用 Supabase anon key
    pub api_key: Option<Secret<String>>,
    #[serde(default = "default_pdf_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_pdf_timeout_secs() -> u64 {
    60
}

/// 会话 Cookie 配置
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    #[serde(default)]
    pub secure: bool,
    #[serde(default = "default_max_age_secs")]
    pub max_age_secs: u64,
    /// 刷新令牌 cookie 的有效期，决定免登录的最长时间
    #[serde(default = "default_refresh_max_age_secs")]
    pub refresh_max_age_secs: u64,
}

fn default_cookie_name() -> String {
    "uos_session".to_string()
}

fn default_max_age_secs() -> u64 {
    3600
}

fn default_refresh_max_age_secs() -> u64 {
    7 * 24 * 3600
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            secure: false,
            max_age_secs: default_max_age_secs(),
            refresh_max_age_secs: default_refresh_max_age_secs(),
        }
    }
}

/// 应用配置
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app_name: String,
    pub app_env: String,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub supabase: SupabaseConfig,
    pub pdf_generator: PdfGeneratorConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    pub fn load(config_dir: &str) -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config: Self = Figment::new()
            .merge(Toml::file(format!("{}/default.toml", config_dir)))
            .merge(Toml::file(format!("{}/{}.toml", config_dir, env)))
            .merge(Env::prefixed("UOS_").split("__"))
            .extract()?;

        Ok(config)
    }

    /// 是否为生产环境
    pub fn is_production(&self) -> bool {
        self.app_env == "production"
    }

    /// 是否为开发环境
    pub fn is_development(&self) -> bool {
        self.app_env == "development"
    }
}
