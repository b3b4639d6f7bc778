//! 布局选择
//!
//! 布局只由本次请求观测到的视口宽度决定，编辑器逻辑不感知布局

use axum::{extract::FromRequestParts, http::request::Parts};
use serde::Serialize;
use std::convert::Infallible;

/// 窄于该宽度（CSS 像素）使用移动端布局
pub const MOBILE_BREAKPOINT: u32 = 768;

const VIEWPORT_HINTS: [&str; 2] = ["sec-ch-viewport-width", "viewport-width"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    #[default]
    Desktop,
    Mobile,
}

/// 纯函数：宽度 < 768 为移动端
pub fn layout_for(width: u32) -> Layout {
    if width < MOBILE_BREAKPOINT {
        Layout::Mobile
    } else {
        Layout::Desktop
    }
}

fn parse_width(raw: &str) -> Option<u32> {
    // 客户端提示可能带小数，如 "390.5"
    let value = raw.trim().parse::<f64>().ok()?;
    (value.is_finite() && value > 0.0).then(|| value as u32)
}

fn width_from_query(query: &str) -> Option<u32> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| *key == "vw")
        .and_then(|(_, value)| parse_width(value))
}

/// 从请求头或 `vw` 查询参数读取视口宽度
pub fn viewport_width(parts: &Parts) -> Option<u32> {
    VIEWPORT_HINTS
        .iter()
        .filter_map(|name| parts.headers.get(*name))
        .filter_map(|value| value.to_str().ok())
        .find_map(parse_width)
        .or_else(|| parts.uri.query().and_then(width_from_query))
}

impl<S> FromRequestParts<S> for Layout
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(viewport_width(parts).map(layout_for).unwrap_or_default())
    }
}
