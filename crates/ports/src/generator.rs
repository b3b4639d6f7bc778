//! PDF 生成 trait 定义

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uos_domain_core::OfferPayload;
use uos_errors::AppResult;

/// 生成结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedOffer {
    pub pdf_url: String,
}

/// 远端 PDF 生成服务
#[async_trait]
pub trait OfferGenerator: Send + Sync {
    /// 提交报价载荷，每次调用只发起一次请求，不重试
    async fn generate(&self, payload: &OfferPayload) -> AppResult<GeneratedOffer>;
}
