//! Repository trait 定义
//!
//! 所有调用都携带用户令牌，由数据存储的行级权限控制可见范围

use async_trait::async_trait;
use uos_domain_core::{AccessToken, Lead, LeadId, NewLead, OfferSummary};
use uos_errors::AppResult;

/// Lead Repository
#[async_trait]
pub trait LeadRepository: Send + Sync {
    /// 全部 Lead，按 ID 倒序
    async fn list_leads(&self, token: &AccessToken) -> AppResult<Vec<Lead>>;

    /// 根据 ID 查找
    async fn find_lead(&self, token: &AccessToken, id: LeadId) -> AppResult<Option<Lead>>;

    /// 新建 Lead
    async fn create_lead(&self, token: &AccessToken, lead: &NewLead) -> AppResult<Lead>;
}

/// 报价摘要 Repository
#[async_trait]
pub trait OfferRepository: Send + Sync {
    /// 全部报价摘要（含 Lead 名称），按 ID 倒序
    async fn list_offers(&self, token: &AccessToken) -> AppResult<Vec<OfferSummary>>;
}
