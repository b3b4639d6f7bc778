//! 业务处理器

use std::sync::Arc;

use secrecy::ExposeSecret;
use tracing::{info, warn};
use uos_bootstrap::{RemoteCallTimer, record_login, record_offer_generated};
use uos_domain_core::{AccessToken, Lead, LeadId, OfferSummary, RefreshToken, Session};
use uos_errors::{AppError, AppResult};
use uos_ports::{AuthProvider, GeneratedOffer, LeadRepository, OfferGenerator, OfferRepository};

use super::commands::*;

const AUTH: &str = "auth";
const STORE: &str = "store";
const GENERATOR: &str = "generator";

/// 仪表盘数据
///
/// 某个列表加载失败时该列表为空，错误信息放入 `notice`
#[derive(Debug, Clone, Default)]
pub struct DashboardData {
    pub leads: Vec<Lead>,
    pub offers: Vec<OfferSummary>,
    pub notice: Option<String>,
}

pub struct SalesHandler {
    auth: Arc<dyn AuthProvider>,
    leads: Arc<dyn LeadRepository>,
    offers: Arc<dyn OfferRepository>,
    generator: Arc<dyn OfferGenerator>,
}

impl SalesHandler {
    pub fn new(
        auth: Arc<dyn AuthProvider>,
        leads: Arc<dyn LeadRepository>,
        offers: Arc<dyn OfferRepository>,
        generator: Arc<dyn OfferGenerator>,
    ) -> Self {
        Self {
            auth,
            leads,
            offers,
            generator,
        }
    }

    // ========== 会话 ==========

    /// 密码登录
    pub async fn sign_in(&self, cmd: SignInCommand) -> AppResult<Session> {
        // 1. 验证命令（不发起网络请求）
        cmd.validate()?;

        // 2. 远端认证
        let result = RemoteCallTimer::new(AUTH, "sign_in").observe(
            self.auth
                .sign_in_with_password(&cmd.email, cmd.password.expose_secret())
                .await,
        );
        record_login(result.is_ok());

        match &result {
            Ok(session) => info!(user_id = %session.user.id, "User signed in"),
            Err(e) => warn!(email = %cmd.email, error = %e, "Sign-in rejected"),
        }
        result
    }

    /// 查询令牌对应的会话，每次请求都重新查询
    pub async fn current_session(&self, token: &AccessToken) -> AppResult<Option<Session>> {
        RemoteCallTimer::new(AUTH, "get_session").observe(self.auth.get_session(token).await)
    }

    /// 用刷新令牌续期会话
    pub async fn refresh_session(&self, refresh_token: &RefreshToken) -> AppResult<Option<Session>> {
        let result = RemoteCallTimer::new(AUTH, "refresh_session")
            .observe(self.auth.refresh_session(refresh_token).await);
        if let Ok(Some(session)) = &result {
            info!(user_id = %session.user.id, "Session refreshed");
        }
        result
    }

    /// 退出登录，远端错误只记录日志
    pub async fn sign_out(&self, token: &AccessToken) {
        let result = RemoteCallTimer::new(AUTH, "sign_out").observe(self.auth.sign_out(token).await);
        if let Err(e) = result {
            warn!(error = %e, "Remote sign-out failed");
        }
    }

    /// 就绪检查
    pub async fn auth_ready(&self) -> AppResult<bool> {
        self.auth.health_check().await
    }

    // ========== 客户 ==========

    /// 并发加载客户与报价列表
    pub async fn load_dashboard(&self, token: &AccessToken) -> DashboardData {
        let (leads, offers) = tokio::join!(
            async {
                RemoteCallTimer::new(STORE, "list_leads")
                    .observe(self.leads.list_leads(token).await)
            },
            async {
                RemoteCallTimer::new(STORE, "list_offers")
                    .observe(self.offers.list_offers(token).await)
            },
        );

        let mut data = DashboardData::default();
        match leads {
            Ok(leads) => data.leads = leads,
            Err(e) => {
                warn!(error = %e, "Failed to load leads");
                data.notice = Some(e.message().to_string());
            }
        }
        match offers {
            Ok(offers) => data.offers = offers,
            Err(e) => {
                warn!(error = %e, "Failed to load offers");
                data.notice.get_or_insert_with(|| e.message().to_string());
            }
        }
        data
    }

    /// 新建客户
    pub async fn create_lead(&self, token: &AccessToken, cmd: CreateLeadCommand) -> AppResult<Lead> {
        let lead = cmd.to_new_lead();
        lead.validate()?;

        let created = RemoteCallTimer::new(STORE, "create_lead")
            .observe(self.leads.create_lead(token, &lead).await)?;

        info!(lead_id = %created.id, name = %created.name, "Lead created");
        Ok(created)
    }

    /// 查找客户，不存在时返回 NotFound
    pub async fn find_lead(&self, token: &AccessToken, id: LeadId) -> AppResult<Lead> {
        RemoteCallTimer::new(STORE, "find_lead")
            .observe(self.leads.find_lead(token, id).await)?
            .ok_or_else(|| AppError::not_found(format!("Customer {} tidak ditemukan", id)))
    }

    // ========== 报价 ==========

    /// 提交报价到 PDF 生成服务
    ///
    /// 编辑器状态不被修改，失败时调用方可原样回显
    pub async fn generate_offer(&self, cmd: &GenerateOfferCommand) -> AppResult<GeneratedOffer> {
        let payload = cmd.editor.serialize(cmd.lead_id, &cmd.note)?;

        let result = RemoteCallTimer::new(GENERATOR, "generate")
            .observe(self.generator.generate(&payload).await);
        record_offer_generated(result.is_ok(), payload.items.len());

        match &result {
            Ok(generated) => info!(
                lead_id = %cmd.lead_id,
                total = %payload.grand_total(),
                pdf_url = %generated.pdf_url,
                "Offer generated"
            ),
            Err(e) => warn!(lead_id = %cmd.lead_id, error = %e, "Offer generation failed"),
        }
        result
    }
}
