//! 仪表盘与客户创建

use axum::{
    Form,
    extract::State,
    http::{HeaderMap, header::SET_COOKIE},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;
use uos_errors::AppResult;

use crate::application::CreateLeadCommand;
use crate::layout::Layout;
use crate::session::{CurrentSession, OFFER_PDF_COOKIE, clear_offer_pdf_cookie, cookie_value};
use crate::state::AppState;
use crate::views::{DashboardPage, LeadFormView, LeadRow, OfferRow};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LeadForm {
    pub name: String,
    pub address: String,
    pub pic_name: String,
    pub pic_phone: String,
}

impl From<LeadForm> for CreateLeadCommand {
    fn from(form: LeadForm) -> Self {
        Self {
            name: form.name,
            address: form.address,
            pic_name: form.pic_name,
            pic_phone: form.pic_phone,
        }
    }
}

impl From<&LeadForm> for LeadFormView {
    fn from(form: &LeadForm) -> Self {
        Self {
            name: form.name.clone(),
            address: form.address.clone(),
            pic_name: form.pic_name.clone(),
            pic_phone: form.pic_phone.clone(),
        }
    }
}

/// 只接受 http(s) 地址，其余忽略
pub fn document_location(raw: &str) -> Option<String> {
    match Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Some(url.to_string()),
        _ => {
            debug!(location = %raw, "Ignoring document location");
            None
        }
    }
}

async fn dashboard_page(state: &AppState, session: &CurrentSession, layout: Layout) -> DashboardPage {
    let data = state.handler.load_dashboard(session.token()).await;

    DashboardPage {
        layout,
        user_email: session.0.user.email.clone().unwrap_or_default(),
        leads: data.leads.iter().map(LeadRow::from).collect(),
        offers: data.offers.iter().map(OfferRow::from).collect(),
        notice: data.notice,
        ..Default::default()
    }
}

/// GET /
///
/// 刚生成的文档地址只来自报价提交写入的 cookie，读取后即清除
pub async fn show(
    State(state): State<AppState>,
    session: CurrentSession,
    layout: Layout,
    headers: HeaderMap,
) -> AppResult<Response> {
    let generated = cookie_value(&headers, OFFER_PDF_COOKIE);

    let mut page = dashboard_page(&state, &session, layout).await;
    page.pdf_url = generated.as_deref().and_then(document_location);

    let mut response = state.views.dashboard(&page)?.into_response();
    if generated.is_some() {
        match clear_offer_pdf_cookie(&state.session) {
            Ok(cookie) => {
                response.headers_mut().append(SET_COOKIE, cookie);
            }
            Err(e) => warn!(error = %e, "Failed to clear offer document cookie"),
        }
    }
    Ok(response)
}

/// POST /leads
///
/// 成功后重定向回仪表盘重新加载列表；失败时保留已填写内容
pub async fn create_lead(
    State(state): State<AppState>,
    session: CurrentSession,
    layout: Layout,
    Form(form): Form<LeadForm>,
) -> AppResult<Response> {
    let lead_form = LeadFormView::from(&form);

    match state.handler.create_lead(session.token(), form.into()).await {
        Ok(_) => Ok(Redirect::to("/").into_response()),
        Err(e) => {
            let mut page = dashboard_page(&state, &session, layout).await;
            page.lead_form = lead_form;
            page.lead_error = Some(e.message().to_string());
            Ok((e.http_status(), state.views.dashboard(&page)?).into_response())
        }
    }
}
