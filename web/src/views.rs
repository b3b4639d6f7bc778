//! 页面模板

use axum::response::{Html, IntoResponse, Response};
use serde::Serialize;
use tera::{Context, Tera};
use tracing::debug;
use uos_domain_core::{Gender, Lead, LeadId, OfferEditor, OfferLine, OfferSummary};
use uos_errors::{AppError, AppResult};

use crate::layout::Layout;

const TEMPLATES: [(&str, &str); 5] = [
    ("base.html", include_str!("../templates/base.html")),
    ("login.html", include_str!("../templates/login.html")),
    ("dashboard.html", include_str!("../templates/dashboard.html")),
    ("offer_form.html", include_str!("../templates/offer_form.html")),
    ("error.html", include_str!("../templates/error.html")),
];

/// 模板管理器（模板编译进二进制）
pub struct Views {
    tera: Tera,
}

impl Views {
    pub fn new() -> AppResult<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES)
            .map_err(|e| AppError::internal(format!("Failed to load templates: {}", e)))?;

        debug!(count = TEMPLATES.len(), "Page templates loaded");
        Ok(Self { tera })
    }

    /// 渲染模板
    pub fn render<T: Serialize>(&self, template_name: &str, page: &T) -> AppResult<Html<String>> {
        let context = Context::from_serialize(page)
            .map_err(|e| AppError::internal(format!("Failed to create template context: {}", e)))?;

        self.tera
            .render(template_name, &context)
            .map(Html)
            .map_err(|e| {
                AppError::internal(format!(
                    "Failed to render template {}: {}",
                    template_name, e
                ))
            })
    }

    pub fn login(&self, page: &LoginPage) -> AppResult<Html<String>> {
        self.render("login.html", page)
    }

    pub fn dashboard(&self, page: &DashboardPage) -> AppResult<Html<String>> {
        self.render("dashboard.html", page)
    }

    pub fn offer_form(&self, page: &OfferFormPage) -> AppResult<Html<String>> {
        self.render("offer_form.html", page)
    }

    pub fn error(&self, page: &ErrorPage) -> AppResult<Html<String>> {
        self.render("error.html", page)
    }

    /// 渲染错误页，状态码取自错误分类
    pub fn error_response(&self, layout: Layout, err: &AppError) -> Response {
        let page = ErrorPage {
            layout,
            status: err.status_code(),
            message: err.message().to_string(),
        };
        match self.error(&page) {
            Ok(html) => (err.http_status(), html).into_response(),
            Err(e) => e.into_response(),
        }
    }
}

/// 登录页
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoginPage {
    pub layout: Layout,
    pub email: String,
    pub error: Option<String>,
}

/// 新建客户表单回显
#[derive(Debug, Clone, Default, Serialize)]
pub struct LeadFormView {
    pub name: String,
    pub address: String,
    pub pic_name: String,
    pub pic_phone: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LeadRow {
    pub id: LeadId,
    pub name: String,
    pub pic_name: String,
    pub pic_phone: String,
    pub offer_href: String,
}

impl From<&Lead> for LeadRow {
    fn from(lead: &Lead) -> Self {
        Self {
            id: lead.id,
            name: lead.name.clone(),
            pic_name: lead.pic_name.clone().unwrap_or_default(),
            pic_phone: lead.pic_phone.clone().unwrap_or_default(),
            offer_href: format!("/offers/new/{}", lead.id),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OfferRow {
    pub number: String,
    pub customer: String,
    pub total: String,
    pub pdf_url: Option<String>,
}

impl From<&OfferSummary> for OfferRow {
    fn from(offer: &OfferSummary) -> Self {
        Self {
            number: offer.offer_number.clone().unwrap_or_default(),
            customer: offer.lead_name().to_string(),
            total: offer.total().to_string(),
            pdf_url: offer.pdf_url.clone().filter(|url| !url.is_empty()),
        }
    }
}

/// 仪表盘
#[derive(Debug, Clone, Default, Serialize)]
pub struct DashboardPage {
    pub layout: Layout,
    pub user_email: String,
    pub leads: Vec<LeadRow>,
    pub offers: Vec<OfferRow>,
    pub notice: Option<String>,
    pub lead_form: LeadFormView,
    pub lead_error: Option<String>,
    /// 刚生成的报价文档，页面加载时在新标签页打开
    pub pdf_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenderOption {
    pub value: &'static str,
    pub label: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct LineRow {
    pub index: usize,
    pub name: String,
    pub gender: &'static str,
    pub material: String,
    pub qty: i64,
    pub unit: String,
    pub price: String,
    pub subtotal: String,
}

impl LineRow {
    fn new(index: usize, line: &OfferLine) -> Self {
        Self {
            index,
            name: line.name().to_string(),
            gender: line.gender().as_str(),
            material: line.material().to_string(),
            qty: line.qty(),
            unit: line.unit().to_string(),
            price: line.price().to_input_value(),
            subtotal: line.subtotal().to_string(),
        }
    }
}

/// 报价编辑页
#[derive(Debug, Clone, Serialize)]
pub struct OfferFormPage {
    pub layout: Layout,
    pub lead_id: LeadId,
    pub lead_name: String,
    pub lines: Vec<LineRow>,
    pub total: String,
    pub note: String,
    pub error: Option<String>,
    pub genders: Vec<GenderOption>,
}

impl OfferFormPage {
    /// 所有金额都从编辑器重新计算，不使用提交上来的值
    pub fn new(layout: Layout, lead: &Lead, editor: &OfferEditor, note: &str) -> Self {
        Self {
            layout,
            lead_id: lead.id,
            lead_name: lead.name.clone(),
            lines: editor
                .lines()
                .iter()
                .enumerate()
                .map(|(index, line)| LineRow::new(index, line))
                .collect(),
            total: editor.grand_total().to_string(),
            note: note.to_string(),
            error: None,
            genders: Gender::ALL
                .iter()
                .map(|g| GenderOption {
                    value: g.as_str(),
                    label: g.label(),
                })
                .collect(),
        }
    }

    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.error = Some(message.into());
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorPage {
    pub layout: Layout,
    pub status: u16,
    pub message: String,
}
