//! 命令定义

use email_address::EmailAddress;
use secrecy::{ExposeSecret, Secret};
use uos_domain_core::{LeadId, NewLead, OfferEditor};
use uos_errors::{AppError, AppResult};

/// 密码登录命令
#[derive(Debug, Clone)]
pub struct SignInCommand {
    pub email: String,
    pub password: Secret<String>,
}

impl SignInCommand {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into().trim().to_string(),
            password: Secret::new(password.into()),
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.email.is_empty() || self.password.expose_secret().is_empty() {
            return Err(AppError::validation("Email dan password wajib diisi"));
        }
        if !EmailAddress::is_valid(&self.email) {
            return Err(AppError::validation("Format email tidak valid"));
        }
        Ok(())
    }
}

/// 新建客户命令
#[derive(Debug, Clone, Default)]
pub struct CreateLeadCommand {
    pub name: String,
    pub address: String,
    pub pic_name: String,
    pub pic_phone: String,
}

impl CreateLeadCommand {
    /// 转换为写入记录，类型固定为 customer
    pub fn to_new_lead(&self) -> NewLead {
        NewLead::customer(
            self.name.trim(),
            self.address.trim(),
            self.pic_name.trim(),
            self.pic_phone.trim(),
        )
    }
}

/// 生成报价命令
#[derive(Debug, Clone)]
pub struct GenerateOfferCommand {
    pub lead_id: LeadId,
    pub editor: OfferEditor,
    pub note: String,
}
