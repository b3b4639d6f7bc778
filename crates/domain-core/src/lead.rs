//! 客户线索（Lead）

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use uos_errors::{AppError, AppResult};

/// Lead ID（由数据存储分配的正整数）
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, From,
)]
#[display("{_0}")]
pub struct LeadId(pub i64);

impl LeadId {
    /// 解析路由参数中的 ID，必须为正整数
    pub fn parse(raw: &str) -> AppResult<Self> {
        raw.trim()
            .parse::<i64>()
            .ok()
            .map(Self)
            .filter(Self::is_valid)
            .ok_or_else(|| AppError::validation(format!("ID customer tidak valid: {}", raw)))
    }

    pub fn is_valid(&self) -> bool {
        self.0 > 0
    }
}

/// Lead 类型
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadType {
    #[default]
    Customer,
    #[serde(other)]
    Other,
}

/// 已持久化的 Lead
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    pub id: LeadId,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub pic_name: Option<String>,
    #[serde(default)]
    pub pic_phone: Option<String>,
    #[serde(rename = "type", default)]
    pub lead_type: LeadType,
}

/// 新建 Lead 的写入记录
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLead {
    pub name: String,
    pub address: String,
    pub pic_name: String,
    pub pic_phone: String,
    #[serde(rename = "type")]
    pub lead_type: LeadType,
}

impl NewLead {
    /// 本流程只创建 customer 类型
    pub fn customer(
        name: impl Into<String>,
        address: impl Into<String>,
        pic_name: impl Into<String>,
        pic_phone: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            pic_name: pic_name.into(),
            pic_phone: pic_phone.into(),
            lead_type: LeadType::Customer,
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::validation("Nama customer wajib diisi"));
        }
        Ok(())
    }
}
