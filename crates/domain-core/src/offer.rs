//! 报价明细行与报价摘要

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uos_errors::AppError;

use crate::money::Rupiah;

pub const DEFAULT_UNIT: &str = "pcs";

/// 单行数量上限，超出视为无效输入
pub const MAX_QTY: i64 = 1_000_000;

/// 单价上限（Rp 1 triliun），超出视为无效输入
///
/// 与 `MAX_QTY` 和行数上限一起保证小计和总计不会溢出
pub const MAX_PRICE: i64 = 1_000_000_000_000;

/// 制服款式性别
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    #[default]
    #[serde(rename = "")]
    Unset,
    #[serde(rename = "Laki-laki")]
    LakiLaki,
    #[serde(rename = "Perempuan")]
    Perempuan,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Unset, Gender::LakiLaki, Gender::Perempuan];

    /// 枚举外的文本视为未选择
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "Laki-laki" => Self::LakiLaki,
            "Perempuan" => Self::Perempuan,
            "" => Self::Unset,
            other => {
                debug!(value = %other, "Unknown gender value, treating as unset");
                Self::Unset
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unset => "",
            Self::LakiLaki => "Laki-laki",
            Self::Perempuan => "Perempuan",
        }
    }

    /// 下拉框显示文本
    pub fn label(&self) -> &'static str {
        match self {
            Self::Unset => "Pilih",
            other => other.as_str(),
        }
    }
}

/// 明细行可编辑字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineField {
    Name,
    Gender,
    Material,
    Qty,
    Unit,
    Price,
}

impl LineField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Gender => "gender",
            Self::Material => "material",
            Self::Qty => "qty",
            Self::Unit => "unit",
            Self::Price => "price",
        }
    }
}

impl FromStr for LineField {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(Self::Name),
            "gender" => Ok(Self::Gender),
            "material" => Ok(Self::Material),
            "qty" | "quantity" => Ok(Self::Qty),
            "unit" => Ok(Self::Unit),
            "price" => Ok(Self::Price),
            other => Err(AppError::validation(format!("Kolom tidak dikenal: {}", other))),
        }
    }
}

/// 报价明细行
///
/// `subtotal` 只能由 `qty × price` 推导，所有修改都经过 [`OfferLine::with_field`]，
/// 返回的行总是已重新计算小计。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OfferLine {
    name: String,
    gender: Gender,
    material: String,
    qty: i64,
    unit: String,
    price: Rupiah,
    subtotal: Rupiah,
}

impl Default for OfferLine {
    fn default() -> Self {
        Self::blank()
    }
}

impl OfferLine {
    /// 初始空行：qty=1, unit="pcs", price=0
    pub fn blank() -> Self {
        Self {
            name: String::new(),
            gender: Gender::Unset,
            material: String::new(),
            qty: 1,
            unit: DEFAULT_UNIT.to_string(),
            price: Rupiah::ZERO,
            subtotal: Rupiah::ZERO,
        }
    }

    /// 写入一个字段并返回重新计算过小计的行
    ///
    /// 数量和单价按宽松策略转换：空值、无法解析或超过上限的输入记为 0。
    pub fn with_field(mut self, field: LineField, raw: &str) -> Self {
        match field {
            LineField::Name => self.name = raw.to_string(),
            LineField::Gender => self.gender = Gender::parse(raw),
            LineField::Material => self.material = raw.to_string(),
            LineField::Unit => self.unit = raw.to_string(),
            LineField::Qty => self.qty = coerce_quantity(raw),
            LineField::Price => self.price = coerce_price(raw),
        }
        self.reconciled()
    }

    fn reconciled(mut self) -> Self {
        self.subtotal = self.price * self.qty;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn gender(&self) -> Gender {
        self.gender
    }

    pub fn material(&self) -> &str {
        &self.material
    }

    pub fn qty(&self) -> i64 {
        self.qty
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn price(&self) -> Rupiah {
        self.price
    }

    pub fn subtotal(&self) -> Rupiah {
        self.subtotal
    }
}

fn parse_non_negative(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw.trim())
        .ok()
        .filter(|value| !value.is_sign_negative() || value.is_zero())
}

fn within_limit(value: Decimal, limit: i64, field: LineField) -> Option<Decimal> {
    if value > Decimal::from(limit) {
        debug!(field = field.as_str(), %value, "Value above limit, treating as zero");
        return None;
    }
    Some(value)
}

fn coerce_quantity(raw: &str) -> i64 {
    parse_non_negative(raw)
        .filter(|value| value.fract().is_zero())
        .and_then(|value| within_limit(value, MAX_QTY, LineField::Qty))
        .and_then(|value| value.to_i64())
        .unwrap_or(0)
}

fn coerce_price(raw: &str) -> Rupiah {
    parse_non_negative(raw)
        .and_then(|value| within_limit(value, MAX_PRICE, LineField::Price))
        .map(Rupiah::new)
        .unwrap_or_default()
}

/// 关联的 Lead 名称（`leads(name)` 联表结果）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadName {
    pub name: String,
}

/// 已持久化报价的摘要视图
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferSummary {
    pub id: i64,
    #[serde(default)]
    pub offer_number: Option<String>,
    #[serde(default)]
    pub total_amount: Option<Rupiah>,
    #[serde(default)]
    pub pdf_url: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "leads", default)]
    pub lead: Option<LeadName>,
}

impl OfferSummary {
    pub fn lead_name(&self) -> &str {
        self.lead.as_ref().map(|l| l.name.as_str()).unwrap_or("")
    }

    pub fn total(&self) -> Rupiah {
        self.total_amount.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_line_defaults() {
        let line = OfferLine::blank();
        assert_eq!(line.qty(), 1);
        assert_eq!(line.unit(), "pcs");
        assert_eq!(line.price(), Rupiah::ZERO);
        assert_eq!(line.subtotal(), Rupiah::ZERO);
        assert_eq!(line.gender(), Gender::Unset);
        assert!(line.name().is_empty());
        assert!(line.material().is_empty());
    }

    #[test]
    fn test_numeric_fields_recompute_subtotal() {
        let line = OfferLine::blank()
            .with_field(LineField::Qty, "3")
            .with_field(LineField::Price, "50000");
        assert_eq!(line.subtotal(), Rupiah::from(150_000));
    }

    #[test]
    fn test_invalid_numbers_coerce_to_zero() {
        let line = OfferLine::blank()
            .with_field(LineField::Qty, "4")
            .with_field(LineField::Price, "1000")
            .with_field(LineField::Price, "abc");
        assert_eq!(line.price(), Rupiah::ZERO);
        assert_eq!(line.subtotal(), Rupiah::ZERO);

        let line = OfferLine::blank().with_field(LineField::Qty, "");
        assert_eq!(line.qty(), 0);
        assert_eq!(OfferLine::blank().with_field(LineField::Qty, "-2").qty(), 0);
        assert_eq!(OfferLine::blank().with_field(LineField::Qty, "2.5").qty(), 0);
        assert_eq!(OfferLine::blank().with_field(LineField::Qty, "2.0").qty(), 2);
        assert_eq!(
            OfferLine::blank().with_field(LineField::Price, "-10").price(),
            Rupiah::ZERO
        );
    }

    #[test]
    fn test_values_above_limit_coerce_to_zero() {
        let line = OfferLine::blank()
            .with_field(LineField::Qty, "2")
            .with_field(LineField::Price, "79228162514264337593543950335");
        assert_eq!(line.price(), Rupiah::ZERO);
        assert_eq!(line.subtotal(), Rupiah::ZERO);

        let line = OfferLine::blank()
            .with_field(LineField::Qty, "1000001")
            .with_field(LineField::Price, "5000");
        assert_eq!(line.qty(), 0);
        assert_eq!(line.subtotal(), Rupiah::ZERO);
    }

    #[test]
    fn test_largest_line_keeps_exact_subtotal() {
        let line = OfferLine::blank()
            .with_field(LineField::Qty, &MAX_QTY.to_string())
            .with_field(LineField::Price, &MAX_PRICE.to_string());
        assert_eq!(
            line.subtotal(),
            Rupiah::new(Decimal::from(MAX_PRICE) * Decimal::from(MAX_QTY))
        );
    }

    #[test]
    fn test_text_fields_are_stored_raw() {
        let line = OfferLine::blank()
            .with_field(LineField::Name, "  Kemeja PDH ")
            .with_field(LineField::Material, "American Drill")
            .with_field(LineField::Unit, "stel")
            .with_field(LineField::Gender, "Perempuan");
        assert_eq!(line.name(), "  Kemeja PDH ");
        assert_eq!(line.material(), "American Drill");
        assert_eq!(line.unit(), "stel");
        assert_eq!(line.gender(), Gender::Perempuan);

        assert_eq!(line.with_field(LineField::Gender, "lainnya").gender(), Gender::Unset);
    }

    #[test]
    fn test_line_field_names() {
        assert_eq!("qty".parse::<LineField>().unwrap(), LineField::Qty);
        assert_eq!("quantity".parse::<LineField>().unwrap(), LineField::Qty);
        assert_eq!("price".parse::<LineField>().unwrap(), LineField::Price);
        assert!("subtotal".parse::<LineField>().is_err());
        assert_eq!(LineField::Material.as_str(), "material");
    }

    #[test]
    fn test_line_wire_format() {
        let line = OfferLine::blank()
            .with_field(LineField::Name, "Kemeja")
            .with_field(LineField::Gender, "Laki-laki")
            .with_field(LineField::Qty, "2")
            .with_field(LineField::Price, "75000");
        let json = serde_json::to_value(&line).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "Kemeja",
                "gender": "Laki-laki",
                "material": "",
                "qty": 2,
                "unit": "pcs",
                "price": 75000,
                "subtotal": 150000
            })
        );
    }

    #[test]
    fn test_offer_summary_from_store_row() {
        let row = r#"{
            "id": 12,
            "offer_number": "PNW/2025/012",
            "total_amount": 350000,
            "pdf_url": "https://files.example.com/offers/12.pdf",
            "created_at": "2025-03-04T05:06:07.123456+00:00",
            "leads": {"name": "SMK Negeri 1"}
        }"#;
        let summary: OfferSummary = serde_json::from_str(row).unwrap();
        assert_eq!(summary.lead_name(), "SMK Negeri 1");
        assert_eq!(summary.total(), Rupiah::from(350_000));

        let orphan: OfferSummary = serde_json::from_str(
            r#"{"id":1,"offer_number":null,"total_amount":null,"pdf_url":null,"created_at":"2025-03-04T05:06:07Z","leads":null}"#,
        )
        .unwrap();
        assert_eq!(orphan.lead_name(), "");
        assert_eq!(orphan.total(), Rupiah::ZERO);
    }
}
