//! 报价明细编辑器
//!
//! 维护一个有序的明细行序列，保证：
//! - 序列长度始终 ≥ 1
//! - 每次修改后各行 `subtotal == qty × price`
//! - 合计金额每次查询时重新计算，不单独存储

use serde::Serialize;
use tracing::debug;
use uos_errors::{AppError, AppResult};

use crate::lead::LeadId;
use crate::money::Rupiah;
use crate::offer::{LineField, OfferLine};

/// 提交给 PDF 生成服务的动作名
pub const OFFER_ACTION: &str = "offer";

/// 报价草稿编辑器
#[derive(Debug, Clone, PartialEq)]
pub struct OfferEditor {
    lines: Vec<OfferLine>,
}

impl Default for OfferEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl OfferEditor {
    /// 初始化：只包含一行空白明细
    pub fn new() -> Self {
        Self {
            lines: vec![OfferLine::blank()],
        }
    }

    pub fn lines(&self) -> &[OfferLine] {
        &self.lines
    }

    pub fn line(&self, index: usize) -> Option<&OfferLine> {
        self.lines.get(index)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// 永远为 false，保留给集合语义
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn check_index(&self, index: usize) -> AppResult<()> {
        if index >= self.lines.len() {
            return Err(AppError::validation(format!(
                "Baris {} tidak ada (jumlah baris {})",
                index,
                self.lines.len()
            )));
        }
        Ok(())
    }

    /// 更新某行的一个字段，返回更新后的行
    pub fn update_field(
        &mut self,
        index: usize,
        field: LineField,
        raw_value: &str,
    ) -> AppResult<&OfferLine> {
        self.check_index(index)?;

        let line = std::mem::take(&mut self.lines[index]);
        self.lines[index] = line.with_field(field, raw_value);

        Ok(&self.lines[index])
    }

    /// 末尾追加一行空白明细，返回新长度
    pub fn add_row(&mut self) -> usize {
        self.lines.push(OfferLine::blank());
        self.lines.len()
    }

    /// 删除一行；只剩一行时不做任何操作
    pub fn remove_row(&mut self, index: usize) -> AppResult<()> {
        self.check_index(index)?;

        if self.lines.len() == 1 {
            debug!("Refusing to remove the last offer line");
            return Ok(());
        }

        self.lines.remove(index);
        Ok(())
    }

    /// 合计金额
    pub fn grand_total(&self) -> Rupiah {
        self.lines.iter().map(OfferLine::subtotal).sum()
    }

    /// 生成提交载荷，不修改编辑器状态
    pub fn serialize(&self, lead_id: LeadId, note: &str) -> AppResult<OfferPayload> {
        if !lead_id.is_valid() {
            return Err(AppError::validation(format!(
                "ID customer tidak valid: {}",
                lead_id
            )));
        }

        Ok(OfferPayload {
            action: OFFER_ACTION,
            lead_id,
            items: self.lines.clone(),
            note: note.to_string(),
        })
    }
}

/// PDF 生成服务的请求载荷
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OfferPayload {
    pub action: &'static str,
    pub lead_id: LeadId,
    pub items: Vec<OfferLine>,
    pub note: String,
}

impl OfferPayload {
    pub fn grand_total(&self) -> Rupiah {
        self.items.iter().map(OfferLine::subtotal).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_consistent(editor: &OfferEditor) {
        for line in editor.lines() {
            assert_eq!(line.subtotal(), line.price() * line.qty());
        }
        let expected: Rupiah = editor.lines().iter().map(|l| l.subtotal()).sum();
        assert_eq!(editor.grand_total(), expected);
        assert!(editor.len() >= 1);
    }

    fn editor_with_subtotals(prices: &[&str]) -> OfferEditor {
        let mut editor = OfferEditor::new();
        for (i, price) in prices.iter().enumerate() {
            if i > 0 {
                editor.add_row();
            }
            editor.update_field(i, LineField::Price, price).unwrap();
        }
        editor
    }

    #[test]
    fn test_initialize() {
        let editor = OfferEditor::new();
        assert_eq!(editor.len(), 1);
        assert!(!editor.is_empty());
        assert_eq!(editor.line(0), Some(&OfferLine::blank()));
        assert_eq!(editor.grand_total(), Rupiah::ZERO);
    }

    #[test]
    fn test_scenario_qty_then_price() {
        let mut editor = OfferEditor::new();
        editor.update_field(0, LineField::Qty, "3").unwrap();
        let line = editor.update_field(0, LineField::Price, "50000").unwrap();
        assert_eq!(line.subtotal(), Rupiah::from(150_000));
        assert_eq!(editor.grand_total(), Rupiah::from(150_000));
    }

    #[test]
    fn test_scenario_remove_row_updates_total() {
        let mut editor = editor_with_subtotals(&["10000", "25000"]);
        assert_eq!(editor.grand_total(), Rupiah::from(35_000));

        editor.remove_row(0).unwrap();
        assert_eq!(editor.len(), 1);
        assert_eq!(editor.grand_total(), Rupiah::from(25_000));
    }

    #[test]
    fn test_scenario_non_numeric_price() {
        let mut editor = OfferEditor::new();
        editor.update_field(0, LineField::Qty, "2").unwrap();
        editor.update_field(0, LineField::Price, "40000").unwrap();
        let line = editor.update_field(0, LineField::Price, "abc").unwrap();
        assert_eq!(line.price(), Rupiah::ZERO);
        assert_eq!(line.subtotal(), Rupiah::ZERO);
    }

    #[test]
    fn test_remove_last_row_is_noop() {
        let mut editor = OfferEditor::new();
        editor.update_field(0, LineField::Name, "Kemeja").unwrap();
        let before = editor.clone();

        editor.remove_row(0).unwrap();
        assert_eq!(editor, before);
        assert_eq!(editor.len(), 1);
    }

    #[test]
    fn test_remove_row_preserves_order() {
        let mut editor = OfferEditor::new();
        editor.add_row();
        editor.add_row();
        for (i, name) in ["A", "B", "C"].iter().enumerate() {
            editor.update_field(i, LineField::Name, name).unwrap();
        }

        editor.remove_row(1).unwrap();
        let names: Vec<&str> = editor.lines().iter().map(|l| l.name()).collect();
        assert_eq!(names, vec!["A", "C"]);
    }

    #[test]
    fn test_add_row_appends_blank() {
        let mut editor = editor_with_subtotals(&["5000"]);
        let before = editor.len();
        let new_len = editor.add_row();
        assert_eq!(new_len, before + 1);
        assert_eq!(editor.len(), before + 1);
        assert_eq!(editor.lines()[new_len - 1].subtotal(), Rupiah::ZERO);
        assert_eq!(editor.lines()[new_len - 1], OfferLine::blank());
    }

    #[test]
    fn test_index_out_of_range() {
        let mut editor = OfferEditor::new();
        assert!(matches!(
            editor.update_field(1, LineField::Qty, "2"),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(editor.remove_row(3), Err(AppError::Validation(_))));
        assert_eq!(editor, OfferEditor::new());
    }

    #[test]
    fn test_every_update_keeps_lines_consistent() {
        let mut editor = OfferEditor::new();
        editor.add_row();
        editor.add_row();

        let edits: &[(usize, LineField, &str)] = &[
            (0, LineField::Qty, "4"),
            (1, LineField::Price, "12500"),
            (0, LineField::Price, "30000"),
            (2, LineField::Qty, "x"),
            (1, LineField::Qty, "10"),
            (2, LineField::Price, "99999"),
            (0, LineField::Name, "Kemeja PDL"),
            (1, LineField::Unit, "stel"),
            (2, LineField::Qty, "7"),
            (0, LineField::Qty, ""),
            (1, LineField::Gender, "Perempuan"),
        ];

        for (index, field, raw) in edits {
            editor.update_field(*index, *field, raw).unwrap();
            assert_consistent(&editor);
        }

        assert_eq!(editor.grand_total(), Rupiah::from(125_000 + 99_999 * 7));
    }

    #[test]
    fn test_grand_total_at_limits_is_exact() {
        let mut editor = OfferEditor::new();
        while editor.len() < 200 {
            editor.add_row();
        }
        for index in 0..editor.len() {
            editor
                .update_field(index, LineField::Qty, &crate::offer::MAX_QTY.to_string())
                .unwrap();
            editor
                .update_field(index, LineField::Price, &crate::offer::MAX_PRICE.to_string())
                .unwrap();
        }

        let line_total = rust_decimal::Decimal::from(crate::offer::MAX_QTY)
            * rust_decimal::Decimal::from(crate::offer::MAX_PRICE);
        assert_eq!(
            editor.grand_total(),
            Rupiah::new(line_total * rust_decimal::Decimal::from(200))
        );
        assert_consistent(&editor);
    }

    #[test]
    fn test_serialize_keeps_order_and_state() {
        let mut editor = editor_with_subtotals(&["1000", "2000", "3000"]);
        editor.update_field(2, LineField::Name, "Rompi").unwrap();
        let before = editor.clone();

        let payload = editor.serialize(LeadId(8), "DP 50%").unwrap();
        assert_eq!(editor, before);
        assert_eq!(payload.action, "offer");
        assert_eq!(payload.lead_id, LeadId(8));
        assert_eq!(payload.note, "DP 50%");
        assert_eq!(payload.items.len(), 3);
        assert_eq!(payload.items.as_slice(), editor.lines());
        assert_eq!(payload.grand_total(), Rupiah::from(6_000));
    }

    #[test]
    fn test_serialize_rejects_invalid_lead() {
        let editor = OfferEditor::new();
        assert!(matches!(editor.serialize(LeadId(0), ""), Err(AppError::Validation(_))));
        assert!(matches!(editor.serialize(LeadId(-1), ""), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_payload_wire_format() {
        let mut editor = OfferEditor::new();
        editor.update_field(0, LineField::Name, "Kemeja").unwrap();
        editor.update_field(0, LineField::Qty, "3").unwrap();
        editor.update_field(0, LineField::Price, "50000").unwrap();

        let json = serde_json::to_value(editor.serialize(LeadId(3), "catatan").unwrap()).unwrap();
        assert_eq!(json["action"], "offer");
        assert_eq!(json["lead_id"], 3);
        assert_eq!(json["note"], "catatan");
        assert_eq!(json["items"][0]["qty"], 3);
        assert_eq!(json["items"][0]["subtotal"], 150000);
    }
}
