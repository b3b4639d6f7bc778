//! 报价编辑页
//!
//! 编辑器状态完全由表单往返：`items[<i>][<field>]`、`note` 和 `action`。
//! 每次提交都按行数重建编辑器并按顺序重放字段，金额从不取自表单。

use std::str::FromStr;

use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tracing::debug;
use uos_domain_core::{Lead, LeadId, LineField, OfferEditor};
use uos_errors::{AppError, AppResult};

use crate::application::GenerateOfferCommand;
use crate::layout::Layout;
use crate::session::{CurrentSession, offer_pdf_cookie, with_cookies};
use crate::state::AppState;
use crate::views::OfferFormPage;

/// 单个报价的最大行数
pub const MAX_ROWS: usize = 200;

/// 表单提交动作
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FormAction {
    AddRow,
    RemoveRow(usize),
    #[default]
    Recalculate,
    Generate,
}

impl FromStr for FormAction {
    type Err = AppError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "add_row" => Ok(Self::AddRow),
            "recalculate" => Ok(Self::Recalculate),
            "generate" => Ok(Self::Generate),
            other => other
                .strip_prefix("remove_row:")
                .and_then(|index| index.parse().ok())
                .map(Self::RemoveRow)
                .ok_or_else(|| AppError::validation(format!("Aksi tidak dikenal: {}", raw))),
        }
    }
}

/// 解析后的报价表单
#[derive(Debug, Clone)]
pub struct OfferForm {
    pub editor: OfferEditor,
    pub note: String,
    pub action: FormAction,
}

/// `items[3][price]` → (3, "price")
fn parse_item_key(key: &str) -> Option<(&str, &str)> {
    let rest = key.strip_prefix("items[")?.strip_suffix(']')?;
    rest.split_once("][")
}

impl OfferForm {
    /// 从表单键值对重建编辑器
    pub fn from_pairs(pairs: Vec<(String, String)>) -> AppResult<Self> {
        let mut edits = Vec::new();
        let mut note = String::new();
        let mut action = FormAction::default();

        for (key, value) in pairs {
            match key.as_str() {
                "note" => note = value,
                "action" => action = value.parse()?,
                _ => {
                    let Some((index, field)) = parse_item_key(&key) else {
                        debug!(key = %key, "Ignoring unknown form field");
                        continue;
                    };
                    let index: usize = index
                        .parse()
                        .map_err(|_| AppError::validation(format!("Baris tidak valid: {}", key)))?;
                    if index >= MAX_ROWS {
                        return Err(AppError::validation(format!(
                            "Maksimal {} baris per penawaran",
                            MAX_ROWS
                        )));
                    }
                    edits.push((index, field.parse::<LineField>()?, value));
                }
            }
        }

        let rows = edits.iter().map(|(index, _, _)| index + 1).max().unwrap_or(1);
        let mut editor = OfferEditor::new();
        while editor.len() < rows {
            editor.add_row();
        }
        for (index, field, value) in &edits {
            editor.update_field(*index, *field, value)?;
        }

        Ok(Self {
            editor,
            note,
            action,
        })
    }

    /// 应用行操作；生成动作由调用方处理
    pub fn apply_action(&mut self) -> AppResult<()> {
        match self.action {
            FormAction::AddRow if self.editor.len() >= MAX_ROWS => Err(AppError::validation(
                format!("Maksimal {} baris per penawaran", MAX_ROWS),
            )),
            FormAction::AddRow => {
                self.editor.add_row();
                Ok(())
            }
            FormAction::RemoveRow(index) => self.editor.remove_row(index),
            FormAction::Recalculate | FormAction::Generate => Ok(()),
        }
    }
}

/// GET /offers/new/{lead_id}
pub async fn show(
    State(state): State<AppState>,
    session: CurrentSession,
    layout: Layout,
    Path(lead_id): Path<String>,
) -> Response {
    let lead = match load_lead(&state, &session, &lead_id).await {
        Ok(lead) => lead,
        Err(e) => return state.views.error_response(layout, &e),
    };

    let page = OfferFormPage::new(layout, &lead, &OfferEditor::new(), "");
    match state.views.offer_form(&page) {
        Ok(html) => html.into_response(),
        Err(e) => e.into_response(),
    }
}

/// POST /offers/new/{lead_id}
///
/// 生成成功后回到仪表盘并打开文档；失败时原样回显编辑器内容和错误消息
pub async fn submit(
    State(state): State<AppState>,
    session: CurrentSession,
    layout: Layout,
    Path(lead_id): Path<String>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Response {
    let lead = match load_lead(&state, &session, &lead_id).await {
        Ok(lead) => lead,
        Err(e) => return state.views.error_response(layout, &e),
    };
    let mut form = match OfferForm::from_pairs(pairs) {
        Ok(form) => form,
        Err(e) => return state.views.error_response(layout, &e),
    };

    let outcome = match form.action {
        FormAction::Generate => {
            let cmd = GenerateOfferCommand {
                lead_id: lead.id,
                editor: form.editor.clone(),
                note: form.note.clone(),
            };
            match state.handler.generate_offer(&cmd).await {
                Ok(generated) => {
                    let redirect = Redirect::to("/").into_response();
                    return match offer_pdf_cookie(&state.session, &generated.pdf_url) {
                        Ok(cookie) => with_cookies(redirect, vec![cookie]),
                        Err(e) => e.into_response(),
                    };
                }
                Err(e) => Err(e),
            }
        }
        _ => form.apply_action(),
    };

    let mut page = OfferFormPage::new(layout, &lead, &form.editor, &form.note);
    let status = match outcome {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            let status = e.http_status();
            page = page.with_error(e.message());
            status
        }
    };

    match state.views.offer_form(&page) {
        Ok(html) => (status, html).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn load_lead(
    state: &AppState,
    session: &CurrentSession,
    raw_id: &str,
) -> AppResult<Lead> {
    let id = LeadId::parse(raw_id)?;
    state.handler.find_lead(session.token(), id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use uos_domain_core::Rupiah;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_action_parse() {
        assert_eq!("add_row".parse::<FormAction>().unwrap(), FormAction::AddRow);
        assert_eq!(
            "remove_row:2".parse::<FormAction>().unwrap(),
            FormAction::RemoveRow(2)
        );
        assert_eq!("generate".parse::<FormAction>().unwrap(), FormAction::Generate);
        assert!("remove_row:x".parse::<FormAction>().is_err());
        assert!("drop_table".parse::<FormAction>().is_err());
    }

    #[test]
    fn test_rebuild_editor_from_pairs() {
        let form = OfferForm::from_pairs(pairs(&[
            ("items[0][name]", "Kemeja"),
            ("items[0][qty]", "2"),
            ("items[0][price]", "10000"),
            ("items[0][subtotal]", "999999"),
            ("items[1][qty]", "1"),
            ("items[1][price]", "25000"),
            ("note", "Catatan"),
            ("action", "recalculate"),
        ]));
        // subtotal 不是可编辑字段
        assert!(form.is_err());

        let form = OfferForm::from_pairs(pairs(&[
            ("items[0][name]", "Kemeja"),
            ("items[0][qty]", "2"),
            ("items[0][price]", "10000"),
            ("items[1][qty]", "1"),
            ("items[1][price]", "25000"),
            ("note", "Catatan"),
            ("action", "recalculate"),
        ]))
        .unwrap();

        assert_eq!(form.editor.len(), 2);
        assert_eq!(form.editor.line(0).unwrap().name(), "Kemeja");
        assert_eq!(form.editor.line(0).unwrap().subtotal(), Rupiah::from(20_000));
        assert_eq!(form.editor.grand_total(), Rupiah::from(45_000));
        assert_eq!(form.note, "Catatan");
        assert_eq!(form.action, FormAction::Recalculate);
    }

    #[test]
    fn test_empty_form_has_one_blank_row() {
        let form = OfferForm::from_pairs(Vec::new()).unwrap();
        assert_eq!(form.editor, OfferEditor::new());
        assert_eq!(form.action, FormAction::Recalculate);
    }

    #[test]
    fn test_sparse_rows_are_filled_with_blanks() {
        let form = OfferForm::from_pairs(pairs(&[("items[2][qty]", "4")])).unwrap();
        assert_eq!(form.editor.len(), 3);
        assert_eq!(form.editor.line(1).unwrap().qty(), 1);
        assert_eq!(form.editor.line(2).unwrap().qty(), 4);
    }

    #[test]
    fn test_row_cap() {
        let err = OfferForm::from_pairs(pairs(&[("items[200][qty]", "1")])).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let mut form = OfferForm::from_pairs(pairs(&[
            ("items[199][qty]", "1"),
            ("action", "add_row"),
        ]))
        .unwrap();
        assert_eq!(form.editor.len(), MAX_ROWS);
        assert!(form.apply_action().is_err());
        assert_eq!(form.editor.len(), MAX_ROWS);
    }

    #[test]
    fn test_apply_remove_keeps_last_row() {
        let mut form = OfferForm::from_pairs(pairs(&[
            ("items[0][price]", "5000"),
            ("action", "remove_row:0"),
        ]))
        .unwrap();
        form.apply_action().unwrap();
        assert_eq!(form.editor.len(), 1);

        let mut form =
            OfferForm::from_pairs(pairs(&[("items[0][qty]", "1"), ("action", "remove_row:3")]))
                .unwrap();
        assert!(form.apply_action().is_err());
    }

    #[test]
    fn test_unrelated_fields_are_ignored() {
        let form = OfferForm::from_pairs(pairs(&[("csrf", "x"), ("items[0][unit]", "lusin")]))
            .unwrap();
        assert_eq!(form.editor.line(0).unwrap().unit(), "lusin");
    }
}
