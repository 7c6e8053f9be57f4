//! Cell Value Resolver Module
//!
//! セル参照から、そのセルの実効的なテキスト値を求めるモジュール。
//! 共有文字列インデックス、論理値、数式・生の値の3種類の格納形式を扱います。

use crate::api::FormulaMode;
use crate::error::MapSheetError;
use crate::types::{CellDataType, RawCell, Worksheet};

/// セル値リゾルバー
///
/// ワークシートと共有文字列テーブルを読み取り専用で借用します。
/// キャッシュは持たず、呼び出しごとにセル一覧を走査します。
#[derive(Debug, Clone, Copy)]
pub struct CellResolver<'a> {
    worksheet: &'a Worksheet,
    shared_strings: Option<&'a [String]>,
    formula_mode: FormulaMode,
}

impl<'a> CellResolver<'a> {
    pub fn new(worksheet: &'a Worksheet, shared_strings: Option<&'a [String]>) -> Self {
        Self {
            worksheet,
            shared_strings,
            formula_mode: FormulaMode::default(),
        }
    }

    pub fn with_formula_mode(mut self, mode: FormulaMode) -> Self {
        self.formula_mode = mode;
        self
    }

    /// ワークシート名を取得
    pub fn sheet_name(&self) -> &str {
        &self.worksheet.name
    }

    /// セル参照の実効値を取得
    ///
    /// # 引数
    ///
    /// * `reference` - A1記法のセル参照（大文字・小文字を区別しない）
    ///
    /// # 戻り値
    ///
    /// * `Ok(String)` - セルの値。セルが存在しない場合は空文字列
    /// * `Err(MapSheetError::Format)` - 共有文字列インデックスが整数でない場合
    /// * `Err(MapSheetError::SharedStringIndex)` - 共有文字列インデックスが範囲外の場合
    pub fn resolve(&self, reference: &str) -> Result<String, MapSheetError> {
        match self.worksheet.find(reference) {
            Some(cell) => self.resolve_cell(cell),
            None => Ok(String::new()),
        }
    }

    fn resolve_cell(&self, cell: &RawCell) -> Result<String, MapSheetError> {
        match cell.data_type {
            Some(CellDataType::SharedString) => {
                if let Some(table) = self.shared_strings {
                    return lookup_shared_string(cell, table);
                }
            }
            Some(CellDataType::Boolean) => {
                let text = if cell.inner_text() == "1" { "TRUE" } else { "FALSE" };
                return Ok(text.to_string());
            }
            _ => {}
        }

        if self.formula_mode == FormulaMode::Formula && cell.value.is_none() {
            if let Some(formula) = cell.formula.as_deref().filter(|f| !f.is_empty()) {
                return Ok(format!("={}", formula));
            }
        }

        Ok(cell
            .value
            .as_ref()
            .or(cell.inline_text.as_ref())
            .cloned()
            .unwrap_or_default())
    }
}

fn lookup_shared_string(cell: &RawCell, table: &[String]) -> Result<String, MapSheetError> {
    let text = cell.inner_text();
    let index: usize = text.trim().parse().map_err(|_| MapSheetError::Format {
        cell: cell.reference.clone(),
        value: text.clone(),
        expected: "shared string index".to_string(),
    })?;

    table
        .get(index)
        .cloned()
        .ok_or_else(|| MapSheetError::SharedStringIndex {
            cell: cell.reference.clone(),
            index,
            len: table.len(),
        })
}
