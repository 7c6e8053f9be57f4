//! Types Module
//!
//! クレート全体で使用する共通データ型を定義するモジュール。

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::error::MapSheetError;

/// セル座標（1始まり）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellCoord {
    pub row: u32,
    pub col: u32,
}

impl CellCoord {
    /// 新しい座標を生成
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// A1形式の文字列に変換（例: (1, 1) -> "A1"）
    pub fn to_reference(&self) -> Result<String, MapSheetError> {
        crate::reference::encode(self.row, self.col)
    }
}

/// セルの`t`属性で宣言されたデータ型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellDataType {
    /// 共有文字列テーブルへのインデックス（`t="s"`）
    SharedString,
    /// 論理値（`t="b"`）
    Boolean,
    /// 数値（`t="n"`）
    Number,
    /// インライン文字列（`t="inlineStr"`）
    InlineString,
    /// 数式の文字列結果（`t="str"`）
    FormulaString,
    /// エラー値（`t="e"`）
    Error,
    /// ISO 8601日付（`t="d"`）
    Date,
}

impl CellDataType {
    /// `t`属性の値からデータ型を判定
    ///
    /// 未知の値の場合は`None`を返します（型宣言なしとして扱う）。
    pub fn from_attribute(value: &str) -> Option<Self> {
        match value {
            "s" => Some(Self::SharedString),
            "b" => Some(Self::Boolean),
            "n" => Some(Self::Number),
            "inlineStr" => Some(Self::InlineString),
            "str" => Some(Self::FormulaString),
            "e" => Some(Self::Error),
            "d" => Some(Self::Date),
            _ => None,
        }
    }
}

/// ワークシートXMLから読み取った生のセル（`<c>`要素）
///
/// 値の解釈は行わず、`CellResolver`が読み取り専用で参照します。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawCell {
    /// セル参照（`r`属性、例: "A1"）
    pub reference: String,
    /// 宣言されたデータ型。`t`属性がない場合は`None`
    pub data_type: Option<CellDataType>,
    /// 数式（`<f>`要素のテキスト、先頭の`=`なし）
    pub formula: Option<String>,
    /// 格納値（`<v>`要素のテキスト）
    pub value: Option<String>,
    /// インライン文字列（`<is>`要素内のテキスト）
    pub inline_text: Option<String>,
}

impl RawCell {
    /// 参照文字列のみを持つ空のセルを生成
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            ..Self::default()
        }
    }

    pub fn with_type(mut self, data_type: CellDataType) -> Self {
        self.data_type = Some(data_type);
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_formula(mut self, formula: impl Into<String>) -> Self {
        self.formula = Some(formula.into());
        self
    }

    pub fn with_inline_text(mut self, text: impl Into<String>) -> Self {
        self.inline_text = Some(text.into());
        self
    }

    /// 子要素のテキストを文書順（数式、値、インライン文字列）に連結したもの
    pub fn inner_text(&self) -> String {
        let mut text = String::new();
        for part in [&self.formula, &self.value, &self.inline_text]
            .into_iter()
            .flatten()
        {
            text.push_str(part);
        }
        text
    }
}

/// 1枚のワークシート
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Worksheet {
    /// シート名（`xl/workbook.xml`の`name`属性）
    pub name: String,
    /// セルの一覧（文書順）
    pub cells: Vec<RawCell>,
}

impl Worksheet {
    pub fn new(name: impl Into<String>, cells: Vec<RawCell>) -> Self {
        Self {
            name: name.into(),
            cells,
        }
    }

    /// 参照文字列に一致する最初のセルを検索（大文字・小文字を区別しない）
    pub fn find(&self, reference: &str) -> Option<&RawCell> {
        self.cells
            .iter()
            .find(|cell| cell.reference.eq_ignore_ascii_case(reference))
    }
}

/// 解析済みのワークブック
///
/// ワークシートはワークブック内の定義順に並びます。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    pub worksheets: Vec<Worksheet>,
    /// 共有文字列テーブル。`xl/sharedStrings.xml`が存在しない場合は`None`
    pub shared_strings: Option<Vec<String>>,
}

/// N×Nのトークングリッド（行優先、上から下、左から右）
pub type MapGrid = Vec<Vec<String>>;

/// 1枚のワークシートから抽出したマップ定義
///
/// JSONのフィールド名はlower camel caseです。値が`None`のフィールドは出力されません。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation_count: Option<i64>,
    pub map: MapGrid,
    /// ブロックされたセル（"行_列"、0始まり）
    #[serde(rename = "block", skip_serializing_if = "Option::is_none")]
    pub blocked_cells: Option<BTreeSet<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence: Option<Vec<String>>,
}

/// 1つのワークブックから生成されるアップロード用ドキュメント（シート名 -> 抽出結果）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct WorkbookDocument {
    pub sheets: BTreeMap<String, ExtractionResult>,
}

impl WorkbookDocument {
    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    pub fn to_json(&self) -> Result<String, MapSheetError> {
        Ok(serde_json::to_string(self)?)
    }
}
