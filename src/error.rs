//! Error Types Module
//!
//! クレート全体で使用する構造化エラー型を定義するモジュール。
//! `thiserror`を使用して、エラーの自動変換とメッセージフォーマットを実現する。

use thiserror::Error;

/// mapsheetクレート全体で使用するエラー型
///
/// ワークブックの読み込み、セル値の解決、マップの抽出、アップロードの各段階で
/// 発生するエラーを統一的に扱います。
///
/// # エラーの種類
///
/// - `Format` / `Range` / `Vocabulary` / `MissingData`: ワークシート単位の抽出エラー
/// - `SharedStringIndex`: 共有文字列テーブルの破損
/// - `Reference` / `InvalidArgument`: セル参照コーデックの契約違反
/// - `Transport`: アップロード境界でのみ発生
///
/// 1つのワークシートで発生したエラーは、そのシートの抽出だけを中断します。
/// バッチ全体を止めるかどうかは呼び出し側（`BatchProcessor`）が決めます。
#[derive(Error, Debug)]
pub enum MapSheetError {
    /// I/O操作中に発生したエラー
    ///
    /// `#[from]`属性により、`std::io::Error`から自動的に変換されます。
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIPアーカイブの解析エラー
    #[error("ZIP archive error: {0}")]
    Zip(String),

    /// XMLの解析エラー
    #[error("XML parse error: {0}")]
    Xml(String),

    /// UTF-8文字列の変換エラー
    #[error("UTF-8 conversion error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// JSONのシリアライズ・デシリアライズエラー
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// 設定の検証に失敗したエラー
    ///
    /// `ExtractorBuilder::build()`時に無効な設定が検出された場合に発生します。
    #[error("Configuration error: {0}")]
    Config(String),

    /// セキュリティ制限に違反したエラー
    ///
    /// ZIP bomb、パストラバーサル、ファイルサイズ制限などに違反した場合に発生します。
    #[error("Security violation: {0}")]
    SecurityViolation(String),

    /// 0行目・0列目など、コーデックに渡された座標が不正
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A1形式として解釈できないセル参照文字列
    #[error("Malformed cell reference: '{0}'")]
    Reference(String),

    /// 数値として解釈できない値
    ///
    /// # 例
    ///
    /// ```rust
    /// use mapsheet::MapSheetError;
    ///
    /// let error = MapSheetError::Format {
    ///     cell: "A1".to_string(),
    ///     value: "abc".to_string(),
    ///     expected: "map size".to_string(),
    /// };
    /// assert_eq!(
    ///     error.to_string(),
    ///     "Invalid map size in cell A1: 'abc' is not a number"
    /// );
    /// ```
    #[error("Invalid {expected} in cell {cell}: '{value}' is not a number")]
    Format {
        /// セル座標（A1記法）
        cell: String,
        /// 読み取った値
        value: String,
        /// 期待していた値の名前（例: "map size"）
        expected: String,
    },

    /// 許容範囲外の数値
    #[error("Invalid {name} in cell {cell}: {value} is outside {}", describe_bounds(.min, .max))]
    Range {
        /// セル座標（A1記法）
        cell: String,
        /// 値の名前
        name: String,
        /// 読み取った値
        value: i64,
        /// 下限（含む）
        min: i64,
        /// 上限（含む）。`None`の場合は上限なし
        max: Option<i64>,
    },

    /// 厳格モードで語彙に含まれないトークンが検出された
    #[error("Unknown token '{value}' at cell {cell}")]
    Vocabulary {
        /// セル座標（A1記法）
        cell: String,
        /// 語彙外のトークン
        value: String,
    },

    /// 必須セルが空、またはデフォルト値が定義されていない
    #[error("Missing {what} in cell {cell}")]
    MissingData {
        /// セル座標（A1記法）
        cell: String,
        /// 欠落している値の名前
        what: String,
    },

    /// 共有文字列インデックスがテーブルの範囲外
    #[error("Shared string index {index} at cell {cell} is out of range (table size: {len})")]
    SharedStringIndex {
        /// セル座標（A1記法）
        cell: String,
        /// セルに格納されていたインデックス
        index: usize,
        /// 共有文字列テーブルの要素数
        len: usize,
    },

    /// アップロード先との通信エラー
    ///
    /// HTTPステータスが成功以外の場合は、ステータスとレスポンス本文を含みます。
    #[error("Transport error for '{key}': {message}")]
    Transport {
        /// アップロード先のキー（例: "chapters/Chapter1.json"）
        key: String,
        /// 詳細メッセージ
        message: String,
    },
}

fn describe_bounds(min: &i64, max: &Option<i64>) -> String {
    match max {
        Some(max) => format!("{}..={}", min, max),
        None => format!(">= {}", min),
    }
}

impl MapSheetError {
    /// エラーが特定のセルに起因する場合、そのセル座標を返す
    pub fn cell(&self) -> Option<&str> {
        match self {
            MapSheetError::Format { cell, .. }
            | MapSheetError::Range { cell, .. }
            | MapSheetError::Vocabulary { cell, .. }
            | MapSheetError::MissingData { cell, .. }
            | MapSheetError::SharedStringIndex { cell, .. } => Some(cell),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_io_error() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error: MapSheetError = io_err.into();

        match error {
            MapSheetError::Io(e) => {
                assert_eq!(e.kind(), io::ErrorKind::NotFound);
                assert_eq!(e.to_string(), "File not found");
            }
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_range_error_display_with_upper_bound() {
        let error = MapSheetError::Range {
            cell: "A1".to_string(),
            name: "map size".to_string(),
            value: 9,
            min: 1,
            max: Some(7),
        };
        assert_eq!(
            error.to_string(),
            "Invalid map size in cell A1: 9 is outside 1..=7"
        );
    }

    #[test]
    fn test_range_error_display_without_upper_bound() {
        let error = MapSheetError::Range {
            cell: "B1".to_string(),
            name: "rotation count".to_string(),
            value: -1,
            min: 0,
            max: None,
        };
        assert_eq!(
            error.to_string(),
            "Invalid rotation count in cell B1: -1 is outside >= 0"
        );
    }

    #[test]
    fn test_vocabulary_error_names_cell_and_value() {
        let error = MapSheetError::Vocabulary {
            cell: "B3".to_string(),
            value: "XYZ".to_string(),
        };
        let msg = error.to_string();
        assert!(msg.contains("B3"));
        assert!(msg.contains("XYZ"));
    }

    #[test]
    fn test_cell_accessor() {
        let error = MapSheetError::MissingData {
            cell: "A1".to_string(),
            what: "map size".to_string(),
        };
        assert_eq!(error.cell(), Some("A1"));

        let error = MapSheetError::Config("bad".to_string());
        assert_eq!(error.cell(), None);
    }

    #[test]
    fn test_error_conversion_with_question_mark() {
        fn io_operation() -> Result<(), MapSheetError> {
            let _file = std::fs::File::open("nonexistent_file.xlsm")?;
            Ok(())
        }

        match io_operation() {
            Err(MapSheetError::Io(_)) => {}
            _ => panic!("Expected Io error from ? operator"),
        }
    }

    #[test]
    fn test_json_error_conversion() {
        let err = serde_json::from_str::<Vec<String>>("not json").unwrap_err();
        let error: MapSheetError = err.into();
        assert!(error.to_string().starts_with("JSON error"));
    }
}
