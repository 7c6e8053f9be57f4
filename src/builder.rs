//! Builder Module
//!
//! Fluent Builder APIを提供し、`Extractor`インスタンスを段階的に構築する。

use crate::api::{FormulaMode, MetadataMode, ValidationMode};
use crate::error::MapSheetError;
use crate::extractor::Extractor;
use crate::vocabulary::Vocabulary;

/// マップサイズの上限（含む）
pub const MAX_MAP_SIZE: i64 = 7;

/// 抽出処理の設定を保持する内部構造体
#[derive(Debug, Clone)]
pub(crate) struct ExtractionConfig {
    /// グリッドの検証方式
    pub validation: ValidationMode,

    /// 出力するメタデータの範囲
    pub metadata_mode: MetadataMode,

    /// 数式セルの解決モード
    pub formula_mode: FormulaMode,

    /// 厳格モードで使用する語彙
    pub vocabulary: Vocabulary,

    /// A1が空の場合に使用するマップサイズ（`None`の場合はエラー）
    pub size_default: Option<i64>,

    /// マップサイズの上限
    pub max_size: i64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            validation: ValidationMode::Strict,
            metadata_mode: MetadataMode::Chapter,
            formula_mode: FormulaMode::CachedValue,
            vocabulary: Vocabulary::default(),
            size_default: None,
            max_size: MAX_MAP_SIZE,
        }
    }
}

/// Fluent Builder APIを提供する構造体
///
/// すべての設定項目にデフォルト値が設定されており、必要な設定のみをオーバーライドできます。
///
/// # 使用例
///
/// ```rust
/// use mapsheet::{ExtractorBuilder, MetadataMode, ValidationMode};
///
/// # fn main() -> Result<(), mapsheet::MapSheetError> {
/// let extractor = ExtractorBuilder::new()
///     .with_validation(ValidationMode::Lenient)
///     .with_metadata_mode(MetadataMode::Answer)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ExtractorBuilder {
    config: ExtractionConfig,
}

impl ExtractorBuilder {
    /// デフォルト設定を持つビルダーインスタンスを生成する
    ///
    /// # デフォルト設定
    ///
    /// - 検証方式: 厳格（標準の語彙）
    /// - メタデータ: チャプター
    /// - 数式モード: キャッシュ値
    /// - A1が空の場合: エラー
    /// - マップサイズの上限: 7
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_validation(mut self, mode: ValidationMode) -> Self {
        self.config.validation = mode;
        self
    }

    pub fn with_metadata_mode(mut self, mode: MetadataMode) -> Self {
        self.config.metadata_mode = mode;
        self
    }

    pub fn with_formula_mode(mut self, mode: FormulaMode) -> Self {
        self.config.formula_mode = mode;
        self
    }

    /// 厳格モードで使用する語彙を指定する
    pub fn with_vocabulary(mut self, vocabulary: Vocabulary) -> Self {
        self.config.vocabulary = vocabulary;
        self
    }

    /// A1が空の場合のマップサイズを指定する
    ///
    /// 値は`build()`で0以上上限以下であることを検証し、抽出時はそのまま使用して警告ログを出力します。
    /// 指定しない場合、A1が空のワークシートは`MapSheetError::MissingData`で失敗します。
    pub fn with_size_default(mut self, size: i64) -> Self {
        self.config.size_default = Some(size);
        self
    }

    /// マップサイズの上限を指定する（1以上7以下）
    pub fn with_max_size(mut self, max_size: i64) -> Self {
        self.config.max_size = max_size;
        self
    }

    /// 設定を検証し、`Extractor`インスタンスを生成する
    ///
    /// # 発生し得るエラー
    ///
    /// * `MapSheetError::Config(String)`: 設定の検証に失敗した場合
    ///   * マップサイズの上限が1..=7の範囲外
    ///   * デフォルトのマップサイズが負、または上限を超える
    ///   * 厳格モードで語彙が空
    pub fn build(self) -> Result<Extractor, MapSheetError> {
        let config = self.config;

        if !(1..=MAX_MAP_SIZE).contains(&config.max_size) {
            return Err(MapSheetError::Config(format!(
                "Invalid max map size: {} (expected 1..={})",
                config.max_size, MAX_MAP_SIZE
            )));
        }

        if let Some(size) = config.size_default {
            if size < 0 || size > config.max_size {
                return Err(MapSheetError::Config(format!(
                    "Invalid default map size: {} (expected 0..={})",
                    size, config.max_size
                )));
            }
        }

        if config.validation == ValidationMode::Strict && config.vocabulary.is_empty() {
            return Err(MapSheetError::Config(
                "Strict validation requires a non-empty vocabulary".to_string(),
            ));
        }

        Ok(Extractor::new(config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let builder = ExtractorBuilder::new();
        assert_eq!(builder.config.validation, ValidationMode::Strict);
        assert_eq!(builder.config.metadata_mode, MetadataMode::Chapter);
        assert_eq!(builder.config.formula_mode, FormulaMode::CachedValue);
        assert_eq!(builder.config.size_default, None);
        assert_eq!(builder.config.max_size, 7);
        assert!(builder.build().is_ok());
    }

    #[test]
    fn test_builder_method_chaining() {
        let builder = ExtractorBuilder::new()
            .with_validation(ValidationMode::Lenient)
            .with_metadata_mode(MetadataMode::Answer)
            .with_formula_mode(FormulaMode::Formula)
            .with_size_default(0)
            .with_max_size(5);

        assert_eq!(builder.config.validation, ValidationMode::Lenient);
        assert_eq!(builder.config.metadata_mode, MetadataMode::Answer);
        assert_eq!(builder.config.formula_mode, FormulaMode::Formula);
        assert_eq!(builder.config.size_default, Some(0));
        assert_eq!(builder.config.max_size, 5);
    }

    #[test]
    fn test_build_rejects_invalid_max_size() {
        for max_size in [0, 8, -1] {
            let result = ExtractorBuilder::new().with_max_size(max_size).build();
            assert!(matches!(result, Err(MapSheetError::Config(_))));
        }
    }

    #[test]
    fn test_build_rejects_invalid_size_default() {
        let result = ExtractorBuilder::new().with_size_default(-1).build();
        assert!(matches!(result, Err(MapSheetError::Config(_))));

        let result = ExtractorBuilder::new()
            .with_max_size(3)
            .with_size_default(4)
            .build();
        assert!(matches!(result, Err(MapSheetError::Config(_))));
    }

    #[test]
    fn test_build_rejects_empty_vocabulary_in_strict_mode() {
        let empty = Vocabulary::new(Vec::<String>::new());

        let result = ExtractorBuilder::new()
            .with_vocabulary(empty.clone())
            .build();
        assert!(matches!(result, Err(MapSheetError::Config(_))));

        let result = ExtractorBuilder::new()
            .with_validation(ValidationMode::Lenient)
            .with_vocabulary(empty)
            .build();
        assert!(result.is_ok());
    }
}
