//! Vocabulary Module
//!
//! 厳格モードで受け入れるマップトークンの閉じた集合。

use std::collections::BTreeSet;

use crate::error::MapSheetError;

/// ロック状態のトークンに付く接頭辞（例: `L_CAT`）
pub const LOCKED_PREFIX: &str = "L_";

/// 組み込みの仮トークン（サンプルワークブック用）
///
/// 実際のプロジェクトでは、ゲームで使用するトークン一覧を`Vocabulary::from_json_str`
/// （CLIでは`--vocabulary`）で指定してください。
pub const DEFAULT_TOKENS: &[&str] = &[
    "ANT", "BAT", "BEE", "CAT", "COW", "DOG", "DUK", "FOX", "HEN", "OWL", "PIG", "RAT", "SHP",
    "BOX", "ROK", "EMP",
];

/// マップトークンの語彙
///
/// 基本トークンと、それに`LOCKED_PREFIX`を付けたロック版を受け入れます。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    tokens: BTreeSet<String>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::new(DEFAULT_TOKENS.iter().copied())
    }
}

impl Vocabulary {
    /// 基本トークンの一覧から語彙を生成
    ///
    /// 前後の空白は除去され、空のトークンは無視されます。
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tokens = tokens
            .into_iter()
            .map(|t| t.as_ref().trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        Self { tokens }
    }

    /// JSON配列（例: `["CAT", "DOG"]`）から語彙を読み込む
    pub fn from_json_str(json: &str) -> Result<Self, MapSheetError> {
        let tokens: Vec<String> = serde_json::from_str(json)?;
        Ok(Self::new(tokens))
    }

    /// トークンが語彙に含まれるかを判定（大文字・小文字を区別する）
    pub fn contains(&self, token: &str) -> bool {
        let base = token.strip_prefix(LOCKED_PREFIX).unwrap_or(token);
        self.tokens.contains(base)
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_accepts_base_and_locked_tokens() {
        let vocab = Vocabulary::default();
        assert!(vocab.contains("CAT"));
        assert!(vocab.contains("L_CAT"));
        assert!(!vocab.contains("cat"));
        assert!(!vocab.contains("XYZ"));
        assert!(!vocab.contains("L_"));
        assert!(!vocab.contains(""));
    }

    #[test]
    fn test_locked_prefix_is_not_applied_twice() {
        let vocab = Vocabulary::new(["CAT"]);
        assert!(!vocab.contains("L_L_CAT"));
    }

    #[test]
    fn test_from_json_str() {
        let vocab = Vocabulary::from_json_str(r#"["  ABC ", "", "DEF"]"#).unwrap();
        assert_eq!(vocab.len(), 2);
        assert!(vocab.contains("ABC"));
        assert!(vocab.contains("L_DEF"));
    }

    #[test]
    fn test_project_vocabulary_replaces_builtin_tokens() {
        let vocab = Vocabulary::from_json_str(r#"["RED", "BLU"]"#).unwrap();
        assert!(vocab.contains("L_RED"));
        assert!(!vocab.contains("CAT"));
        assert!(DEFAULT_TOKENS.iter().all(|t| !vocab.contains(t)));
    }

    #[test]
    fn test_from_json_str_rejects_non_array() {
        assert!(matches!(
            Vocabulary::from_json_str(r#"{"tokens": []}"#),
            Err(MapSheetError::Json(_))
        ));
    }
}
