//! Public API Types
//!
//! 公開APIで使用する列挙型を定義するモジュール。

/// マップグリッドの検証方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum ValidationMode {
    /// すべてのセルが空でなく、語彙に含まれるトークンであることを要求（デフォルト）
    ///
    /// 違反した場合、そのワークシートの抽出は失敗し、エラーには違反したセル座標と値が含まれます。
    #[default]
    Strict,

    /// 空文字列を含む任意の文字列を受け入れる
    Lenient,
}

/// 抽出するメタデータの範囲
///
/// アップロード先のキーの接頭辞もこのモードで決まります。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum MetadataMode {
    /// チャプター用: `size`、`rotationCount`、`map`、`block`、`sequence`を出力（デフォルト）
    ///
    /// キー: `chapters/<name>.json`
    #[default]
    Chapter,

    /// 解答用: `size`と`map`のみを出力
    ///
    /// キー: `answers/<name>.json`
    Answer,
}

impl MetadataMode {
    /// アップロード先のキーの接頭辞
    pub fn key_prefix(&self) -> &'static str {
        match self {
            MetadataMode::Chapter => "chapters",
            MetadataMode::Answer => "answers",
        }
    }

    /// ドキュメント名からアップロード先のキーを生成（例: `chapters/Chapter1.json`）
    pub fn upload_key(&self, name: &str) -> String {
        format!("{}/{}.json", self.key_prefix(), name)
    }
}

/// 数式セルの解決モード
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum FormulaMode {
    /// キャッシュされた結果値を返す（デフォルト）
    ///
    /// 結果値がない数式セルは空文字列になります。
    #[default]
    CachedValue,

    /// 結果値がない数式セルは、`=`を前置した数式文字列を返す
    ///
    /// 例: `<f>SUM(A1:B1)</f>`（`<v>`なし） → `=SUM(A1:B1)`
    Formula,
}
