//! Upload Module
//!
//! 抽出結果のJSONをドキュメントストアへ送るアップロード境界。
//! HTTPクライアントは呼び出し側で構築して`HttpUploader`に渡します。

use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use reqwest::Url;
use std::io::Write;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::MapSheetError;

/// アップロード先
///
/// `key`はドキュメントストア内の論理キー（例: `chapters/Chapter1.json`）です。
pub trait Uploader {
    fn put(&mut self, key: &str, json: &str) -> Result<(), MapSheetError>;
}

/// HTTP PUTでJSONを送るアップローダー
#[derive(Debug, Clone)]
pub struct HttpUploader {
    client: Client,
    base_url: Url,
}

impl HttpUploader {
    /// 構築済みのクライアントとベースURLからアップローダーを生成
    ///
    /// ベースURLの末尾に`/`がない場合は補完します。
    ///
    /// # 戻り値
    ///
    /// * `Err(MapSheetError::Config)` - ベースURLが不正、またはhttp/https以外の場合
    pub fn new(client: Client, base_url: &str) -> Result<Self, MapSheetError> {
        let mut normalized = base_url.trim().to_string();
        if !normalized.ends_with('/') {
            normalized.push('/');
        }
        let base_url = Url::parse(&normalized)
            .map_err(|e| MapSheetError::Config(format!("Invalid base URL '{}': {}", base_url, e)))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(MapSheetError::Config(format!(
                "Unsupported URL scheme: {}",
                base_url.scheme()
            )));
        }
        Ok(Self { client, base_url })
    }

    /// タイムアウト付きのクライアントを構築してアップローダーを生成
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, MapSheetError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MapSheetError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Self::new(client, base_url)
    }

    /// キーに対応するURLを取得
    ///
    /// キーは`/`で区切ったパスセグメントとして追加され、各セグメントはパーセントエンコードされます
    /// （`Chapter#2` -> `Chapter%232`）。
    pub fn url_for(&self, key: &str) -> Result<Url, MapSheetError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| MapSheetError::Transport {
                key: key.to_string(),
                message: format!("Base URL cannot have path segments: {}", self.base_url),
            })?
            .pop_if_empty()
            .extend(key.split('/'));
        Ok(url)
    }
}

impl Uploader for HttpUploader {
    fn put(&mut self, key: &str, json: &str) -> Result<(), MapSheetError> {
        let url = self.url_for(key)?;
        let transport = |message: String| MapSheetError::Transport {
            key: key.to_string(),
            message,
        };

        let response = self
            .client
            .put(url)
            .header(CONTENT_TYPE, "application/json; charset=utf-8")
            .body(json.to_string())
            .send()
            .map_err(|e| transport(e.to_string()))?;

        let status = response.status();
        let body = response.text().map_err(|e| transport(e.to_string()))?;

        if status.is_success() {
            info!(key = %key, status = status.as_u16(), "uploaded document");
            debug!(key = %key, "response: {}", body);
            Ok(())
        } else {
            Err(transport(format!("status {}, response: {}", status, body)))
        }
    }
}

/// 送信せずに、キーと整形済みJSONを書き出すアップローダー（ドライラン用）
#[derive(Debug)]
pub struct WriterUploader<W: Write> {
    writer: W,
}

impl<W: Write> WriterUploader<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Uploader for WriterUploader<W> {
    fn put(&mut self, key: &str, json: &str) -> Result<(), MapSheetError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        writeln!(self.writer, "{}", key)?;
        serde_json::to_writer_pretty(&mut self.writer, &value)?;
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}
