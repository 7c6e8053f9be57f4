//! Security Module
//!
//! ワークブック（ZIPアーカイブ）を開く際の制限を実装するモジュール。
//! ZIP bomb、パストラバーサル、過大な入力ファイルへの対策を提供します。

use std::io::{Read, Seek};
use zip::ZipArchive;

use crate::error::MapSheetError;

/// アーカイブの制限値
///
/// マップ定義のワークブックは数シート・各7×7セル程度のため、
/// 一般的な表計算ファイルよりも小さな上限を設定しています。
#[derive(Debug, Clone)]
pub(crate) struct SecurityConfig {
    /// 展開後の合計最大サイズ（バイト）
    /// デフォルト: 256MB
    pub max_decompressed_size: u64,
    /// ZIPアーカイブ内の最大ファイル数
    /// デフォルト: 2000
    pub max_file_count: usize,
    /// 単一エントリの最大サイズ（バイト）
    /// デフォルト: 64MB
    pub max_file_size: u64,
    /// 入力ファイルの最大サイズ（バイト）
    /// デフォルト: 128MB
    pub max_input_file_size: u64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_decompressed_size: 268_435_456, // 256MB
            max_file_count: 2_000,
            max_file_size: 67_108_864,        // 64MB
            max_input_file_size: 134_217_728, // 128MB
        }
    }
}

impl SecurityConfig {
    /// 入力ファイルのサイズを検証
    pub fn check_input_size(&self, size: u64) -> Result<(), MapSheetError> {
        if size > self.max_input_file_size {
            return Err(MapSheetError::SecurityViolation(format!(
                "Input file size exceeds maximum: {} bytes (max: {} bytes)",
                size, self.max_input_file_size
            )));
        }
        Ok(())
    }

    /// アーカイブ内の全エントリについて、件数・パス・サイズを検証
    pub fn check_archive<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
    ) -> Result<(), MapSheetError> {
        if archive.len() > self.max_file_count {
            return Err(MapSheetError::SecurityViolation(format!(
                "ZIP archive contains too many files: {} (max: {})",
                archive.len(),
                self.max_file_count
            )));
        }

        let mut total: u64 = 0;
        for i in 0..archive.len() {
            let file = archive
                .by_index(i)
                .map_err(|e| MapSheetError::Zip(e.to_string()))?;

            validate_zip_path(file.name())
                .map_err(|e| MapSheetError::SecurityViolation(format!("Invalid ZIP path: {}", e)))?;

            if file.size() > self.max_file_size {
                return Err(MapSheetError::SecurityViolation(format!(
                    "File '{}' exceeds maximum size: {} bytes (max: {} bytes)",
                    file.name(),
                    file.size(),
                    self.max_file_size
                )));
            }

            total = total.checked_add(file.size()).ok_or_else(|| {
                MapSheetError::SecurityViolation(
                    "Total decompressed size calculation overflow".to_string(),
                )
            })?;
            if total > self.max_decompressed_size {
                return Err(MapSheetError::SecurityViolation(format!(
                    "Total decompressed size exceeds maximum: {} bytes (max: {} bytes)",
                    total, self.max_decompressed_size
                )));
            }
        }

        Ok(())
    }
}

/// アーカイブ内のエントリパスの検証
///
/// # 戻り値
///
/// * `Ok(())` - パスが安全な場合
/// * `Err(String)` - 空、絶対パス、`..`、`\`を含む場合
pub(crate) fn validate_zip_path(path: &str) -> Result<(), String> {
    if path.is_empty() {
        return Err("Empty path is not allowed".to_string());
    }

    let bytes = path.as_bytes();
    let has_drive = bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':';
    if path.starts_with('/') || has_drive {
        return Err(format!("Absolute path is not allowed: {}", path));
    }

    if path.split('/').any(|segment| segment == "..") {
        return Err(format!("Path traversal detected: {}", path));
    }

    if path.contains('\\') {
        return Err(format!("Backslash in path is not allowed: {}", path));
    }

    Ok(())
}
