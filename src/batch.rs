//! Batch Processing Module
//!
//! ディレクトリ内のワークブックを順に抽出し、アップロードするバッチドライバー。
//! 1つのワークシート・ファイル・アップロードの失敗はログに記録され、処理は継続します。

use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use crate::error::MapSheetError;
use crate::extractor::Extractor;
use crate::parser::open_workbook_path;
use crate::upload::Uploader;

/// 一時ファイル・ロックファイルの接頭辞（Excelが編集中に作成する）
pub const LOCK_FILE_PREFIX: &str = "~$";

/// 処理対象の拡張子
pub const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm"];

/// バッチ処理の集計
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// 見つかったワークブックの数
    pub files_found: usize,
    /// アップロードに成功したワークブックの数
    pub files_uploaded: usize,
    /// 読み込み・シリアライズ・アップロードのいずれかに失敗したワークブックの数
    pub files_failed: usize,
    /// 抽出できたシートが1枚もなく、アップロードを見送ったワークブックの数
    pub files_skipped: usize,
    /// 抽出に成功したワークシートの数
    pub sheets_extracted: usize,
    /// 抽出に失敗したワークシートの数
    pub sheets_failed: usize,
}

impl BatchReport {
    pub fn has_failures(&self) -> bool {
        self.files_failed > 0 || self.sheets_failed > 0
    }
}

/// ワークブックのファイル名かどうかを判定（ロックファイルを除く）
pub fn is_workbook_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    if name.starts_with(LOCK_FILE_PREFIX) {
        return false;
    }
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| {
            WORKBOOK_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
        .unwrap_or(false)
}

/// ディレクトリ直下のワークブックを、ファイル名順に列挙する（再帰しない）
///
/// シンボリックリンクはリンク先で判定します。
pub fn scan_directory(dir: &Path) -> Result<Vec<PathBuf>, MapSheetError> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if is_workbook_file(&path) && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// バッチドライバー
///
/// 抽出器とアップローダーを所有し、ワークブックごとに1ドキュメントを送信します。
/// キーはワークブックのファイル名（拡張子なし）から`MetadataMode::upload_key`で生成します。
pub struct BatchProcessor<U: Uploader> {
    extractor: Extractor,
    uploader: U,
}

impl<U: Uploader> BatchProcessor<U> {
    pub fn new(extractor: Extractor, uploader: U) -> Self {
        Self {
            extractor,
            uploader,
        }
    }

    pub fn into_uploader(self) -> U {
        self.uploader
    }

    /// ディレクトリ内のすべてのワークブックを処理する
    ///
    /// # 戻り値
    ///
    /// * `Ok(BatchReport)` - 処理の集計（個々の失敗はここに計上される）
    /// * `Err(MapSheetError::Io)` - ディレクトリを読み込めない場合のみ
    pub fn process_directory(&mut self, dir: &Path) -> Result<BatchReport, MapSheetError> {
        let files = scan_directory(dir)?;
        let mut report = BatchReport {
            files_found: files.len(),
            ..BatchReport::default()
        };

        if files.is_empty() {
            warn!(dir = %dir.display(), "no workbook files found");
        }

        for path in &files {
            self.process_file(path, &mut report);
        }

        info!(
            found = report.files_found,
            uploaded = report.files_uploaded,
            failed = report.files_failed,
            skipped = report.files_skipped,
            sheets = report.sheets_extracted,
            sheets_failed = report.sheets_failed,
            "batch finished"
        );
        Ok(report)
    }

    /// 1つのワークブックを処理し、結果を集計に加える
    pub fn process_file(&mut self, path: &Path, report: &mut BatchReport) {
        info!(file = %path.display(), "processing file");

        if let Err(e) = self.try_process_file(path, report) {
            error!(file = %path.display(), "an error occurred while processing: {}", e);
            report.files_failed += 1;
        }
    }

    fn try_process_file(
        &mut self,
        path: &Path,
        report: &mut BatchReport,
    ) -> Result<(), MapSheetError> {
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| {
                MapSheetError::Config(format!("Unsupported file name: {}", path.display()))
            })?
            .to_string();

        let workbook = open_workbook_path(path)?;
        let extraction = self.extractor.extract_workbook(&workbook);
        report.sheets_extracted += extraction.document.sheets.len();
        report.sheets_failed += extraction.failures.len();

        if extraction.document.is_empty() {
            // 空のドキュメントをPUTすると既存のデータを消してしまう
            warn!(file = %path.display(), "no sheets extracted, skipping upload");
            report.files_skipped += 1;
            return Ok(());
        }

        let json = extraction.document.to_json()?;
        let key = self.extractor.metadata_mode().upload_key(&name);
        self.uploader.put(&key, &json)?;
        report.files_uploaded += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_workbook_file() {
        assert!(is_workbook_file(Path::new("maps/Chapter1.xlsm")));
        assert!(is_workbook_file(Path::new("Chapter1.XLSX")));
        assert!(!is_workbook_file(Path::new("~$Chapter1.xlsm")));
        assert!(!is_workbook_file(Path::new("notes.txt")));
        assert!(!is_workbook_file(Path::new("Chapter1")));
        assert!(!is_workbook_file(Path::new("Chapter1.xls")));
    }

    #[test]
    fn test_report_has_failures() {
        assert!(!BatchReport::default().has_failures());
        let report = BatchReport {
            sheets_failed: 1,
            ..BatchReport::default()
        };
        assert!(report.has_failures());
    }
}
