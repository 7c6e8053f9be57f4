//! Workbook Container Parser
//!
//! XLSX/XLSMファイル（ZIPアーカイブ）を開き、シート一覧・共有文字列・
//! 各ワークシートのセルを`Workbook`として読み込みます。

use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;
use tracing::debug;
use zip::result::ZipError;
use zip::ZipArchive;

use crate::error::MapSheetError;
use crate::parser::xml;
use crate::security::SecurityConfig;
use crate::types::{Workbook, Worksheet};

const WORKBOOK_PART: &str = "xl/workbook.xml";
const WORKBOOK_RELS_PART: &str = "xl/_rels/workbook.xml.rels";
const SHARED_STRINGS_PART: &str = "xl/sharedStrings.xml";

/// ワークブックパーサー
///
/// 入力全体をメモリに読み込み、セキュリティ制限を検証した上でアーカイブを保持します。
pub(crate) struct WorkbookParser {
    archive: ZipArchive<Cursor<Vec<u8>>>,
}

impl WorkbookParser {
    /// ワークブックを開く
    ///
    /// # 引数
    ///
    /// * `reader` - ワークブックのバイト列を読み込むためのリーダー
    ///
    /// # 戻り値
    ///
    /// * `Ok(WorkbookParser)` - アーカイブの検証に成功した場合
    /// * `Err(MapSheetError::SecurityViolation)` - サイズ・件数・パスの制限に違反した場合
    /// * `Err(MapSheetError::Zip)` - ZIPアーカイブとして読み込めない場合
    pub fn open<R: Read>(reader: R) -> Result<Self, MapSheetError> {
        let security = SecurityConfig::default();

        // 上限+1バイトまで読み、超過を検出する
        let mut buffer = Vec::new();
        let bytes_read = reader
            .take(security.max_input_file_size + 1)
            .read_to_end(&mut buffer)?;
        security.check_input_size(bytes_read as u64)?;

        let mut archive =
            ZipArchive::new(Cursor::new(buffer)).map_err(|e| MapSheetError::Zip(e.to_string()))?;
        security.check_archive(&mut archive)?;

        Ok(Self { archive })
    }

    /// すべてのワークシートと共有文字列テーブルを読み込む
    pub fn parse(mut self) -> Result<Workbook, MapSheetError> {
        let workbook_xml = self
            .read_part(WORKBOOK_PART)?
            .ok_or_else(|| MapSheetError::Zip(format!("Missing part: {}", WORKBOOK_PART)))?;
        let sheets = xml::parse_sheet_list(&workbook_xml)?;

        let rels = match self.read_part(WORKBOOK_RELS_PART)? {
            Some(bytes) => xml::parse_relationships(&bytes)?,
            None => Default::default(),
        };

        let shared_strings = match self.read_part(SHARED_STRINGS_PART)? {
            Some(bytes) => Some(xml::parse_shared_strings(&bytes)?),
            None => None,
        };

        let mut worksheets = Vec::with_capacity(sheets.len());
        for (name, rel_id) in sheets {
            let target = rels.get(&rel_id).ok_or_else(|| {
                MapSheetError::Zip(format!(
                    "Sheet '{}' refers to unknown relationship '{}'",
                    name, rel_id
                ))
            })?;
            let path = xml::resolve_target(target);
            let bytes = self.read_part(&path)?.ok_or_else(|| {
                MapSheetError::Zip(format!("Missing worksheet part for '{}': {}", name, path))
            })?;
            let cells = xml::parse_worksheet_cells(&bytes)?;
            debug!(sheet = %name, part = %path, cells = cells.len(), "parsed worksheet");
            worksheets.push(Worksheet::new(name, cells));
        }

        Ok(Workbook {
            worksheets,
            shared_strings,
        })
    }

    /// アーカイブ内のパートを読み込む。存在しない場合は`None`
    fn read_part(&mut self, name: &str) -> Result<Option<Vec<u8>>, MapSheetError> {
        let mut file = match self.archive.by_name(name) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(MapSheetError::Zip(e.to_string())),
        };
        let mut content = Vec::new();
        file.read_to_end(&mut content)?;
        Ok(Some(content))
    }
}

/// リーダーからワークブックを読み込む
///
/// # 使用例
///
/// ```rust,no_run
/// use std::fs::File;
///
/// # fn main() -> Result<(), mapsheet::MapSheetError> {
/// let workbook = mapsheet::open_workbook(File::open("Chapter1.xlsm")?)?;
/// for sheet in &workbook.worksheets {
///     println!("{}: {} cells", sheet.name, sheet.cells.len());
/// }
/// # Ok(())
/// # }
/// ```
pub fn open_workbook<R: Read>(reader: R) -> Result<Workbook, MapSheetError> {
    WorkbookParser::open(reader)?.parse()
}

/// パスからワークブックを読み込む
///
/// 他のプロセス（Excel）が開いているファイルも読み取り専用で開きます。
pub fn open_workbook_path(path: impl AsRef<Path>) -> Result<Workbook, MapSheetError> {
    let file = File::open(path.as_ref())?;
    open_workbook(file)
}
