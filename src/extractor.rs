//! Worksheet Extractor Module
//!
//! ワークシートからマップサイズ・グリッド・チャプター用メタデータを読み取り、
//! `ExtractionResult`を組み立てます。抽出はワークシート単位で全か無かです。

use std::collections::BTreeSet;
use tracing::{error, info, warn};

use crate::api::{MetadataMode, ValidationMode};
use crate::builder::ExtractionConfig;
use crate::error::MapSheetError;
use crate::reference;
use crate::resolver::CellResolver;
use crate::types::{ExtractionResult, MapGrid, Workbook, WorkbookDocument, Worksheet};

const SIZE_CELL: &str = "A1";
const ROTATION_CELL: &str = "B1";
const BLOCK_CELL: &str = "C1";
const SEQUENCE_CELL: &str = "D1";

/// グリッドの先頭行（A1の次の行）
const GRID_FIRST_ROW: u32 = 2;

/// 抽出に失敗したワークシート
#[derive(Debug)]
pub struct SheetFailure {
    pub sheet: String,
    pub error: MapSheetError,
}

/// ワークブック全体の抽出結果
///
/// 失敗したワークシートはドキュメントに含まれず、`failures`に記録されます。
#[derive(Debug, Default)]
pub struct WorkbookExtraction {
    pub document: WorkbookDocument,
    pub failures: Vec<SheetFailure>,
}

/// ワークシート抽出のファサード
///
/// `ExtractorBuilder`で構築します。状態を持たないため、複数のワークシートに繰り返し使用できます。
///
/// # 使用例
///
/// ```rust
/// use mapsheet::{ExtractorBuilder, RawCell, Worksheet};
///
/// # fn main() -> Result<(), mapsheet::MapSheetError> {
/// let sheet = Worksheet::new(
///     "Stage1",
///     vec![
///         RawCell::new("A1").with_value("1"),
///         RawCell::new("A2").with_value("CAT"),
///     ],
/// );
/// let extractor = ExtractorBuilder::new().build()?;
/// let result = extractor.extract(&sheet, None)?;
/// assert_eq!(result.map, vec![vec!["CAT".to_string()]]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Extractor {
    config: ExtractionConfig,
}

impl Extractor {
    pub(crate) fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }

    pub fn metadata_mode(&self) -> MetadataMode {
        self.config.metadata_mode
    }

    pub fn validation(&self) -> ValidationMode {
        self.config.validation
    }

    /// 1枚のワークシートを抽出する
    ///
    /// # 引数
    ///
    /// * `worksheet` - 対象のワークシート
    /// * `shared_strings` - ワークブックの共有文字列テーブル
    ///
    /// # 処理フロー
    ///
    /// 1. A1からマップサイズNを読み取る
    /// 2. 2行目からN+1行目、A列からN列目までのグリッドを読み取り、検証する
    /// 3. チャプターモードの場合、B1（回転数）・C1（ブロック）・D1（手順）を読み取る
    ///
    /// # 戻り値
    ///
    /// * `Ok(ExtractionResult)` - 抽出に成功した場合
    /// * `Err(MapSheetError)` - いずれかのセルで失敗した場合（部分的な結果は返さない）
    pub fn extract(
        &self,
        worksheet: &Worksheet,
        shared_strings: Option<&[String]>,
    ) -> Result<ExtractionResult, MapSheetError> {
        let resolver = CellResolver::new(worksheet, shared_strings)
            .with_formula_mode(self.config.formula_mode);

        let size = self.read_size(&resolver)?;
        let map = self.read_grid(&resolver, size)?;

        let result = match self.config.metadata_mode {
            MetadataMode::Chapter => {
                let rotation_count = read_rotation_count(&resolver)?;
                let blocked = parse_blocked_cells(&resolver.resolve(BLOCK_CELL)?, size);
                let blocked_cells = log_skipped(&resolver, blocked);
                let sequence = parse_sequence(&resolver.resolve(SEQUENCE_CELL)?);
                ExtractionResult {
                    size: Some(size),
                    rotation_count: Some(rotation_count),
                    map,
                    blocked_cells: Some(blocked_cells),
                    sequence: Some(sequence),
                }
            }
            MetadataMode::Answer => ExtractionResult {
                size: Some(size),
                rotation_count: None,
                map,
                blocked_cells: None,
                sequence: None,
            },
        };

        Ok(result)
    }

    /// ワークブック内のすべてのワークシートを抽出する
    ///
    /// 1枚のワークシートの失敗はエラーログに記録され、残りのワークシートの処理は継続します。
    pub fn extract_workbook(&self, workbook: &Workbook) -> WorkbookExtraction {
        let shared_strings = workbook.shared_strings.as_deref();
        let mut extraction = WorkbookExtraction::default();

        for worksheet in &workbook.worksheets {
            match self.extract(worksheet, shared_strings) {
                Ok(result) => {
                    info!(sheet = %worksheet.name, size = ?result.size, "extracted worksheet");
                    extraction
                        .document
                        .sheets
                        .insert(worksheet.name.clone(), result);
                }
                Err(e) => {
                    error!(sheet = %worksheet.name, "error processing sheet: {}", e);
                    extraction.failures.push(SheetFailure {
                        sheet: worksheet.name.clone(),
                        error: e,
                    });
                }
            }
        }

        extraction
    }

    fn read_size(&self, resolver: &CellResolver<'_>) -> Result<i64, MapSheetError> {
        let value = resolver.resolve(SIZE_CELL)?;
        let value = value.trim();

        if value.is_empty() {
            return match self.config.size_default {
                Some(size) => {
                    warn!(
                        sheet = %resolver.sheet_name(),
                        "cell {} is empty, using default map size {}", SIZE_CELL, size
                    );
                    Ok(size)
                }
                None => Err(MapSheetError::MissingData {
                    cell: SIZE_CELL.to_string(),
                    what: "map size".to_string(),
                }),
            };
        }

        let size = parse_integer(value).ok_or_else(|| MapSheetError::Format {
            cell: SIZE_CELL.to_string(),
            value: value.to_string(),
            expected: "map size".to_string(),
        })?;

        if !(1..=self.config.max_size).contains(&size) {
            return Err(MapSheetError::Range {
                cell: SIZE_CELL.to_string(),
                name: "map size".to_string(),
                value: size,
                min: 1,
                max: Some(self.config.max_size),
            });
        }

        Ok(size)
    }

    fn read_grid(&self, resolver: &CellResolver<'_>, size: i64) -> Result<MapGrid, MapSheetError> {
        // sizeは検証済み（0..=7）
        let size = size.max(0) as u32;
        let mut map = Vec::with_capacity(size as usize);

        for row in GRID_FIRST_ROW..GRID_FIRST_ROW + size {
            let mut row_data = Vec::with_capacity(size as usize);
            for col in 1..=size {
                let cell = reference::encode(row, col)?;
                let value = resolver.resolve(&cell)?;
                self.validate_token(&cell, &value)?;
                row_data.push(value);
            }
            map.push(row_data);
        }

        Ok(map)
    }

    fn validate_token(&self, cell: &str, value: &str) -> Result<(), MapSheetError> {
        if self.config.validation == ValidationMode::Lenient {
            return Ok(());
        }
        if value.is_empty() {
            return Err(MapSheetError::MissingData {
                cell: cell.to_string(),
                what: "map token".to_string(),
            });
        }
        if !self.config.vocabulary.contains(value) {
            return Err(MapSheetError::Vocabulary {
                cell: cell.to_string(),
                value: value.to_string(),
            });
        }
        Ok(())
    }
}

fn read_rotation_count(resolver: &CellResolver<'_>) -> Result<i64, MapSheetError> {
    let value = resolver.resolve(ROTATION_CELL)?;
    let value = value.trim();

    if value.is_empty() {
        warn!(
            sheet = %resolver.sheet_name(),
            "cell {} is empty, using default rotation count 0", ROTATION_CELL
        );
        return Ok(0);
    }

    let count = parse_integer(value).ok_or_else(|| MapSheetError::Format {
        cell: ROTATION_CELL.to_string(),
        value: value.to_string(),
        expected: "rotation count".to_string(),
    })?;

    if count < 0 {
        return Err(MapSheetError::Range {
            cell: ROTATION_CELL.to_string(),
            name: "rotation count".to_string(),
            value: count,
            min: 0,
            max: None,
        });
    }

    Ok(count)
}

/// 整数として解釈する（"3"、"3.0"のような小数部が0の数値も受け入れる）
fn parse_integer(value: &str) -> Option<i64> {
    if let Ok(n) = value.parse::<i64>() {
        return Some(n);
    }
    let f = value.parse::<f64>().ok()?;
    if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

/// ブロックセル一覧の解析結果
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BlockedCells {
    /// "行_列"（0始まり、グリッド原点からの相対位置）
    pub cells: BTreeSet<String>,
    /// 解釈できなかった、またはグリッド外のエントリ
    pub skipped: Vec<String>,
}

/// カンマ区切りのセル参照一覧を、0始まりの"行_列"の集合に変換
///
/// 行はグリッド先頭行（2行目）からのオフセット、列はA列からのオフセットです。
/// 解釈できないエントリやグリッド外のエントリは`skipped`に記録され、失敗にはなりません。
///
/// # 使用例
///
/// ```rust
/// use mapsheet::parse_blocked_cells;
///
/// let blocked = parse_blocked_cells("A2, C4", 3);
/// assert!(blocked.cells.contains("0_0"));
/// assert!(blocked.cells.contains("2_2"));
/// ```
pub fn parse_blocked_cells(text: &str, size: i64) -> BlockedCells {
    let size = size.max(0) as u32;
    let mut blocked = BlockedCells::default();

    for entry in text.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let in_grid = reference::decode(entry).ok().filter(|coord| {
            coord.row >= GRID_FIRST_ROW && coord.row < GRID_FIRST_ROW + size && coord.col <= size
        });
        match in_grid {
            Some(coord) => {
                blocked
                    .cells
                    .insert(format!("{}_{}", coord.row - GRID_FIRST_ROW, coord.col - 1));
            }
            None => blocked.skipped.push(entry.to_string()),
        }
    }

    blocked
}

fn log_skipped(resolver: &CellResolver<'_>, blocked: BlockedCells) -> BTreeSet<String> {
    for entry in &blocked.skipped {
        warn!(
            sheet = %resolver.sheet_name(),
            "skipping blocked cell entry '{}' in {}", entry, BLOCK_CELL
        );
    }
    blocked.cells
}

/// カンマ区切りの手順トークンを順序を保って分割（前後の空白を除去し、空のエントリは除外）
pub fn parse_sequence(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
