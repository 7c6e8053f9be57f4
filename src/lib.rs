//! mapsheet - Excel puzzle map extractor and JSON publisher
//!
//! このクレートは、Excelワークブック（XLSX/XLSM）に記述されたパズルマップ定義を
//! 読み取り、JSONドキュメントとしてドキュメントストアへアップロードする機能を提供します。
//!
//! 各ワークシートのレイアウト:
//!
//! | セル | 内容 |
//! | ---- | ---- |
//! | A1 | マップサイズN（1〜7） |
//! | B1 | 回転数（0以上、チャプターのみ） |
//! | C1 | ブロックセルのセル参照（カンマ区切り、チャプターのみ） |
//! | D1 | 手順トークン（カンマ区切り、チャプターのみ） |
//! | A2〜 | N×Nのトークングリッド |
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use mapsheet::{open_workbook_path, ExtractorBuilder};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let extractor = ExtractorBuilder::new().build()?;
//!     let workbook = open_workbook_path("Chapter1.xlsm")?;
//!
//!     let extraction = extractor.extract_workbook(&workbook);
//!     println!("{}", extraction.document.to_json()?);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Batch Upload
//!
//! ```rust,no_run
//! use std::path::Path;
//! use std::time::Duration;
//! use mapsheet::{BatchProcessor, ExtractorBuilder, HttpUploader, MetadataMode};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let extractor = ExtractorBuilder::new()
//!         .with_metadata_mode(MetadataMode::Answer)
//!         .build()?;
//!     let uploader = HttpUploader::with_timeout("https://example.com/db/", Duration::from_secs(30))?;
//!
//!     let mut batch = BatchProcessor::new(extractor, uploader);
//!     let report = batch.process_directory(Path::new("maps"))?;
//!     println!("uploaded {} workbooks", report.files_uploaded);
//!
//!     Ok(())
//! }
//! ```

mod api;
mod batch;
mod builder;
mod error;
mod extractor;
mod parser;
pub mod reference;
mod resolver;
mod security;
mod types;
mod upload;
mod vocabulary;

// 公開API
pub use api::{FormulaMode, MetadataMode, ValidationMode};
pub use batch::{is_workbook_file, scan_directory, BatchProcessor, BatchReport};
pub use builder::{ExtractorBuilder, MAX_MAP_SIZE};
pub use error::MapSheetError;
pub use extractor::{
    parse_blocked_cells, parse_sequence, BlockedCells, Extractor, SheetFailure,
    WorkbookExtraction,
};
pub use parser::{open_workbook, open_workbook_path};
pub use resolver::CellResolver;
pub use types::{
    CellCoord, CellDataType, ExtractionResult, MapGrid, RawCell, Workbook, WorkbookDocument,
    Worksheet,
};
pub use upload::{HttpUploader, Uploader, WriterUploader};
pub use vocabulary::{Vocabulary, DEFAULT_TOKENS, LOCKED_PREFIX};
