//! Parser Module
//!
//! quick-xmlとzipを使用したワークブック解析の実装。
//! セルの`t`属性・数式・値を解釈せずにそのまま`RawCell`として取り出します。

mod workbook;
mod xml;

pub use workbook::{open_workbook, open_workbook_path};
