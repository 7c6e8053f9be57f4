//! SpreadsheetML XML Parsing
//!
//! ZIPアーカイブから取り出したXMLバイト列を解析する関数群。
//! quick-xmlのイベントAPIで、必要な要素だけを読み取ります。

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;

use crate::error::MapSheetError;
use crate::reference;
use crate::types::{CellDataType, RawCell};

fn xml_error(e: impl std::fmt::Display) -> MapSheetError {
    MapSheetError::Xml(e.to_string())
}

/// 要素の属性を(ローカル名, 値)の組で取得
fn attributes(e: &BytesStart<'_>) -> Result<Vec<(Vec<u8>, String)>, MapSheetError> {
    let mut attrs = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(|e| MapSheetError::Xml(format!("XML attribute error: {}", e)))?;
        let value = attr.unescape_value().map_err(xml_error)?.into_owned();
        attrs.push((attr.key.local_name().as_ref().to_vec(), value));
    }
    Ok(attrs)
}

fn attribute(attrs: &[(Vec<u8>, String)], name: &[u8]) -> Option<String> {
    attrs
        .iter()
        .find(|(key, _)| key.as_slice() == name)
        .map(|(_, value)| value.clone())
}

/// `xl/workbook.xml` の解析
///
/// `<sheet name="..." r:id="..."/>` を定義順に返します。
pub(crate) fn parse_sheet_list(xml: &[u8]) -> Result<Vec<(String, String)>, MapSheetError> {
    let mut reader = Reader::from_reader(xml);
    reader.trim_text(true);

    let mut sheets = Vec::new();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.local_name().as_ref() == b"sheet" => {
                let attrs = attributes(&e)?;
                let name = attribute(&attrs, b"name")
                    .ok_or_else(|| MapSheetError::Xml("<sheet> without name".to_string()))?;
                let rel_id = attribute(&attrs, b"id").ok_or_else(|| {
                    MapSheetError::Xml(format!("<sheet name=\"{}\"> without r:id", name))
                })?;
                sheets.push((name, rel_id));
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(sheets)
}

/// `xl/_rels/workbook.xml.rels` の解析（Id -> Target）
pub(crate) fn parse_relationships(xml: &[u8]) -> Result<HashMap<String, String>, MapSheetError> {
    let mut reader = Reader::from_reader(xml);
    reader.trim_text(true);

    let mut rels = HashMap::new();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e))
                if e.local_name().as_ref() == b"Relationship" =>
            {
                let attrs = attributes(&e)?;
                if let (Some(id), Some(target)) =
                    (attribute(&attrs, b"Id"), attribute(&attrs, b"Target"))
                {
                    rels.insert(id, target);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(rels)
}

/// 関係のTargetをアーカイブ内のパスに変換（`worksheets/sheet1.xml` -> `xl/worksheets/sheet1.xml`）
pub(crate) fn resolve_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{}", target),
    }
}

/// `xl/sharedStrings.xml` の解析
///
/// `<si>`ごとに1要素を返します。リッチテキストの`<r>`は連結し、
/// ふりがな（`<rPh>`）は除外します。空の`<si>`もインデックスを保持します。
pub(crate) fn parse_shared_strings(xml: &[u8]) -> Result<Vec<String>, MapSheetError> {
    let mut reader = Reader::from_reader(xml);
    // xml:space="preserve" の空白を保持するため、トリムしない
    reader.trim_text(false);

    let mut strings = Vec::new();
    let mut buf = Vec::new();
    let mut current = String::new();
    let mut in_si = false;
    let mut in_t = false;
    let mut in_rph = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"si" => {
                    in_si = true;
                    current.clear();
                }
                b"rPh" if in_si => in_rph = true,
                b"t" if in_si && !in_rph => in_t = true,
                _ => {}
            },
            Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"si" {
                    strings.push(String::new());
                }
            }
            Ok(Event::Text(e)) => {
                if in_t {
                    current.push_str(&e.unescape().map_err(xml_error)?);
                }
            }
            Ok(Event::CData(e)) => {
                if in_t {
                    current.push_str(std::str::from_utf8(&e.into_inner())?);
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"si" => {
                    strings.push(std::mem::take(&mut current));
                    in_si = false;
                }
                b"rPh" => in_rph = false,
                b"t" => in_t = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(strings)
}

/// セル要素内のどのテキストを読んでいるか
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellText {
    None,
    Formula,
    Value,
    Inline,
}

/// `xl/worksheets/sheetN.xml` の解析
///
/// `<sheetData>`内の`<c>`要素を文書順に返します。`r`属性のないセルは、
/// 行の`r`属性と直前のセルの列から参照を補完します。
pub(crate) fn parse_worksheet_cells(xml: &[u8]) -> Result<Vec<RawCell>, MapSheetError> {
    let mut reader = Reader::from_reader(xml);
    reader.trim_text(false);

    let mut cells = Vec::new();
    let mut buf = Vec::new();

    let mut row: u32 = 0;
    let mut last_col: u32 = 0;
    let mut current: Option<RawCell> = None;
    let mut reading = CellText::None;
    let mut in_is = false;
    let mut in_rph = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"row" => {
                    row = next_row(&e, row)?;
                    last_col = 0;
                }
                b"c" => {
                    current = Some(start_cell(&e, row, &mut last_col)?);
                }
                b"f" if current.is_some() => {
                    reading = CellText::Formula;
                    if let Some(cell) = current.as_mut() {
                        cell.formula.get_or_insert_with(String::new);
                    }
                }
                b"v" if current.is_some() => {
                    reading = CellText::Value;
                    if let Some(cell) = current.as_mut() {
                        cell.value.get_or_insert_with(String::new);
                    }
                }
                b"is" if current.is_some() => {
                    in_is = true;
                    if let Some(cell) = current.as_mut() {
                        cell.inline_text.get_or_insert_with(String::new);
                    }
                }
                b"rPh" if in_is => in_rph = true,
                b"t" if in_is && !in_rph => reading = CellText::Inline,
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"row" => {
                    row = next_row(&e, row)?;
                    last_col = 0;
                }
                b"c" => {
                    cells.push(start_cell(&e, row, &mut last_col)?);
                }
                b"v" => {
                    if let Some(cell) = current.as_mut() {
                        cell.value.get_or_insert_with(String::new);
                    }
                }
                _ => {}
            },
            Ok(Event::Text(e)) => {
                if reading != CellText::None {
                    let text = e.unescape().map_err(xml_error)?;
                    append_text(current.as_mut(), reading, &text);
                }
            }
            Ok(Event::CData(e)) => {
                if reading != CellText::None {
                    let bytes = e.into_inner();
                    let text = std::str::from_utf8(&bytes)?;
                    append_text(current.as_mut(), reading, text);
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"c" => {
                    if let Some(cell) = current.take() {
                        cells.push(cell);
                    }
                    reading = CellText::None;
                    in_is = false;
                    in_rph = false;
                }
                b"f" | b"v" => reading = CellText::None,
                b"t" if in_is => reading = CellText::None,
                b"rPh" => in_rph = false,
                b"is" => in_is = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(cells)
}

/// `<row>`の行番号。`r`属性がない場合は直前の行の次
fn next_row(e: &BytesStart<'_>, previous: u32) -> Result<u32, MapSheetError> {
    let attrs = attributes(e)?;
    match attribute(&attrs, b"r") {
        Some(r) => r
            .parse()
            .map_err(|_| MapSheetError::Xml(format!("Invalid row number: {}", r))),
        None => previous
            .checked_add(1)
            .ok_or_else(|| MapSheetError::Xml(format!("Row number overflow after row {}", previous))),
    }
}

fn start_cell(e: &BytesStart<'_>, row: u32, last_col: &mut u32) -> Result<RawCell, MapSheetError> {
    let attrs = attributes(e)?;

    let reference = match attribute(&attrs, b"r") {
        Some(r) => {
            if let Ok(coord) = reference::decode(&r) {
                *last_col = coord.col;
            }
            r
        }
        None => {
            *last_col += 1;
            reference::encode(row.max(1), *last_col)?
        }
    };

    let mut cell = RawCell::new(reference);
    cell.data_type = attribute(&attrs, b"t").and_then(|t| CellDataType::from_attribute(&t));
    Ok(cell)
}

fn append_text(cell: Option<&mut RawCell>, reading: CellText, text: &str) {
    let Some(cell) = cell else {
        return;
    };
    let target = match reading {
        CellText::Formula => &mut cell.formula,
        CellText::Value => &mut cell.value,
        CellText::Inline => &mut cell.inline_text,
        CellText::None => return,
    };
    target.get_or_insert_with(String::new).push_str(text);
}
