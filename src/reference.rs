//! Cell Reference Module
//!
//! A1記法のセル参照文字列と、1始まりの(行, 列)座標との相互変換を行うモジュール。
//! 列文字は全単射26進数（A=1 ... Z=26, AA=27, ...）で表現されます。

use crate::error::MapSheetError;
use crate::types::CellCoord;

/// Excelの最大列数（XFD）
pub const MAX_COLUMN: u32 = 16_384;

/// 1始まりの列番号を列文字に変換（1 -> "A", 26 -> "Z", 27 -> "AA"）
///
/// # 戻り値
///
/// * `Ok(String)` - 列文字
/// * `Err(MapSheetError::InvalidArgument)` - `column`が0の場合
pub fn column_letters(column: u32) -> Result<String, MapSheetError> {
    if column == 0 {
        return Err(MapSheetError::InvalidArgument(
            "column must be >= 1".to_string(),
        ));
    }

    let mut letters = Vec::new();
    let mut column = column;
    while column > 0 {
        let modulo = (column - 1) % 26;
        letters.push(b'A' + modulo as u8);
        column = (column - 1) / 26;
    }
    letters.reverse();

    // 'A'..='Z'のみで構成されるため、UTF-8として常に有効
    Ok(letters.into_iter().map(char::from).collect())
}

/// 列文字を1始まりの列番号に変換（"A" -> 1, "AB" -> 28）
///
/// 大文字・小文字は区別しません。`MAX_COLUMN`を超える列はエラーになります。
pub fn column_index(letters: &str) -> Result<u32, MapSheetError> {
    if letters.is_empty() {
        return Err(MapSheetError::Reference(letters.to_string()));
    }

    let mut column: u32 = 0;
    for byte in letters.bytes() {
        if !byte.is_ascii_alphabetic() {
            return Err(MapSheetError::Reference(letters.to_string()));
        }
        let digit = (byte.to_ascii_uppercase() - b'A') as u32 + 1;
        column = column * 26 + digit;
        if column > MAX_COLUMN {
            return Err(MapSheetError::Reference(letters.to_string()));
        }
    }

    Ok(column)
}

/// (行, 列)をA1記法の参照文字列に変換
///
/// # 引数
///
/// * `row` - 行番号（1始まり）
/// * `column` - 列番号（1始まり）
///
/// # 戻り値
///
/// * `Ok(String)` - 参照文字列（例: `encode(5, 28)` -> `"AB5"`）
/// * `Err(MapSheetError::InvalidArgument)` - 行または列が0の場合
///
/// # 使用例
///
/// ```rust
/// use mapsheet::reference::encode;
///
/// assert_eq!(encode(1, 27).unwrap(), "AA1");
/// ```
pub fn encode(row: u32, column: u32) -> Result<String, MapSheetError> {
    if row == 0 {
        return Err(MapSheetError::InvalidArgument(
            "row must be >= 1".to_string(),
        ));
    }
    let letters = column_letters(column)?;
    Ok(format!("{}{}", letters, row))
}

/// A1記法の参照文字列を座標に変換
///
/// 列文字の後に10進数の行番号が続く形式のみを受け付けます（例: `"c4"`, `"AB12"`）。
/// 前後の空白は呼び出し側で除去してください。
///
/// # 戻り値
///
/// * `Ok(CellCoord)` - 1始まりの座標
/// * `Err(MapSheetError::Reference)` - 形式が不正、行が0、または列が範囲外の場合
pub fn decode(reference: &str) -> Result<CellCoord, MapSheetError> {
    let malformed = || MapSheetError::Reference(reference.to_string());

    let split = reference
        .find(|c: char| !c.is_ascii_alphabetic())
        .ok_or_else(malformed)?;
    let (letters, digits) = reference.split_at(split);

    if letters.is_empty() || digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }

    let column = column_index(letters).map_err(|_| malformed())?;
    let row: u32 = digits.parse().map_err(|_| malformed())?;
    if row == 0 {
        return Err(malformed());
    }

    Ok(CellCoord::new(row, column))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_encode_known_references() {
        assert_eq!(encode(1, 1).unwrap(), "A1");
        assert_eq!(encode(1, 26).unwrap(), "Z1");
        assert_eq!(encode(1, 27).unwrap(), "AA1");
        assert_eq!(encode(5, 28).unwrap(), "AB5");
        assert_eq!(encode(10, 52).unwrap(), "AZ10");
        assert_eq!(encode(1, 702).unwrap(), "ZZ1");
        assert_eq!(encode(1, 703).unwrap(), "AAA1");
        assert_eq!(encode(1_048_576, MAX_COLUMN).unwrap(), "XFD1048576");
    }

    #[test]
    fn test_encode_rejects_zero() {
        assert!(matches!(
            encode(0, 1),
            Err(MapSheetError::InvalidArgument(_))
        ));
        assert!(matches!(
            encode(1, 0),
            Err(MapSheetError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_decode_known_references() {
        assert_eq!(decode("A1").unwrap(), CellCoord::new(1, 1));
        assert_eq!(decode("AB5").unwrap(), CellCoord::new(5, 28));
        assert_eq!(decode("c4").unwrap(), CellCoord::new(4, 3));
        assert_eq!(decode("XFD1048576").unwrap(), CellCoord::new(1_048_576, 16_384));
    }

    #[test]
    fn test_decode_rejects_malformed() {
        for input in ["", "A", "12", "A0", "1A", "A1B", "A-1", " A1", "A1 ", "XFE1", "Ä1"] {
            assert!(
                matches!(decode(input), Err(MapSheetError::Reference(_))),
                "expected Reference error for {:?}",
                input
            );
        }
    }

    #[test]
    fn test_column_index() {
        assert_eq!(column_index("A").unwrap(), 1);
        assert_eq!(column_index("z").unwrap(), 26);
        assert_eq!(column_index("AB").unwrap(), 28);
        assert!(column_index("").is_err());
        assert!(column_index("A1").is_err());
    }

    proptest! {
        #[test]
        fn prop_round_trip(row in 1u32..=1_048_576, column in 1u32..=MAX_COLUMN) {
            let reference = encode(row, column).unwrap();
            prop_assert_eq!(decode(&reference).unwrap(), CellCoord::new(row, column));
        }

        #[test]
        fn prop_column_letters_are_uppercase(column in 1u32..=MAX_COLUMN) {
            let letters = column_letters(column).unwrap();
            prop_assert!(letters.bytes().all(|b| b.is_ascii_uppercase()));
            prop_assert_eq!(column_index(&letters).unwrap(), column);
        }
    }
}
