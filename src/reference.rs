//! 参照表（Excel）読み込みモジュール
//!
//! 指定シートの文書名列・文書番号列を読み込み、
//! 両方が揃っている行だけを参照表にする。同名の行は後勝ち。

use crate::error::{RenamerError, Result};
use calamine::{open_workbook_auto, Data, Range, Reader};
use pdf_renamer_common::ReferenceTable;
use std::path::Path;

/// プレビューで表示する行数
pub const PREVIEW_ROWS: usize = 15;

/// シート指定
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetSelector {
    /// 0始まりの番号
    Index(usize),
    Name(String),
}

impl Default for SheetSelector {
    fn default() -> Self {
        SheetSelector::Index(0)
    }
}

impl std::str::FromStr for SheetSelector {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("シート名が空です".to_string());
        }
        Ok(match s.parse::<usize>() {
            Ok(index) => SheetSelector::Index(index),
            Err(_) => SheetSelector::Name(s.to_string()),
        })
    }
}

impl std::fmt::Display for SheetSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SheetSelector::Index(i) => write!(f, "{}番目のシート", i + 1),
            SheetSelector::Name(name) => write!(f, "シート '{}'", name),
        }
    }
}

/// 参照表のレイアウト
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableLayout {
    pub sheet: SheetSelector,
    /// 文書名の列（表示用の文字）
    pub name_column: String,
    /// 文書番号の列（表示用の文字）
    pub number_column: String,
    /// 読み飛ばすヘッダー行数
    pub header_rows: usize,
}

impl Default for TableLayout {
    fn default() -> Self {
        Self {
            sheet: SheetSelector::default(),
            name_column: "H".to_string(),
            number_column: "V".to_string(),
            header_rows: 1,
        }
    }
}

impl TableLayout {
    /// 列の指定を検証
    pub fn validate(&self) -> Result<()> {
        column_index(&self.name_column)?;
        column_index(&self.number_column)?;
        Ok(())
    }
}

/// 参照表の1行（行番号はExcel表記の1始まり）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceRow {
    pub row_number: usize,
    pub name: String,
    pub number: String,
}

/// 参照表の読み込み結果
#[derive(Debug, Clone, Default)]
pub struct ReferenceLoad {
    pub table: ReferenceTable,
    /// 有効な行（読み込み順）
    pub rows: Vec<ReferenceRow>,
    /// データ行数（ヘッダー除く）
    pub data_rows: usize,
    /// 後の行で上書きされた文書名
    pub overwritten: Vec<String>,
}

/// 列プレビューの1セル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellPreview {
    pub row_number: usize,
    pub value: Option<String>,
    pub kind: &'static str,
}

/// 列プレビュー
#[derive(Debug, Clone, Default)]
pub struct ColumnPreview {
    pub total_rows: usize,
    pub total_columns: usize,
    pub names: Vec<CellPreview>,
    pub numbers: Vec<CellPreview>,
    pub valid_pairs: usize,
}

/// 列記号を0始まりの番号に変換（A→0, H→7, V→21, AA→26）
pub fn column_index(letters: &str) -> Result<usize> {
    let letters = letters.trim();
    if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(RenamerError::InvalidColumn(letters.to_string()));
    }

    let mut index: usize = 0;
    for c in letters.chars() {
        let digit = (c.to_ascii_uppercase() as u8 - b'A') as usize + 1;
        index = index
            .checked_mul(26)
            .and_then(|i| i.checked_add(digit))
            .ok_or_else(|| RenamerError::InvalidColumn(letters.to_string()))?;
    }
    Ok(index - 1)
}

/// 文書番号の表記を整える
///
/// 数値が小数として読まれた場合（"12.0"）は整数表記にする。
pub fn clean_number(raw: &str) -> String {
    let trimmed = raw.trim();
    let digits_only = trimmed
        .chars()
        .filter(|c| *c != '.' && *c != '-')
        .collect::<String>();

    if trimmed.contains('.') && !digits_only.is_empty() && digits_only.chars().all(|c| c.is_ascii_digit()) {
        if let Ok(value) = trimmed.parse::<f64>() {
            if let Some(integer) = integral(value) {
                return integer;
            }
        }
    }
    trimmed.to_string()
}

/// セルを文字列に変換（空・エラーは None）
pub fn cell_to_string(cell: &Data) -> Option<String> {
    let text = match cell {
        Data::Empty | Data::Error(_) => return None,
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => integral(*f).unwrap_or_else(|| f.to_string()),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.trim().to_string(),
        other => other.to_string(),
    };
    (!text.is_empty()).then_some(text)
}

/// セルの型名（プレビュー表示用）
pub fn cell_kind(cell: &Data) -> &'static str {
    match cell {
        Data::Empty => "empty",
        Data::String(_) => "string",
        Data::Float(_) => "float",
        Data::Int(_) => "int",
        Data::Bool(_) => "bool",
        Data::Error(_) => "error",
        Data::DurationIso(_) => "duration",
        _ => "datetime",
    }
}

fn integral(value: f64) -> Option<String> {
    (value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15).then(|| format!("{}", value as i64))
}

/// 参照表を読み込む
pub fn read_reference_table(path: &Path, layout: &TableLayout) -> Result<ReferenceLoad> {
    let name_col = column_index(&layout.name_column)?;
    let number_col = column_index(&layout.number_column)?;
    let range = open_range(path, &layout.sheet)?;

    let mut load = ReferenceLoad::default();
    let Some((end_row, _)) = range.end() else {
        return Ok(load);
    };

    for row in layout.header_rows..=end_row as usize {
        load.data_rows += 1;
        let name = cell_at(&range, row, name_col).and_then(|c| cell_to_string(c));
        let number = cell_at(&range, row, number_col)
            .and_then(|c| cell_to_string(c))
            .map(|n| clean_number(&n));

        let (Some(name), Some(number)) = (name, number) else {
            continue;
        };

        if load.table.insert(name.clone(), number.clone()).is_some() {
            tracing::debug!(row = row + 1, name = %name, "文書名が重複、後の行で上書き");
            load.overwritten.push(name.clone());
        }
        load.rows.push(ReferenceRow {
            row_number: row + 1,
            name,
            number,
        });
    }

    tracing::debug!(
        path = %path.display(),
        entries = load.table.len(),
        rows = load.data_rows,
        "参照表を読み込み"
    );
    Ok(load)
}

/// 文書名列・文書番号列の先頭をプレビュー
pub fn preview_columns(path: &Path, layout: &TableLayout, limit: usize) -> Result<ColumnPreview> {
    let name_col = column_index(&layout.name_column)?;
    let number_col = column_index(&layout.number_column)?;
    let range = open_range(path, &layout.sheet)?;

    let mut preview = ColumnPreview::default();
    let Some((end_row, end_col)) = range.end() else {
        return Ok(preview);
    };
    preview.total_rows = (end_row as usize + 1).saturating_sub(layout.header_rows);
    preview.total_columns = end_col as usize + 1;

    for row in layout.header_rows..=end_row as usize {
        let name = cell_at(&range, row, name_col);
        let number = cell_at(&range, row, number_col);
        let name_text = name.and_then(cell_to_string);
        let number_text = number.and_then(cell_to_string);

        if name_text.is_some() && number_text.is_some() {
            preview.valid_pairs += 1;
        }

        if preview.names.len() < limit {
            preview.names.push(CellPreview {
                row_number: row + 1,
                value: name_text,
                kind: name.map_or("empty", cell_kind),
            });
            preview.numbers.push(CellPreview {
                row_number: row + 1,
                value: number_text,
                kind: number.map_or("empty", cell_kind),
            });
        }
    }

    Ok(preview)
}

fn open_range(path: &Path, sheet: &SheetSelector) -> Result<Range<Data>> {
    if !path.exists() {
        return Err(RenamerError::FileNotFound(path.display().to_string()));
    }

    let mut workbook = open_workbook_auto(path)?;
    match sheet {
        SheetSelector::Index(index) => workbook
            .worksheet_range_at(*index)
            .ok_or_else(|| RenamerError::ReferenceTable(format!("{}がありません", sheet)))?
            .map_err(RenamerError::from),
        SheetSelector::Name(name) => workbook
            .worksheet_range(name)
            .map_err(|e| RenamerError::ReferenceTable(format!("{}: {}", sheet, e))),
    }
}

/// シート上の絶対位置でセルを取得
fn cell_at(range: &Range<Data>, row: usize, col: usize) -> Option<&Data> {
    let row = u32::try_from(row).ok()?;
    let col = u32::try_from(col).ok()?;
    range.get_value((row, col))
}
