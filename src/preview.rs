//! 参照表の列プレビューとファイル一覧

use crate::config::Settings;
use crate::error::Result;
use crate::reference::{preview_columns, CellPreview, PREVIEW_ROWS};
use crate::scanner::scan_folder;
use crate::Outcome;
use pdf_renamer_common::CandidateFile;
use std::collections::BTreeMap;

/// ルート直下のファイルのグループ名
pub const ROOT_GROUP: &str = "ルートフォルダ";

/// 文書名列・文書番号列の先頭を表示
pub fn run_preview(settings: &Settings) -> Result<Outcome> {
    let excel_file = settings.excel_file()?;
    let layout = &settings.layout;
    let preview = preview_columns(excel_file, layout, PREVIEW_ROWS)?;

    println!("📊 {}（{}）", excel_file.display(), layout.sheet);
    println!("  データ行数: {}", preview.total_rows);
    println!("  列数: {}", preview.total_columns);

    print_column(&format!("{}列（文書名）", layout.name_column), &preview.names);
    print_column(&format!("{}列（文書番号）", layout.number_column), &preview.numbers);

    println!("\n有効な組（文書名・文書番号の両方あり）: {}件", preview.valid_pairs);
    if preview.valid_pairs == 0 {
        println!("⚠ 有効な組がありません。列の指定を確認してください");
        return Ok(Outcome::NothingToDo);
    }
    Ok(Outcome::Completed)
}

fn print_column(title: &str, cells: &[CellPreview]) {
    println!("\n{} 先頭{}行:", title, cells.len());
    println!("{}", "-".repeat(50));
    for cell in cells {
        match &cell.value {
            Some(value) => println!("  行 {:3}: '{}' ({})", cell.row_number, value, cell.kind),
            None => println!("  行 {:3}: <空> ({})", cell.row_number, cell.kind),
        }
    }
}

/// フォルダごとにまとめる（ルート直下は ROOT_GROUP）
pub fn group_by_folder(files: &[CandidateFile]) -> BTreeMap<String, Vec<String>> {
    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for file in files {
        let (folder, name) = match file.relative_path.rsplit_once('/') {
            Some((folder, name)) => (folder.to_string(), name.to_string()),
            None => (ROOT_GROUP.to_string(), file.relative_path.clone()),
        };
        groups.entry(folder).or_default().push(name);
    }
    for names in groups.values_mut() {
        names.sort();
    }
    groups
}

/// 対象ファイルをフォルダごとに一覧表示
pub fn run_list(settings: &Settings) -> Result<Outcome> {
    let folder = settings.pdf_folder()?;
    let files = scan_folder(folder, &settings.extension)?;

    if files.is_empty() {
        println!("{}ファイルが見つかりません: {}", settings.extension.to_uppercase(), folder.display());
        return Ok(Outcome::NothingToDo);
    }

    println!("📁 {}", folder.display());
    for (group, names) in group_by_folder(&files) {
        println!("\n{} ({}件):", group, names.len());
        for name in names {
            println!("  - {}", name);
        }
    }
    println!("\n合計: {}件", files.len());
    Ok(Outcome::Completed)
}
