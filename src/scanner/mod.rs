mod paths;

pub use paths::{relative_string, resolve_relative};

use crate::error::{RenamerError, Result};
use pdf_renamer_common::CandidateFile;
use std::path::Path;
use walkdir::WalkDir;

/// 既定の対象拡張子
pub const DEFAULT_EXTENSION: &str = "pdf";

/// フォルダ以下（サブフォルダ含む）の対象ファイルを列挙
///
/// 拡張子は大文字小文字を区別しない。相対パス順にソートして返す。
pub fn scan_folder(folder: &Path, extension: &str) -> Result<Vec<CandidateFile>> {
    if !folder.is_dir() {
        return Err(RenamerError::FolderNotFound(folder.display().to_string()));
    }

    let mut files = Vec::new();

    for entry in WalkDir::new(folder)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| match e {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::warn!(error = %err, "スキャンできないエントリをスキップ");
                None
            }
        })
    {
        let path = entry.path();

        if !entry.file_type().is_file() || !has_extension(path, extension) {
            continue;
        }

        let Ok(relative) = path.strip_prefix(folder) else {
            continue;
        };
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        files.push(CandidateFile {
            path: path.to_path_buf(),
            stem,
            relative_path: relative_string(relative),
        });
    }

    files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    tracing::debug!(folder = %folder.display(), count = files.len(), "ファイルをスキャン");

    Ok(files)
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension.trim_start_matches('.')))
        .unwrap_or(false)
}
