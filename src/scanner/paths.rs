use std::path::{Component, Path, PathBuf};

/// 相対パスを `/` 区切りの文字列にする
pub fn relative_string(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().to_string()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// 台帳の相対パスをルート基準の絶対パスにする（`/` と `\` の両方を区切りとみなす）
pub fn resolve_relative(root: &Path, relative: &str) -> PathBuf {
    relative
        .split(['/', '\\'])
        .filter(|part| !part.is_empty() && *part != ".")
        .fold(root.to_path_buf(), |path, part| path.join(part))
}
