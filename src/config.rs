use crate::error::{RenamerError, Result};
use crate::reference::{SheetSelector, TableLayout};
use crate::scanner::DEFAULT_EXTENSION;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 設定ファイルの場所を上書きする環境変数
pub const CONFIG_ENV: &str = "PDF_RENAMER_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 参照表（Excel）のパス
    pub excel_file: Option<PathBuf>,
    /// PDFフォルダのパス
    pub pdf_folder: Option<PathBuf>,
    /// シート（番号または名前、省略時は先頭）
    pub sheet: Option<String>,
    /// 文書名の列
    pub name_column: String,
    /// 文書番号の列
    pub number_column: String,
    /// ヘッダー行数
    pub header_rows: usize,
    /// 対象拡張子
    pub extension: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            excel_file: None,
            pdf_folder: None,
            sheet: None,
            name_column: "H".into(),
            number_column: "V".into(),
            header_rows: 1,
            extension: DEFAULT_EXTENSION.into(),
        }
    }
}

/// コマンドラインからの上書き
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub excel_file: Option<PathBuf>,
    pub pdf_folder: Option<PathBuf>,
    pub sheet: Option<String>,
}

/// 実行時の設定（設定ファイル + コマンドライン）
#[derive(Debug, Clone)]
pub struct Settings {
    pub excel_file: Option<PathBuf>,
    pub pdf_folder: Option<PathBuf>,
    pub layout: TableLayout,
    pub extension: String,
}

impl Settings {
    pub fn excel_file(&self) -> Result<&Path> {
        self.excel_file.as_deref().ok_or(RenamerError::MissingExcelPath)
    }

    pub fn pdf_folder(&self) -> Result<&Path> {
        self.pdf_folder.as_deref().ok_or(RenamerError::MissingFolderPath)
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Ok(PathBuf::from(path));
        }

        let home = dirs::home_dir()
            .ok_or_else(|| RenamerError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("pdf-renamer").join("config.json"))
    }

    /// コマンドラインの指定を反映した実行時設定
    pub fn resolve(&self, overrides: &Overrides) -> Result<Settings> {
        let sheet = match overrides.sheet.as_ref().or(self.sheet.as_ref()) {
            Some(s) => s.parse::<SheetSelector>().map_err(RenamerError::Config)?,
            None => SheetSelector::default(),
        };

        let layout = TableLayout {
            sheet,
            name_column: self.name_column.trim().to_uppercase(),
            number_column: self.number_column.trim().to_uppercase(),
            header_rows: self.header_rows,
        };
        layout.validate()?;

        let extension = self.extension.trim().trim_start_matches('.').to_string();
        if extension.is_empty() {
            return Err(RenamerError::Config("拡張子が空です".into()));
        }

        Ok(Settings {
            excel_file: overrides.excel_file.clone().or_else(|| self.excel_file.clone()),
            pdf_folder: overrides.pdf_folder.clone().or_else(|| self.pdf_folder.clone()),
            layout,
            extension,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_columns() {
        let config = Config::default();
        assert_eq!(config.name_column, "H");
        assert_eq!(config.number_column, "V");
        assert_eq!(config.header_rows, 1);
        assert_eq!(config.extension, "pdf");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"pdf_folder": "/data/pdf"}"#).unwrap();
        assert_eq!(config.pdf_folder, Some(PathBuf::from("/data/pdf")));
        assert_eq!(config.name_column, "H");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = Config {
            excel_file: Some(PathBuf::from("list.xlsx")),
            name_column: "B".into(),
            ..Default::default()
        };
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_load_missing_gives_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("none.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_resolve_overrides() {
        let config = Config {
            excel_file: Some(PathBuf::from("config.xlsx")),
            pdf_folder: Some(PathBuf::from("/config/pdf")),
            sheet: Some("Liste".into()),
            name_column: " h ".into(),
            ..Default::default()
        };
        let overrides = Overrides {
            excel_file: Some(PathBuf::from("cli.xlsx")),
            sheet: Some("1".into()),
            ..Default::default()
        };

        let settings = config.resolve(&overrides).unwrap();
        assert_eq!(settings.excel_file().unwrap(), Path::new("cli.xlsx"));
        assert_eq!(settings.pdf_folder().unwrap(), Path::new("/config/pdf"));
        assert_eq!(settings.layout.sheet, SheetSelector::Index(1));
        assert_eq!(settings.layout.name_column, "H");
    }

    #[test]
    fn test_resolve_missing_paths() {
        let settings = Config::default().resolve(&Overrides::default()).unwrap();
        assert!(matches!(settings.excel_file(), Err(RenamerError::MissingExcelPath)));
        assert!(matches!(settings.pdf_folder(), Err(RenamerError::MissingFolderPath)));
    }

    #[test]
    fn test_resolve_rejects_bad_column() {
        let config = Config {
            number_column: "21".into(),
            ..Default::default()
        };
        assert!(matches!(
            config.resolve(&Overrides::default()),
            Err(RenamerError::InvalidColumn(_))
        ));
    }
}
