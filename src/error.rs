use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenamerError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("Excelファイルを指定してください（--excel または `pdf-renamer config --set-excel`）")]
    MissingExcelPath,

    #[error("PDFフォルダを指定してください（--folder または `pdf-renamer config --set-folder`）")]
    MissingFolderPath,

    #[error("参照表の読み込みに失敗: {0}")]
    ReferenceTable(String),

    #[error("列の指定が不正です: {0}（A, H, V, AA のように指定してください）")]
    InvalidColumn(String),

    #[error("文書名と文書番号の組が見つかりません（{name_column}列・{number_column}列を確認してください）")]
    NoReferenceEntries {
        name_column: String,
        number_column: String,
    },

    #[error("対象ファイルが見つかりません: {0}")]
    NoCandidateFiles(String),

    #[error("リネーム台帳を読み込めません: {path}: {reason}")]
    LedgerUnreadable { path: PathBuf, reason: String },

    #[error("入力エラー: {0}")]
    Prompt(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] pdf_renamer_common::Error),
}

impl From<calamine::Error> for RenamerError {
    fn from(e: calamine::Error) -> Self {
        RenamerError::ReferenceTable(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RenamerError>;
