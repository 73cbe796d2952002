use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pdf-renamer")]
#[command(about = "参照表の文書番号をPDFファイル名に付けるリネームツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 参照表（Excel）ファイル
    #[arg(long, global = true)]
    pub excel: Option<PathBuf>,

    /// PDFフォルダ
    #[arg(long, global = true)]
    pub folder: Option<PathBuf>,

    /// シート（番号または名前）
    #[arg(long, global = true)]
    pub sheet: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 文書名列・文書番号列の先頭を表示
    Preview,

    /// PDFファイルをフォルダごとに一覧表示
    List,

    /// 照合してリネーム
    Rename {
        /// 確認せずに実行
        #[arg(short, long)]
        yes: bool,

        /// 計画の表示のみ（ファイルは変更しない）
        #[arg(long)]
        dry_run: bool,
    },

    /// 直前までのリネームを元に戻す
    Undo {
        /// 確認せずに実行
        #[arg(short, long)]
        yes: bool,
    },

    /// 設定の表示・変更
    Config {
        /// 現在の設定を表示
        #[arg(long)]
        show: bool,

        /// 参照表（Excel）ファイルを設定
        #[arg(long)]
        set_excel: Option<PathBuf>,

        /// PDFフォルダを設定
        #[arg(long)]
        set_folder: Option<PathBuf>,

        /// シートを設定（番号または名前）
        #[arg(long)]
        set_sheet: Option<String>,

        /// 文書名の列を設定（例: H）
        #[arg(long)]
        set_name_column: Option<String>,

        /// 文書番号の列を設定（例: V）
        #[arg(long)]
        set_number_column: Option<String>,
    },

    /// 対話メニュー（既定）
    Menu,
}
