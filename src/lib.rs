//! PDF Renamer
//!
//! 参照表（Excel）の文書名とPDFファイル名を照合し、
//! ファイル名の先頭に文書番号を付ける。リネーム台帳から元に戻せる。

pub mod cli;
pub mod config;
pub mod error;
pub mod ledger;
pub mod menu;
pub mod preview;
pub mod prompt;
pub mod reference;
pub mod renamer;
pub mod scanner;
pub mod undo;

/// 各操作の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// 実行した
    Completed,
    /// ユーザーが中止した
    Aborted,
    /// 対象がなかった
    NothingToDo,
}
