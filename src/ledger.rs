//! リネーム台帳ファイル（rename_backup.json）の読み書き
//!
//! 台帳は処理対象フォルダの直下に置く。
//! 書き込みは一時ファイル経由で置き換える。

use crate::error::{RenamerError, Result};
use crate::scanner::resolve_relative;
use pdf_renamer_common::Ledger;
use std::path::{Path, PathBuf};

pub const LEDGER_FILE_NAME: &str = "rename_backup.json";

/// 台帳の読み込み状態
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerState {
    /// 台帳ファイルなし
    Missing,
    /// 台帳ファイルはあるが読めない
    Unreadable(String),
    Loaded(Ledger),
}

impl LedgerState {
    /// 書き込み前の既存台帳（なければ空）
    ///
    /// 読めない台帳を上書きすると履歴が失われるためエラーにする。
    pub fn into_existing(self, root: &Path) -> Result<Ledger> {
        match self {
            LedgerState::Missing => Ok(Ledger::new()),
            LedgerState::Loaded(ledger) => Ok(ledger),
            LedgerState::Unreadable(reason) => Err(RenamerError::LedgerUnreadable {
                path: ledger_path(root),
                reason,
            }),
        }
    }
}

pub fn ledger_path(root: &Path) -> PathBuf {
    root.join(LEDGER_FILE_NAME)
}

/// 台帳を読み込む
pub fn load(root: &Path) -> LedgerState {
    let path = ledger_path(root);
    if !path.exists() {
        return LedgerState::Missing;
    }

    let content = match std::fs::read_to_string(&path) {
        Ok(c) => c,
        Err(e) => return LedgerState::Unreadable(e.to_string()),
    };

    match Ledger::from_json(&content) {
        Ok(ledger) => LedgerState::Loaded(ledger),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "台帳を解析できません");
            LedgerState::Unreadable(e.to_string())
        }
    }
}

/// 台帳を保存
pub fn save(root: &Path, ledger: &Ledger) -> Result<()> {
    let path = ledger_path(root);
    let tmp = path.with_extension("json.tmp");

    std::fs::write(&tmp, ledger.to_json_pretty()?)?;
    if let Err(e) = std::fs::rename(&tmp, &path) {
        std::fs::remove_file(&tmp).ok();
        return Err(e.into());
    }

    tracing::debug!(path = %path.display(), entries = ledger.len(), "台帳を保存");
    Ok(())
}

/// 台帳ファイルを削除（存在しなければ false）
pub fn remove(root: &Path) -> Result<bool> {
    let path = ledger_path(root);
    if !path.exists() {
        return Ok(false);
    }
    std::fs::remove_file(&path)?;
    Ok(true)
}

/// 今回のリネーム記録を既存台帳にマージして保存
///
/// 書き込み時点でリネーム後のファイルが存在する記録だけを加える。
pub fn persist_session(root: &Path, existing: &Ledger, session: &Ledger) -> Result<Ledger> {
    let present = session.retain(|current, _| resolve_relative(root, current).exists());
    let merged = existing.merge(&present);
    save(root, &merged)?;
    Ok(merged)
}
