//! リネームの取り消し
//!
//! 台帳の記録（現在のパス → 元のパス）に従ってファイル名を戻す。
//! 元のパスに別のファイルがある場合は上書きせずスキップする。

use crate::error::Result;
use crate::ledger::{self, LedgerState};
use crate::prompt::Confirm;
use crate::scanner::resolve_relative;
use crate::Outcome;
use pdf_renamer_common::Ledger;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// 戻せる記録
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoItem {
    pub current_rel: String,
    pub original_rel: String,
    pub current: PathBuf,
    pub original: PathBuf,
    /// 元のパスに別のファイルが存在する
    pub conflict: bool,
}

/// 現在のファイルが見つからない記録
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingItem {
    pub current_rel: String,
    pub original_rel: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UndoPlan {
    pub revertible: Vec<UndoItem>,
    pub missing: Vec<MissingItem>,
}

impl UndoPlan {
    pub fn conflict_count(&self) -> usize {
        self.revertible.iter().filter(|item| item.conflict).count()
    }
}

/// 台帳の更新結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerUpdate {
    /// 戻したものがなく、台帳はそのまま
    Unchanged,
    /// 残りの記録で保存
    Updated { remaining: usize },
    /// 記録がなくなったので削除
    Removed,
    /// 更新に失敗（警告のみ）
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoSummary {
    pub reverted: Vec<UndoItem>,
    pub skipped: Vec<UndoItem>,
    pub failures: Vec<(UndoItem, String)>,
    pub ledger: LedgerUpdate,
}

/// 台帳の記録を「戻せる」と「ファイルなし」に分ける
pub fn plan_undo(root: &Path, ledger: &Ledger) -> UndoPlan {
    let mut plan = UndoPlan::default();

    for (current_rel, original_rel) in ledger.iter() {
        let current = resolve_relative(root, current_rel);
        if !current.exists() {
            plan.missing.push(MissingItem {
                current_rel: current_rel.to_string(),
                original_rel: original_rel.to_string(),
            });
            continue;
        }

        let original = resolve_relative(root, original_rel);
        let conflict = original.exists() && original != current;
        plan.revertible.push(UndoItem {
            current_rel: current_rel.to_string(),
            original_rel: original_rel.to_string(),
            current,
            original,
            conflict,
        });
    }

    plan
}

/// 取り消しを実行し、戻した記録を台帳から取り除く
pub fn execute_undo<F>(root: &Path, ledger: &Ledger, plan: &UndoPlan, mut on_item: F) -> UndoSummary
where
    F: FnMut(&UndoItem, &ItemResult),
{
    let mut reverted_keys = HashSet::new();
    let mut summary = UndoSummary {
        reverted: Vec::new(),
        skipped: Vec::new(),
        failures: Vec::new(),
        ledger: LedgerUpdate::Unchanged,
    };

    for item in &plan.revertible {
        let result = revert_one(item);
        on_item(item, &result);

        match result {
            ItemResult::Reverted => {
                reverted_keys.insert(item.current_rel.clone());
                summary.reverted.push(item.clone());
            }
            ItemResult::Conflict => summary.skipped.push(item.clone()),
            ItemResult::Failed(reason) => summary.failures.push((item.clone(), reason)),
        }
    }

    if !reverted_keys.is_empty() {
        summary.ledger = update_ledger(root, &ledger.prune(&reverted_keys));
    }
    summary
}

/// 1件の取り消し結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemResult {
    Reverted,
    /// 元のパスに別のファイルがある
    Conflict,
    Failed(String),
}

fn revert_one(item: &UndoItem) -> ItemResult {
    if let Some(parent) = item.original.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            return ItemResult::Failed(e.to_string());
        }
    }

    // 計画後に作られたファイルも上書きしない
    if item.original.exists() && item.original != item.current {
        return ItemResult::Conflict;
    }

    match std::fs::rename(&item.current, &item.original) {
        Ok(()) => ItemResult::Reverted,
        Err(e) => ItemResult::Failed(e.to_string()),
    }
}

fn update_ledger(root: &Path, remaining: &Ledger) -> LedgerUpdate {
    let result = if remaining.is_empty() {
        ledger::remove(root).map(|_| LedgerUpdate::Removed)
    } else {
        ledger::save(root, remaining).map(|_| LedgerUpdate::Updated {
            remaining: remaining.len(),
        })
    };

    result.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "台帳の更新に失敗");
        LedgerUpdate::Failed(e.to_string())
    })
}

/// 台帳を読み込んで取り消しを実行
pub fn run_undo(folder: &Path, confirm: &mut dyn Confirm) -> Result<Outcome> {
    let ledger = match ledger::load(folder) {
        LedgerState::Missing => {
            println!("元に戻す記録がありません（{} が見つかりません）", ledger::LEDGER_FILE_NAME);
            return Ok(Outcome::NothingToDo);
        }
        LedgerState::Unreadable(reason) => {
            println!("✗ 台帳を読み込めません: {}", reason);
            println!("  {}", ledger::ledger_path(folder).display());
            return Ok(Outcome::NothingToDo);
        }
        LedgerState::Loaded(ledger) if ledger.is_empty() => {
            println!("台帳は空です。元に戻すものはありません");
            return Ok(Outcome::NothingToDo);
        }
        LedgerState::Loaded(ledger) => ledger,
    };

    let plan = plan_undo(folder, &ledger);
    print_plan(&plan);

    if plan.revertible.is_empty() {
        println!("\n元に戻せるファイルがありません（すべて見つかりません）");
        return Ok(Outcome::NothingToDo);
    }

    if !confirm.confirm(&format!("{}件のファイルを元に戻しますか？", plan.revertible.len()))? {
        println!("キャンセルしました");
        return Ok(Outcome::Aborted);
    }

    println!("\n元に戻しています...");
    let summary = execute_undo(folder, &ledger, &plan, |item, result| match result {
        ItemResult::Reverted => println!("  ✔ '{}' → '{}'", item.current_rel, item.original_rel),
        ItemResult::Conflict => println!(
            "  ⚠ スキップ '{}' - '{}' は既に存在します",
            item.current_rel, item.original_rel
        ),
        ItemResult::Failed(reason) => println!("  ✗ 失敗 '{}': {}", item.current_rel, reason),
    });

    match &summary.ledger {
        LedgerUpdate::Unchanged => {}
        LedgerUpdate::Updated { remaining } => println!("\n台帳を更新しました（残り{}件）", remaining),
        LedgerUpdate::Removed => println!("\nすべて元に戻したため台帳を削除しました"),
        LedgerUpdate::Failed(reason) => println!("\n⚠ 警告: 台帳を更新できませんでした: {}", reason),
    }

    println!(
        "\n✅ {}件中{}件を元に戻しました",
        plan.revertible.len(),
        summary.reverted.len()
    );
    if !summary.skipped.is_empty() {
        println!("⚠ 既存ファイルのためスキップ: {}件", summary.skipped.len());
    }
    if !summary.failures.is_empty() {
        println!("✗ 失敗: {}件", summary.failures.len());
    }

    Ok(Outcome::Completed)
}

fn print_plan(plan: &UndoPlan) {
    if !plan.revertible.is_empty() {
        println!("\n元に戻すファイル ({}件):", plan.revertible.len());
        for item in &plan.revertible {
            let mark = if item.conflict { "⚠" } else { " " };
            println!("  {} '{}' → '{}'", mark, item.current_rel, item.original_rel);
        }
        if plan.conflict_count() > 0 {
            println!(
                "  ⚠ {}件は元のファイル名が既に使われているためスキップされます",
                plan.conflict_count()
            );
        }
    }

    if !plan.missing.is_empty() {
        println!("\n見つからないファイル ({}件、台帳に残します):", plan.missing.len());
        for item in &plan.missing {
            println!("  ✗ '{}'（元: '{}'）", item.current_rel, item.original_rel);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn ledger_of(pairs: &[(&str, &str)]) -> Ledger {
        pairs.iter().map(|(k, v)| (*k, *v)).collect()
    }

    #[test]
    fn test_plan_partitions_missing() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("100a.pdf"), b"a").unwrap();

        let ledger = ledger_of(&[("100a.pdf", "a.pdf"), ("200b.pdf", "b.pdf")]);
        let plan = plan_undo(dir.path(), &ledger);

        assert_eq!(plan.revertible.len(), 1);
        assert_eq!(plan.revertible[0].current_rel, "100a.pdf");
        assert!(!plan.revertible[0].conflict);
        assert_eq!(
            plan.missing,
            vec![MissingItem {
                current_rel: "200b.pdf".into(),
                original_rel: "b.pdf".into()
            }]
        );
    }

    #[test]
    fn test_plan_flags_conflict() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("100a.pdf"), b"renamed").unwrap();
        fs::write(dir.path().join("a.pdf"), b"new file").unwrap();

        let plan = plan_undo(dir.path(), &ledger_of(&[("100a.pdf", "a.pdf")]));
        assert!(plan.revertible[0].conflict);
        assert_eq!(plan.conflict_count(), 1);
    }

    #[test]
    fn test_execute_restores_into_missing_parent() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("100a.pdf"), b"a").unwrap();

        let ledger = ledger_of(&[("100a.pdf", "moved/away/a.pdf")]);
        ledger::save(dir.path(), &ledger).unwrap();
        let plan = plan_undo(dir.path(), &ledger);
        let summary = execute_undo(dir.path(), &ledger, &plan, |_, _| {});

        assert_eq!(summary.reverted.len(), 1);
        assert!(dir.path().join("moved").join("away").join("a.pdf").exists());
        assert_eq!(summary.ledger, LedgerUpdate::Removed);
        assert_eq!(ledger::load(dir.path()), LedgerState::Missing);
    }

    #[test]
    fn test_execute_keeps_unreverted_entries() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("100a.pdf"), b"a").unwrap();
        fs::write(dir.path().join("200b.pdf"), b"b").unwrap();
        fs::write(dir.path().join("b.pdf"), b"other").unwrap();

        let ledger = ledger_of(&[
            ("100a.pdf", "a.pdf"),
            ("200b.pdf", "b.pdf"),
            ("300c.pdf", "c.pdf"),
        ]);
        ledger::save(dir.path(), &ledger).unwrap();
        let plan = plan_undo(dir.path(), &ledger);
        let summary = execute_undo(dir.path(), &ledger, &plan, |_, _| {});

        assert_eq!(summary.reverted.len(), 1);
        assert_eq!(summary.skipped.len(), 1);
        assert_eq!(summary.ledger, LedgerUpdate::Updated { remaining: 2 });
        assert_eq!(fs::read(dir.path().join("b.pdf")).unwrap(), b"other");

        let remaining = ledger_of(&[("200b.pdf", "b.pdf"), ("300c.pdf", "c.pdf")]);
        assert_eq!(ledger::load(dir.path()), LedgerState::Loaded(remaining));
    }

    #[test]
    fn test_ledger_save_failure_keeps_revert() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("100a.pdf"), b"a").unwrap();

        // 残りの記録があるので削除ではなく保存になる
        let ledger = ledger_of(&[("100a.pdf", "a.pdf"), ("200gone.pdf", "gone.pdf")]);
        ledger::save(dir.path(), &ledger).unwrap();
        fs::create_dir(dir.path().join("rename_backup.json.tmp")).unwrap();

        let plan = plan_undo(dir.path(), &ledger);
        let summary = execute_undo(dir.path(), &ledger, &plan, |_, _| {});

        assert!(matches!(summary.ledger, LedgerUpdate::Failed(_)));
        assert_eq!(summary.reverted.len(), 1);
        assert!(dir.path().join("a.pdf").exists());
        assert!(!dir.path().join("100a.pdf").exists());
        assert_eq!(ledger::load(dir.path()), LedgerState::Loaded(ledger));
    }

    #[test]
    fn test_nothing_reverted_leaves_ledger() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("100a.pdf"), b"a").unwrap();
        fs::write(dir.path().join("a.pdf"), b"other").unwrap();

        let ledger = ledger_of(&[("100a.pdf", "a.pdf")]);
        ledger::save(dir.path(), &ledger).unwrap();
        let plan = plan_undo(dir.path(), &ledger);
        let summary = execute_undo(dir.path(), &ledger, &plan, |_, _| {});

        assert_eq!(summary.ledger, LedgerUpdate::Unchanged);
        assert_eq!(ledger::load(dir.path()), LedgerState::Loaded(ledger));
    }
}
