//! リネーム実行モジュール
//!
//! ## 処理フロー
//! 1. 参照表読み込み・ファイルスキャン
//! 2. 照合（カスケード）と結果の一覧表示
//! 3. 確認プロンプト（中止ならファイルは一切変更しない）
//! 4. リネーム（既存ファイルは上書きしない）と台帳への記録

use crate::config::Settings;
use crate::error::{RenamerError, Result};
use crate::ledger;
use crate::prompt::Confirm;
use crate::reference::{read_reference_table, ReferenceLoad};
use crate::scanner::scan_folder;
use crate::Outcome;
use indicatif::{ProgressBar, ProgressStyle};
use pdf_renamer_common::{CandidateFile, FileAnalysis, FileOutcome, Ledger, MatchReport, MatchResult, Matcher};
use std::path::{Path, PathBuf};

/// 1件のリネーム計画
#[derive(Debug, Clone, PartialEq)]
pub struct RenamePlan {
    pub source: PathBuf,
    pub target: PathBuf,
    /// ルートからの相対パス（`/`区切り）
    pub source_rel: String,
    pub target_rel: String,
    pub new_name: String,
    pub matched: MatchResult,
}

/// 1件のリネーム結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenameStatus {
    Renamed,
    /// リネーム先が既に存在
    Collision,
    Failed(String),
}

/// リネーム処理の集計
#[derive(Debug, Clone, Default)]
pub struct RenameSummary {
    pub items: Vec<(RenamePlan, RenameStatus)>,
    /// 台帳を保存できなかった場合の理由
    pub ledger_warning: Option<String>,
    /// 保存後の台帳件数
    pub ledger_entries: usize,
}

impl RenameSummary {
    pub fn count(&self, status: &RenameStatus) -> usize {
        self.items.iter().filter(|(_, s)| s == status).count()
    }

    pub fn renamed_count(&self) -> usize {
        self.count(&RenameStatus::Renamed)
    }

    pub fn collision_count(&self) -> usize {
        self.count(&RenameStatus::Collision)
    }

    pub fn failed_count(&self) -> usize {
        self.items
            .iter()
            .filter(|(_, s)| matches!(s, RenameStatus::Failed(_)))
            .count()
    }
}

/// リネーム処理のオプション
#[derive(Debug, Clone, Copy, Default)]
pub struct RenameOptions {
    /// 計画の表示のみ
    pub dry_run: bool,
    /// ファイルごとの照合詳細を表示
    pub verbose: bool,
}

/// 照合結果からリネーム計画を作る（リネーム先は元と同じフォルダ）
pub fn plan_renames(matches: &[MatchResult], extension: &str) -> Vec<RenamePlan> {
    matches
        .iter()
        .map(|m| {
            let new_name = m.new_file_name(extension);
            let target_rel = match m.file.relative_path.rsplit_once('/') {
                Some((dir, _)) => format!("{}/{}", dir, new_name),
                None => new_name.clone(),
            };
            RenamePlan {
                source: m.file.path.clone(),
                target: m.file.path.with_file_name(&new_name),
                source_rel: m.file.relative_path.clone(),
                target_rel,
                new_name,
                matched: m.clone(),
            }
        })
        .collect()
}

/// リネームを実行し、成功した分を台帳に記録する
///
/// 台帳は1件成功するごとに保存する。読めない台帳がある場合は
/// 何もリネームせずにエラーを返す。
pub fn execute_renames<F>(plans: &[RenamePlan], root: &Path, mut on_item: F) -> Result<RenameSummary>
where
    F: FnMut(&RenamePlan, &RenameStatus),
{
    let existing = ledger::load(root).into_existing(root)?;
    let mut session = Ledger::new();
    let mut summary = RenameSummary {
        ledger_entries: existing.len(),
        ..Default::default()
    };
    let mut last_save_failed = false;

    for plan in plans {
        let status = rename_one(plan);

        if status == RenameStatus::Renamed {
            session.record(plan.target_rel.clone(), plan.source_rel.clone());
            match ledger::persist_session(root, &existing, &session) {
                Ok(saved) => {
                    summary.ledger_entries = saved.len();
                    last_save_failed = false;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "台帳の途中保存に失敗");
                    last_save_failed = true;
                }
            }
        }

        on_item(plan, &status);
        summary.items.push((plan.clone(), status));
    }

    if last_save_failed {
        match ledger::persist_session(root, &existing, &session) {
            Ok(saved) => summary.ledger_entries = saved.len(),
            Err(e) => summary.ledger_warning = Some(e.to_string()),
        }
    }

    Ok(summary)
}

fn rename_one(plan: &RenamePlan) -> RenameStatus {
    if plan.new_name.contains(['/', '\\']) {
        return RenameStatus::Failed(format!("ファイル名に使えない文字を含みます: '{}'", plan.new_name));
    }
    if plan.target.exists() {
        return RenameStatus::Collision;
    }

    match std::fs::rename(&plan.source, &plan.target) {
        Ok(()) => RenameStatus::Renamed,
        Err(e) => {
            tracing::debug!(source = %plan.source.display(), error = %e, "リネーム失敗");
            RenameStatus::Failed(e.to_string())
        }
    }
}

/// 参照表の読み込みからリネームまで一括実行
pub fn run_rename(settings: &Settings, options: RenameOptions, confirm: &mut dyn Confirm) -> Result<Outcome> {
    let excel_file = settings.excel_file()?;
    let folder = settings.pdf_folder()?;

    // 1. 参照表
    println!("[1/3] 参照表を読み込み中...");
    let load = read_reference_table(excel_file, &settings.layout)?;
    print_reference_rows(&load, options.verbose);

    if load.table.is_empty() {
        return Err(RenamerError::NoReferenceEntries {
            name_column: settings.layout.name_column.clone(),
            number_column: settings.layout.number_column.clone(),
        });
    }
    println!("✔ 有効な文書名・文書番号の組: {}件\n", load.table.len());

    // 2. ファイルスキャン
    println!("[2/3] {}ファイルをスキャン中...", settings.extension.to_uppercase());
    let files = scan_folder(folder, &settings.extension)?;
    if files.is_empty() {
        return Err(RenamerError::NoCandidateFiles(folder.display().to_string()));
    }
    println!("✔ {}件のファイルを検出\n", files.len());
    if options.verbose {
        for file in &files {
            println!("  - {}", file.relative_path);
        }
        println!();
    }

    // 3. 照合
    println!("[3/3] 照合中...");
    let report = match_with_progress(&Matcher::new(&load.table), &files, options.verbose);
    print_match_summary(&report, &settings.extension);

    if report.matches.is_empty() {
        println!("リネームできるファイルはありません（一致なし）");
        println!("\nヒント:");
        println!("  1. `pdf-renamer preview` で{}列の文書名を確認", settings.layout.name_column);
        println!("  2. `pdf-renamer list` でファイル名を確認");
        println!("  3. 文書名とファイル名に共通の単語があるか確認");
        return Ok(Outcome::NothingToDo);
    }

    if options.dry_run {
        println!("ドライランのため変更は行いません");
        return Ok(Outcome::Completed);
    }

    if !confirm.confirm(&format!("{}件のファイルをリネームしますか？", report.matches.len()))? {
        println!("キャンセルしました");
        return Ok(Outcome::Aborted);
    }

    println!("\nリネーム中...");
    let plans = plan_renames(&report.matches, &settings.extension);
    let summary = execute_renames(&plans, folder, |plan, status| match status {
        RenameStatus::Renamed => println!("  ✔ '{}' → '{}'", plan.source_rel, plan.new_name),
        RenameStatus::Collision => println!(
            "  ⚠ スキップ '{}' - '{}' は既に存在します",
            plan.source_rel, plan.new_name
        ),
        RenameStatus::Failed(reason) => println!("  ✗ リネーム失敗 '{}': {}", plan.source_rel, reason),
    })?;

    if let Some(warning) = &summary.ledger_warning {
        println!("\n⚠ 警告: 台帳を保存できませんでした: {}", warning);
        println!("  （リネーム済みのファイルは元に戻していません）");
    } else if summary.renamed_count() > 0 {
        println!("\n📁 台帳を保存: {}", ledger::ledger_path(folder).display());
        println!("  （元に戻すための記録です。{}件）", summary.ledger_entries);
    }

    println!(
        "\n✅ {}件中{}件をリネームしました",
        plans.len(),
        summary.renamed_count()
    );
    if summary.collision_count() > 0 {
        println!("⚠ 既存ファイルのためスキップ: {}件", summary.collision_count());
    }
    if summary.failed_count() > 0 {
        println!("✗ 失敗: {}件", summary.failed_count());
    }

    Ok(Outcome::Completed)
}

fn match_with_progress(matcher: &Matcher, files: &[CandidateFile], verbose: bool) -> MatchReport {
    if verbose {
        return matcher.match_all_with(files, print_analysis);
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::with_template("  {bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    let report = matcher.match_all_with(files, |analysis| {
        pb.set_message(analysis.file.stem.clone());
        pb.inc(1);
    });
    pb.finish_and_clear();
    report
}

fn print_reference_rows(load: &ReferenceLoad, verbose: bool) {
    if !verbose {
        return;
    }
    println!("文書名 → 文書番号:");
    println!("{}", "-".repeat(60));
    for row in &load.rows {
        println!("  行 {}: '{}' → 文書番号 {}", row.row_number, row.name, row.number);
    }
    for name in &load.overwritten {
        println!("  ⚠ 文書名が重複（後の行を採用）: '{}'", name);
    }
    println!();
}

fn print_analysis(analysis: &FileAnalysis) {
    println!("\n解析中: '{}'", analysis.file.relative_path);
    for hit in &analysis.hits {
        println!(
            "  ~ {}: '{}' (スコア: {:.3}) → 文書番号 {}",
            hit.strategy(),
            hit.entry.name,
            hit.score(),
            hit.entry.number
        );
        println!("    {}", hit.hit.details);
    }

    match &analysis.outcome {
        FileOutcome::Matched(m) => {
            println!(
                "  ✔ 一致: '{}' ({}, スコア: {:.3}) → 文書番号 {}",
                m.matched_name, m.strategy, m.score, m.matched_number
            );
            if !m.details.is_empty() {
                println!("    {}", m.details);
            }
        }
        FileOutcome::Unmatched { best } => {
            let score = best.as_ref().map_or(0.0, |c| c.score());
            println!("  ✗ 一致なし（最高スコア: {:.3}）", score);
            if let Some(candidate) = best {
                println!("    最良候補 '{}' はスコア不足", candidate.entry.name);
            }
        }
    }
}

fn print_match_summary(report: &MatchReport, extension: &str) {
    println!("\n{}", "=".repeat(70));
    println!("照合結果");
    println!("{}", "=".repeat(70));

    if !report.matches.is_empty() {
        println!("\nリネーム対象 ({}件):", report.matches.len());
        for (i, m) in report.matches.iter().enumerate() {
            println!(
                "  {:2}. '{}' → '{}'",
                i + 1,
                m.file.relative_path,
                m.new_file_name(extension)
            );
            println!("      照合: '{}' ({}, スコア: {:.3})", m.matched_name, m.strategy, m.score);
            if !m.details.is_empty() {
                println!("      詳細: {}", m.details);
            }
        }
    }

    if !report.unmatched.is_empty() {
        println!("\n一致なし ({}件):", report.unmatched.len());
        for u in &report.unmatched {
            match &u.best {
                Some(candidate) => println!(
                    "  '{}'（最良候補: '{}', スコア: {:.3}）",
                    u.file.relative_path,
                    candidate.entry.name,
                    u.best_score()
                ),
                None => println!("  '{}'", u.file.relative_path),
            }
        }
    }
    println!();
}
