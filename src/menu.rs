//! 対話メニュー
//!
//! 各操作のエラーは表示してメニューに戻る。入力自体が失敗した場合のみ終了する。

use crate::config::Settings;
use crate::error::{RenamerError, Result};
use crate::prompt::{read_line, TerminalPrompt};
use crate::renamer::{run_rename, RenameOptions};
use crate::{preview, undo, Outcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Preview,
    List,
    Rename,
    Undo,
    Exit,
}

impl MenuChoice {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(MenuChoice::Preview),
            "2" => Some(MenuChoice::List),
            "3" => Some(MenuChoice::Rename),
            "4" => Some(MenuChoice::Undo),
            "5" => Some(MenuChoice::Exit),
            _ => None,
        }
    }
}

fn print_options(settings: &Settings) {
    println!("\n操作を選んでください:");
    println!(
        "1. 参照表のプレビュー（{}列・{}列）",
        settings.layout.name_column, settings.layout.number_column
    );
    println!("2. {}ファイル一覧（サブフォルダ含む）", settings.extension.to_uppercase());
    println!("3. リネーム");
    println!("4. リネームを元に戻す");
    println!("5. 終了");
}

/// メニューを表示して選択された操作を繰り返す
pub fn run_menu(settings: &Settings, verbose: bool) -> Result<()> {
    println!("PDF Renamer - 参照表の文書名とPDFファイルを照合");
    println!("{}", "=".repeat(55));

    loop {
        print_options(settings);

        let input = read_line("\n番号を入力 (1-5)")?;
        let Some(choice) = MenuChoice::parse(&input) else {
            println!("無効な選択です。1〜5を入力してください");
            continue;
        };

        if choice == MenuChoice::Exit {
            println!("終了します");
            return Ok(());
        }

        match run_choice(choice, settings, verbose) {
            Ok(outcome) => tracing::debug!(?choice, ?outcome, "操作終了"),
            Err(e @ RenamerError::Prompt(_)) => return Err(e),
            Err(e) => println!("\n✗ エラー: {}", e),
        }
    }
}

fn run_choice(choice: MenuChoice, settings: &Settings, verbose: bool) -> Result<Outcome> {
    match choice {
        MenuChoice::Preview => preview::run_preview(settings),
        MenuChoice::List => preview::run_list(settings),
        MenuChoice::Rename => run_rename(
            settings,
            RenameOptions {
                dry_run: false,
                verbose,
            },
            &mut TerminalPrompt,
        ),
        MenuChoice::Undo => undo::run_undo(settings.pdf_folder()?, &mut TerminalPrompt),
        MenuChoice::Exit => Ok(Outcome::NothingToDo),
    }
}
