use anyhow::Context;
use clap::Parser;
use pdf_renamer::cli::{Cli, Commands};
use pdf_renamer::config::{Config, Overrides};
use pdf_renamer::prompt::{AssumeYes, Confirm, TerminalPrompt};
use pdf_renamer::renamer::{run_rename, RenameOptions};
use pdf_renamer::{menu, preview, undo};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load().context("設定ファイルの読み込みに失敗")?;
    let overrides = Overrides {
        excel_file: cli.excel.clone(),
        pdf_folder: cli.folder.clone(),
        sheet: cli.sheet.clone(),
    };

    let settings = || config.resolve(&overrides);

    match cli.command.unwrap_or(Commands::Menu) {
        Commands::Preview => {
            preview::run_preview(&settings()?)?;
        }

        Commands::List => {
            preview::run_list(&settings()?)?;
        }

        Commands::Rename { yes, dry_run } => {
            println!("📄 pdf-renamer - リネーム\n");
            let options = RenameOptions {
                dry_run,
                verbose: cli.verbose,
            };
            let outcome = run_rename(&settings()?, options, confirmer(yes).as_mut())?;
            tracing::debug!(?outcome, "リネーム終了");
        }

        Commands::Undo { yes } => {
            println!("↩ pdf-renamer - 元に戻す\n");
            let outcome = undo::run_undo(settings()?.pdf_folder()?, confirmer(yes).as_mut())?;
            tracing::debug!(?outcome, "取り消し終了");
        }

        Commands::Config {
            show,
            set_excel,
            set_folder,
            set_sheet,
            set_name_column,
            set_number_column,
        } => {
            let mut config = config.clone();
            let mut changed = false;

            if let Some(path) = set_excel {
                config.excel_file = Some(path);
                changed = true;
            }
            if let Some(path) = set_folder {
                config.pdf_folder = Some(path);
                changed = true;
            }
            if let Some(sheet) = set_sheet {
                config.sheet = Some(sheet);
                changed = true;
            }
            if let Some(column) = set_name_column {
                config.name_column = column.trim().to_uppercase();
                changed = true;
            }
            if let Some(column) = set_number_column {
                config.number_column = column.trim().to_uppercase();
                changed = true;
            }

            if changed {
                // 不正な値は保存しない
                config.resolve(&Overrides::default())?;
                config.save()?;
                println!("✔ 設定を保存しました: {}", Config::config_path()?.display());
            }

            if show || !changed {
                print_config(&config);
            }
        }

        Commands::Menu => {
            menu::run_menu(&settings()?, cli.verbose)?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn confirmer(yes: bool) -> Box<dyn Confirm> {
    if yes {
        Box::new(AssumeYes)
    } else {
        Box::new(TerminalPrompt)
    }
}

fn print_config(config: &Config) {
    let show_path = |p: &Option<std::path::PathBuf>| {
        p.as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "未設定".to_string())
    };

    println!("設定:");
    println!("  参照表: {}", show_path(&config.excel_file));
    println!("  PDFフォルダ: {}", show_path(&config.pdf_folder));
    println!("  シート: {}", config.sheet.as_deref().unwrap_or("先頭"));
    println!("  文書名の列: {}", config.name_column);
    println!("  文書番号の列: {}", config.number_column);
    println!("  ヘッダー行数: {}", config.header_rows);
    println!("  拡張子: {}", config.extension);
}
