use anyhow::{Context, Result};
use clap::Parser;
use colored::control as color_control;
use lucid_schema::cli::commands::build::{BuildCommand, BuildCommandHandler};
use lucid_schema::cli::commands::export::{ExportCommand, ExportCommandHandler};
use lucid_schema::cli::commands::import::{ImportCommand, ImportCommandHandler};
use lucid_schema::cli::commands::sql::{SqlCommand, SqlCommandHandler};
use lucid_schema::cli::{Cli, Commands};
use std::env;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    sqlx::any::install_default_drivers();

    // CLIをパースして実行
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // 非同期ランタイムを作成して実行
    let runtime = tokio::runtime::Runtime::new()
        .context("Failed to create Tokio runtime")
        .unwrap_or_else(|e| {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        });

    let result = runtime.block_on(run_command(cli));

    match result {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

/// ログ出力を初期化する（RUST_LOGが優先、--verboseで既定レベルをdebugに上げる）
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("lucid_schema={}", default_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// コマンドを実行する
async fn run_command(cli: Cli) -> Result<String> {
    // --no-color フラグの処理
    if cli.no_color {
        color_control::set_override(false);
    }

    // プロジェクトのルートパスを取得
    let project_path = env::current_dir()?;

    // --config フラグの処理（絶対パスに変換）
    let config_path: Option<PathBuf> = cli.config.map(|p| {
        if p.is_absolute() {
            p
        } else {
            project_path.join(p)
        }
    });

    match cli.command {
        Commands::Build { namespace, backup } => {
            let handler = BuildCommandHandler::new();
            let command = BuildCommand {
                project_path,
                config_path,
                namespace,
                backup,
            };
            handler.execute(&command)
        }

        Commands::Import { namespace } => {
            let handler = ImportCommandHandler::new();
            let command = ImportCommand {
                project_path,
                config_path,
                namespace,
            };
            handler.execute(&command).await
        }

        Commands::Export { namespace } => {
            let handler = ExportCommandHandler::new();
            let command = ExportCommand {
                project_path,
                config_path,
                namespace,
            };
            handler.execute(&command)
        }

        Commands::Sql { namespace } => {
            let handler = SqlCommandHandler::new();
            let command = SqlCommand {
                project_path,
                config_path,
                namespace,
            };
            handler.execute(&command)
        }
    }
}
