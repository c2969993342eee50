// importコマンドハンドラー
//
// コンパイル済みスキーマのSQL文をデータベースに順に実行します。

use crate::cli::command_context::CommandContext;
use anyhow::{anyhow, Result};
use colored::Colorize;
use std::path::PathBuf;

/// importコマンドの入力パラメータ
#[derive(Debug, Clone)]
pub struct ImportCommand {
    /// プロジェクトのルートパス
    pub project_path: PathBuf,
    /// 設定ファイルのパス
    pub config_path: Option<PathBuf>,
    /// 名前空間
    pub namespace: Option<String>,
}

/// importコマンドハンドラー
#[derive(Debug, Clone, Default)]
pub struct ImportCommandHandler {}

impl ImportCommandHandler {
    /// 新しいImportCommandHandlerを作成
    pub fn new() -> Self {
        Self {}
    }

    /// importコマンドを実行
    ///
    /// # Errors
    ///
    /// いずれかのSQL文が失敗した場合（それまでに適用された文はそのまま残ります）
    pub async fn execute(&self, command: &ImportCommand) -> Result<String> {
        let context = CommandContext::load(&command.project_path, command.config_path.as_deref())?;
        let namespace = context.namespace(command.namespace.as_deref());
        context.config.get_database_config(&namespace)?;

        let mut manager = context.manager(&namespace)?;
        let imported = manager.import(Some(&namespace)).await;
        manager.gateway_mut().close().await;

        if !imported {
            return Err(anyhow!(
                "Failed to import schema into namespace '{}'. Run with --verbose for details.",
                namespace
            ));
        }

        Ok(format!(
            "{} {} tables into namespace '{}'",
            "✓ Imported".green().bold(),
            manager.schema().table_count(),
            namespace
        ))
    }
}
