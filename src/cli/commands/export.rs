// exportコマンドハンドラー
//
// コンパイル済みスキーマのSQL文を、ヘッダー付きのSQLダンプファイルとして書き出します。

use crate::cli::command_context::CommandContext;
use anyhow::{anyhow, Result};
use colored::Colorize;
use std::path::PathBuf;

/// exportコマンドの入力パラメータ
#[derive(Debug, Clone)]
pub struct ExportCommand {
    /// プロジェクトのルートパス
    pub project_path: PathBuf,
    /// 設定ファイルのパス
    pub config_path: Option<PathBuf>,
    /// 名前空間
    pub namespace: Option<String>,
}

/// exportコマンドハンドラー
#[derive(Debug, Clone, Default)]
pub struct ExportCommandHandler {}

impl ExportCommandHandler {
    /// 新しいExportCommandHandlerを作成
    pub fn new() -> Self {
        Self {}
    }

    /// exportコマンドを実行
    ///
    /// # Returns
    ///
    /// 成功時は書き込んだダンプファイルのパスを含むメッセージ
    pub fn execute(&self, command: &ExportCommand) -> Result<String> {
        let context = CommandContext::load(&command.project_path, command.config_path.as_deref())?;
        let namespace = context.namespace(command.namespace.as_deref());
        let mut manager = context.manager(&namespace)?;

        if !manager.export(Some(&namespace)) {
            return Err(anyhow!(
                "Failed to export schema for namespace '{}'",
                namespace
            ));
        }

        let path = context.store().dump_path(&namespace);
        Ok(format!(
            "{} {} ({} statements)",
            "✓ Exported SQL dump:".green().bold(),
            path.display(),
            manager.statements().len()
        ))
    }
}
