// buildコマンドハンドラー
//
// スキーマ定義をコンパイルし、コンパイル済みスキーマを成果物として保存します。

use crate::cli::command_context::CommandContext;
use anyhow::{anyhow, Result};
use colored::Colorize;
use std::path::PathBuf;

/// buildコマンドの入力パラメータ
#[derive(Debug, Clone)]
pub struct BuildCommand {
    /// プロジェクトのルートパス
    pub project_path: PathBuf,
    /// 設定ファイルのパス
    pub config_path: Option<PathBuf>,
    /// 名前空間
    pub namespace: Option<String>,
    /// バックアップを作成するか
    pub backup: bool,
}

/// buildコマンドハンドラー
#[derive(Debug, Clone, Default)]
pub struct BuildCommandHandler {}

impl BuildCommandHandler {
    /// 新しいBuildCommandHandlerを作成
    pub fn new() -> Self {
        Self {}
    }

    /// buildコマンドを実行
    ///
    /// # Returns
    ///
    /// 成功時は書き込んだ成果物のパスを含むメッセージ
    pub fn execute(&self, command: &BuildCommand) -> Result<String> {
        let context = CommandContext::load(&command.project_path, command.config_path.as_deref())?;
        let namespace = context.namespace(command.namespace.as_deref());
        let mut manager = context.manager(&namespace)?;

        if !manager.build(Some(&namespace), command.backup) {
            return Err(anyhow!(
                "Failed to build schema for namespace '{}'",
                namespace
            ));
        }

        let path = context.store().artifact_path(&namespace);
        Ok(format!(
            "{} {} ({} tables)",
            "✓ Built schema:".green().bold(),
            path.display(),
            manager.schema().table_count()
        ))
    }
}
