// sqlコマンドハンドラー
//
// コンパイル結果のSQLスクリプトを標準出力に表示します（ファイルには書き込みません）。

use crate::cli::command_context::CommandContext;
use anyhow::{Context, Result};
use std::path::PathBuf;

/// sqlコマンドの入力パラメータ
#[derive(Debug, Clone)]
pub struct SqlCommand {
    /// プロジェクトのルートパス
    pub project_path: PathBuf,
    /// 設定ファイルのパス
    pub config_path: Option<PathBuf>,
    /// 名前空間
    pub namespace: Option<String>,
}

/// sqlコマンドハンドラー
#[derive(Debug, Clone, Default)]
pub struct SqlCommandHandler {}

impl SqlCommandHandler {
    /// 新しいSqlCommandHandlerを作成
    pub fn new() -> Self {
        Self {}
    }

    /// sqlコマンドを実行
    ///
    /// # Returns
    ///
    /// 改行区切りのSQLスクリプト
    pub fn execute(&self, command: &SqlCommand) -> Result<String> {
        let context = CommandContext::load(&command.project_path, command.config_path.as_deref())?;
        let namespace = context.namespace(command.namespace.as_deref());
        let mut manager = context.manager(&namespace)?;

        manager
            .load()
            .with_context(|| format!("Failed to compile schema for namespace '{}'", namespace))?;

        Ok(manager.statements().join("\n"))
    }
}
