// コマンド共通コンテキスト
//
// 設定ファイル読み込みやスキーマ定義の読み込みの重複をCLI層で集約する。

use crate::adapters::database::SqlxGateway;
use crate::core::config::Config;
use crate::services::config_loader::ConfigLoader;
use crate::services::schema_loader::SchemaLoader;
use crate::services::schema_manager::SchemaManager;
use crate::services::schema_store::SchemaStore;
use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// CLIコマンド共通の実行コンテキスト
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub project_path: PathBuf,
    pub config_path: PathBuf,
    pub config: Config,
}

impl CommandContext {
    /// プロジェクトルートから設定を読み込んでコンテキストを作成
    ///
    /// # Arguments
    ///
    /// * `project_path` - プロジェクトのルートパス
    /// * `config_path` - 設定ファイルのパス（Noneの場合はデフォルト）
    pub fn load(project_path: &Path, config_path: Option<&Path>) -> Result<Self> {
        let config_path = config_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| project_path.join(Config::DEFAULT_CONFIG_PATH));
        if !config_path.exists() {
            return Err(anyhow!("Config file not found: {:?}", config_path));
        }

        let config =
            ConfigLoader::from_file(&config_path).with_context(|| "Failed to read config file")?;

        Ok(Self {
            project_path: project_path.to_path_buf(),
            config_path,
            config,
        })
    }

    /// スキーマ定義ファイルの絶対パス
    pub fn schema_file(&self) -> PathBuf {
        self.project_path.join(&self.config.schema_file)
    }

    /// 成果物の保存先
    pub fn store(&self) -> SchemaStore {
        SchemaStore::from_config(&self.project_path, &self.config)
    }

    /// 対象の名前空間（未指定の場合は設定の既定値）
    pub fn namespace(&self, namespace: Option<&str>) -> String {
        namespace
            .map(str::to_string)
            .unwrap_or_else(|| self.config.default_namespace.clone())
    }

    /// スキーマ管理サービスを作成
    ///
    /// スキーマ定義ファイルがあればそれを、なければ指定名前空間の成果物を読み込みます。
    pub fn manager(&self, namespace: &str) -> Result<SchemaManager<SqlxGateway>> {
        let gateway = SqlxGateway::new(self.config.clone());
        let schema_file = self.schema_file();

        if schema_file.exists() {
            let schema = SchemaLoader::new().load_file(&schema_file)?;
            debug!(path = %schema_file.display(), tables = schema.table_count(), "Loaded schema definition");
            return Ok(SchemaManager::new(
                schema,
                self.config.defaults.clone(),
                self.store(),
                gateway,
            ));
        }

        SchemaManager::from_artifact(namespace, self.config.defaults.clone(), self.store(), gateway)
            .with_context(|| {
                format!(
                    "Schema file not found: {:?}, and no build artifact exists for namespace '{}'",
                    schema_file, namespace
                )
            })
    }
}
