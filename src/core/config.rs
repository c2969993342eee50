// 設定ファイル管理
//
// プロジェクトの設定ファイル（YAML形式）の読み込み、検証、
// データベース名前空間ごとの接続設定とスキーマ既定値の管理を行います。

use anyhow::{anyhow, Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// データベース方言
///
/// 現在サポートしているのはMySQLのみです。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dialect {
    #[default]
    #[serde(rename = "mysql")]
    MySQL,
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dialect::MySQL => write!(f, "mysql"),
        }
    }
}

/// スキーマのグローバル既定値
///
/// スキーマ定義の`_options`で未指定の項目はこの値で補完されます。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDefaults {
    /// created / updated / deleted カラムを自動追加するか
    #[serde(default = "default_true")]
    pub timestamps: bool,

    /// 外部キー制約を生成するか
    #[serde(default = "default_true")]
    pub constraints: bool,

    #[serde(default = "default_charset")]
    pub charset: String,

    #[serde(default = "default_collate")]
    pub collate: String,

    #[serde(default = "default_engine")]
    pub engine: String,
}

fn default_true() -> bool {
    true
}

fn default_charset() -> String {
    "utf8".to_string()
}

fn default_collate() -> String {
    "utf8_general_ci".to_string()
}

fn default_engine() -> String {
    "InnoDB".to_string()
}

impl Default for SchemaDefaults {
    fn default() -> Self {
        Self {
            timestamps: true,
            constraints: true,
            charset: default_charset(),
            collate: default_collate(),
            engine: default_engine(),
        }
    }
}

/// プロジェクト設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// 設定ファイルのバージョン
    pub version: String,

    /// データベース方言
    #[serde(default)]
    pub dialect: Dialect,

    /// スキーマ定義ファイル
    #[serde(default = "default_schema_file")]
    pub schema_file: PathBuf,

    /// コンパイル済みスキーマの出力ディレクトリ
    #[serde(default = "default_build_dir")]
    pub build_dir: PathBuf,

    /// SQLダンプの出力ディレクトリ
    #[serde(default = "default_generated_dir")]
    pub generated_dir: PathBuf,

    /// 既定のデータベース名前空間
    #[serde(default = "default_namespace")]
    pub default_namespace: String,

    /// スキーマのグローバル既定値
    #[serde(default)]
    pub defaults: SchemaDefaults,

    /// 名前空間ごとのデータベース設定
    #[serde(default)]
    pub databases: IndexMap<String, DatabaseConfig>,
}

fn default_schema_file() -> PathBuf {
    PathBuf::from("db/schema.yaml")
}

fn default_build_dir() -> PathBuf {
    PathBuf::from("db/build")
}

fn default_generated_dir() -> PathBuf {
    PathBuf::from("db/generated")
}

fn default_namespace() -> String {
    "default".to_string()
}

impl Config {
    /// デフォルトの設定ファイルパス
    pub const DEFAULT_CONFIG_PATH: &'static str = crate::core::naming::CONFIG_FILE;

    /// 指定された名前空間のデータベース設定を取得
    pub fn get_database_config(&self, namespace: &str) -> Result<DatabaseConfig> {
        self.databases.get(namespace).cloned().ok_or_else(|| {
            anyhow!(
                "Database namespace '{}' not found. Available namespaces: {:?}",
                namespace,
                self.databases.keys().collect::<Vec<_>>()
            )
        })
    }

    /// 指定された名前空間のテーブル名プレフィックス
    pub fn table_prefix(&self, namespace: &str) -> String {
        self.databases
            .get(namespace)
            .and_then(|db| db.prefix.clone())
            .unwrap_or_default()
    }

    /// 設定の妥当性を検証
    pub fn validate(&self) -> Result<()> {
        if self.version.is_empty() {
            return Err(anyhow!("Config file version is not specified"));
        }

        if self.default_namespace.is_empty() {
            return Err(anyhow!("Default database namespace is empty"));
        }

        for (namespace, db_config) in &self.databases {
            db_config
                .validate()
                .with_context(|| format!("Invalid config for namespace '{}'", namespace))?;
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            dialect: Dialect::MySQL,
            schema_file: default_schema_file(),
            build_dir: default_build_dir(),
            generated_dir: default_generated_dir(),
            default_namespace: default_namespace(),
            defaults: SchemaDefaults::default(),
            databases: IndexMap::new(),
        }
    }
}

/// std::str::FromStrトレイトの実装
impl FromStr for Config {
    type Err = anyhow::Error;

    fn from_str(yaml: &str) -> Result<Self, Self::Err> {
        serde_saphyr::from_str(yaml).with_context(|| "Failed to parse config file")
    }
}

/// データベース接続設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// データベース名
    pub database: String,

    pub user: Option<String>,

    pub password: Option<String>,

    /// テーブル名プレフィックス
    #[serde(default)]
    pub prefix: Option<String>,

    /// 接続タイムアウト（秒）
    pub timeout: Option<u64>,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    3306 // MySQLのデフォルトポート
}

impl DatabaseConfig {
    /// Validate database configuration
    pub fn validate(&self) -> Result<()> {
        if self.database.is_empty() {
            return Err(anyhow!("Database name is not specified"));
        }

        Ok(())
    }
}
