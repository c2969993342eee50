// スキーマストアサービス
//
// コンパイル済みスキーマの成果物（YAML）の保存・再読み込みと、
// SQLダンプファイルの書き出しを行います。

use crate::core::config::Config;
use crate::core::error::IoError;
use crate::core::naming::{
    backup_file_name, build_file_name, dump_file_name, generator_identity,
};
use crate::core::schema::Schema;
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// スキーマストアサービス
#[derive(Debug, Clone)]
pub struct SchemaStore {
    build_dir: PathBuf,
    generated_dir: PathBuf,
}

impl SchemaStore {
    /// 新しいSchemaStoreを作成
    ///
    /// # Arguments
    ///
    /// * `build_dir` - コンパイル済みスキーマの出力ディレクトリ
    /// * `generated_dir` - SQLダンプの出力ディレクトリ
    pub fn new(build_dir: impl Into<PathBuf>, generated_dir: impl Into<PathBuf>) -> Self {
        Self {
            build_dir: build_dir.into(),
            generated_dir: generated_dir.into(),
        }
    }

    /// 設定のディレクトリをプロジェクトルート基準で解決して作成
    pub fn from_config(project_path: &Path, config: &Config) -> Self {
        Self::new(
            project_path.join(&config.build_dir),
            project_path.join(&config.generated_dir),
        )
    }

    /// コンパイル済みスキーマのパス
    pub fn artifact_path(&self, namespace: &str) -> PathBuf {
        self.build_dir.join(build_file_name(namespace))
    }

    /// バックアップのパス
    pub fn backup_path(&self, namespace: &str) -> PathBuf {
        self.build_dir.join(backup_file_name(namespace))
    }

    /// SQLダンプのパス
    pub fn dump_path(&self, namespace: &str) -> PathBuf {
        self.generated_dir.join(dump_file_name(namespace))
    }

    /// スキーマをYAML文字列にシリアライズ
    pub fn serialize(schema: &Schema) -> Result<String> {
        serde_saphyr::to_string(schema).with_context(|| "Failed to serialize compiled schema")
    }

    /// YAML文字列からスキーマをデシリアライズ
    pub fn deserialize(content: &str) -> Result<Schema> {
        serde_saphyr::from_str(content).with_context(|| "Failed to parse compiled schema")
    }

    /// コンパイル済みスキーマを保存
    ///
    /// `backup`がtrueの場合は`~`付きのバックアップを同じディレクトリにコピーします。
    ///
    /// # Returns
    ///
    /// 書き込んだ成果物のパス
    pub fn save(&self, schema: &Schema, namespace: &str, backup: bool) -> Result<PathBuf> {
        let content = Self::serialize(schema)?;
        let path = self.artifact_path(namespace);

        write_file(&path, &content)?;
        debug!(path = %path.display(), "Wrote compiled schema");

        if backup {
            let backup_path = self.backup_path(namespace);
            fs::copy(&path, &backup_path).map_err(|e| IoError::FileWrite {
                path: backup_path.display().to_string(),
                cause: e.to_string(),
            })?;
            debug!(path = %backup_path.display(), "Wrote compiled schema backup");
        }

        Ok(path)
    }

    /// コンパイル済みスキーマを読み込む
    pub fn load(&self, namespace: &str) -> Result<Schema> {
        let path = self.artifact_path(namespace);
        let content = read_file(&path)?;
        Self::deserialize(&content).with_context(|| format!("Invalid artifact: {:?}", path))
    }

    /// SQLダンプの内容を生成
    ///
    /// 生成元と日時（RFC 2822）のヘッダーに続けて、SQL文を改行区切りで連結します。
    pub fn render_dump(statements: &[String], generated_at: DateTime<Local>) -> String {
        format!(
            "--\n-- Generated by {}\n-- {}\n--\n\n{}",
            generator_identity(),
            generated_at.to_rfc2822(),
            statements.join("\n")
        )
    }

    /// SQLダンプを書き出す
    ///
    /// # Returns
    ///
    /// 書き込んだダンプファイルのパス
    pub fn write_dump(&self, namespace: &str, statements: &[String]) -> Result<PathBuf> {
        let path = self.dump_path(namespace);
        let content = Self::render_dump(statements, Local::now());

        write_file(&path, &content)?;
        debug!(path = %path.display(), "Wrote SQL dump");

        Ok(path)
    }
}

fn read_file(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(IoError::FileNotFound {
            path: path.display().to_string(),
        }
        .into());
    }

    fs::read_to_string(path).map_err(|e| {
        IoError::FileRead {
            path: path.display().to_string(),
            cause: e.to_string(),
        }
        .into()
    })
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| IoError::DirectoryCreate {
            path: parent.display().to_string(),
            cause: e.to_string(),
        })?;
    }

    fs::write(path, content).map_err(|e| {
        IoError::FileWrite {
            path: path.display().to_string(),
            cause: e.to_string(),
        }
        .into()
    })
}
