// スキーマ定義読み込みサービス
//
// 宣言的なスキーマ定義ファイルを読み込みます。
// 拡張子でYAML（.yaml / .yml）とJSON（.json）を切り替え、
// テーブル名・カラム名が識別子として妥当かを検証します。

use crate::core::error::{CompileError, IoError};
use crate::core::schema::Schema;
use anyhow::{anyhow, Context, Result};
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use tracing::warn;

/// テーブル名・カラム名として許可するパターン
static IDENTIFIER_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").ok());

/// MySQLの識別子の最大長
const MAX_IDENTIFIER_LENGTH: usize = 64;

/// スキーマ定義の形式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaFormat {
    Yaml,
    Json,
}

impl SchemaFormat {
    /// 拡張子から形式を判定
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Ok(SchemaFormat::Yaml),
            Some("json") => Ok(SchemaFormat::Json),
            other => Err(anyhow!(
                "Unsupported schema file extension: {:?} ({})",
                other,
                path.display()
            )),
        }
    }
}

/// スキーマ定義読み込みサービス
#[derive(Debug, Clone, Default)]
pub struct SchemaLoader {}

impl SchemaLoader {
    /// 新しいSchemaLoaderを作成
    pub fn new() -> Self {
        Self {}
    }

    /// スキーマ定義ファイルを読み込み、識別子を検証する
    ///
    /// # Errors
    ///
    /// - ファイルが存在しない、または読み込めない場合
    /// - 拡張子がサポート外、または解析に失敗した場合
    /// - 不正な識別子を除くとテーブルが1つも残らない場合
    pub fn load_file(&self, path: &Path) -> Result<Schema> {
        if !path.exists() {
            return Err(IoError::FileNotFound {
                path: path.display().to_string(),
            }
            .into());
        }

        let format = SchemaFormat::from_path(path)?;
        let content = fs::read_to_string(path).map_err(|e| IoError::FileRead {
            path: path.display().to_string(),
            cause: e.to_string(),
        })?;

        let schema = self
            .parse(&content, format)
            .with_context(|| format!("Failed to parse schema file: {:?}", path))?;

        Ok(self.validate(schema)?)
    }

    /// 文字列からスキーマ定義を解析
    pub fn parse(&self, content: &str, format: SchemaFormat) -> Result<Schema> {
        let schema = match format {
            SchemaFormat::Yaml => serde_saphyr::from_str(content)?,
            SchemaFormat::Json => serde_json::from_str(content)?,
        };
        Ok(schema)
    }

    /// テーブル名・カラム名・外部キー名を検証し、不正なものを取り除く
    ///
    /// 不正な識別子を持つテーブル・フィールド・リレーションは警告を出してスキップし、
    /// 残りの定義はそのまま保持します。
    ///
    /// # Errors
    ///
    /// 取り除いた結果テーブルが1つも残らない場合は`CompileError::EmptySchema`
    pub fn validate(&self, mut schema: Schema) -> Result<Schema, CompileError> {
        let declared = schema.table_count();

        schema.tables.retain(|table_name, _| match validate_identifier(table_name) {
            Ok(()) => true,
            Err(e) => {
                warn!(table = %table_name, error = %e, "Skipping table");
                false
            }
        });

        for (table_name, table) in schema.tables.iter_mut() {
            table.fields.retain(|field_name, _| match validate_identifier(field_name) {
                Ok(()) => true,
                Err(e) => {
                    warn!(table = %table_name, field = %field_name, error = %e, "Skipping field");
                    false
                }
            });

            for relations in [
                &mut table.one_to_many,
                &mut table.one_to_one,
                &mut table.many_to_many,
            ] {
                relations.retain(|other, relation| {
                    let names = relation.name.iter().chain(relation.table.iter());
                    match names.map(|name| validate_identifier(name)).find_map(Result::err) {
                        None => true,
                        Some(e) => {
                            warn!(table = %table_name, relation = %other, error = %e, "Skipping relation");
                            false
                        }
                    }
                });
            }
        }

        if declared > 0 && schema.tables.is_empty() {
            return Err(CompileError::EmptySchema);
        }

        Ok(schema)
    }
}

/// 識別子を検証
///
/// # Errors
///
/// 空、長すぎる、または英数字とアンダースコア以外を含む場合は`CompileError::InvalidIdentifier`
pub fn validate_identifier(name: &str) -> Result<(), CompileError> {
    if name.len() > MAX_IDENTIFIER_LENGTH {
        return Err(CompileError::InvalidIdentifier {
            name: name.to_string(),
            reason: format!("longer than {} characters", MAX_IDENTIFIER_LENGTH),
        });
    }

    let valid = IDENTIFIER_PATTERN
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(name));
    if !valid {
        return Err(CompileError::InvalidIdentifier {
            name: name.to_string(),
            reason: "must start with a letter or underscore and contain only letters, digits and underscores".to_string(),
        });
    }

    Ok(())
}
