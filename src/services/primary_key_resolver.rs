// プライマリキー解決サービス
//
// テーブルごとのオプションを確定し、タイムスタンプカラムの追加と
// プライマリキーインデックスの構築を行います。

use crate::core::config::SchemaDefaults;
use crate::core::schema::{FieldDefinition, PrimaryKeyIndex, TableDefinition};
use indexmap::IndexMap;
use tracing::debug;

/// 自動追加されるタイムスタンプカラム
pub const TIMESTAMP_FIELDS: [&str; 3] = ["created", "updated", "deleted"];

/// 既定のプライマリキーカラム名
pub const DEFAULT_PK_FIELD: &str = "id";

/// プライマリキー解決サービス
#[derive(Debug, Clone, Default)]
pub struct PrimaryKeyResolver {}

impl PrimaryKeyResolver {
    /// 新しいPrimaryKeyResolverを作成
    pub fn new() -> Self {
        Self {}
    }

    /// テーブル定義を受け取り、オプション確定済みのテーブルとPKインデックスを返す
    ///
    /// # Arguments
    ///
    /// * `tables` - 宣言順のテーブル定義
    /// * `globals` - グローバルの実効オプション
    ///
    /// # Returns
    ///
    /// 更新済みのテーブル定義とプライマリキーインデックス
    pub fn resolve(
        &self,
        tables: IndexMap<String, TableDefinition>,
        globals: &SchemaDefaults,
    ) -> (IndexMap<String, TableDefinition>, PrimaryKeyIndex) {
        let mut resolved = IndexMap::with_capacity(tables.len());
        let mut pk_index = PrimaryKeyIndex::new();

        for (table_name, mut table) in tables {
            let effective = table.options.overlay(globals);
            table.options.fill_from(&effective);

            if effective.timestamps {
                for field in TIMESTAMP_FIELDS {
                    table
                        .fields
                        .insert(field.to_string(), FieldDefinition::nullable_datetime());
                }
            }

            let pk_fields = self.primary_key_fields(&table);
            debug!(
                table = %table_name,
                pk = ?pk_fields.keys().collect::<Vec<_>>(),
                "Resolved primary key"
            );

            pk_index.insert(table_name.clone(), pk_fields);
            resolved.insert(table_name, table);
        }

        (resolved, pk_index)
    }

    /// 明示的な`pk`オプション、または既定の`id`からPKフィールドを決定
    fn primary_key_fields(&self, table: &TableDefinition) -> IndexMap<String, FieldDefinition> {
        match table.options.pk {
            Some(ref names) => names
                .iter()
                .map(|name| {
                    let field = table
                        .get_field(name)
                        .cloned()
                        .unwrap_or_else(FieldDefinition::primary_key_default);
                    (name.clone(), field)
                })
                .collect(),
            None => IndexMap::from([(
                DEFAULT_PK_FIELD.to_string(),
                FieldDefinition::primary_key_default(),
            )]),
        }
    }
}
