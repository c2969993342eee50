// テーブル文生成サービス
//
// PK・外部キー・宣言済みフィールドを統合し、コンパイル済みのテーブル定義から
// CREATE TABLE文を組み立てます。

use crate::adapters::sql_generator::mysql::MysqlSqlGenerator;
use crate::adapters::sql_generator::SqlGenerator;
use crate::adapters::type_mapping::TypeMappingService;
use crate::core::config::SchemaDefaults;
use crate::core::schema::{FieldDefinition, Schema};
use crate::services::foreign_key_resolver::foreign_key_relations;
use indexmap::IndexMap;
use tracing::warn;

/// PKフィールド、外部キーフィールド、宣言済みフィールドの順に統合
///
/// 同名のフィールドは後の定義で上書きされ、位置は最初に現れた場所のままです。
pub fn merge_fields(
    pk_fields: Option<&IndexMap<String, FieldDefinition>>,
    fk_fields: IndexMap<String, FieldDefinition>,
    declared: IndexMap<String, FieldDefinition>,
) -> IndexMap<String, FieldDefinition> {
    let mut merged: IndexMap<String, FieldDefinition> = pk_fields.cloned().unwrap_or_default();
    merged.extend(fk_fields);
    merged.extend(declared);
    merged
}

/// テーブル文生成サービス
#[derive(Debug, Clone, Default)]
pub struct TableStatementBuilder {
    type_mapping: TypeMappingService,
    generator: MysqlSqlGenerator,
}

impl TableStatementBuilder {
    /// 新しいTableStatementBuilderを作成
    pub fn new(type_mapping: TypeMappingService) -> Self {
        Self {
            type_mapping,
            generator: MysqlSqlGenerator::new(),
        }
    }

    /// CREATE TABLE文を生成
    ///
    /// # Arguments
    ///
    /// * `table_name` - 論理テーブル名
    /// * `schema` - コンパイル済みのスキーマ
    /// * `globals` - グローバルの実効オプション
    /// * `physical_name` - プレフィックス付きの物理テーブル名
    ///
    /// # Returns
    ///
    /// CREATE TABLE文。テーブルが存在しない場合はNone
    pub fn build(
        &self,
        table_name: &str,
        schema: &Schema,
        globals: &SchemaDefaults,
        physical_name: &str,
    ) -> Option<String> {
        let table = schema.get_table(table_name)?;
        let options = table.options.overlay(globals);

        let mut columns = Vec::new();
        let mut rendered = Vec::new();
        let mut auto_increment = false;

        for (name, field) in &table.fields {
            match self.type_mapping.resolve(field) {
                Ok(resolved) => {
                    columns.push(self.generator.generate_column_definition(
                        name,
                        &resolved,
                        &options.collate,
                    ));
                    auto_increment |= resolved.definition.is_autoinc();
                    rendered.push(name.as_str());
                }
                Err(e) => {
                    warn!(table = %table_name, field = %name, error = %e, "Skipping column");
                }
            }
        }

        // インデックス対象: 外部キー（中間テーブルは全カラム）とユニークカラム
        let mut indexed: Vec<&str> = if table.is_pivot() {
            rendered.clone()
        } else {
            let fk_names: Vec<String> = foreign_key_relations(table_name, &schema.tables)
                .into_iter()
                .map(|(_, relation)| relation.name)
                .collect();
            rendered
                .iter()
                .copied()
                .filter(|name| fk_names.iter().any(|fk| fk.as_str() == *name))
                .collect()
        };
        for name in &rendered {
            if table.fields[*name].is_unique() && !indexed.contains(name) {
                indexed.push(*name);
            }
        }

        let mut body = columns;
        for name in indexed {
            body.push(
                self.generator
                    .generate_index(name, table.fields[name].is_unique()),
            );
        }

        if let Some(pk) = schema.primary_keys().get(table_name) {
            if !pk.is_empty() {
                let pk_names: Vec<String> = pk.keys().cloned().collect();
                body.push(self.generator.generate_primary_key(&pk_names));
            }
        }

        Some(
            self.generator
                .generate_create_table(physical_name, &body, &options, auto_increment),
        )
    }
}
