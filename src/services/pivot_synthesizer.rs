// 中間テーブル合成サービス
//
// 双方向に宣言された m:m リレーションから中間テーブル（<A>_to_<B>）を生成し、
// PKインデックスと制約インデックスに登録します。

use crate::core::config::SchemaDefaults;
use crate::core::error::CompileError;
use crate::core::naming::pivot_table_name;
use crate::core::schema::{
    ConstraintIndex, FieldDefinition, PrimaryKeyIndex, RelationDefinition, TableDefinition,
    TableOptions,
};
use crate::services::foreign_key_resolver::ForeignKeyResolver;
use indexmap::IndexMap;
use tracing::{debug, warn};

/// 中間テーブル合成サービス
#[derive(Debug, Clone, Default)]
pub struct PivotSynthesizer {}

/// m:m の宣言（宣言側テーブル, 相手テーブル, リレーション定義）
type ManyToManyDeclaration = (String, String, RelationDefinition);

impl PivotSynthesizer {
    /// 新しいPivotSynthesizerを作成
    pub fn new() -> Self {
        Self {}
    }

    /// 中間テーブルを合成
    ///
    /// # Arguments
    ///
    /// * `tables` - PK解決済みのテーブル定義
    /// * `pk_index` - プライマリキーインデックス
    /// * `globals` - グローバルの実効オプション（中間テーブルのオプションに使用）
    /// * `resolver` - 外部キー解決サービス
    ///
    /// # Returns
    ///
    /// 中間テーブルを追加したテーブル定義、PKインデックス、制約インデックス
    pub fn synthesize(
        &self,
        mut tables: IndexMap<String, TableDefinition>,
        mut pk_index: PrimaryKeyIndex,
        globals: &SchemaDefaults,
        resolver: &mut ForeignKeyResolver,
    ) -> (IndexMap<String, TableDefinition>, PrimaryKeyIndex, ConstraintIndex) {
        let mut constraints = ConstraintIndex::new();

        let declarations: Vec<ManyToManyDeclaration> = tables
            .iter()
            .flat_map(|(table, definition)| {
                definition
                    .many_to_many
                    .iter()
                    .map(move |(other, relation)| (table.clone(), other.clone(), relation.clone()))
            })
            .collect();

        for (table, other, joint) in declarations {
            if tables.contains_key(&pivot_table_name(&table, &other))
                || tables.contains_key(&pivot_table_name(&other, &table))
            {
                continue;
            }

            let Some(reciprocal) = tables
                .get(&other)
                .and_then(|definition| definition.many_to_many.get(&table))
                .cloned()
            else {
                let error = CompileError::MissingReciprocal {
                    table: table.clone(),
                    other: other.clone(),
                };
                debug!(error = %error, "Skipping many-to-many relation");
                continue;
            };

            let joint_table = explicit_table_name(&joint)
                .or_else(|| explicit_table_name(&reciprocal))
                .unwrap_or_else(|| pivot_table_name(&table, &other));

            if tables.contains_key(&joint_table) {
                continue;
            }

            let mut options = TableOptions {
                pk: Some(Vec::new()),
                timestamps: Some(false),
                many_to_many: Some(true),
                ..Default::default()
            };
            options.fill_from(globals);
            let constraints_enabled = options.constraints.unwrap_or(globals.constraints);

            let mut pivot = TableDefinition::new().with_options(options);
            let mut pivot_pk = IndexMap::new();
            let mut pivot_constraints = IndexMap::new();

            // 宣言側 -> 相手側の順に外部キーを追加
            let sides = [(&table, &joint), (&other, &reciprocal)];
            let mut failed = false;
            for (referenced, relation) in sides {
                let relation = relation.resolve(referenced);
                let field = match resolver.foreign_key_field(referenced, &relation, &pk_index) {
                    Ok(field) => FieldDefinition {
                        null: Some(false),
                        ..field
                    },
                    Err(e) => {
                        warn!(pivot = %joint_table, error = %e, "Skipping pivot table");
                        failed = true;
                        break;
                    }
                };

                pivot.fields.insert(relation.name.clone(), field.clone());
                if let Some(pk) = pivot.options.pk.as_mut() {
                    pk.push(relation.name.clone());
                }
                pivot_pk.insert(relation.name.clone(), field);

                if constraints_enabled {
                    if let Ok(constraint) = resolver.constraint(referenced, &relation, &pk_index) {
                        pivot_constraints.insert(relation.name.clone(), constraint);
                    }
                }
            }

            if failed {
                continue;
            }

            debug!(pivot = %joint_table, table = %table, other = %other, "Synthesized pivot table");

            tables.insert(joint_table.clone(), pivot);
            pk_index.insert(joint_table.clone(), pivot_pk);
            if !pivot_constraints.is_empty() {
                constraints.insert(joint_table, pivot_constraints);
            }
        }

        (tables, pk_index, constraints)
    }
}

fn explicit_table_name(relation: &RelationDefinition) -> Option<String> {
    relation.table.clone().filter(|name| !name.is_empty())
}
