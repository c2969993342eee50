// 制約文生成サービス
//
// 制約インデックスから ALTER TABLE ... ADD CONSTRAINT / DROP FOREIGN KEY 文を生成します。
// テーブルをすべて作成した後に適用することで、循環参照による失敗を避けます。

use crate::adapters::sql_generator::mysql::MysqlSqlGenerator;
use crate::adapters::sql_generator::SqlGenerator;
use crate::core::naming::prefixed_table_name;
use crate::core::schema::{ConstraintDefinition, ConstraintIndex};

/// 制約文生成サービス
#[derive(Debug, Clone, Default)]
pub struct ConstraintStatementBuilder {
    generator: MysqlSqlGenerator,
}

impl ConstraintStatementBuilder {
    /// 新しいConstraintStatementBuilderを作成
    pub fn new() -> Self {
        Self {
            generator: MysqlSqlGenerator::new(),
        }
    }

    /// 制約追加文を生成
    ///
    /// テーブルごとにコメントバナー（3行）と ALTER TABLE 文1つを出力します。
    /// `enabled`がfalseの場合は何も出力しません。
    ///
    /// # Arguments
    ///
    /// * `constraints` - 制約インデックス
    /// * `enabled` - グローバルの`constraints`オプション
    /// * `prefix` - テーブル名プレフィックス
    pub fn build_add(
        &self,
        constraints: &ConstraintIndex,
        enabled: bool,
        prefix: &str,
    ) -> Vec<String> {
        if !enabled {
            return Vec::new();
        }

        let mut sql = Vec::new();
        for (table, table_constraints) in constraints {
            if table_constraints.is_empty() {
                continue;
            }

            let physical = prefixed_table_name(prefix, table);
            sql.extend(
                self.generator
                    .generate_banner(&format!("Constraints for table `{}`", physical)),
            );

            let definitions: Vec<(&ConstraintDefinition, String)> = table_constraints
                .values()
                .map(|constraint| {
                    (
                        constraint,
                        prefixed_table_name(prefix, &constraint.reference_table),
                    )
                })
                .collect();
            sql.push(
                self.generator
                    .generate_add_constraints(&physical, &definitions),
            );
        }

        sql
    }

    /// 制約削除文を生成（テーブルごとに ALTER TABLE ... DROP FOREIGN KEY）
    pub fn build_drop(
        &self,
        constraints: &ConstraintIndex,
        enabled: bool,
        prefix: &str,
    ) -> Vec<String> {
        if !enabled {
            return Vec::new();
        }

        constraints
            .iter()
            .filter(|(_, table_constraints)| !table_constraints.is_empty())
            .map(|(table, table_constraints)| {
                let names: Vec<String> = table_constraints
                    .values()
                    .map(|constraint| constraint.name.clone())
                    .collect();
                self.generator
                    .generate_drop_constraints(&prefixed_table_name(prefix, table), &names)
            })
            .collect()
    }
}
