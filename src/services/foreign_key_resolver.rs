// 外部キー解決サービス
//
// m:1 / 1:1 / m:m のリレーションから外部キーフィールドと制約定義を導出します。
// 制約名の乱数源は差し替え可能で、テストではシード固定の乱数を使用します。

use crate::core::error::CompileError;
use crate::core::schema::{
    ConstraintDefinition, FieldDefinition, PrimaryKeyIndex, ReferentialAction, RelationOptions,
    TableDefinition,
};
use indexmap::IndexMap;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, warn};

/// 制約名に使用する文字
const CONSTRAINT_NAME_CHARS: &str = "0123456789abcdefghijklmnopqrstuvwxyz";

/// 制約名のランダム部分の長さ
const CONSTRAINT_NAME_LENGTH: usize = 15;

/// 外部キー制約名の生成器
///
/// `FK_` に続けて、英数字36文字から重複なしで選んだ15文字（大文字）を付与します。
#[derive(Debug, Clone)]
pub struct ConstraintNamer {
    rng: StdRng,
}

impl ConstraintNamer {
    /// OSの乱数源で初期化したConstraintNamerを作成
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// シードを固定したConstraintNamerを作成
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// 次の制約名を生成
    pub fn next_name(&mut self) -> String {
        let mut letters: Vec<char> = CONSTRAINT_NAME_CHARS.chars().collect();
        letters.shuffle(&mut self.rng);

        let code: String = letters.into_iter().take(CONSTRAINT_NAME_LENGTH).collect();
        format!("FK_{}", code.to_uppercase())
    }
}

impl Default for ConstraintNamer {
    fn default() -> Self {
        Self::new()
    }
}

/// テーブル単位の外部キー解決結果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForeignKeys {
    /// 外部キーカラム名 -> フィールド定義（宣言順）
    pub fields: IndexMap<String, FieldDefinition>,
    /// 外部キーカラム名 -> 制約定義
    pub constraints: IndexMap<String, ConstraintDefinition>,
}

/// テーブルが持つ外部キーリレーションを宣言順に列挙
///
/// m:1 は参照先テーブルに対応する 1:m エントリがある場合のみ対象となり、
/// そのエントリのオプションが使用されます。続いて 1:1 を列挙します。
pub fn foreign_key_relations(
    table_name: &str,
    tables: &IndexMap<String, TableDefinition>,
) -> Vec<(String, RelationOptions)> {
    let Some(table) = tables.get(table_name) else {
        return Vec::new();
    };

    let mut relations = Vec::new();

    for referenced in &table.many_to_one {
        match tables
            .get(referenced)
            .and_then(|other| other.one_to_many.get(table_name))
        {
            Some(relation) => relations.push((referenced.clone(), relation.resolve(referenced))),
            None => {
                let error = CompileError::AmbiguousReference {
                    table: table_name.to_string(),
                    other: referenced.clone(),
                };
                debug!(table = %table_name, error = %error, "Skipping many-to-one relation");
            }
        }
    }

    for (referenced, relation) in &table.one_to_one {
        relations.push((referenced.clone(), relation.resolve(referenced)));
    }

    relations
}

/// 外部キー解決サービス
#[derive(Debug, Clone, Default)]
pub struct ForeignKeyResolver {
    namer: ConstraintNamer,
}

impl ForeignKeyResolver {
    /// 新しいForeignKeyResolverを作成
    pub fn new(namer: ConstraintNamer) -> Self {
        Self { namer }
    }

    /// 参照先テーブルのPKから外部キーフィールド定義を導出
    ///
    /// 外部キー名と同名のPKフィールドがあればそれを、なければ先頭のPKフィールドを
    /// コピーし、自動増分を外します。デフォルト値があればNOT NULL、なければNULL許可です。
    ///
    /// # Errors
    ///
    /// - 参照先テーブルが存在しない場合は`CompileError::NotATable`
    /// - 参照先テーブルにPKがない場合は`CompileError::MissingPrimaryKey`
    pub fn foreign_key_field(
        &self,
        referenced_table: &str,
        relation: &RelationOptions,
        pk_index: &PrimaryKeyIndex,
    ) -> Result<FieldDefinition, CompileError> {
        let (_, pk_field) = self.referenced_pk(referenced_table, relation, pk_index)?;

        let mut field = pk_field.clone();
        field.autoinc = None;

        if relation.unique {
            field.unique = Some(true);
        }

        match relation.default {
            Some(ref default) => {
                field.default = Some(default.clone());
                field.null = Some(false);
            }
            None => field.null = Some(true),
        }

        Ok(field)
    }

    /// 外部キー制約定義を生成
    ///
    /// # Errors
    ///
    /// `foreign_key_field`と同じ条件でエラーを返します。
    pub fn constraint(
        &mut self,
        referenced_table: &str,
        relation: &RelationOptions,
        pk_index: &PrimaryKeyIndex,
    ) -> Result<ConstraintDefinition, CompileError> {
        let (reference_field, _) = self.referenced_pk(referenced_table, relation, pk_index)?;
        let reference_fields = reference_field.to_string();

        Ok(ConstraintDefinition {
            name: self.namer.next_name(),
            fields: relation.name.clone(),
            reference_table: referenced_table.to_string(),
            reference_fields,
            on_delete: relation.cascade.on_delete(),
            on_update: ReferentialAction::NoAction,
        })
    }

    /// テーブルの m:1 / 1:1 リレーションから外部キーを解決
    ///
    /// 解決できないリレーションは警告を出してスキップします。
    pub fn resolve_table(
        &mut self,
        table_name: &str,
        tables: &IndexMap<String, TableDefinition>,
        pk_index: &PrimaryKeyIndex,
        constraints_enabled: bool,
    ) -> ForeignKeys {
        let mut foreign_keys = ForeignKeys::default();

        for (referenced, relation) in foreign_key_relations(table_name, tables) {
            let field = match self.foreign_key_field(&referenced, &relation, pk_index) {
                Ok(field) => field,
                Err(e) => {
                    warn!(table = %table_name, references = %referenced, error = %e, "Skipping foreign key");
                    continue;
                }
            };
            foreign_keys.fields.insert(relation.name.clone(), field);

            if constraints_enabled {
                let constraint = self.constraint(&referenced, &relation, pk_index);
                if let Ok(constraint) = constraint {
                    foreign_keys
                        .constraints
                        .insert(relation.name.clone(), constraint);
                }
            }
        }

        foreign_keys
    }

    fn referenced_pk<'a>(
        &self,
        referenced_table: &str,
        relation: &RelationOptions,
        pk_index: &'a PrimaryKeyIndex,
    ) -> Result<(&'a str, &'a FieldDefinition), CompileError> {
        let pk_fields = pk_index
            .get(referenced_table)
            .ok_or_else(|| CompileError::NotATable {
                table: referenced_table.to_string(),
            })?;

        pk_fields
            .get_key_value(relation.name.as_str())
            .or_else(|| pk_fields.first())
            .map(|(name, field)| (name.as_str(), field))
            .ok_or_else(|| CompileError::MissingPrimaryKey {
                table: referenced_table.to_string(),
            })
    }
}
