// スキーマコンパイラー
//
// 宣言的なスキーマ定義を、PK・中間テーブル・外部キーを解決したコンパイル済みスキーマに変換し、
// 順序付きのDDLスクリプトを生成します。
//
// 各ステージは入力を値で受け取り、新しい値とインデックスを返します。
// PKインデックスが空でないスキーマはコンパイル済みとみなし、再解決せずに描画だけを行います。

use crate::adapters::sql_generator::mysql::MysqlSqlGenerator;
use crate::adapters::sql_generator::SqlGenerator;
use crate::adapters::type_mapping::TypeMappingService;
use crate::core::config::{Dialect, SchemaDefaults};
use crate::core::error::CompileError;
use crate::core::naming::prefixed_table_name;
use crate::core::schema::Schema;
use crate::services::constraint_statement_builder::ConstraintStatementBuilder;
use crate::services::foreign_key_resolver::{ConstraintNamer, ForeignKeyResolver};
use crate::services::pivot_synthesizer::PivotSynthesizer;
use crate::services::primary_key_resolver::PrimaryKeyResolver;
use crate::services::table_statement_builder::{merge_fields, TableStatementBuilder};
use tracing::{debug, info};

/// コンパイル結果
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledSchema {
    /// コンパイル済みのスキーマ
    pub schema: Schema,
    /// 実行順のSQL文（コメントバナーを含む）
    pub statements: Vec<String>,
}

/// コメントのみのエントリかどうか（実行対象外）
pub fn is_comment(statement: &str) -> bool {
    statement
        .lines()
        .all(|line| line.trim_start().starts_with("--"))
}

/// スキーマコンパイラー
#[derive(Debug, Clone)]
pub struct SchemaCompiler {
    defaults: SchemaDefaults,
    prefix: String,
    pk_resolver: PrimaryKeyResolver,
    pivot_synthesizer: PivotSynthesizer,
    fk_resolver: ForeignKeyResolver,
    table_builder: TableStatementBuilder,
    constraint_builder: ConstraintStatementBuilder,
    generator: MysqlSqlGenerator,
}

impl SchemaCompiler {
    /// 新しいSchemaCompilerを作成
    ///
    /// # Arguments
    ///
    /// * `defaults` - スキーマの`_options`で未指定の項目に使用する既定値
    pub fn new(defaults: SchemaDefaults) -> Self {
        Self {
            defaults,
            prefix: String::new(),
            pk_resolver: PrimaryKeyResolver::new(),
            pivot_synthesizer: PivotSynthesizer::new(),
            fk_resolver: ForeignKeyResolver::default(),
            table_builder: TableStatementBuilder::new(TypeMappingService::new(Dialect::MySQL)),
            constraint_builder: ConstraintStatementBuilder::new(),
            generator: MysqlSqlGenerator::new(),
        }
    }

    /// テーブル名プレフィックスを設定
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// 制約名の生成器を差し替え
    pub fn with_constraint_namer(mut self, namer: ConstraintNamer) -> Self {
        self.fk_resolver = ForeignKeyResolver::new(namer);
        self
    }

    /// テーブル名プレフィックスを変更
    pub fn set_prefix(&mut self, prefix: impl Into<String>) {
        self.prefix = prefix.into();
    }

    /// スキーマをコンパイル
    ///
    /// 未コンパイルのスキーマは解決してから、コンパイル済みのスキーマはそのまま描画します。
    ///
    /// # Errors
    ///
    /// テーブル定義が1つもない場合は`CompileError::EmptySchema`
    pub fn compile(&mut self, schema: Schema) -> Result<CompiledSchema, CompileError> {
        if schema.tables.is_empty() {
            return Err(CompileError::EmptySchema);
        }

        let schema = if schema.is_compiled() {
            debug!("Schema already compiled, rendering only");
            schema
        } else {
            self.resolve(schema)
        };

        let statements = self.render(&schema);
        info!(
            tables = schema.table_count(),
            statements = statements.len(),
            "Compiled schema"
        );

        Ok(CompiledSchema { schema, statements })
    }

    /// PK・中間テーブル・外部キーを解決したスキーマを返す
    pub fn resolve(&mut self, schema: Schema) -> Schema {
        let Schema {
            mut options,
            tables,
        } = schema;
        let globals = options.overlay(&self.defaults);

        let (tables, pk_index) = self.pk_resolver.resolve(tables, &globals);
        let (mut tables, pk_index, mut constraints) = self.pivot_synthesizer.synthesize(
            tables,
            pk_index,
            &globals,
            &mut self.fk_resolver,
        );

        let table_names: Vec<String> = tables.keys().cloned().collect();
        for table_name in table_names {
            let constraints_enabled = tables
                .get(&table_name)
                .and_then(|table| table.options.constraints)
                .unwrap_or(globals.constraints);

            let foreign_keys = self.fk_resolver.resolve_table(
                &table_name,
                &tables,
                &pk_index,
                constraints_enabled,
            );

            if !foreign_keys.constraints.is_empty() {
                constraints
                    .entry(table_name.clone())
                    .or_default()
                    .extend(foreign_keys.constraints);
            }

            if let Some(table) = tables.get_mut(&table_name) {
                let declared = std::mem::take(&mut table.fields);
                table.fields = merge_fields(pk_index.get(&table_name), foreign_keys.fields, declared);
            }
        }

        options.pk = pk_index;
        options.fk_constraints = constraints;

        Schema { options, tables }
    }

    /// コンパイル済みスキーマからSQLスクリプトを生成
    ///
    /// 外部キーチェックを無効化し、テーブルごとに DROP / CREATE を出力した後、
    /// 制約を追加して外部キーチェックを戻します。
    pub fn render(&self, schema: &Schema) -> Vec<String> {
        let globals = schema.options.overlay(&self.defaults);

        let mut sql = vec![self.generator.generate_foreign_key_checks(false)];

        for table_name in schema.tables.keys() {
            let physical = prefixed_table_name(&self.prefix, table_name);
            if let Some(create) = self
                .table_builder
                .build(table_name, schema, &globals, &physical)
            {
                sql.extend(
                    self.generator
                        .generate_banner(&format!("Table structure for table `{}`", physical)),
                );
                sql.push(self.generator.generate_drop_table(&physical));
                sql.push(create);
            }
        }

        sql.extend(self.constraint_builder.build_add(
            schema.constraints(),
            globals.constraints,
            &self.prefix,
        ));
        sql.push(self.generator.generate_foreign_key_checks(true));

        sql
    }

    /// 制約追加文のみを生成
    pub fn constraint_statements(&self, schema: &Schema) -> Vec<String> {
        self.constraint_builder.build_add(
            schema.constraints(),
            self.constraints_enabled(schema),
            &self.prefix,
        )
    }

    /// 制約削除文を生成
    pub fn drop_constraint_statements(&self, schema: &Schema) -> Vec<String> {
        self.constraint_builder.build_drop(
            schema.constraints(),
            self.constraints_enabled(schema),
            &self.prefix,
        )
    }

    fn constraints_enabled(&self, schema: &Schema) -> bool {
        schema.options.overlay(&self.defaults).constraints
    }
}
