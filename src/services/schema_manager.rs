// スキーマ管理サービス
//
// スキーマの状態遷移（未コンパイル → コンパイル済み → 保存 / インポート / エクスポート）を管理します。
// build / import / export は成功・失敗をboolで返し、失敗の詳細はログに出力します。

use crate::core::config::{Dialect, SchemaDefaults};
use crate::core::error::CompileError;
use crate::core::schema::Schema;
use crate::services::foreign_key_resolver::ConstraintNamer;
use crate::services::schema_compiler::{is_comment, SchemaCompiler};
use crate::services::schema_store::SchemaStore;
use crate::services::traits::DatabaseGateway;
use anyhow::Result;
use tracing::{debug, error, info, warn};

/// スキーマ管理サービス
///
/// スキーマを所有し、すべての遷移で`&mut self`を取るため、
/// 同じスキーマに対するステージが交錯することはありません。
#[derive(Debug)]
pub struct SchemaManager<G: DatabaseGateway> {
    schema: Schema,
    statements: Vec<String>,
    compiler: SchemaCompiler,
    store: SchemaStore,
    gateway: G,
}

impl<G: DatabaseGateway> SchemaManager<G> {
    /// 新しいSchemaManagerを作成
    ///
    /// # Arguments
    ///
    /// * `schema` - スキーマ定義（未コンパイル、またはコンパイル済み）
    /// * `defaults` - `_options`で未指定の項目に使用する既定値
    /// * `store` - 成果物とSQLダンプの保存先
    /// * `gateway` - データベースゲートウェイ
    pub fn new(schema: Schema, defaults: SchemaDefaults, store: SchemaStore, gateway: G) -> Self {
        Self {
            schema,
            statements: Vec::new(),
            compiler: SchemaCompiler::new(defaults),
            store,
            gateway,
        }
    }

    /// 以前にビルドしたコンパイル済みスキーマから作成
    ///
    /// # Errors
    ///
    /// 成果物が存在しない、または解析できない場合
    pub fn from_artifact(
        namespace: &str,
        defaults: SchemaDefaults,
        store: SchemaStore,
        gateway: G,
    ) -> Result<Self> {
        let schema = store.load(namespace)?;
        debug!(namespace, tables = schema.table_count(), "Loaded compiled schema");
        Ok(Self::new(schema, defaults, store, gateway))
    }

    /// 制約名の生成器を差し替え
    pub fn with_constraint_namer(mut self, namer: ConstraintNamer) -> Self {
        self.compiler = self.compiler.with_constraint_namer(namer);
        self
    }

    /// 現在のスキーマ
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// 生成済みのSQL文
    pub fn statements(&self) -> &[String] {
        &self.statements
    }

    /// データベースゲートウェイ
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// データベースゲートウェイ（可変）
    pub fn gateway_mut(&mut self) -> &mut G {
        &mut self.gateway
    }

    /// 対象のデータベースドライバー
    pub fn driver(&self) -> Dialect {
        Dialect::MySQL
    }

    /// スキーマがコンパイル済みかどうか
    pub fn is_loaded(&self) -> bool {
        self.schema.is_compiled()
    }

    /// スキーマをコンパイルし、SQL文を生成する
    ///
    /// SQL文が生成済みの場合は何もしません。
    /// テーブル名には現在の名前空間のプレフィックスを付与します。
    ///
    /// # Errors
    ///
    /// テーブル定義が1つもない場合は`CompileError::EmptySchema`
    pub fn load(&mut self) -> Result<(), CompileError> {
        if !self.statements.is_empty() {
            return Ok(());
        }

        self.compiler.set_prefix(self.gateway.table_prefix());
        let compiled = self.compiler.compile(self.schema.clone())?;
        self.schema = compiled.schema;
        self.statements = compiled.statements;

        Ok(())
    }

    /// コンパイル済みスキーマを成果物として保存
    ///
    /// # Arguments
    ///
    /// * `namespace` - 名前空間（Noneの場合は現在の名前空間）
    /// * `backup` - `~`付きのバックアップも作成するか
    ///
    /// # Returns
    ///
    /// 保存に成功した場合はtrue
    pub fn build(&mut self, namespace: Option<&str>, backup: bool) -> bool {
        if let Err(e) = self.load() {
            warn!(error = %e, "Failed to compile schema");
            return false;
        }

        let namespace = self.target_namespace(namespace);
        match self.store.save(&self.schema, &namespace, backup) {
            Ok(path) => {
                info!(namespace = %namespace, path = %path.display(), backup, "Built schema");
                true
            }
            Err(e) => {
                error!(namespace = %namespace, error = %format!("{:#}", e), "Failed to build schema");
                false
            }
        }
    }

    /// SQL文をデータベースに順に実行する
    ///
    /// 名前空間が現在と異なる場合は切り替えてから実行し、成否にかかわらず元に戻します。
    /// 最初に失敗した文で実行を中断し、適用済みの文はロールバックしません。
    /// 実行後はバックアップ付きで成果物を再生成します。
    ///
    /// # Returns
    ///
    /// すべての文の実行に成功した場合はtrue
    pub async fn import(&mut self, namespace: Option<&str>) -> bool {
        let namespace = self.target_namespace(namespace);

        self.build(Some(&namespace), false);
        if self.statements.is_empty() {
            return false;
        }

        let original = self.gateway.namespace().to_string();
        let switched = original != namespace;
        if switched {
            if let Err(e) = self.gateway.switch_connection(&namespace).await {
                error!(namespace = %namespace, error = %e, "Failed to switch database connection");
                return false;
            }
        }

        let mut failed = false;
        let mut applied = 0usize;
        for sql in self.statements.iter().filter(|sql| !is_comment(sql)) {
            if let Err(e) = self.gateway.execute(sql).await {
                error!(namespace = %namespace, applied, error = %e, "Import aborted");
                failed = true;
                break;
            }
            applied += 1;
        }

        if switched {
            if let Err(e) = self.gateway.switch_connection(&original).await {
                error!(namespace = %original, error = %e, "Failed to restore database connection");
                failed = true;
            }
        }

        self.build(Some(&namespace), true);

        if !failed {
            info!(namespace = %namespace, applied, "Imported schema");
        }
        !failed
    }

    /// SQLダンプファイルを書き出す
    ///
    /// # Returns
    ///
    /// 書き出しに成功した場合はtrue
    pub fn export(&mut self, namespace: Option<&str>) -> bool {
        let namespace = self.target_namespace(namespace);

        self.build(Some(&namespace), false);
        if self.statements.is_empty() {
            return false;
        }

        match self.store.write_dump(&namespace, &self.statements) {
            Ok(path) => {
                info!(namespace = %namespace, path = %path.display(), "Exported schema");
                true
            }
            Err(e) => {
                error!(namespace = %namespace, error = %format!("{:#}", e), "Failed to export schema");
                false
            }
        }
    }

    /// テーブルが存在するか確認
    pub fn has_table(&self, table_name: &str) -> bool {
        self.schema.has_table(table_name)
    }

    /// フィールドが存在するか確認
    pub fn has_field(&self, table_name: &str, field_name: &str) -> bool {
        self.schema.has_field(table_name, field_name)
    }

    /// テーブルがタイムスタンプカラムを持つか確認
    pub fn has_timestamps(&self, table_name: &str) -> bool {
        self.schema.has_timestamps(table_name)
    }

    /// テーブルがslugフィールドを持つか確認
    pub fn has_slug(&self, table_name: &str) -> bool {
        self.schema.has_slug(table_name)
    }

    /// フィールドの抽象型名を取得
    pub fn field_type(&self, table_name: &str, field_name: &str) -> Option<&str> {
        self.schema.field_type(table_name, field_name)
    }

    fn target_namespace(&self, namespace: Option<&str>) -> String {
        namespace
            .map(str::to_string)
            .unwrap_or_else(|| self.gateway.namespace().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::DatabaseError;
    use crate::core::schema::{FieldDefinition, TableDefinition};
    use async_trait::async_trait;
    use tempfile::TempDir;

    #[derive(Debug, Default)]
    struct NullGateway {
        executed: Vec<String>,
    }

    #[async_trait]
    impl DatabaseGateway for NullGateway {
        fn namespace(&self) -> &str {
            "default"
        }

        fn table_prefix(&self) -> String {
            "lc_".to_string()
        }

        async fn switch_connection(&mut self, _namespace: &str) -> Result<(), DatabaseError> {
            Ok(())
        }

        async fn execute(&mut self, sql: &str) -> Result<(), DatabaseError> {
            self.executed.push(sql.to_string());
            Ok(())
        }
    }

    fn sample_schema() -> Schema {
        let mut schema = Schema::new();
        schema.add_table(
            "category",
            TableDefinition::new().with_field("name", FieldDefinition::new("string")),
        );
        schema
    }

    #[test]
    fn test_load_uses_gateway_prefix() {
        let temp_dir = TempDir::new().unwrap();
        let store = SchemaStore::new(temp_dir.path(), temp_dir.path());
        let mut manager = SchemaManager::new(
            sample_schema(),
            SchemaDefaults::default(),
            store,
            NullGateway::default(),
        );

        assert!(!manager.is_loaded());
        manager.load().unwrap();

        assert!(manager.is_loaded());
        assert!(manager
            .statements()
            .contains(&"DROP TABLE IF EXISTS `lc_category`;".to_string()));
        assert!(manager.has_table("category"));
        assert!(manager.has_timestamps("category"));
        assert_eq!(manager.field_type("category", "id"), Some("int"));
        assert_eq!(manager.driver(), Dialect::MySQL);
    }

    #[test]
    fn test_build_empty_schema_fails() {
        let temp_dir = TempDir::new().unwrap();
        let store = SchemaStore::new(temp_dir.path(), temp_dir.path());
        let mut manager = SchemaManager::new(
            Schema::new(),
            SchemaDefaults::default(),
            store,
            NullGateway::default(),
        );

        assert!(!manager.build(None, false));
        assert!(!temp_dir.path().join("schema.default.yaml").exists());
    }

    #[tokio::test]
    async fn test_import_skips_comment_entries() {
        let temp_dir = TempDir::new().unwrap();
        let store = SchemaStore::new(temp_dir.path(), temp_dir.path());
        let mut manager = SchemaManager::new(
            sample_schema(),
            SchemaDefaults::default(),
            store,
            NullGateway::default(),
        );

        assert!(manager.import(None).await);

        let executed = &manager.gateway().executed;
        assert_eq!(executed.len(), 4);
        assert!(executed.iter().all(|sql| !is_comment(sql)));
        assert!(temp_dir.path().join("~schema.default.yaml").exists());
    }
}
