// データベース接続アダプター
//
// SQLxを使用したデータベース接続の管理を行います。
// 名前空間ごとに接続プールを遅延生成し、DDL文を順番に実行します。
// `SET FOREIGN_KEY_CHECKS`などのセッション変数を保つため、
// 名前空間ごとに1つの接続を確保して使い続けます。

use crate::adapters::connection_string::build_connection_string;
use crate::core::config::{Config, DatabaseConfig, Dialect};
use crate::core::error::DatabaseError;
use crate::services::traits::DatabaseGateway;
use async_trait::async_trait;
use sqlx::pool::{PoolConnection, PoolOptions};
use sqlx::{Any, AnyPool};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// データベース接続サービス
///
/// データベース接続プールの初期化と管理を行います。
#[derive(Debug, Clone, Default)]
pub struct DatabaseConnectionService {}

impl DatabaseConnectionService {
    /// 新しいDatabaseConnectionServiceを作成
    pub fn new() -> Self {
        Self {}
    }

    /// データベース接続プールを作成
    ///
    /// # Arguments
    ///
    /// * `dialect` - データベース方言
    /// * `config` - データベース設定
    ///
    /// # Returns
    ///
    /// 接続プールまたはエラー
    pub async fn create_pool(
        &self,
        dialect: Dialect,
        config: &DatabaseConfig,
    ) -> Result<AnyPool, DatabaseError> {
        let connection_string = build_connection_string(dialect, config);

        self.create_pool_options(config.timeout)
            .connect(&connection_string)
            .await
            .map_err(|e| DatabaseError::Connection {
                message: format!("Failed to create connection pool for {}", dialect),
                cause: e.to_string(),
            })
    }

    /// プールオプションを作成（タイムアウト未指定時は30秒）
    pub fn create_pool_options(&self, timeout_secs: Option<u64>) -> PoolOptions<Any> {
        PoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(timeout_secs.unwrap_or(30)))
    }
}

/// SQLxによるデータベースゲートウェイ
///
/// 設定ファイルの`databases`に定義された名前空間ごとに接続プールを保持します。
/// プールは最初のSQL実行時に作成され、そこから確保した接続を
/// 同じ名前空間のすべての文で再利用します。
#[derive(Debug)]
pub struct SqlxGateway {
    config: Config,
    namespace: String,
    pools: HashMap<String, AnyPool>,
    connections: HashMap<String, PoolConnection<Any>>,
    connection: DatabaseConnectionService,
}

impl SqlxGateway {
    /// 新しいSqlxGatewayを作成（既定の名前空間に接続）
    pub fn new(config: Config) -> Self {
        let namespace = config.default_namespace.clone();
        Self {
            config,
            namespace,
            pools: HashMap::new(),
            connections: HashMap::new(),
            connection: DatabaseConnectionService::new(),
        }
    }

    /// 現在の名前空間のプールを取得（未作成なら作成）
    async fn pool(&mut self) -> Result<AnyPool, DatabaseError> {
        if let Some(pool) = self.pools.get(&self.namespace) {
            return Ok(pool.clone());
        }

        let db_config = self.database_config(&self.namespace)?;
        debug!(namespace = %self.namespace, host = %db_config.host, "Creating connection pool");

        let pool = self
            .connection
            .create_pool(self.config.dialect, &db_config)
            .await?;
        self.pools.insert(self.namespace.clone(), pool.clone());
        Ok(pool)
    }

    /// 現在の名前空間の接続を取得（未確保ならプールから確保）
    async fn session(&mut self) -> Result<&mut PoolConnection<Any>, DatabaseError> {
        if !self.connections.contains_key(&self.namespace) {
            let pool = self.pool().await?;
            let conn = pool.acquire().await.map_err(|e| DatabaseError::Connection {
                message: format!("Failed to acquire connection for namespace '{}'", self.namespace),
                cause: e.to_string(),
            })?;
            self.connections.insert(self.namespace.clone(), conn);
        }

        self.connections
            .get_mut(&self.namespace)
            .ok_or_else(|| DatabaseError::UnknownNamespace {
                namespace: self.namespace.clone(),
            })
    }

    fn database_config(&self, namespace: &str) -> Result<DatabaseConfig, DatabaseError> {
        self.config
            .databases
            .get(namespace)
            .cloned()
            .ok_or_else(|| DatabaseError::UnknownNamespace {
                namespace: namespace.to_string(),
            })
    }

    /// 確保した接続を返却し、すべての接続プールを閉じる
    pub async fn close(&mut self) {
        self.connections.clear();
        for (_, pool) in self.pools.drain() {
            pool.close().await;
        }
    }
}

#[async_trait]
impl DatabaseGateway for SqlxGateway {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn table_prefix(&self) -> String {
        self.config.table_prefix(&self.namespace)
    }

    async fn switch_connection(&mut self, namespace: &str) -> Result<(), DatabaseError> {
        self.database_config(namespace)?;
        debug!(from = %self.namespace, to = %namespace, "Switching database namespace");
        self.namespace = namespace.to_string();
        Ok(())
    }

    async fn execute(&mut self, sql: &str) -> Result<(), DatabaseError> {
        let conn = self.session().await?;

        let conn: &mut sqlx::AnyConnection = &mut **conn;
        sqlx::Executor::execute(conn, sqlx::raw_sql(sql))
            .await
            .map(|_| ())
            .map_err(|e| DatabaseError::Query {
                message: e.to_string(),
                sql: Some(sql.to_string()),
            })
    }
}
