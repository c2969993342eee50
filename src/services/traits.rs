// サービストレイト定義
//
// テスト時のモック差し替えを可能にするためのトレイト群。
// スキーマ管理が外部のデータベースに触れるのはこのインターフェースだけです。

use crate::core::error::DatabaseError;
use crate::core::naming::prefixed_table_name;
use async_trait::async_trait;

/// データベースゲートウェイのトレイト
///
/// 名前空間（接続先）の切り替え、テーブル名のプレフィックス付与、
/// DDL文の実行を抽象化します。
#[async_trait]
pub trait DatabaseGateway: Send {
    /// 現在の名前空間
    fn namespace(&self) -> &str;

    /// 現在の名前空間のテーブル名プレフィックス
    fn table_prefix(&self) -> String;

    /// 論理テーブル名を物理テーブル名に変換
    fn table_name(&self, logical: &str) -> String {
        prefixed_table_name(&self.table_prefix(), logical)
    }

    /// 接続先の名前空間を切り替える
    ///
    /// # Errors
    ///
    /// 設定に存在しない名前空間の場合は`DatabaseError::UnknownNamespace`
    async fn switch_connection(&mut self, namespace: &str) -> Result<(), DatabaseError>;

    /// SQL文を1つ実行
    async fn execute(&mut self, sql: &str) -> Result<(), DatabaseError>;
}
