// SQL生成アダプター
//
// コンパイル済みのスキーマ要素から方言固有のDDL文字列を生成するアダプター層。
// どのテーブル・カラムを出力するかの判断はサービス層が行い、
// ここでは文字列の組み立てだけを担当します。

pub mod mysql;

use crate::adapters::type_mapping::ResolvedType;
use crate::core::config::SchemaDefaults;
use crate::core::schema::ConstraintDefinition;

/// SQLジェネレータートレイト
///
/// 各データベース方言用のSQLジェネレーターが実装すべきインターフェース。
pub trait SqlGenerator {
    /// カラム定義行を生成
    ///
    /// # Arguments
    ///
    /// * `name` - カラム名
    /// * `resolved` - 型解決済みのフィールド
    /// * `collate` - 文字列型に付与する照合順序
    ///
    /// # Returns
    ///
    /// 先頭のインデントと末尾のカンマを含まないカラム定義
    fn generate_column_definition(
        &self,
        name: &str,
        resolved: &ResolvedType,
        collate: &str,
    ) -> String;

    /// インデックス定義行を生成
    fn generate_index(&self, column: &str, unique: bool) -> String;

    /// 主キー定義行を生成
    fn generate_primary_key(&self, columns: &[String]) -> String;

    /// CREATE TABLE文を生成
    ///
    /// # Arguments
    ///
    /// * `table_name` - 物理テーブル名（プレフィックス付き）
    /// * `body` - カラム・インデックス・主キーの定義行
    /// * `options` - テーブルの実効オプション（engine, charset, collate）
    /// * `auto_increment` - AUTO_INCREMENTカラムを含むか
    ///
    /// # Returns
    ///
    /// CREATE TABLE文のSQL文字列（末尾に改行を含む）
    fn generate_create_table(
        &self,
        table_name: &str,
        body: &[String],
        options: &SchemaDefaults,
        auto_increment: bool,
    ) -> String;

    /// DROP TABLE文を生成
    fn generate_drop_table(&self, table_name: &str) -> String;

    /// ALTER TABLE文（外部キー制約の追加）を生成
    ///
    /// # Arguments
    ///
    /// * `table_name` - 物理テーブル名
    /// * `constraints` - 制約定義と参照先の物理テーブル名の組
    fn generate_add_constraints(
        &self,
        table_name: &str,
        constraints: &[(&ConstraintDefinition, String)],
    ) -> String;

    /// ALTER TABLE文（外部キー制約の削除）を生成
    fn generate_drop_constraints(&self, table_name: &str, constraint_names: &[String]) -> String;

    /// 外部キーチェックの切り替え文を生成
    fn generate_foreign_key_checks(&self, enabled: bool) -> String;

    /// コメントバナー（3行）を生成
    fn generate_banner(&self, title: &str) -> Vec<String> {
        vec!["--".to_string(), format!("-- {}", title), "--".to_string()]
    }
}
