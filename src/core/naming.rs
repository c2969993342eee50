// 命名ポリシー
//
// アプリケーション名と生成物のファイル名の単一ソースを提供します。

/// 現行アプリケーション名
pub const APP_NAME: &str = "lucid-schema";

/// 既定の設定ファイル名
pub const CONFIG_FILE: &str = ".lucid-schema.yaml";

/// バックアップファイルのプレフィックス
pub const BACKUP_PREFIX: &str = "~";

/// コンパイル済みスキーマのファイル名（schema.<namespace>.yaml）
pub fn build_file_name(namespace: &str) -> String {
    format!("schema.{}.yaml", namespace)
}

/// コンパイル済みスキーマのバックアップファイル名（~schema.<namespace>.yaml）
pub fn backup_file_name(namespace: &str) -> String {
    format!("{}{}", BACKUP_PREFIX, build_file_name(namespace))
}

/// SQLダンプのファイル名（schema.<namespace>.sql）
pub fn dump_file_name(namespace: &str) -> String {
    format!("schema.{}.sql", namespace)
}

/// 多対多の中間テーブル名（<a>_to_<b>）
pub fn pivot_table_name(table: &str, other: &str) -> String {
    format!("{}_to_{}", table, other)
}

/// プレフィックス付きの物理テーブル名
pub fn prefixed_table_name(prefix: &str, table: &str) -> String {
    format!("{}{}", prefix, table)
}

/// 生成元の識別子（ダンプのヘッダーに使用）
pub fn generator_identity() -> String {
    format!("{} {}", APP_NAME, env!("CARGO_PKG_VERSION"))
}
