// エラー型定義
//
// アプリケーション全体で使用されるカスタムエラー型を提供します。
// thiserrorを使用して、CompileError, DatabaseError, IoError を定義します。

use thiserror::Error;

/// コンパイルエラー
///
/// スキーマ定義の解決中に発生するエラーを表現します。
/// 多くはその場でスキップされ、コンパイル全体は継続します。
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    /// Unsupported abstract type
    #[error("Unsupported field type '{field_type}'{}", format_field_opt(.field))]
    UnsupportedType {
        /// 抽象型名
        field_type: String,
        /// 対象フィールド
        field: Option<String>,
    },

    /// Reference to a table that does not exist
    #[error("Table '{table}' is not defined in the schema")]
    NotATable {
        /// テーブル名
        table: String,
    },

    /// Referenced table without primary key fields
    #[error("Table '{table}' has no primary key to reference")]
    MissingPrimaryKey {
        /// テーブル名
        table: String,
    },

    /// Invalid identifier
    #[error("Invalid identifier '{name}': {reason}")]
    InvalidIdentifier {
        /// 識別子
        name: String,
        /// 不正な理由
        reason: String,
    },

    /// Many-to-many declared from one side only
    #[error("Many-to-many relation '{table}' -> '{other}' is not declared on '{other}'")]
    MissingReciprocal {
        /// 宣言側のテーブル
        table: String,
        /// 相手側のテーブル
        other: String,
    },

    /// Many-to-one without the mirrored one-to-many entry
    #[error("Relation '{table}' -> '{other}' has no matching '1:m' entry on '{other}'")]
    AmbiguousReference {
        /// 参照元テーブル
        table: String,
        /// 参照先テーブル
        other: String,
    },

    /// Schema without any table
    #[error("Schema has no table definitions")]
    EmptySchema,
}

fn format_field_opt(field: &Option<String>) -> String {
    field
        .as_ref()
        .map_or(String::new(), |name| format!(" (field: {})", name))
}

/// データベースエラー
///
/// データベース操作時に発生するエラーを表現します。
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Connection error
    #[error("Database connection error: {message} (cause: {cause})")]
    Connection {
        /// エラーメッセージ
        message: String,
        /// エラー原因
        cause: String,
    },

    /// Query execution error
    #[error("Query execution error: {message}")]
    Query {
        /// エラーメッセージ
        message: String,
        /// 失敗したSQL
        sql: Option<String>,
    },

    /// Unknown database namespace
    #[error("Unknown database namespace '{namespace}'")]
    UnknownNamespace {
        /// 名前空間
        namespace: String,
    },
}

/// I/Oエラー
///
/// ファイル操作時に発生するエラーを表現します。
#[derive(Debug, Error)]
pub enum IoError {
    /// File not found
    #[error("File not found: {path}")]
    FileNotFound {
        /// ファイルパス
        path: String,
    },

    /// File read error
    #[error("Failed to read file: {path} (cause: {cause})")]
    FileRead {
        /// ファイルパス
        path: String,
        /// エラー原因
        cause: String,
    },

    /// File write error
    #[error("Failed to write file: {path} (cause: {cause})")]
    FileWrite {
        /// ファイルパス
        path: String,
        /// エラー原因
        cause: String,
    },

    /// Directory creation error
    #[error("Failed to create directory: {path} (cause: {cause})")]
    DirectoryCreate {
        /// ディレクトリパス
        path: String,
        /// エラー原因
        cause: String,
    },
}
