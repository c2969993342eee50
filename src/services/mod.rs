// Services Layer
// スキーマのコンパイル・永続化・インポートを実行するサービス層

pub mod config_loader;
pub mod constraint_statement_builder;
pub mod foreign_key_resolver;
pub mod pivot_synthesizer;
pub mod primary_key_resolver;
pub mod schema_compiler;
pub mod schema_loader;
pub mod schema_manager;
pub mod schema_store;
pub mod table_statement_builder;
pub mod traits;
