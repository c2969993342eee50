// Adapters
// データベースとSQL方言へのアクセスを抽象化

pub mod connection_string;
pub mod database;
pub mod sql_generator;
pub mod sql_quote;
pub mod type_mapping;
