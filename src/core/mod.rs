// Core Domain
// スキーマ定義モデル、設定、エラー型、命名規則の純粋なドメイン層

pub mod config;
pub mod error;
pub mod naming;
pub mod schema;
