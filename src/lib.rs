// lucid-schemaライブラリのエントリーポイント
//
// モジュール構造:
// - cli: CLIレイヤー（ユーザー入力の受付とコマンドルーティング）
// - core: コアドメイン（スキーマモデル、設定、命名規則、エラー型）
// - adapters: 型マッピング、SQL生成、データベース接続
// - services: スキーマのコンパイル、成果物の保存、インポート

pub mod cli;
pub mod core;
pub mod adapters;
pub mod services;
