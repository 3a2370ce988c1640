//! テスト共通フィクスチャ
//!
//! DB を使用する統合テストで共通利用するヘルパー。Rust の統合テスト規約に従い
//! `tests/common/mod.rs` に配置。

// 各テストファイルが独立したクレートとしてコンパイルされるため、
// 使用しない関数に dead_code 警告が出る。モジュール全体で抑制する。
#![allow(dead_code)]

use std::sync::Arc;

use alto_infra::{db::Database, schema};
use sqlx::PgPool;

/// テスト用プールから `todos` テーブル作成済みのハンドルを作成する
pub async fn setup_database(pool: PgPool) -> Arc<Database> {
   let database = Arc::new(Database::from_pool(pool));
   schema::ensure_todos_table(&database).await.unwrap();
   database
}
