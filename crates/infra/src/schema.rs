//! # スキーマ初期化
//!
//! `todos` テーブルを冪等に作成する。
//!
//! ## 設計方針
//!
//! - **明示的な実行**: プロセス起動時に一度だけ呼び出し、完了を待ってからリクエストを受け付ける
//! - **冪等性**: `CREATE TABLE IF NOT EXISTS` で何度実行しても同じ結果になる
//! - **並行起動の直列化**: 複数インスタンスが同時に起動しても、アドバイザリロックで
//!   DDL を一つずつ実行する（`IF NOT EXISTS` 同士のカタログ競合を避ける）
//!
//! 失敗時の扱い（起動を継続するか）は呼び出し側が決める。

use crate::{db::Database, error::InfraError};

/// `todos` テーブルの DDL
pub const CREATE_TODOS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS todos (
    id SERIAL PRIMARY KEY,
    todo TEXT NOT NULL,
    created_at TIMESTAMP DEFAULT NOW()
)
"#;

/// スキーマ初期化を直列化するアドバイザリロックのキー
const SCHEMA_LOCK_KEY: i64 = 0x616c_746f_5f74_6f64;

/// `todos` テーブルが存在しなければ作成する
///
/// トランザクション内でアドバイザリロックを取得してから DDL を実行する。
/// ロックはトランザクション終了時に解放される。
#[tracing::instrument(skip_all)]
pub async fn ensure_todos_table(database: &Database) -> Result<(), InfraError> {
   let pool = database.pool().await?;
   let mut tx = pool.begin().await.map_err(|e| {
      tracing::error!(error = %e, "スキーマ初期化用の接続取得に失敗しました");
      InfraError::connection(e)
   })?;

   sqlx::query("SELECT pg_advisory_xact_lock($1)")
      .bind(SCHEMA_LOCK_KEY)
      .execute(&mut *tx)
      .await
      .map_err(|e| {
         tracing::error!(error = %e, "スキーマ初期化ロックの取得に失敗しました");
         InfraError::query(e)
      })?;

   sqlx::query(CREATE_TODOS_TABLE)
      .execute(&mut *tx)
      .await
      .map_err(|e| {
         tracing::error!(error = %e, "todos テーブルの作成に失敗しました");
         InfraError::query(e)
      })?;

   tx.commit().await.map_err(|e| {
      tracing::error!(error = %e, "スキーマ初期化のコミットに失敗しました");
      InfraError::query(e)
   })?;

   tracing::info!("todos テーブルを確認しました");
   Ok(())
}

#[cfg(test)]
mod tests {
   use std::{sync::Arc, time::Duration};

   use super::*;
   use crate::{
      InfraErrorKind,
      credentials::CredentialResolver,
      db::{DatabaseSettings, TlsMode},
      mock::MockSecretStore,
   };

   fn database(store: MockSecretStore) -> Database {
      let settings = DatabaseSettings {
         tls_mode: TlsMode::Disable,
         acquire_timeout: Duration::from_millis(500),
         ..DatabaseSettings::default()
      };
      Database::from_secret(CredentialResolver::new(Arc::new(store), "alto-db"), settings)
   }

   #[tokio::test]
   async fn test_認証情報の取得に失敗するとcredential_retrievalを返す() {
      let database = database(MockSecretStore::failing("AccessDeniedException"));

      let err = ensure_todos_table(&database).await.unwrap_err();

      assert!(matches!(err.kind(), InfraErrorKind::CredentialRetrieval));
   }

   #[tokio::test]
   async fn test_接続できない場合はconnectionを返す() {
      let database = database(MockSecretStore::with_payload(
         r#"{"host":"127.0.0.1","port":1,"username":"u","password":"p"}"#,
      ));

      let err = ensure_todos_table(&database).await.unwrap_err();

      assert!(matches!(err.kind(), InfraErrorKind::Connection(_)));
   }
}
