//! # プロセスコンテキスト
//!
//! プロセス（Lambda の実行環境）ごとに一度だけ作成する依存関係を保持する。
//!
//! ## 保持するもの
//!
//! - Secrets Manager クライアント（[`CredentialResolver`] 経由）
//! - 遅延初期化される接続プール（[`Database`]）
//! - リポジトリ
//!
//! コールドスタート時に `main` で作成し、ルーターの状態として明示的に渡す。
//! 呼び出しをまたいで保持されるのはこれらの接続資源のみで、Todo のデータは保持しない。

use std::sync::Arc;

use alto_infra::{
   InfraError,
   credentials::CredentialResolver,
   db::Database,
   repository::{PostgresTodoRepository, TodoRepository},
   schema,
   secrets::{self, AwsSecretStore},
};

use crate::{config::FunctionConfig, handler::TodoState};

/// プロセス全体で共有する依存関係
pub struct FunctionContext {
   database:   Arc<Database>,
   repository: Arc<dyn TodoRepository>,
}

impl FunctionContext {
   /// 設定からコンテキストを作成する
   ///
   /// Secrets Manager クライアントを作成するだけで、ネットワーク接続は行わない。
   /// 認証情報の取得とプールの作成は最初の DB 操作まで遅延する。
   pub async fn from_config(config: &FunctionConfig) -> Self {
      let client = secrets::create_client(config.secrets_manager_endpoint.as_deref()).await;
      let resolver = CredentialResolver::new(
         Arc::new(AwsSecretStore::new(client)),
         config.db_secret_id.clone(),
      );
      let database = Database::from_secret(resolver, config.database.clone());

      Self::from_database(Arc::new(database))
   }

   /// 作成済みの [`Database`] からコンテキストを作成する
   pub fn from_database(database: Arc<Database>) -> Self {
      let repository = Arc::new(PostgresTodoRepository::new(Arc::clone(&database)));

      Self {
         database,
         repository,
      }
   }

   /// `todos` テーブルを作成する（存在しない場合）
   ///
   /// コールドスタート時に一度だけ呼び出す。
   pub async fn ensure_schema(&self) -> Result<(), InfraError> {
      schema::ensure_todos_table(&self.database).await
   }

   /// ハンドラの共有状態を作成する
   pub fn todo_state(&self) -> Arc<TodoState> {
      Arc::new(TodoState {
         repository: Arc::clone(&self.repository),
      })
   }
}
