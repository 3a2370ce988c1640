//! # テスト用モック
//!
//! ハンドラテスト・リゾルバテストで使用するインメモリのモック実装。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! alto-infra = { workspace = true, features = ["test-utils"] }
//! ```

use std::sync::{Arc, Mutex};

use alto_domain::todo::{Todo, TodoId, TodoText};
use async_trait::async_trait;
use chrono::Utc;

use crate::{error::InfraError, repository::TodoRepository, secrets::SecretStore};

// ===== MockSecretStore =====

#[derive(Clone)]
enum SecretOutcome {
   Payload(String),
   NoSecretString,
   Failure(String),
}

/// 固定の結果を返すシークレットストア
///
/// 要求されたシークレット ID を記録する。
#[derive(Clone)]
pub struct MockSecretStore {
   outcome:   SecretOutcome,
   requested: Arc<Mutex<Vec<String>>>,
}

impl MockSecretStore {
   fn with_outcome(outcome: SecretOutcome) -> Self {
      Self {
         outcome,
         requested: Arc::new(Mutex::new(Vec::new())),
      }
   }

   /// 指定したペイロードを `SecretString` として返す
   pub fn with_payload(payload: &str) -> Self {
      Self::with_outcome(SecretOutcome::Payload(payload.to_string()))
   }

   /// `SecretString` を持たないシークレットを返す
   pub fn without_secret_string() -> Self {
      Self::with_outcome(SecretOutcome::NoSecretString)
   }

   /// 常にストアエラーを返す
   pub fn failing(message: &str) -> Self {
      Self::with_outcome(SecretOutcome::Failure(message.to_string()))
   }

   /// 要求されたシークレット ID の記録
   pub fn requested_ids(&self) -> Arc<Mutex<Vec<String>>> {
      Arc::clone(&self.requested)
   }
}

#[async_trait]
impl SecretStore for MockSecretStore {
   async fn get_secret_string(&self, secret_id: &str) -> Result<Option<String>, InfraError> {
      self.requested.lock().unwrap().push(secret_id.to_string());

      match &self.outcome {
         SecretOutcome::Payload(payload) => Ok(Some(payload.clone())),
         SecretOutcome::NoSecretString => Ok(None),
         SecretOutcome::Failure(message) => Err(InfraError::secret_store(message.clone())),
      }
   }
}

// ===== MockTodoRepository =====

#[derive(Clone, Default)]
pub struct MockTodoRepository {
   todos:   Arc<Mutex<Vec<Todo>>>,
   failing: bool,
}

impl MockTodoRepository {
   pub fn new() -> Self {
      Self::default()
   }

   /// 全操作で接続エラーを返すリポジトリ
   pub fn failing() -> Self {
      Self {
         failing: true,
         ..Self::default()
      }
   }

   /// 保存済みの Todo を追加する
   pub fn add_todo(&self, todo: Todo) {
      self.todos.lock().unwrap().push(todo);
   }

   /// 保存済みの Todo の件数
   pub fn len(&self) -> usize {
      self.todos.lock().unwrap().len()
   }

   pub fn is_empty(&self) -> bool {
      self.len() == 0
   }

   fn check_available(&self) -> Result<(), InfraError> {
      if self.failing {
         return Err(InfraError::connection(sqlx::Error::PoolTimedOut));
      }
      Ok(())
   }
}

#[async_trait]
impl TodoRepository for MockTodoRepository {
   async fn find_all(&self) -> Result<Vec<Todo>, InfraError> {
      self.check_available()?;
      Ok(self.todos.lock().unwrap().clone())
   }

   async fn insert(&self, text: &TodoText) -> Result<Todo, InfraError> {
      self.check_available()?;

      let mut todos = self.todos.lock().unwrap();
      let next_id = todos.iter().map(|t| t.id().as_i32()).max().unwrap_or(0) + 1;
      let todo = Todo::from_db(TodoId::from_i32(next_id), text.clone(), Some(Utc::now()));
      todos.push(todo.clone());

      Ok(todo)
   }
}
