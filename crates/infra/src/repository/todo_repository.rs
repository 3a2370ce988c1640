//! # TodoRepository
//!
//! `todos` テーブルに対する全件取得と作成を担当するリポジトリ。
//!
//! ## 設計方針
//!
//! - **実行時クエリ**: ビルド時に DB を必要としないよう `sqlx::query_as` を使用する
//! - **並び順**: 全件取得は `ORDER BY` を付けない（データベースの返却順のまま）
//! - **DB 採番**: ID と作成日時は `INSERT ... RETURNING` でデータベースから受け取る
//! - **エラーログ**: 失敗はここで原因をログに記録し、呼び出し側には種別付きのエラーを返す

use std::sync::Arc;

use alto_domain::todo::{Todo, TodoId, TodoText};
use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::{db::Database, error::InfraError};

/// Todo リポジトリトレイト
#[async_trait]
pub trait TodoRepository: Send + Sync {
   /// 全件取得
   ///
   /// テーブルが空の場合は空の Vec を返す。
   async fn find_all(&self) -> Result<Vec<Todo>, InfraError>;

   /// 1 件作成し、採番済みの Todo を返す
   async fn insert(&self, text: &TodoText) -> Result<Todo, InfraError>;
}

/// `todos` テーブルの行
#[derive(Debug, sqlx::FromRow)]
struct TodoRow {
   id:         i32,
   todo:       String,
   created_at: Option<NaiveDateTime>,
}

impl From<TodoRow> for Todo {
   fn from(row: TodoRow) -> Self {
      // `TIMESTAMP`（タイムゾーンなし）は DB サーバーの UTC として扱う
      Todo::from_db(
         TodoId::from_i32(row.id),
         TodoText::from_db(row.todo),
         row.created_at.map(|at| at.and_utc()),
      )
   }
}

/// PostgreSQL 実装の TodoRepository
#[derive(Debug, Clone)]
pub struct PostgresTodoRepository {
   database: Arc<Database>,
}

impl PostgresTodoRepository {
   /// 新しいリポジトリインスタンスを作成
   pub fn new(database: Arc<Database>) -> Self {
      Self { database }
   }
}

#[async_trait]
impl TodoRepository for PostgresTodoRepository {
   #[tracing::instrument(skip_all)]
   async fn find_all(&self) -> Result<Vec<Todo>, InfraError> {
      let mut conn = self.database.acquire().await?;

      let rows = sqlx::query_as::<_, TodoRow>("SELECT id, todo, created_at FROM todos")
         .fetch_all(&mut *conn)
         .await
         .map_err(|e| {
            tracing::error!(error = %e, "todos の取得に失敗しました");
            InfraError::query(e)
         })?;

      tracing::debug!(count = rows.len(), "todos を取得しました");
      Ok(rows.into_iter().map(Todo::from).collect())
   }

   #[tracing::instrument(skip_all)]
   async fn insert(&self, text: &TodoText) -> Result<Todo, InfraError> {
      let mut conn = self.database.acquire().await?;

      let row = sqlx::query_as::<_, TodoRow>(
         r#"
            INSERT INTO todos (todo)
            VALUES ($1)
            RETURNING id, todo, created_at
            "#,
      )
      .bind(text.as_str())
      .fetch_one(&mut *conn)
      .await
      .map_err(|e| {
         tracing::error!(error = %e, "todo の作成に失敗しました");
         InfraError::query(e)
      })?;

      tracing::info!(todo_id = row.id, "todo を作成しました");
      Ok(row.into())
   }
}
