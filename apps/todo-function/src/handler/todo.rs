//! # Todo ハンドラ
//!
//! Todo の一覧取得・作成 API を提供する。
//!
//! ## エンドポイント
//!
//! - `GET /todos` - 全件取得
//! - `POST /todos` - 作成
//!
//! 上記以外のメソッド・パスは [`route_fallback`] で応答する。

use std::sync::Arc;

use alto_domain::todo::{Todo, TodoText};
use alto_infra::repository::TodoRepository;
use axum::{
   body::Bytes,
   extract::{State, rejection::BytesRejection},
   http::StatusCode,
   response::Response,
};
use serde::Serialize;
use serde_json::Value;

use crate::{error::FunctionError, response::format_response};

/// Todo API の共有状態
pub struct TodoState {
   pub repository: Arc<dyn TodoRepository>,
}

// --- レスポンス型 ---

/// Todo DTO
#[derive(Debug, Serialize)]
pub struct TodoDto {
   pub id:         i32,
   pub todo:       String,
   /// RFC 3339（UTC）。DB の値が NULL の場合は `null`
   pub created_at: Option<String>,
}

impl From<&Todo> for TodoDto {
   fn from(todo: &Todo) -> Self {
      Self {
         id:         todo.id().as_i32(),
         todo:       todo.text().as_str().to_string(),
         created_at: todo.created_at().map(|at| at.to_rfc3339()),
      }
   }
}

/// 一覧レスポンス
#[derive(Debug, Serialize)]
pub struct TodoListResponse {
   pub todos: Vec<TodoDto>,
}

/// 作成レスポンス
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodoResponse {
   pub new_todo: TodoDto,
}

/// 作成リクエストのボディから `value` を取り出す
///
/// ボディが空・JSON として不正・オブジェクトでない場合は `{}` と同じ扱いになる。
/// `value` が文字列でない場合も未指定として扱う。
fn extract_value(body: &[u8]) -> Option<String> {
   let payload: Value = serde_json::from_slice(body).unwrap_or(Value::Null);

   match payload.get("value") {
      Some(Value::String(value)) => Some(value.clone()),
      _ => None,
   }
}

// --- ハンドラ ---

/// GET /todos
///
/// 全件を DB の返却順のまま返す。
#[tracing::instrument(skip_all)]
pub async fn list_todos(State(state): State<Arc<TodoState>>) -> Result<Response, FunctionError> {
   let todos = state
      .repository
      .find_all()
      .await
      .map_err(FunctionError::Fetch)?;

   let response = TodoListResponse {
      todos: todos.iter().map(TodoDto::from).collect(),
   };
   Ok(format_response(StatusCode::OK, &response))
}

/// POST /todos
///
/// `{ "value": string }` を受け取り、作成した Todo を返す。
/// `value` が無い・空の場合や、ボディを読み取れない場合は何も保存せず 400 を返す。
#[tracing::instrument(skip_all)]
pub async fn create_todo(
   State(state): State<Arc<TodoState>>,
   body: Result<Bytes, BytesRejection>,
) -> Result<Response, FunctionError> {
   let body = body.map_err(|rejection| {
      tracing::warn!(error = %rejection, "リクエストボディの読み取りに失敗しました");
      FunctionError::MissingValue
   })?;

   let text = extract_value(&body)
      .and_then(|value| TodoText::new(value).ok())
      .ok_or(FunctionError::MissingValue)?;

   let todo = state
      .repository
      .insert(&text)
      .await
      .map_err(FunctionError::Insert)?;

   let response = CreateTodoResponse {
      new_todo: TodoDto::from(&todo),
   };
   Ok(format_response(StatusCode::CREATED, &response))
}

/// 未定義のメソッド・パス
pub async fn route_fallback() -> FunctionError {
   FunctionError::RouteNotFound
}
