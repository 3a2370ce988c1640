//! # Todo Function エラー定義
//!
//! ハンドラで発生するエラーと、HTTP レスポンスへの変換を定義する。
//!
//! ## 設計方針
//!
//! - 内部エラーを呼び出し元向けの短いメッセージに置き換える唯一の場所
//! - 500 系のエラーはここで詳細（`SpanTrace` を含む）をログに記録する
//! - エラーボディには安定したエラーコードと Request ID を含める
//!
//! | バリアント | ステータス | `code` | `message` |
//! |-----------|-----------|--------|-----------|
//! | `MissingValue` | 400 | `validation-error` | `Todo value is required` |
//! | `Fetch` | 500 | `fetch-failed` | `Error fetching rows from database` |
//! | `Insert` | 500 | `insert-failed` | `Error adding new todo` |
//! | `RouteNotFound` | 500 | `route-not-found` | `Not Found` |

use alto_infra::InfraError;
use alto_shared::ErrorResponse;
use axum::{
   http::StatusCode,
   response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{middleware::current_request_id, response::format_response};

/// Todo Function で発生するエラー
#[derive(Debug, Error)]
pub enum FunctionError {
   /// 作成リクエストに `value` が無い、文字列でない、または空
   #[error("Todo value is required")]
   MissingValue,

   /// 全件取得の失敗
   #[error("Error fetching rows from database")]
   Fetch(#[source] InfraError),

   /// 作成の失敗
   #[error("Error adding new todo")]
   Insert(#[source] InfraError),

   /// ルーティングされないメソッド・パス
   #[error("Not Found")]
   RouteNotFound,
}

impl FunctionError {
   /// 呼び出し元に返すステータスコード
   pub fn status(&self) -> StatusCode {
      match self {
         Self::MissingValue => StatusCode::BAD_REQUEST,
         // 未定義ルートも 500 で応答する
         Self::Fetch(_) | Self::Insert(_) | Self::RouteNotFound => {
            StatusCode::INTERNAL_SERVER_ERROR
         }
      }
   }

   /// 呼び出し元に返す安定したエラーコード
   pub fn code(&self) -> &'static str {
      match self {
         Self::MissingValue => "validation-error",
         Self::Fetch(_) => "fetch-failed",
         Self::Insert(_) => "insert-failed",
         Self::RouteNotFound => "route-not-found",
      }
   }
}

impl IntoResponse for FunctionError {
   fn into_response(self) -> Response {
      match &self {
         Self::Fetch(e) | Self::Insert(e) => {
            tracing::error!(
               code = self.code(),
               error = %e,
               span_trace = %e.span_trace(),
               "{self}"
            );
         }
         Self::RouteNotFound => tracing::warn!(code = self.code(), "{self}"),
         Self::MissingValue => tracing::info!(code = self.code(), "{self}"),
      }

      let body =
         ErrorResponse::new(self.code(), self.to_string()).with_request_id(current_request_id());
      format_response(self.status(), &body)
   }
}

#[cfg(test)]
mod tests {
   use axum::body::to_bytes;
   use pretty_assertions::assert_eq;
   use rstest::rstest;

   use super::*;

   async fn error_body(response: Response) -> ErrorResponse {
      let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
      serde_json::from_slice(&body).unwrap()
   }

   #[rstest]
   #[case::missing_value(
      FunctionError::MissingValue,
      400,
      "validation-error",
      "Todo value is required"
   )]
   #[case::fetch(
      FunctionError::Fetch(InfraError::unexpected("pool timed out")),
      500,
      "fetch-failed",
      "Error fetching rows from database"
   )]
   #[case::insert(
      FunctionError::Insert(InfraError::credential_retrieval()),
      500,
      "insert-failed",
      "Error adding new todo"
   )]
   #[case::route_not_found(FunctionError::RouteNotFound, 500, "route-not-found", "Not Found")]
   #[tokio::test]
   async fn test_エラーがステータスとボディに変換される(
      #[case] error: FunctionError,
      #[case] status: u16,
      #[case] code: &str,
      #[case] message: &str,
   ) {
      let response = error.into_response();

      assert_eq!(response.status().as_u16(), status);
      assert_eq!(response.headers()["access-control-allow-origin"], "*");
      let body = error_body(response).await;
      assert_eq!(body.code, code);
      assert_eq!(body.message, message);
      // task-local スコープ外のため Request ID は付与されない
      assert_eq!(body.request_id, None);
   }

   #[tokio::test]
   async fn test_内部エラーの詳細はボディに含まれない() {
      let error = FunctionError::Fetch(InfraError::unexpected("secret-internal-detail"));

      let response = error.into_response();

      let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
      let text = String::from_utf8(body.to_vec()).unwrap();
      assert!(!text.contains("secret-internal-detail"));
   }
}
