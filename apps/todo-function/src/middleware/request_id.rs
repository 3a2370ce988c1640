//! # Request ID ミドルウェア
//!
//! 呼び出しごとの Request ID を生成し、ハンドラとエラー変換から参照できるようにする。
//!
//! ## 仕組み
//!
//! 1. [`MakeInvocationRequestId`] が `SetRequestIdLayer` から呼ばれ、Request ID を決める
//!    - Lambda 上: 呼び出しコンテキストの `request_id`（CloudWatch Logs の `RequestId` と一致）
//!    - ローカル: UUID v7
//! 2. [`store_request_id`] ミドルウェアが `SetRequestIdLayer` の設定した
//!    [`RequestId`](tower_http::request_id::RequestId) を task-local に保存する
//! 3. [`current_request_id`] でエラーボディに Request ID を付与する
//!
//! クライアントが `X-Request-Id` を送ってきた場合は `SetRequestIdLayer` がそちらを優先する。

use alto_shared::observability::MakeRequestUuidV7;
use axum::{body::Body, http::Request, middleware::Next, response::Response};
use tower_http::request_id::{MakeRequestId, RequestId};

tokio::task_local! {
   static REQUEST_ID: String;
}

/// 現在のリクエストの Request ID を取得する
///
/// task-local スコープ外（テスト等）では `None` を返す。
pub fn current_request_id() -> Option<String> {
   REQUEST_ID.try_with(|id| id.clone()).ok()
}

/// Request ID を task-local に保存するミドルウェア
pub async fn store_request_id(request: Request<Body>, next: Next) -> Response {
   let request_id = request
      .extensions()
      .get::<RequestId>()
      .and_then(|id| id.header_value().to_str().ok())
      .unwrap_or("-")
      .to_string();

   REQUEST_ID.scope(request_id, next.run(request)).await
}

/// Lambda の呼び出し ID を優先して Request ID を生成する
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeInvocationRequestId;

impl MakeRequestId for MakeInvocationRequestId {
   fn make_request_id<B>(&mut self, request: &http::Request<B>) -> Option<RequestId> {
      let invocation_id = request
         .extensions()
         .get::<lambda_http::Context>()
         .map(|context| context.request_id.as_str())
         .filter(|id| !id.is_empty())
         .and_then(|id| http::HeaderValue::from_str(id).ok());

      match invocation_id {
         Some(value) => Some(RequestId::new(value)),
         None => MakeRequestUuidV7.make_request_id(request),
      }
   }
}
