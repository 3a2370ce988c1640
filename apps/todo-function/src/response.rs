//! # レスポンス整形
//!
//! ステータスコードとボディから、CORS ヘッダー付きの JSON レスポンスを組み立てる。
//!
//! すべてのレスポンス（成功・エラー・フォールバック）はこのモジュールを経由する。
//! CORS のプリフライト（`OPTIONS`）は API Gateway 側で応答するため、
//! ここでは実リクエストへのレスポンスにヘッダーを付与するだけでよい。

use axum::{
   Json,
   http::{HeaderName, HeaderValue, StatusCode, header},
   response::{IntoResponse, Response},
};
use serde::Serialize;

/// すべてのレスポンスに付与する CORS ヘッダー
pub fn cors_headers() -> [(HeaderName, HeaderValue); 3] {
   [
      (
         header::ACCESS_CONTROL_ALLOW_HEADERS,
         HeaderValue::from_static("Content-Type"),
      ),
      (
         header::ACCESS_CONTROL_ALLOW_ORIGIN,
         HeaderValue::from_static("*"),
      ),
      (
         header::ACCESS_CONTROL_ALLOW_METHODS,
         HeaderValue::from_static("OPTIONS,POST,GET"),
      ),
   ]
}

/// ステータスコードと JSON ボディからレスポンスを作成する
///
/// `Content-Type: application/json` と [`cors_headers`] を付与する。
pub fn format_response(status: StatusCode, body: &impl Serialize) -> Response {
   (status, cors_headers(), Json(body)).into_response()
}
