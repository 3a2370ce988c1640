//! # アプリケーション構築
//!
//! ルーター定義と横断的レイヤーの適用を担当する。
//! `main.rs` は初期化と実行モードの選択に集中する。
//!
//! ## ルーティング
//!
//! | メソッド | パス | ハンドラ |
//! |---------|------|---------|
//! | `GET` | `/todos` | [`list_todos`] |
//! | `POST` | `/todos` | [`create_todo`] |
//! | その他 | その他 | [`route_fallback`]（500 `Not Found`） |
//!
//! `/todos` への `GET` / `POST` 以外のメソッドも、405 ではなくフォールバックで応答する。
//! `HEAD` は `GET` に流れないよう明示的にフォールバックへ割り当てる。
//!
//! リクエストボディの上限は API Gateway のペイロード上限（10 MB）に合わせる。

use std::sync::Arc;

use alto_shared::observability::make_request_span;
use axum::{Router, extract::DefaultBodyLimit, middleware::from_fn, routing::get};
use tower_http::{
   request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
   trace::TraceLayer,
};

use crate::{
   handler::{TodoState, create_todo, list_todos, route_fallback},
   middleware::{MakeInvocationRequestId, store_request_id},
};

/// リクエストボディの上限（API Gateway のペイロード上限）
pub const BODY_LIMIT_BYTES: usize = 10 * 1024 * 1024;

/// ルーターを構築する
///
/// Lambda 実行時とローカル実行時で同じルーターを使用する。
pub fn build_app(state: Arc<TodoState>) -> Router {
   // レイヤーは下から順に外側になる:
   // 1. SetRequestIdLayer（最外）: 呼び出し ID（ローカルでは UUID v7）を Request ID に設定
   // 2. TraceLayer: カスタムスパンに request_id を含め、全ログに自動注入
   // 3. PropagateRequestIdLayer: レスポンスヘッダーに X-Request-Id をコピー
   // 4. store_request_id: エラーボディ用に Request ID を task-local に保存
   Router::new()
      .route(
         "/todos",
         get(list_todos)
            .post(create_todo)
            .head(route_fallback)
            .fallback(route_fallback),
      )
      .fallback(route_fallback)
      .with_state(state)
      .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
      .layer(from_fn(store_request_id))
      .layer(PropagateRequestIdLayer::x_request_id())
      .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
      .layer(SetRequestIdLayer::x_request_id(MakeInvocationRequestId))
}
