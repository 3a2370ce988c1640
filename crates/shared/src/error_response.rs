//! # エラーレスポンス
//!
//! 呼び出し元に返すエラーボディ `{ "message", "code", "requestId" }` を提供する。
//!
//! ## 設計
//!
//! - `message`: 短い人間可読メッセージ。内部エラーの詳細は含めない
//! - `code`: クライアントが分岐に使える安定したエラーコード
//! - `requestId`: ログの `request_id` と一致する呼び出し ID。
//!   問い合わせ時にサーバー側の詳細ログと突き合わせるために使う
//!
//! `ErrorResponse` は純粋なデータ構造であり、HTTP レスポンスへの変換は
//! 各アプリの責務とする。

use serde::{Deserialize, Serialize};

/// エラーレスポンスボディ
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub message:    String,
    pub code:       String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub request_id: Option<String>,
}

impl ErrorResponse {
    /// エラーコードとメッセージから作成する
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            message:    message.into(),
            code:       code.into(),
            request_id: None,
        }
    }

    /// リクエスト ID を付与する
    ///
    /// `None` の場合（リクエストスコープ外）は何も付与しない。
    pub fn with_request_id(mut self, request_id: Option<String>) -> Self {
        self.request_id = request_id;
        self
    }
}
