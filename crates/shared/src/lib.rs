//! # Alto 共有ユーティリティ
//!
//! Todo API のクレート間で共有する横断的ユーティリティを提供する。
//!
//! ## 設計方針
//!
//! - ビジネスロジックを含まない純粋なユーティリティのみを配置
//! - axum 等の Web フレームワークには依存しない（`IntoResponse` 変換は各アプリの責務）
//! - トレーシング関連の依存は `observability` feature で有効化する

pub mod error_response;
pub mod observability;

pub use error_response::ErrorResponse;
