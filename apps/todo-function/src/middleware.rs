//! # ミドルウェア
//!
//! ルーター全体に適用する横断的処理を提供する。

pub mod request_id;

pub use request_id::{MakeInvocationRequestId, current_request_id, store_request_id};
