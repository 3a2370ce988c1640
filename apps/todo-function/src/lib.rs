//! # Todo Function ライブラリ
//!
//! Todo API の Lambda 関数を構成するモジュールを公開する。
//! バイナリ（`main.rs`）と統合テストの両方から利用する。

pub mod app;
pub mod config;
pub mod context;
pub mod error;
pub mod handler;
pub mod middleware;
pub mod response;
