//! # Alto ドメイン層
//!
//! Todo API のドメインモデルを定義する。
//!
//! ## 設計方針
//!
//! - **エンティティ**: データベースが採番する ID を持つ [`todo::Todo`]
//! - **値オブジェクト**: 検証済みの本文 [`todo::TodoText`]
//! - **ドメインエラー**: ビジネスルール違反を表現する [`DomainError`]
//!
//! ## 依存関係の方向
//!
//! ```text
//! todo-function → infra → domain
//!       ↘                   ↑
//!         ─────────────────
//! ```
//!
//! ドメイン層はインフラ層（DB、Secrets Manager）には一切依存しない。
//!
//! ## 使用例
//!
//! ```rust
//! use alto_domain::{DomainError, todo::TodoText};
//!
//! let text = TodoText::new("牛乳を買う").unwrap();
//! assert_eq!(text.as_str(), "牛乳を買う");
//!
//! let error = TodoText::new("").unwrap_err();
//! assert!(matches!(error, DomainError::Validation(_)));
//! ```

pub mod error;
pub mod todo;

pub use error::DomainError;
