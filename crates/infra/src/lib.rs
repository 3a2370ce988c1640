//! # Alto インフラ層
//!
//! 外部システム（PostgreSQL、AWS Secrets Manager）との接続・通信を担当する。
//!
//! ## 責務
//!
//! - **認証情報の解決**: Secrets Manager から DB 認証情報を取得
//! - **データベース接続**: 認証情報から接続設定を組み立て、接続プールを管理
//! - **スキーマ初期化**: `todos` テーブルの冪等な作成
//! - **リポジトリ実装**: Todo の全件取得・作成
//!
//! ## 依存関係
//!
//! ```text
//! todo-function → infra → domain
//! ```
//!
//! ## モジュール構成
//!
//! - [`secrets`] - シークレットストアの抽象化と AWS 実装
//! - [`credentials`] - DB 認証情報の解決
//! - [`db`] - 接続設定と接続プール
//! - [`schema`] - スキーマ初期化
//! - [`repository`] - リポジトリ実装
//! - [`error`] - インフラ層エラー定義
//!
//! ## 使用例
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use alto_infra::{credentials::CredentialResolver, db, schema, secrets};
//!
//! async fn setup() -> Result<(), alto_infra::InfraError> {
//!     let client = secrets::create_client(None).await;
//!     let store = Arc::new(secrets::AwsSecretStore::new(client));
//!     let resolver = CredentialResolver::new(store, "arn:aws:secretsmanager:...");
//!     let database = db::Database::from_secret(resolver, db::DatabaseSettings::default());
//!
//!     schema::ensure_todos_table(&database).await?;
//!     Ok(())
//! }
//! ```

pub mod credentials;
pub mod db;
pub mod error;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod repository;
pub mod schema;
pub mod secrets;

pub use error::{InfraError, InfraErrorKind};
