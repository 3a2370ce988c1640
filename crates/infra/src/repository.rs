//! # リポジトリ実装
//!
//! ドメインエンティティの永続化を担当するリポジトリを提供する。
//!
//! ## 設計方針
//!
//! - **トレイト境界**: ハンドラはトレイト経由でリポジトリを利用し、テストではモックに差し替える
//! - **データベース抽象化**: sqlx を使用し、PostgreSQL 固有の処理をカプセル化
//! - **接続の返却**: 接続は操作ごとにプールから取得し、スコープ終了時に必ず返却する

pub mod todo_repository;

pub use todo_repository::{PostgresTodoRepository, TodoRepository};
