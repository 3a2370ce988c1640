//! # Todo
//!
//! API が扱う唯一のエンティティ。
//!
//! ## ライフサイクル
//!
//! - 作成: `INSERT ... RETURNING` でデータベースが ID と作成日時を採番する
//! - 参照: 全件取得のみ
//! - 更新・削除: このシステムでは公開しない
//!
//! ## 設計判断
//!
//! ### ID はデータベース採番
//!
//! `todos.id` は `SERIAL`（`int4`）であり、アプリケーション側では生成しない。
//! そのため [`TodoId`] には `new()` がなく、DB から取得した値の復元のみを提供する。
//!
//! ### 本文は trim しない
//!
//! [`TodoText`] は空文字列のみを拒否する。空白だけの本文も「値あり」として扱い、
//! 入力された文字列をそのまま保存する。

use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::DomainError;

/// Todo の一意識別子
///
/// データベースの `SERIAL` カラムが採番する正の整数。一度割り当てられたら不変。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display)]
#[display("{_0}")]
pub struct TodoId(i32);

impl TodoId {
    /// データベースから取得した値から ID を復元する
    pub fn from_i32(value: i32) -> Self {
        Self(value)
    }

    /// 内部の整数値を取得する
    pub fn as_i32(&self) -> i32 {
        self.0
    }
}

/// Todo の本文
///
/// 空文字列を許容しない。`todos.todo` の `NOT NULL` 制約に加えて、
/// リクエスト受付時点でこの型を経由させることで空の本文を排除する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoText(String);

impl TodoText {
    /// 本文を検証して作成する
    ///
    /// # エラー
    ///
    /// 空文字列の場合は [`DomainError::Validation`] を返す。
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();

        if value.is_empty() {
            return Err(DomainError::Validation("Todo の本文は必須です".to_string()));
        }

        Ok(Self(value))
    }

    /// データベースから取得した値から復元する
    ///
    /// 保存済みの値は検証しない。空文字列の行が存在しても一覧取得は失敗させない。
    pub fn from_db(value: String) -> Self {
        Self(value)
    }

    /// 文字列参照を取得する
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TodoText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Todo エンティティ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Todo {
    id:         TodoId,
    text:       TodoText,
    created_at: Option<DateTime<Utc>>,
}

impl Todo {
    /// データベースの行から Todo を復元する
    ///
    /// `created_at` はカラムが NULL 許容のため `Option` で受け取る。
    pub fn from_db(id: TodoId, text: TodoText, created_at: Option<DateTime<Utc>>) -> Self {
        Self {
            id,
            text,
            created_at,
        }
    }

    pub fn id(&self) -> TodoId {
        self.id
    }

    pub fn text(&self) -> &TodoText {
        &self.text
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }
}
