//! # DB 認証情報の解決
//!
//! シークレットストアから DB 接続用の認証情報（host / port / username / password）を取得する。
//!
//! ## シークレットのペイロード形式
//!
//! RDS が生成する Secrets Manager のシークレットと同じ JSON オブジェクト:
//!
//! ```json
//! {
//!   "engine": "postgres",
//!   "host": "xxx.rds.amazonaws.com",
//!   "port": 5432,
//!   "username": "postgres",
//!   "password": "..."
//! }
//! ```
//!
//! 上記 4 キー以外は無視する。`port` は数値・数値文字列のどちらも受け付ける。
//!
//! ## エラー方針
//!
//! 取得失敗・ペイロード欠落・JSON 不正はすべてこのモジュールでログに記録し、
//! 原因を含まない [`InfraErrorKind::CredentialRetrieval`](crate::InfraErrorKind::CredentialRetrieval)
//! に置き換えて返す。

use std::{fmt, sync::Arc};

use serde::{Deserialize, Deserializer};

use crate::{InfraError, secrets::SecretStore};

/// DB 接続用の認証情報
#[derive(Clone, Deserialize)]
pub struct DbCredentials {
   pub host:     String,
   #[serde(deserialize_with = "deserialize_port")]
   pub port:     u16,
   pub username: String,
   password:     String,
}

impl DbCredentials {
   /// 認証情報を作成する
   pub fn new(
      host: impl Into<String>,
      port: u16,
      username: impl Into<String>,
      password: impl Into<String>,
   ) -> Self {
      Self {
         host: host.into(),
         port,
         username: username.into(),
         password: password.into(),
      }
   }

   /// パスワードを取得する
   ///
   /// 接続設定の組み立て以外では使用しないこと。
   pub fn password(&self) -> &str {
      &self.password
   }
}

// パスワードをログに出さないため Debug を手動実装する
impl fmt::Debug for DbCredentials {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.debug_struct("DbCredentials")
         .field("host", &self.host)
         .field("port", &self.port)
         .field("username", &self.username)
         .field("password", &"[REDACTED]")
         .finish()
   }
}

/// `port` を数値または数値文字列から読み取る
fn deserialize_port<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
   D: Deserializer<'de>,
{
   #[derive(Deserialize)]
   #[serde(untagged)]
   enum Port {
      Number(u16),
      Text(String),
   }

   match Port::deserialize(deserializer)? {
      Port::Number(port) => Ok(port),
      Port::Text(text) => text
         .trim()
         .parse()
         .map_err(|_| serde::de::Error::custom(format!("不正なポート番号: {text:?}"))),
   }
}

/// DB 認証情報のリゾルバ
///
/// シークレット ID とシークレットストアを保持し、呼び出しのたびに最新の
/// 認証情報を取得する。キャッシュは行わない（キャッシュは接続プール側の責務）。
#[derive(Clone)]
pub struct CredentialResolver {
   store:     Arc<dyn SecretStore>,
   secret_id: String,
}

impl CredentialResolver {
   /// 新しいリゾルバを作成する
   pub fn new(store: Arc<dyn SecretStore>, secret_id: impl Into<String>) -> Self {
      Self {
         store,
         secret_id: secret_id.into(),
      }
   }

   /// シークレットストアから認証情報を取得する
   ///
   /// # エラー
   ///
   /// 以下のいずれの場合も原因をログに記録した上で
   /// [`InfraError::credential_retrieval`] を返す:
   ///
   /// - シークレットストアの呼び出しに失敗した
   /// - `SecretString` が存在しない
   /// - ペイロードが JSON として不正、または必須キーが欠けている
   #[tracing::instrument(skip_all, fields(secret_id = %self.secret_id))]
   pub async fn resolve(&self) -> Result<DbCredentials, InfraError> {
      let payload = match self.store.get_secret_string(&self.secret_id).await {
         Ok(Some(payload)) => payload,
         Ok(None) => {
            tracing::error!("シークレットに SecretString が含まれていません");
            return Err(InfraError::credential_retrieval());
         }
         Err(e) => {
            tracing::error!(error = %e, "シークレットの取得に失敗しました");
            return Err(InfraError::credential_retrieval());
         }
      };

      serde_json::from_str(&payload).map_err(|e| {
         tracing::error!(error = %e, "シークレットのペイロードを解析できません");
         InfraError::credential_retrieval()
      })
   }
}

impl fmt::Debug for CredentialResolver {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.debug_struct("CredentialResolver")
         .field("secret_id", &self.secret_id)
         .finish_non_exhaustive()
   }
}
