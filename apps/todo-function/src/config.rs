//! # Todo Function 設定
//!
//! 環境変数から関数の設定を読み込む。
//!
//! 読み込みは起動時に一度だけ行い、不正な値はリクエストを受け付ける前に
//! [`ConfigError`] として報告する。

use std::{env, path::PathBuf, time::Duration};

use alto_infra::db::{DatabaseSettings, TlsMode};
use thiserror::Error;

/// 設定読み込みのエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
   /// 必須の環境変数が設定されていない
   #[error("{0} が設定されていません")]
   Missing(&'static str),

   /// 環境変数の値が不正
   #[error("{name} の値が不正です: {value:?}")]
   Invalid { name: &'static str, value: String },
}

/// Todo Function の設定
#[derive(Debug, Clone)]
pub struct FunctionConfig {
   /// DB 認証情報を保持するシークレットの ID（ARN）
   pub db_secret_id: String,
   /// DB 接続設定（認証情報以外）
   pub database: DatabaseSettings,
   /// Secrets Manager のエンドポイント上書き（LocalStack 等）
   pub secrets_manager_endpoint: Option<String>,
   /// ローカル実行時のバインドアドレス
   pub host: String,
   /// ローカル実行時のポート番号
   pub port: u16,
}

impl FunctionConfig {
   /// 環境変数から設定を読み込む
   pub fn from_env() -> Result<Self, ConfigError> {
      Self::from_vars(|name| env::var(name).ok())
   }

   /// 任意の変数ソースから設定を読み込む
   ///
   /// 空文字列の値は未設定として扱う。
   pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
      let var = |name: &str| lookup(name).filter(|value| !value.is_empty());

      let db_secret_id = var("DB_SECRET_ARN").ok_or(ConfigError::Missing("DB_SECRET_ARN"))?;

      let defaults = DatabaseSettings::default();
      let tls_mode = match var("DB_TLS_MODE") {
         Some(value) => TlsMode::parse(&value).ok_or(ConfigError::Invalid {
            name: "DB_TLS_MODE",
            value,
         })?,
         None => defaults.tls_mode,
      };
      let database = DatabaseSettings {
         database_name: var("DB_NAME").unwrap_or(defaults.database_name),
         tls_mode,
         ssl_root_cert: var("DB_SSL_ROOT_CERT").map(PathBuf::from),
         max_connections: parse_or(
            "DB_MAX_CONNECTIONS",
            var("DB_MAX_CONNECTIONS"),
            defaults.max_connections,
         )?,
         acquire_timeout: match var("DB_ACQUIRE_TIMEOUT_SECS") {
            Some(value) => Duration::from_secs(parse("DB_ACQUIRE_TIMEOUT_SECS", value)?),
            None => defaults.acquire_timeout,
         },
      };

      if database.max_connections == 0 {
         return Err(ConfigError::Invalid {
            name:  "DB_MAX_CONNECTIONS",
            value: "0".to_string(),
         });
      }

      Ok(Self {
         db_secret_id,
         database,
         secrets_manager_endpoint: var("SECRETS_MANAGER_ENDPOINT_URL"),
         host: var("FUNCTION_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
         port: parse_or("FUNCTION_PORT", var("FUNCTION_PORT"), 3000)?,
      })
   }
}

fn parse<T: std::str::FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
   value
      .trim()
      .parse()
      .map_err(|_| ConfigError::Invalid { name, value })
}

fn parse_or<T: std::str::FromStr>(
   name: &'static str,
   value: Option<String>,
   default: T,
) -> Result<T, ConfigError> {
   value.map_or(Ok(default), |value| parse(name, value))
}

#[cfg(test)]
mod tests {
   use std::collections::HashMap;

   use pretty_assertions::assert_eq;
   use rstest::rstest;

   use super::*;

   // テスト間で環境変数の競合を避けるため、変数ソースを差し替えて検証する
   fn load(vars: &[(&str, &str)]) -> Result<FunctionConfig, ConfigError> {
      let vars: HashMap<String, String> = vars
         .iter()
         .map(|(k, v)| (k.to_string(), v.to_string()))
         .collect();
      FunctionConfig::from_vars(|name| vars.get(name).cloned())
   }

   #[test]
   fn test_必須項目のみでデフォルト値が適用される() {
      let config = load(&[("DB_SECRET_ARN", "arn:secret")]).unwrap();

      assert_eq!(config.db_secret_id, "arn:secret");
      assert_eq!(config.database.database_name, "postgres");
      assert_eq!(config.database.tls_mode, TlsMode::VerifyFull);
      assert_eq!(config.database.ssl_root_cert, None);
      assert_eq!(config.database.max_connections, 2);
      assert_eq!(config.database.acquire_timeout, Duration::from_secs(5));
      assert_eq!(config.secrets_manager_endpoint, None);
      assert_eq!(config.host, "0.0.0.0");
      assert_eq!(config.port, 3000);
   }

   #[test]
   fn test_全項目を指定できる() {
      let config = load(&[
         ("DB_SECRET_ARN", "arn:secret"),
         ("DB_NAME", "todos"),
         ("DB_TLS_MODE", "require"),
         ("DB_SSL_ROOT_CERT", "/opt/rds-ca.pem"),
         ("DB_MAX_CONNECTIONS", "4"),
         ("DB_ACQUIRE_TIMEOUT_SECS", "10"),
         ("SECRETS_MANAGER_ENDPOINT_URL", "http://localhost:4566"),
         ("FUNCTION_HOST", "127.0.0.1"),
         ("FUNCTION_PORT", "8080"),
      ])
      .unwrap();

      assert_eq!(config.database.database_name, "todos");
      assert_eq!(config.database.tls_mode, TlsMode::Require);
      assert_eq!(
         config.database.ssl_root_cert,
         Some(PathBuf::from("/opt/rds-ca.pem"))
      );
      assert_eq!(config.database.max_connections, 4);
      assert_eq!(config.database.acquire_timeout, Duration::from_secs(10));
      assert_eq!(
         config.secrets_manager_endpoint.as_deref(),
         Some("http://localhost:4566")
      );
      assert_eq!(config.host, "127.0.0.1");
      assert_eq!(config.port, 8080);
   }

   #[rstest]
   #[case::未設定(&[])]
   #[case::空文字列(&[("DB_SECRET_ARN", "")])]
   fn test_シークレットidが無い場合はエラー(#[case] vars: &[(&str, &str)]) {
      assert_eq!(load(vars).unwrap_err(), ConfigError::Missing("DB_SECRET_ARN"));
   }

   #[rstest]
   #[case("DB_TLS_MODE", "strict")]
   #[case("DB_MAX_CONNECTIONS", "many")]
   #[case("DB_MAX_CONNECTIONS", "0")]
   #[case("DB_ACQUIRE_TIMEOUT_SECS", "-1")]
   #[case("FUNCTION_PORT", "70000")]
   fn test_不正な値はinvalidエラー(#[case] name: &str, #[case] value: &str) {
      let err = load(&[("DB_SECRET_ARN", "arn:secret"), (name, value)]).unwrap_err();

      assert!(
         matches!(&err, ConfigError::Invalid { name: n, .. } if *n == name),
         "{err:?}"
      );
   }
}
