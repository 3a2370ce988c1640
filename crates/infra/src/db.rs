//! # PostgreSQL データベース接続管理
//!
//! 認証情報から接続設定を組み立て、接続プールを管理する。
//!
//! ## 設計方針
//!
//! - **接続プール**: 呼び出しごとに接続を張り直さず、上限付きのプールで再利用する
//! - **遅延初期化**: プールは最初の DB 操作で作成する。作成前に Secrets Manager から
//!   認証情報を解決し、失敗した場合は何もキャッシュせず次の操作で再試行する
//! - **ヘルスチェック**: `test_before_acquire` により、プールから取り出す前に接続の生存を確認する
//! - **TLS 検証**: 検証モードは設定で明示する。デフォルトは `verify-full`
//!
//! ## TLS モード
//!
//! | 設定値 | 暗号化 | 証明書検証 |
//! |--------|--------|-----------|
//! | `disable` | なし | なし |
//! | `require` | あり | なし |
//! | `verify-ca` | あり | CA のみ |
//! | `verify-full` | あり | CA + ホスト名 |
//!
//! RDS に `verify-ca` / `verify-full` で接続する場合は、RDS の CA バンドルを
//! `ssl_root_cert` に指定する。
//!
//! ## 使用例
//!
//! ```rust,ignore
//! use alto_infra::db::{Database, DatabaseSettings};
//!
//! async fn example(database: &Database) -> Result<(), alto_infra::InfraError> {
//!     // スコープを抜けると接続はプールに返却される（エラー経路でも同様）
//!     let mut conn = database.acquire().await?;
//!     sqlx::query("SELECT 1").execute(&mut *conn).await?;
//!     Ok(())
//! }
//! ```

use std::{path::PathBuf, time::Duration};

use sqlx::{
   PgPool,
   Postgres,
   pool::PoolConnection,
   postgres::{PgConnectOptions, PgPoolOptions, PgSslMode},
};
use tokio::sync::OnceCell;

use crate::{
   credentials::{CredentialResolver, DbCredentials},
   error::InfraError,
};

/// 接続時に PostgreSQL へ通知するアプリケーション名
const APPLICATION_NAME: &str = "alto-todo-function";

/// DB 接続の TLS モード
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TlsMode {
   /// 暗号化しない
   Disable,
   /// 暗号化するが証明書を検証しない
   Require,
   /// 証明書の CA を検証する
   VerifyCa,
   /// 証明書の CA とホスト名を検証する
   #[default]
   VerifyFull,
}

impl TlsMode {
   /// 設定値の文字列からパースする
   ///
   /// 不明な値の場合は `None` を返す。
   pub fn parse(value: &str) -> Option<Self> {
      match value {
         "disable" => Some(Self::Disable),
         "require" => Some(Self::Require),
         "verify-ca" => Some(Self::VerifyCa),
         "verify-full" => Some(Self::VerifyFull),
         _ => None,
      }
   }

   fn ssl_mode(self) -> PgSslMode {
      match self {
         Self::Disable => PgSslMode::Disable,
         Self::Require => PgSslMode::Require,
         Self::VerifyCa => PgSslMode::VerifyCa,
         Self::VerifyFull => PgSslMode::VerifyFull,
      }
   }
}

/// 認証情報以外の接続設定
#[derive(Debug, Clone)]
pub struct DatabaseSettings {
   /// 接続先データベース名
   pub database_name:   String,
   /// TLS モード
   pub tls_mode:        TlsMode,
   /// 証明書検証に使うルート CA（PEM）のパス
   pub ssl_root_cert:   Option<PathBuf>,
   /// プールの最大接続数
   pub max_connections: u32,
   /// プールからの接続取得タイムアウト
   pub acquire_timeout: Duration,
}

impl Default for DatabaseSettings {
   fn default() -> Self {
      Self {
         database_name:   "postgres".to_string(),
         tls_mode:        TlsMode::default(),
         ssl_root_cert:   None,
         max_connections: 2,
         acquire_timeout: Duration::from_secs(5),
      }
   }
}

/// 認証情報と接続設定から接続オプションを組み立てる
///
/// この時点ではネットワーク接続は行わない。
pub fn connect_options(credentials: &DbCredentials, settings: &DatabaseSettings) -> PgConnectOptions {
   let options = PgConnectOptions::new()
      .host(&credentials.host)
      .port(credentials.port)
      .username(&credentials.username)
      .password(credentials.password())
      .database(&settings.database_name)
      .ssl_mode(settings.tls_mode.ssl_mode())
      .application_name(APPLICATION_NAME);

   match &settings.ssl_root_cert {
      Some(path) => options.ssl_root_cert(path),
      None => options,
   }
}

/// 上限とヘルスチェックを設定した `PgPoolOptions` を返す
pub fn pool_options(settings: &DatabaseSettings) -> PgPoolOptions {
   PgPoolOptions::new()
      .max_connections(settings.max_connections)
      .acquire_timeout(settings.acquire_timeout)
      .test_before_acquire(true)
}

/// プロセス全体で共有するデータベースハンドル
///
/// 接続プールを遅延初期化で保持する。プロセス起動時に一度だけ作成し、
/// `Arc` で各リポジトリに渡す。
#[derive(Debug)]
pub struct Database {
   pool:     OnceCell<PgPool>,
   resolver: Option<CredentialResolver>,
   settings: DatabaseSettings,
}

impl Database {
   /// シークレットストアの認証情報から接続するハンドルを作成する
   ///
   /// 認証情報の解決とプールの作成は最初の [`pool`](Self::pool) 呼び出しまで行わない。
   pub fn from_secret(resolver: CredentialResolver, settings: DatabaseSettings) -> Self {
      Self {
         pool: OnceCell::new(),
         resolver: Some(resolver),
         settings,
      }
   }

   /// 作成済みのプールからハンドルを作成する
   ///
   /// テストや `DATABASE_URL` で直接接続する場合に使用する。
   pub fn from_pool(pool: PgPool) -> Self {
      Self {
         pool:     OnceCell::new_with(Some(pool)),
         resolver: None,
         settings: DatabaseSettings::default(),
      }
   }

   /// 接続プールを取得する（未作成なら作成する）
   ///
   /// # エラー
   ///
   /// 認証情報の解決に失敗した場合は `CredentialRetrieval` を返す。
   /// この場合プールはキャッシュされず、次回の呼び出しで再度解決を試みる。
   pub async fn pool(&self) -> Result<&PgPool, InfraError> {
      self.pool
         .get_or_try_init(|| async {
            let Some(resolver) = &self.resolver else {
               return Err(InfraError::unexpected(
                  "接続プールの生成元が設定されていません",
               ));
            };

            let credentials = resolver.resolve().await?;
            tracing::info!(
               host = %credentials.host,
               port = credentials.port,
               database = %self.settings.database_name,
               tls_mode = ?self.settings.tls_mode,
               max_connections = self.settings.max_connections,
               "データベース接続プールを作成します"
            );

            Ok(pool_options(&self.settings)
               .connect_lazy_with(connect_options(&credentials, &self.settings)))
         })
         .await
   }

   /// プールから接続を取得する
   ///
   /// 返された接続はドロップ時にプールへ返却される。
   pub async fn acquire(&self) -> Result<PoolConnection<Postgres>, InfraError> {
      let pool = self.pool().await?;

      pool.acquire().await.map_err(|e| {
         tracing::error!(error = %e, "データベース接続の取得に失敗しました");
         InfraError::connection(e)
      })
   }
}
