//! # インフラ層エラー定義
//!
//! データベースや Secrets Manager との通信で発生するエラーを表現する。
//!
//! ## 設計方針
//!
//! - **エラーの分類**: 認証情報取得・接続・クエリ実行を区別する
//! - **内部詳細の遮断**: 認証情報取得の失敗は原因をログに記録した上で、
//!   原因を含まない [`InfraErrorKind::CredentialRetrieval`] に置き換える
//! - **SpanTrace 自動捕捉**: `From` 実装や convenience constructor で
//!   エラー生成時の呼び出し経路を自動記録する
//!
//! ## 構造
//!
//! `std::io::Error` と同じ struct + enum パターンを採用:
//! - [`InfraError`]: エラー種別（[`InfraErrorKind`]）と [`SpanTrace`] を保持するラッパー
//! - [`InfraErrorKind`]: エラーの具体的な種別

use std::fmt;

use derive_more::Display;
use thiserror::Error;
use tracing_error::SpanTrace;

/// インフラ層で発生するエラー
///
/// エラー種別（[`InfraErrorKind`]）と [`SpanTrace`]（呼び出し経路）を保持する。
///
/// ## パターンマッチ
///
/// エラー種別に応じた処理には [`kind()`](InfraError::kind) を使用する:
///
/// ```ignore
/// match error.kind() {
///     InfraErrorKind::CredentialRetrieval => { /* 認証情報の取得失敗 */ }
///     _ => { /* その他 */ }
/// }
/// ```
#[derive(Display)]
#[display("{kind}")]
pub struct InfraError {
   kind:       InfraErrorKind,
   span_trace: SpanTrace,
}

/// インフラ層エラーの種別
#[derive(Debug, Error)]
pub enum InfraErrorKind {
   /// シークレットストアの呼び出し失敗
   ///
   /// AWS SDK のエラー型はジェネリクスが深く `#[from]` が困難なため、
   /// 手動で String にマップする。
   #[error("シークレットストアエラー: {0}")]
   SecretStore(String),

   /// DB 認証情報の取得失敗
   ///
   /// シークレットの取得失敗、`SecretString` の欠落、JSON として不正なペイロードを
   /// まとめて表す。原因は生成元でログに記録済みであり、このバリアントには含めない。
   #[error("データベース認証情報の取得に失敗しました")]
   CredentialRetrieval,

   /// データベース接続エラー
   ///
   /// 接続プールからの取得失敗、TCP / TLS / 認証の失敗など。
   #[error("データベース接続エラー: {0}")]
   Connection(#[source] sqlx::Error),

   /// クエリ実行エラー
   ///
   /// SQL の実行失敗、制約違反、デコード失敗など。
   #[error("クエリ実行エラー: {0}")]
   Query(#[source] sqlx::Error),

   /// 予期しないエラー
   #[error("予期しないエラー: {0}")]
   Unexpected(String),
}

// ===== InfraError のメソッド =====

impl InfraError {
   /// エラー種別を取得する
   pub fn kind(&self) -> &InfraErrorKind {
      &self.kind
   }

   /// SpanTrace を取得する
   pub fn span_trace(&self) -> &SpanTrace {
      &self.span_trace
   }

   fn with_kind(kind: InfraErrorKind) -> Self {
      Self {
         kind,
         span_trace: SpanTrace::capture(),
      }
   }

   // ===== Convenience constructors =====

   /// シークレットストアエラーを生成する
   pub fn secret_store(msg: impl Into<String>) -> Self {
      Self::with_kind(InfraErrorKind::SecretStore(msg.into()))
   }

   /// 認証情報取得エラーを生成する
   pub fn credential_retrieval() -> Self {
      Self::with_kind(InfraErrorKind::CredentialRetrieval)
   }

   /// 接続エラーを生成する
   ///
   /// `pool.acquire()` の失敗に対して `.map_err(InfraError::connection)` として使う。
   pub fn connection(source: sqlx::Error) -> Self {
      Self::with_kind(InfraErrorKind::Connection(source))
   }

   /// クエリ実行エラーを生成する
   pub fn query(source: sqlx::Error) -> Self {
      Self::with_kind(InfraErrorKind::Query(source))
   }

   /// 予期しないエラーを生成する
   pub fn unexpected(msg: impl Into<String>) -> Self {
      Self::with_kind(InfraErrorKind::Unexpected(msg.into()))
   }
}

// ===== トレイト実装 =====

impl fmt::Debug for InfraError {
   fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
      f.debug_struct("InfraError")
         .field("kind", &self.kind)
         .field("span_trace", &self.span_trace)
         .finish()
   }
}

impl std::error::Error for InfraError {
   fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
      self.kind.source()
   }
}

// ===== From 実装（SpanTrace 自動キャプチャ） =====

/// `?` で変換される sqlx のエラーはクエリ実行エラーとして扱う。
/// 接続取得の失敗は [`InfraError::connection`] で明示的に変換すること。
impl From<sqlx::Error> for InfraError {
   fn from(source: sqlx::Error) -> Self {
      Self::query(source)
   }
}

#[cfg(test)]
mod tests {
   use pretty_assertions::assert_eq;
   use tracing_subscriber::layer::SubscriberExt as _;

   use super::*;

   /// テスト用に ErrorLayer 付き subscriber を設定する
   fn with_error_layer(f: impl FnOnce()) {
      let subscriber = tracing_subscriber::registry().with(tracing_error::ErrorLayer::default());
      let _guard = tracing::subscriber::set_default(subscriber);
      f();
   }

   #[test]
   fn test_from_sqlx_errorはqueryになりspan_traceがキャプチャされる() {
      with_error_layer(|| {
         let span = tracing::info_span!("test_repo", request_id = "req-001");
         let _enter = span.enter();

         let err: InfraError = sqlx::Error::RowNotFound.into();

         assert!(matches!(err.kind(), InfraErrorKind::Query(_)));
         let trace_str = format!("{}", err.span_trace());
         assert!(
            trace_str.contains("test_repo"),
            "SpanTrace がスパン名を含むこと: {trace_str}",
         );
      });
   }

   #[test]
   fn test_connectionはconnection種別になる() {
      let err = InfraError::connection(sqlx::Error::PoolTimedOut);

      assert!(matches!(err.kind(), InfraErrorKind::Connection(_)));
   }

   #[test]
   fn test_secret_storeでspan_traceがキャプチャされる() {
      with_error_layer(|| {
         let span = tracing::info_span!("test_secret");
         let _enter = span.enter();

         let err = InfraError::secret_store("AccessDeniedException");

         assert!(matches!(
            err.kind(),
            InfraErrorKind::SecretStore(msg) if msg == "AccessDeniedException"
         ));
         assert!(format!("{}", err.span_trace()).contains("test_secret"));
      });
   }

   #[test]
   fn test_credential_retrievalの表示は原因を含まない() {
      let err = InfraError::credential_retrieval();

      assert_eq!(err.to_string(), "データベース認証情報の取得に失敗しました");
   }

   #[test]
   fn test_sourceがinfra_error_kindに委譲する() {
      use std::error::Error;

      let err = InfraError::query(sqlx::Error::RowNotFound);
      assert!(err.source().is_some());

      let err = InfraError::credential_retrieval();
      assert!(err.source().is_none());
   }
}
