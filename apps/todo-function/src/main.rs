//! # Todo Function
//!
//! Todo の一覧取得・作成を提供する Lambda 関数。
//!
//! ## 役割
//!
//! API Gateway（REST、Cognito オーソライザーで認証済み）から呼び出され、
//! PostgreSQL の `todos` テーブルを読み書きする。DB 認証情報は Secrets Manager から取得する。
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ API Gateway  │────▶│Todo Function │────▶│  PostgreSQL  │
//! └──────────────┘     └──────────────┘     └──────────────┘
//!                             │
//!                             ▼
//!                      ┌──────────────┐
//!                      │Secrets Manager│
//!                      └──────────────┘
//! ```
//!
//! ## 実行モード
//!
//! - **Lambda**: `AWS_LAMBDA_RUNTIME_API` が設定されている場合、`lambda_http` ランタイムで実行する。
//!   ステージ名がパスに付与されないよう `AWS_LAMBDA_HTTP_IGNORE_STAGE_IN_PATH=true` を設定すること
//! - **ローカル**: それ以外の場合、`FUNCTION_HOST:FUNCTION_PORT` で HTTP サーバーとして起動する
//!
//! ## 環境変数
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `DB_SECRET_ARN` | **Yes** | DB 認証情報のシークレット ID |
//! | `DB_NAME` | No | データベース名（デフォルト: `postgres`） |
//! | `DB_TLS_MODE` | No | `disable` / `require` / `verify-ca` / `verify-full`（デフォルト: `verify-full`） |
//! | `DB_SSL_ROOT_CERT` | No | ルート CA（PEM）のパス |
//! | `DB_MAX_CONNECTIONS` | No | 接続プールの最大接続数（デフォルト: `2`） |
//! | `DB_ACQUIRE_TIMEOUT_SECS` | No | 接続取得のタイムアウト秒数（デフォルト: `5`） |
//! | `SECRETS_MANAGER_ENDPOINT_URL` | No | Secrets Manager のエンドポイント上書き |
//! | `LOG_FORMAT` | No | `json` / `pretty`（デフォルト: `pretty`） |
//! | `FUNCTION_HOST` | No | ローカル実行時のバインドアドレス（デフォルト: `0.0.0.0`） |
//! | `FUNCTION_PORT` | No | ローカル実行時のポート番号（デフォルト: `3000`） |
//!
//! ## 起動方法
//!
//! ```bash
//! # ローカル（LocalStack の Secrets Manager を使用）
//! DB_SECRET_ARN=alto-db SECRETS_MANAGER_ENDPOINT_URL=http://localhost:4566 \
//!   DB_TLS_MODE=disable cargo run -p alto-todo-function
//! ```

use std::net::SocketAddr;

use alto_shared::observability::{self, TracingConfig};
use alto_todo_function::{app::build_app, config::FunctionConfig, context::FunctionContext};
use anyhow::Context as _;
use tokio::net::TcpListener;

/// Lambda ランタイムが設定する環境変数
const LAMBDA_RUNTIME_API: &str = "AWS_LAMBDA_RUNTIME_API";

/// Todo Function のエントリーポイント
///
/// 1. 環境変数の読み込み（`.env` があれば使用）
/// 2. トレーシングの初期化
/// 3. 設定の読み込み
/// 4. プロセスコンテキストの作成とスキーマ初期化
/// 5. 実行モードに応じたルーターの起動
#[tokio::main]
async fn main() -> anyhow::Result<()> {
   // .env ファイルを読み込む（存在する場合）
   // Lambda 上では .env ファイルは使用せず、関数の環境変数を直接設定する
   dotenvy::dotenv().ok();

   let tracing_config = TracingConfig::from_env("todo-function");
   observability::init_tracing(&tracing_config);
   let _tracing_guard = tracing_config.app_span().entered();

   let config = FunctionConfig::from_env().context("設定の読み込みに失敗しました")?;

   let context = FunctionContext::from_config(&config).await;

   // スキーマ初期化は失敗しても起動を継続する（各リクエストが DB エラーとして 500 を返す）
   if let Err(e) = context.ensure_schema().await {
      tracing::error!(
         error = %e,
         span_trace = %e.span_trace(),
         "スキーマ初期化に失敗しました。起動を継続します"
      );
   }

   let app = build_app(context.todo_state());

   if std::env::var_os(LAMBDA_RUNTIME_API).is_some() {
      tracing::info!("Lambda ランタイムで起動します");
      lambda_http::run(app).await.map_err(|e| anyhow::anyhow!(e))?;
      return Ok(());
   }

   let addr: SocketAddr = format!("{}:{}", config.host, config.port)
      .parse()
      .context("アドレスのパースに失敗しました")?;

   let listener = TcpListener::bind(addr).await?;
   tracing::info!("Todo Function をローカルで起動しました: {}", addr);

   axum::serve(listener, app).await?;

   Ok(())
}
