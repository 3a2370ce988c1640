//! # シークレットストア
//!
//! AWS Secrets Manager からシークレット文字列を取得する。
//!
//! ## 設計方針
//!
//! - **本番環境**: Lambda の実行ロールで Secrets Manager に接続（リージョンは `AWS_REGION`）
//! - **ローカル開発**: LocalStack 等のエンドポイントを `SECRETS_MANAGER_ENDPOINT_URL` で指定
//! - **テスタビリティ**: [`SecretStore`] トレイト経由でモックに差し替え可能
//!
//! クライアントはプロセス起動時に一度だけ作成し、以降の呼び出しで使い回す。
//!
//! ## 使用例
//!
//! ```rust,ignore
//! use alto_infra::secrets::{self, AwsSecretStore, SecretStore};
//!
//! async fn example() -> Result<(), alto_infra::InfraError> {
//!     // 本番（AWS Secrets Manager）
//!     let client = secrets::create_client(None).await;
//!     let store = AwsSecretStore::new(client);
//!
//!     let payload = store.get_secret_string("arn:aws:secretsmanager:...").await?;
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use aws_sdk_secretsmanager::{Client, error::DisplayErrorContext};

use crate::InfraError;

/// シークレットストアのインターフェース
#[async_trait]
pub trait SecretStore: Send + Sync {
   /// シークレット文字列を取得する
   ///
   /// # 戻り値
   ///
   /// - `Ok(Some(payload))`: 文字列シークレットが存在する
   /// - `Ok(None)`: シークレットは存在するが `SecretString` を持たない（バイナリシークレット等）
   /// - `Err(_)`: ストアの呼び出しに失敗した
   async fn get_secret_string(&self, secret_id: &str) -> Result<Option<String>, InfraError>;
}

/// Secrets Manager クライアントを作成する
///
/// 認証情報とリージョンは AWS SDK のデフォルトプロバイダチェーンから解決する。
///
/// # 引数
///
/// * `endpoint_url` - エンドポイント URL（LocalStack 使用時に指定、`None` で AWS デフォルト）
pub async fn create_client(endpoint_url: Option<&str>) -> Client {
   let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
   if let Some(endpoint) = endpoint_url {
      loader = loader.endpoint_url(endpoint);
   }
   let config = loader.load().await;

   Client::new(&config)
}

/// AWS Secrets Manager 実装の [`SecretStore`]
#[derive(Debug, Clone)]
pub struct AwsSecretStore {
   client: Client,
}

impl AwsSecretStore {
   /// 新しいシークレットストアを作成する
   pub fn new(client: Client) -> Self {
      Self { client }
   }
}

#[async_trait]
impl SecretStore for AwsSecretStore {
   async fn get_secret_string(&self, secret_id: &str) -> Result<Option<String>, InfraError> {
      let output = self
         .client
         .get_secret_value()
         .secret_id(secret_id)
         .send()
         .await
         .map_err(|e| {
            InfraError::secret_store(format!(
               "GetSecretValue に失敗: {}",
               DisplayErrorContext(&e)
            ))
         })?;

      Ok(output.secret_string().map(str::to_owned))
   }
}
