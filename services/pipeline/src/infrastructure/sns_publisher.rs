//! SNS発行モジュール
//!
//! プロデューサーLambdaが検証済みの取引イベントをSNSトピックへ発行する
//! 機能を提供する。実SDKはトレイトの背後に置き、テストはモックで行う。

use async_trait::async_trait;
use aws_sdk_sns::Client as SnsClient;
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::Transaction;

/// SNS発行のエラー型
#[derive(Debug, Error)]
pub enum PublishError {
    /// AWS SDK エラー
    #[error("AWS SNS APIエラー: {0}")]
    AwsSdkError(String),
    /// JSON シリアライズエラー
    #[error("JSONシリアライズエラー: {0}")]
    SerializeError(String),
}

/// 取引イベント発行トレイト（テスト用の抽象化）
#[async_trait]
pub trait TransactionPublisher: Send + Sync {
    /// メッセージをトピックに発行し、メッセージIDを返す
    async fn publish(&self, topic_arn: &str, message: &str) -> Result<String, PublishError>;

    /// 取引レコードをJSONとしてトピックに発行する
    ///
    /// # 引数
    /// * `topic_arn` - 発行先トピックARN
    /// * `tx` - 発行する取引レコード
    ///
    /// # 戻り値
    /// * `Ok(String)` - SNSメッセージID
    /// * `Err(PublishError)` - エラー
    async fn publish_transaction(
        &self,
        topic_arn: &str,
        tx: &Transaction,
    ) -> Result<String, PublishError> {
        let message = serde_json::to_string(tx)
            .map_err(|e| PublishError::SerializeError(e.to_string()))?;

        self.publish(topic_arn, &message).await
    }
}

/// 実際のAWS SNS SDKを使用した発行実装
pub struct SnsTransactionPublisher {
    client: SnsClient,
}

impl SnsTransactionPublisher {
    /// 新しいSnsTransactionPublisherを作成
    pub fn new(client: SnsClient) -> Self {
        Self { client }
    }

    /// AWS設定からデフォルトのクライアントを作成
    pub async fn from_config() -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let client = SnsClient::new(&config);
        Self::new(client)
    }
}

#[async_trait]
impl TransactionPublisher for SnsTransactionPublisher {
    async fn publish(&self, topic_arn: &str, message: &str) -> Result<String, PublishError> {
        let result = self
            .client
            .publish()
            .topic_arn(topic_arn)
            .message(message)
            .send()
            .await;

        match result {
            Ok(response) => {
                let message_id = response.message_id().unwrap_or("unknown").to_string();

                info!(
                    topic_arn = %topic_arn,
                    message_id = %message_id,
                    payload = %message,
                    "SNS Publish成功"
                );

                Ok(message_id)
            }
            Err(err) => {
                warn!(
                    topic_arn = %topic_arn,
                    error = %err,
                    "SNS Publishエラー"
                );
                Err(PublishError::AwsSdkError(err.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// テスト用のモック発行実装
    struct MockPublisher {
        /// 発行を成功させるか
        succeed: bool,
        /// publish呼び出し回数
        call_count: AtomicUsize,
        /// 発行されたメッセージを記録
        published: Mutex<Vec<(String, String)>>,
    }

    impl MockPublisher {
        fn new(succeed: bool) -> Self {
            Self {
                succeed,
                call_count: AtomicUsize::new(0),
                published: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl TransactionPublisher for MockPublisher {
        async fn publish(&self, topic_arn: &str, message: &str) -> Result<String, PublishError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            self.published
                .lock()
                .unwrap()
                .push((topic_arn.to_string(), message.to_string()));

            if self.succeed {
                Ok("mock-message-id".to_string())
            } else {
                Err(PublishError::AwsSdkError("mock error".to_string()))
            }
        }
    }

    fn sample_transaction() -> Transaction {
        Transaction {
            user_id: "2d9f35a3-4c0f-4dca-98e5-9a4a24ae3001".to_string(),
            amount: "100.00".parse().unwrap(),
            kind: "deposit".to_string(),
            timestamp: "2025-11-07T00:00:00Z".to_string(),
        }
    }

    // ==================== publish_transaction テスト ====================

    /// 取引がJSONとして発行されることを確認
    #[tokio::test]
    async fn test_publish_transaction_serializes_to_json() {
        let mock = MockPublisher::new(true);
        let tx = sample_transaction();

        let message_id = mock
            .publish_transaction("arn:aws:sns:ap-northeast-1:123456789012:transactions", &tx)
            .await
            .unwrap();

        assert_eq!(message_id, "mock-message-id");

        let published = mock.published.lock().unwrap();
        assert_eq!(published.len(), 1);

        // ワイヤー形式が正しいことを確認（金額は文字列のまま）
        let json: serde_json::Value = serde_json::from_str(&published[0].1).unwrap();
        assert_eq!(json["amount"], "100.00");
        assert_eq!(json["type"], "deposit");
        assert_eq!(json["timestamp"], "2025-11-07T00:00:00Z");
    }

    /// 発行失敗がエラーとして伝播することを確認
    #[tokio::test]
    async fn test_publish_transaction_propagates_failure() {
        let mock = MockPublisher::new(false);
        let tx = sample_transaction();

        let err = mock
            .publish_transaction("arn:aws:sns:ap-northeast-1:123456789012:transactions", &tx)
            .await
            .unwrap_err();

        assert!(matches!(err, PublishError::AwsSdkError(_)));
        assert_eq!(mock.call_count.load(Ordering::SeqCst), 1);
    }

    // ==================== エラー型テスト ====================

    #[test]
    fn test_publish_error_display() {
        let sdk_error = PublishError::AwsSdkError("API呼び出し失敗".to_string());
        assert_eq!(sdk_error.to_string(), "AWS SNS APIエラー: API呼び出し失敗");

        let serialize_error = PublishError::SerializeError("JSONエラー".to_string());
        assert_eq!(
            serialize_error.to_string(),
            "JSONシリアライズエラー: JSONエラー"
        );
    }
}
