/// メッセージデコーダー
///
/// SQS経由で配信されたボディから取引レコードを取り出す。ボディは通知
/// エンベロープ（`Message`フィールドを持つJSONオブジェクト）で、その中に
/// 取引レコードのJSONテキストが入っている二重構造。
///
/// どの段階で壊れていてもエラーにはせず`Skip`を返す。1件の不正な
/// メッセージがバッチ全体を止めてはならない。
use serde::Deserialize;
use thiserror::Error;

use crate::domain::Transaction;

/// 通知エンベロープ
///
/// 外側のエンベロープはメッセージング基盤が定義する形で、ここでは
/// `Message`フィールドだけを取り出す。トランスポート固有の型には
/// 依存しない。
#[derive(Debug, Deserialize)]
struct NotificationEnvelope {
    /// アプリケーションペイロード（取引レコードのJSONテキスト）
    #[serde(rename = "Message", default)]
    message: Option<String>,
}

/// スキップ理由
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    /// ボディがエンベロープJSONとしてパースできない
    #[error("エンベロープのパースに失敗: {0}")]
    InvalidEnvelope(String),

    /// Messageフィールドが存在しない、または空（デコード対象なし）
    #[error("Messageフィールドがありません")]
    MissingMessage,

    /// Messageの内容が取引レコードとしてパースできない
    #[error("取引レコードのパースに失敗: {0}")]
    InvalidTransaction(String),
}

/// デコード結果
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeOutcome {
    /// 構造的に完全な取引レコードが得られた
    Decoded(Transaction),
    /// 処理対象外（呼び出し元はログに残して次へ進む）
    Skip(SkipReason),
}

/// メッセージデコーダー
pub struct MessageDecoder;

impl MessageDecoder {
    /// 配信ボディを取引レコードにデコードする
    ///
    /// エンベロープと取引レコードの2段階のパースを順に実行する。
    /// ビジネスルール（金額の正値性・種別タグの妥当性）はここでは
    /// 検証しない。それはプロデューサー側の責務で、このデコーダーは
    /// 発行されたペイロードをそのまま通す。
    ///
    /// # 引数
    /// * `body` - SQSレコードのボディ文字列
    ///
    /// # 戻り値
    /// * `DecodeOutcome::Decoded(tx)` - デコード成功
    /// * `DecodeOutcome::Skip(reason)` - 処理対象外
    pub fn decode(body: &str) -> DecodeOutcome {
        // 第1段階: エンベロープをパース
        let envelope: NotificationEnvelope = match serde_json::from_str(body) {
            Ok(envelope) => envelope,
            Err(err) => return DecodeOutcome::Skip(SkipReason::InvalidEnvelope(err.to_string())),
        };

        // Messageフィールドの欠落・空はエラーではなく「デコード対象なし」
        let message = match envelope.message {
            Some(message) if !message.is_empty() => message,
            _ => return DecodeOutcome::Skip(SkipReason::MissingMessage),
        };

        // 第2段階: ペイロードを取引レコードとしてパース
        match serde_json::from_str::<Transaction>(&message) {
            Ok(tx) => DecodeOutcome::Decoded(tx),
            Err(err) => DecodeOutcome::Skip(SkipReason::InvalidTransaction(err.to_string())),
        }
    }
}
