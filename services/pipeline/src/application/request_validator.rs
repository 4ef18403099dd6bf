/// リクエストバリデーター
///
/// プロデューサーが受け取ったHTTPボディを検証し、発行可能な取引レコードを
/// 構築する。形式検証（JSON・金額の10進数パース）とビジネスルール検証
/// （正の金額・許可された種別）はここが唯一の実施箇所。
use chrono::{SecondsFormat, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{Transaction, TransactionType};

/// HTTPリクエストボディの形
#[derive(Debug, Deserialize)]
pub struct TransactionRequest {
    /// 金額（10進数の文字列表現）
    pub amount: String,
    /// 取引種別タグ
    #[serde(rename = "type")]
    pub kind: String,
}

/// 検証エラー
///
/// いずれも4xx相当としてクライアントに返される。プロセスは落とさない。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// ボディがJSONとしてパースできない
    #[error("JSONボディが不正です")]
    InvalidBody,

    /// 金額が10進数としてパースできない
    #[error("金額が不正です: {0}")]
    InvalidAmount(String),

    /// 金額が正の値でない
    #[error("金額は正の値である必要があります: {0}")]
    NonPositiveAmount(String),

    /// 許可されていない取引種別
    #[error("取引種別が不正です: {0}")]
    UnknownKind(String),
}

/// リクエストバリデーター
pub struct RequestValidator;

impl RequestValidator {
    /// HTTPボディを検証し、取引レコードを構築する
    ///
    /// 成功時はuser_id（UUID v4）とタイムスタンプ（RFC 3339 / UTC）を
    /// 採番した取引レコードを返す。
    ///
    /// # 引数
    /// * `body` - HTTPリクエストのボディ文字列
    ///
    /// # 戻り値
    /// * `Ok(Transaction)` - 検証済み取引レコード
    /// * `Err(ValidationError)` - 検証失敗
    pub fn validate(body: &str) -> Result<Transaction, ValidationError> {
        let request: TransactionRequest =
            serde_json::from_str(body).map_err(|_| ValidationError::InvalidBody)?;

        let amount: Decimal = request
            .amount
            .parse()
            .map_err(|_| ValidationError::InvalidAmount(request.amount.clone()))?;

        if amount <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveAmount(amount.to_string()));
        }

        let kind: TransactionType = request
            .kind
            .parse()
            .map_err(|_| ValidationError::UnknownKind(request.kind.clone()))?;

        Ok(Transaction {
            user_id: Uuid::new_v4().to_string(),
            amount,
            kind: kind.as_str().to_string(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== 正常系テスト ====================

    #[test]
    fn test_validate_deposit() {
        let tx = RequestValidator::validate(r#"{"amount":"100.00","type":"deposit"}"#).unwrap();

        assert_eq!(tx.amount.to_string(), "100.00");
        assert_eq!(tx.kind, "deposit");

        // user_idはUUIDとしてパース可能
        assert!(Uuid::parse_str(&tx.user_id).is_ok());

        // タイムスタンプはRFC 3339（UTC、Zサフィックス）
        assert!(tx.timestamp.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(&tx.timestamp).is_ok());
    }

    #[test]
    fn test_validate_withdraw() {
        let tx = RequestValidator::validate(r#"{"amount":"0.01","type":"withdraw"}"#).unwrap();
        assert_eq!(tx.kind, "withdraw");
    }

    /// 呼び出しごとに異なるuser_idが採番される
    #[test]
    fn test_validate_assigns_fresh_user_id() {
        let body = r#"{"amount":"1","type":"deposit"}"#;
        let tx1 = RequestValidator::validate(body).unwrap();
        let tx2 = RequestValidator::validate(body).unwrap();
        assert_ne!(tx1.user_id, tx2.user_id);
    }

    // ==================== 検証失敗テスト ====================

    /// 負の金額は拒否される
    #[test]
    fn test_validate_rejects_negative_amount() {
        let err = RequestValidator::validate(r#"{"amount":"-10","type":"deposit"}"#).unwrap_err();
        assert_eq!(err, ValidationError::NonPositiveAmount("-10".to_string()));
    }

    /// ゼロも正の値ではないため拒否される
    #[test]
    fn test_validate_rejects_zero_amount() {
        let err = RequestValidator::validate(r#"{"amount":"0","type":"deposit"}"#).unwrap_err();
        assert!(matches!(err, ValidationError::NonPositiveAmount(_)));
    }

    /// 10進数でない金額は拒否される
    #[test]
    fn test_validate_rejects_non_decimal_amount() {
        let err = RequestValidator::validate(r#"{"amount":"abc","type":"deposit"}"#).unwrap_err();
        assert_eq!(err, ValidationError::InvalidAmount("abc".to_string()));
    }

    /// 未知の種別タグは拒否される
    #[test]
    fn test_validate_rejects_unknown_kind() {
        let err = RequestValidator::validate(r#"{"amount":"100","type":"invalid"}"#).unwrap_err();
        assert_eq!(err, ValidationError::UnknownKind("invalid".to_string()));
    }

    /// JSONでないボディは拒否される
    #[test]
    fn test_validate_rejects_malformed_body() {
        let err = RequestValidator::validate("not json").unwrap_err();
        assert_eq!(err, ValidationError::InvalidBody);
    }

    /// 必須フィールドの欠落も不正ボディとして拒否される
    #[test]
    fn test_validate_rejects_missing_fields() {
        let err = RequestValidator::validate(r#"{"amount":"100"}"#).unwrap_err();
        assert_eq!(err, ValidationError::InvalidBody);
    }

    // ==================== エラー表示テスト ====================

    #[test]
    fn test_validation_error_display() {
        assert!(
            ValidationError::NonPositiveAmount("-10".to_string())
                .to_string()
                .contains("-10")
        );
        assert!(
            ValidationError::UnknownKind("gift".to_string())
                .to_string()
                .contains("gift")
        );
    }
}
