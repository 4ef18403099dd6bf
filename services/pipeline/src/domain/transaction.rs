/// 取引レコード
///
/// プロデューサーが検証済みのリクエストから構築し、SNSメッセージとして
/// 発行する単位。コンシューマーは同じ形をデコードしてPostgreSQLに永続化する。
use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 取引種別（入金 / 出金）
///
/// プロデューサー側の検証でのみ使用する。コンシューマー側の`Transaction`は
/// 文字列のまま保持する（上流で検証済みのペイロードを再検証しない方針）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// 入金
    Deposit,
    /// 出金
    Withdraw,
}

impl TransactionType {
    /// ワイヤー表現（JSON・DBカラムと同じ小文字タグ）を返す
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Deposit => "deposit",
            TransactionType::Withdraw => "withdraw",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 未知の取引種別エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("未知の取引種別: {0}")]
pub struct UnknownTransactionType(pub String);

impl FromStr for TransactionType {
    type Err = UnknownTransactionType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "deposit" => Ok(TransactionType::Deposit),
            "withdraw" => Ok(TransactionType::Withdraw),
            other => Err(UnknownTransactionType(other.to_string())),
        }
    }
}

/// 取引レコード
///
/// JSON表現は `{"user_id":"...","amount":"100.00","type":"deposit",
/// "timestamp":"2025-11-07T00:00:00Z"}`。金額は文字列としてシリアライズされ、
/// 浮動小数点を経由しないため精度が落ちない。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// ユーザー識別子（UUIDの文字列表現、プロデューサーが採番）
    pub user_id: String,
    /// 金額（任意精度10進数）
    pub amount: Decimal,
    /// 取引種別タグ
    ///
    /// デコード経路では検証しない。タグの妥当性検証はプロデューサーの責務で、
    /// コンシューマーは発行されたペイロードをそのまま通す。
    #[serde(rename = "type")]
    pub kind: String,
    /// 作成タイムスタンプ（RFC 3339 / UTC、プロデューサーが採番）
    pub timestamp: String,
}
