// ドメイン層モジュール
pub mod transaction;

// 再エクスポート
pub use transaction::{Transaction, TransactionType, UnknownTransactionType};
