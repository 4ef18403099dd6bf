// アプリケーション層モジュール
pub mod ingestion;
pub mod message_decoder;
pub mod request_validator;

// 再エクスポート
pub use ingestion::{IngestResult, TransactionIngestor};
pub use message_decoder::{DecodeOutcome, MessageDecoder, SkipReason};
pub use request_validator::{RequestValidator, TransactionRequest, ValidationError};
