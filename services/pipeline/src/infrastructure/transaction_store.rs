//! 取引ストア
//!
//! 取引レコードのPostgreSQLへの永続化を提供する。
//! - テーブル存在確認・作成（冪等なスキーマ提供の下請け）
//! - 取引レコードの1行挿入
//!
//! ストア操作はトレイトで抽象化し、テストではモック実装を使用する。

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use thiserror::Error;

use crate::domain::Transaction;
use crate::infrastructure::DatabaseConfig;

/// ストアエラー
#[derive(Debug, Error)]
pub enum StoreError {
    /// データベースエラー
    #[error("データベースエラー: {0}")]
    Database(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}

/// 取引ストア操作トレイト（テスト用の抽象化）
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// 接続の疎通確認
    async fn ping(&self) -> Result<(), StoreError>;

    /// transactionsテーブルがスキーマカタログに存在するか確認
    async fn table_exists(&self) -> Result<bool, StoreError>;

    /// transactionsテーブルを作成（ID生成用の拡張も有効化）
    async fn create_table(&self) -> Result<(), StoreError>;

    /// 取引レコードを1行挿入
    async fn insert(&self, tx: &Transaction) -> Result<(), StoreError>;
}

/// テーブル存在確認クエリ
///
/// public.transactionsがinformation_schemaに存在するかを返す。
const TABLE_EXISTS_SQL: &str = r#"
SELECT EXISTS (
    SELECT FROM information_schema.tables
    WHERE table_schema = 'public' AND table_name = 'transactions'
);
"#;

/// transactionsテーブルのスキーマを定義するSQL
///
/// idはサーバー側でUUIDを生成し、timestampは挿入時刻がデフォルト。
const CREATE_TABLE_SQL: &str = r#"
CREATE EXTENSION IF NOT EXISTS "uuid-ossp";

CREATE TABLE public.transactions (
    id UUID PRIMARY KEY DEFAULT uuid_generate_v4(),
    user_id UUID NOT NULL,
    amount NUMERIC(12,2) NOT NULL,
    type VARCHAR(50) NOT NULL,
    timestamp TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);
"#;

/// 挿入クエリ
///
/// 金額はテキストとしてバインドし、NUMERICへのキャストで変換する
/// （バイナリ浮動小数点を経由させない）。
const INSERT_SQL: &str = r#"
INSERT INTO transactions (user_id, amount, type, timestamp)
VALUES ($1::uuid, $2::numeric, $3, $4::timestamp)
"#;

/// PostgreSQL取引ストア
///
/// プロセス全体で共有する接続プールを1つ保持する。プールは
/// sqlxが並行利用を保証するため、通常のクエリ実行に追加のロックは不要。
pub struct PgTransactionStore {
    pool: PgPool,
}

impl PgTransactionStore {
    /// 既存のプールから新しいPgTransactionStoreを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 設定から接続を確立して新しいPgTransactionStoreを作成
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect(&config.connection_url())
            .await?;

        Ok(Self::new(pool))
    }
}

#[async_trait]
impl TransactionStore for PgTransactionStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn table_exists(&self) -> Result<bool, StoreError> {
        let exists: bool = sqlx::query_scalar(TABLE_EXISTS_SQL)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }

    async fn create_table(&self) -> Result<(), StoreError> {
        // 拡張の有効化とテーブル作成を1バッチで実行
        sqlx::raw_sql(CREATE_TABLE_SQL).execute(&self.pool).await?;
        Ok(())
    }

    async fn insert(&self, tx: &Transaction) -> Result<(), StoreError> {
        sqlx::query(INSERT_SQL)
            .bind(&tx.user_id)
            .bind(tx.amount.to_string())
            .bind(&tx.kind)
            .bind(&tx.timestamp)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
