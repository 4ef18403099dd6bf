//! 接続プロビジョナー
//!
//! プロセス生涯で一度だけデータベース接続を確立し、transactionsテーブルの
//! 存在を冪等に保証する。初期化の失敗は型付きエラーとして返し、プロセスの
//! 終了判断は最外殻のエントリポイント（コンシューマーLambda）に委ねる。

use tokio::sync::OnceCell;
use tracing::info;

use crate::infrastructure::database_config::{DatabaseConfig, DatabaseConfigError, is_offline_mode};
use crate::infrastructure::transaction_store::{PgTransactionStore, StoreError, TransactionStore};

/// プロビジョニングのエラー型
///
/// いずれも回復不能な設定不備を示す。リクエスト経路内での再試行では
/// 解決しないため、エントリポイントはこのエラーでプロセスを終了させる。
#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    /// 環境変数エラー
    #[error("データベース設定エラー: {0}")]
    Config(#[from] DatabaseConfigError),

    /// 接続確立に失敗
    #[error("データベース接続に失敗: {0}")]
    Connect(StoreError),

    /// 疎通確認に失敗
    #[error("疎通確認に失敗: {0}")]
    Ping(StoreError),

    /// テーブル存在確認に失敗
    #[error("テーブル存在確認に失敗: {0}")]
    SchemaCheck(StoreError),

    /// テーブル作成に失敗
    #[error("テーブル作成に失敗: {0}")]
    SchemaCreate(StoreError),
}

/// スキーマ提供の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provisioned {
    /// テーブルは既に存在していた（副作用なし）
    AlreadyExists,
    /// テーブルを新規作成した
    Created,
}

/// transactionsテーブルの存在を冪等に保証する
///
/// # 処理フロー
/// 1. スキーマカタログに対して存在確認を実行
/// 2. 確認自体が失敗した場合は`SchemaCheck`（作成は試みない）
/// 3. 存在すれば副作用なしで`AlreadyExists`
/// 4. 存在しなければ作成文を実行し、失敗なら`SchemaCreate`
/// 5. 成功なら`Created`
pub async fn ensure_table_exists<S: TransactionStore + ?Sized>(
    store: &S,
) -> Result<Provisioned, ProvisionError> {
    let exists = store
        .table_exists()
        .await
        .map_err(ProvisionError::SchemaCheck)?;

    if exists {
        info!("transactionsテーブルは既に存在（変更なし）");
        return Ok(Provisioned::AlreadyExists);
    }

    store
        .create_table()
        .await
        .map_err(ProvisionError::SchemaCreate)?;

    info!("transactionsテーブルを作成");
    Ok(Provisioned::Created)
}

/// プロセス全体で共有するストア
///
/// オフラインモードではNoneを保持する。一度初期化されたら再作成しない。
static STORE: OnceCell<Option<PgTransactionStore>> = OnceCell::const_new();

/// 共有ストアを取得する
///
/// 初回呼び出しで接続確立・疎通確認・スキーマ提供を実行する。並行する
/// 初回呼び出しはOnceCellが直列化するため、実際の初期化は1回だけ実行され、
/// 以降の呼び出しはキャッシュ済みのハンドルを返す。
///
/// # 戻り値
/// * `Ok(Some(store))` - 初期化済みストア
/// * `Ok(None)` - オフラインモード（接続なし）
/// * `Err(ProvisionError)` - 初期化失敗（呼び出し元がプロセスを終了させる）
pub async fn acquire() -> Result<Option<&'static PgTransactionStore>, ProvisionError> {
    STORE
        .get_or_try_init(|| async {
            if is_offline_mode() {
                info!("テスト環境を検出、データベース接続をスキップ");
                return Ok(None);
            }

            let config = DatabaseConfig::from_env()?;

            let store = PgTransactionStore::connect(&config)
                .await
                .map_err(ProvisionError::Connect)?;

            store.ping().await.map_err(ProvisionError::Ping)?;

            info!(host = config.host(), database = config.name(), "データベース接続を確立");

            ensure_table_exists(&store).await?;

            Ok(Some(store))
        })
        .await
        .map(Option::as_ref)
}
