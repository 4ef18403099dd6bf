/// 取引コンシューマーLambda関数
///
/// SNS→SQS経由で配信された取引メッセージのバッチをデコードし、
/// PostgreSQLのtransactionsテーブルに永続化する。初回のコールドスタートで
/// データベース接続とスキーマ提供を一度だけ実行する。
///
/// レコード単位の失敗はログにのみ現れ、この関数は常に成功を返す
/// （再配信ポリシーは配信基盤の責務）。
use aws_lambda_events::event::sqs::SqsEvent;
use lambda_runtime::{Error, LambdaEvent, service_fn};
use pipeline::application::TransactionIngestor;
use pipeline::infrastructure::{acquire, init_logging};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<(), Error> {
    // 構造化ログを初期化
    init_logging();

    // コールドスタート時に接続とスキーマ提供を実行する。初期化の失敗は
    // 回復不能な設定不備なので、ここでプロセスを終了させて
    // オーケストレーション側の再起動・アラートに委ねる。
    if let Err(err) = acquire().await {
        error!(error = %err, "データベース初期化に失敗");
        std::process::exit(1);
    }

    // Lambda関数を初期化して実行
    lambda_runtime::run(service_fn(handler)).await?;
    Ok(())
}

/// Lambda関数のメインハンドラー
///
/// # 処理フロー
/// 1. 共有ストアを取得（初期化済みの結果が返る）
/// 2. オフラインモードならバッチ全体を副作用なしで終了
/// 3. TransactionIngestorでバッチを処理し、結果件数をログに記録
async fn handler(event: LambdaEvent<SqsEvent>) -> Result<(), Error> {
    let event = event.payload;
    info!(record_count = event.records.len(), "SQSイベントを受信");

    let store = match acquire().await {
        Ok(Some(store)) => store,
        Ok(None) => {
            // 意図的な「何もしない」経路。失敗とは区別される。
            warn!("データベース未接続のためバッチ処理を中断");
            return Ok(());
        }
        Err(err) => {
            error!(error = %err, "データベース初期化に失敗");
            std::process::exit(1);
        }
    };

    let ingestor = TransactionIngestor::new(store);
    let result = ingestor.process_event(event).await;

    info!(
        success_count = result.success_count,
        failure_count = result.failure_count,
        skip_count = result.skip_count,
        "コンシューマー処理完了"
    );

    // レコード単位の失敗があっても呼び出し元には成功を返す
    Ok(())
}
