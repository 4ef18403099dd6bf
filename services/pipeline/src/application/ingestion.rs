/// 取引インジェスター
///
/// SQSバッチの各レコードをデコードして永続化する。失敗はレコード単位で
/// 隔離し、1件の不正・失敗が残りのレコードの処理を妨げないようにする。
use aws_lambda_events::event::sqs::SqsEvent;
use tracing::{debug, error, info};

use crate::application::message_decoder::{DecodeOutcome, MessageDecoder};
use crate::infrastructure::TransactionStore;

/// インジェスト処理の結果
///
/// バッチ処理の成功/失敗/スキップ件数を保持。この結果は呼び出し元への
/// エラーにはならない（再配信ポリシーは配信基盤の責務）。
#[derive(Debug, Clone, Default)]
pub struct IngestResult {
    /// 永続化に成功したレコード数
    pub success_count: usize,
    /// 挿入に失敗したレコード数
    pub failure_count: usize,
    /// スキップしたレコード数（エンベロープ不正等）
    pub skip_count: usize,
}

impl IngestResult {
    /// 新しいIngestResultを作成
    pub fn new() -> Self {
        Self::default()
    }
}

/// 取引インジェスター
///
/// 共有ストアへの参照を保持し、配信順にレコードを逐次処理する。
/// バッチ内での並行処理は行わない。
pub struct TransactionIngestor<'a> {
    /// 取引ストア
    store: &'a dyn TransactionStore,
}

impl<'a> TransactionIngestor<'a> {
    /// 新しいTransactionIngestorを作成
    pub fn new(store: &'a dyn TransactionStore) -> Self {
        Self { store }
    }

    /// SQSバッチイベントを処理する
    ///
    /// 各レコードを配信順にデコード・永続化する。空のバッチは何もせず
    /// 成功として扱う。この関数自体は決して失敗しない。
    ///
    /// # 処理フロー（レコードごと）
    /// 1. ボディをデコード。スキップならログに残して次へ
    /// 2. デコード済みレコードをテーブルに挿入
    /// 3. 挿入失敗はログに残して次へ（エラーは伝播しない）
    /// 4. 成功時は永続化した識別フィールドをログに記録
    pub async fn process_event(&self, event: SqsEvent) -> IngestResult {
        let record_count = event.records.len();
        info!(record_count = record_count, "取引バッチ処理開始");

        let mut result = IngestResult::new();

        for record in event.records {
            let message_id = record.message_id.as_deref().unwrap_or("unknown");

            // ボディのないレコードはデコード対象なし
            let Some(body) = record.body.as_deref() else {
                debug!(message_id = message_id, "ボディなし、レコードをスキップ");
                result.skip_count += 1;
                continue;
            };

            let tx = match MessageDecoder::decode(body) {
                DecodeOutcome::Decoded(tx) => tx,
                DecodeOutcome::Skip(reason) => {
                    debug!(
                        message_id = message_id,
                        reason = %reason,
                        "レコードをスキップ"
                    );
                    result.skip_count += 1;
                    continue;
                }
            };

            // 挿入失敗はこのレコードに限定し、バッチ処理を続行する
            match self.store.insert(&tx).await {
                Ok(()) => {
                    info!(
                        user_id = %tx.user_id,
                        kind = %tx.kind,
                        amount = %tx.amount,
                        "取引を永続化"
                    );
                    result.success_count += 1;
                }
                Err(err) => {
                    error!(
                        message_id = message_id,
                        user_id = %tx.user_id,
                        error = %err,
                        "取引の保存に失敗"
                    );
                    result.failure_count += 1;
                }
            }
        }

        info!(
            success_count = result.success_count,
            failure_count = result.failure_count,
            skip_count = result.skip_count,
            "取引バッチ処理完了"
        );

        result
    }
}
