/// 取引プロデューサーLambda関数
///
/// HTTPゲートウェイ経由の取引リクエストを検証し、検証済みの取引レコードを
/// SNSトピックに発行する。検証失敗は4xx、設定不備・発行失敗は5xxとして
/// 返し、プロセスは落とさない。
use lambda_http::{Body, Error, Request, Response, run, service_fn};
use pipeline::application::RequestValidator;
use pipeline::infrastructure::{SnsTransactionPublisher, TransactionPublisher, init_logging};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<(), Error> {
    // 構造化ログを初期化
    init_logging();

    info!("プロデューサーLambda関数を初期化");

    // 実SNSクライアントを一度だけ構築し、全リクエストで共有する
    let publisher = SnsTransactionPublisher::from_config().await;
    let publisher_ref = &publisher;

    run(service_fn(move |request: Request| async move {
        handler(publisher_ref, request).await
    }))
    .await
}

/// HTTPリクエストハンドラー
///
/// # 契約
/// - メソッドはPOSTのみ（それ以外は405）
/// - ボディは `{"amount":"...","type":"..."}`（検証失敗は400）
/// - SNS_TOPIC_ARNが未設定なら500
/// - 発行失敗は500、成功は200と確認メッセージ
async fn handler(
    publisher: &dyn TransactionPublisher,
    request: Request,
) -> Result<Response<Body>, Error> {
    if request.method() != lambda_http::http::Method::POST {
        return Ok(Response::builder()
            .status(405)
            .body(Body::from("メソッドが許可されていません"))?);
    }

    let body = match request.body() {
        Body::Text(text) => text.clone(),
        Body::Binary(bytes) => String::from_utf8_lossy(bytes).to_string(),
        _ => String::new(),
    };

    // 検証とレコード構築（user_id・タイムスタンプの採番を含む）
    let tx = match RequestValidator::validate(&body) {
        Ok(tx) => tx,
        Err(err) => {
            warn!(error = %err, "リクエスト検証に失敗");
            return Ok(Response::builder()
                .status(400)
                .body(Body::from(err.to_string()))?);
        }
    };

    // 発行先の設定確認
    let topic_arn = match std::env::var("SNS_TOPIC_ARN") {
        Ok(arn) if !arn.is_empty() => arn,
        _ => {
            error!("SNS_TOPIC_ARNが設定されていません");
            return Ok(Response::builder()
                .status(500)
                .body(Body::from("発行先が設定されていません"))?);
        }
    };

    match publisher.publish_transaction(&topic_arn, &tx).await {
        Ok(message_id) => {
            info!(
                message_id = %message_id,
                user_id = %tx.user_id,
                kind = %tx.kind,
                "取引イベントを発行"
            );
            Ok(Response::builder()
                .status(200)
                .body(Body::from(format!("取引を受け付けました: {}", tx.kind)))?)
        }
        Err(err) => {
            error!(error = %err, "取引イベントの発行に失敗");
            Ok(Response::builder()
                .status(500)
                .body(Body::from("メッセージの発行に失敗しました"))?)
        }
    }
}
