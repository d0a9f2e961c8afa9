//! # Proofsheet Gateway
//!
//! ブラウザのモックアップ承認ワークフローと外部サービス3つ
//! （SFTP画像ストア・電子署名プロバイダ・受注管理API）の橋渡しをする
//! バックエンドプロキシ。認証情報をブラウザから隠し、レスポンスを
//! フロントエンド向けに整形し、文書を署名に回す。
//!
//! ## API エンドポイント
//! - `GET /` — 稼働確認
//! - `GET /check-limits` — ボディ上限の確認
//! - `GET /image?code=` — 商品コードから画像ストアの画像を返す
//! - `GET /fetch-image?url=` — 任意URLの画像中継
//! - `GET /api/brightpearl/order/{id}` — 受注の素通し
//! - `GET /api/brightpearl/order/{id}/availability` — 在庫の素通し
//! - `GET /api/brightpearl/product/{id}` — 商品の素通し
//! - `GET /api/brightpearl/proof-required` — 承認待ち受注の一覧
//! - `POST /send-to-docusign` — 署名依頼の送信
//! - `GET /api/docusign-logs` — 送信ログの取得

mod brightpearl;
mod config;
mod endpoints;
mod error;
mod imagestore;
mod storage;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// リクエストボディの上限。Base64のPDFが乗るため大きめに取る。
const MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let state = Arc::new(config::AppState::from_env().await?);

    let app = axum::Router::new()
        .route("/", get(endpoints::handle_root))
        .route("/check-limits", get(endpoints::handle_check_limits))
        .route("/image", get(endpoints::handle_image))
        .route("/fetch-image", get(endpoints::handle_fetch_image))
        .route(
            "/api/brightpearl/order/{order_id}",
            get(endpoints::handle_order),
        )
        .route(
            "/api/brightpearl/order/{order_id}/availability",
            get(endpoints::handle_availability),
        )
        .route(
            "/api/brightpearl/product/{product_id}",
            get(endpoints::handle_product),
        )
        .route(
            "/api/brightpearl/proof-required",
            get(endpoints::handle_proof_required),
        )
        .route("/send-to-docusign", post(endpoints::handle_send_to_docusign))
        .route("/api/docusign-logs", get(endpoints::handle_docusign_logs))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state);

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("0.0.0.0:{port}");
    tracing::info!("Gatewayを {} で起動します", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
