//! # GET /api/brightpearl/*
//!
//! 受注管理APIへの転送4ルート。基本は素通しで、`proof-required`だけ
//! 検索→詳細取得→整形の3段で応答を組み立てる。

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;

use crate::brightpearl;
use crate::config::AppState;
use crate::error::GatewayError;

/// 承認待ちを表す受注ステータスID。
const PROOF_REQUIRED_STATUS_ID: &str = "34";

/// 詳細を取得する受注数の上限（URLが長くなりすぎるのを防ぐ）。
const PROOF_REQUIRED_DETAIL_LIMIT: usize = 10;

/// GET /api/brightpearl/order/{order_id} — 受注の素通し。
pub async fn handle_order(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<String>,
) -> Result<Json<serde_json::Value>, GatewayError> {
    let data =
        brightpearl::fetch_json(&state, &format!("order-service/order/{order_id}")).await?;
    Ok(Json(data))
}

/// GET /api/brightpearl/product/{product_id} — 商品の素通し。
pub async fn handle_product(
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<String>,
) -> Result<Json<serde_json::Value>, GatewayError> {
    let data =
        brightpearl::fetch_json(&state, &format!("product-service/product/{product_id}")).await?;
    Ok(Json(data))
}

/// GET /api/brightpearl/order/{order_id}/availability — 在庫の素通し。
pub async fn handle_availability(
    State(state): State<Arc<AppState>>,
    Path(_order_id): Path<String>,
) -> Result<Json<serde_json::Value>, GatewayError> {
    let data =
        brightpearl::fetch_json(&state, "warehouse-service/product-availability").await?;
    Ok(Json(data))
}

/// GET /api/brightpearl/proof-required — 承認待ち受注の一覧。
///
/// ステータス検索で受注IDを集め、先頭10件の詳細を取得して
/// フロントエンド向けの形に整形する。
pub async fn handle_proof_required(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, GatewayError> {
    let search = brightpearl::fetch_json(
        &state,
        &format!(
            "order-service/order-search?orderStatusId={PROOF_REQUIRED_STATUS_ID}&pageSize=50&firstResult=1"
        ),
    )
    .await?;

    let Some(results) = search.pointer("/response/results") else {
        return Ok(Json(serde_json::Value::Array(Vec::new())));
    };

    let order_ids = brightpearl::extract_order_ids(results);
    tracing::info!(count = order_ids.len(), "承認待ち受注IDを抽出しました");
    if order_ids.is_empty() {
        return Ok(Json(serde_json::Value::Array(Vec::new())));
    }

    let limited = &order_ids[..order_ids.len().min(PROOF_REQUIRED_DETAIL_LIMIT)];
    let details = brightpearl::fetch_json(
        &state,
        &format!("order-service/order/{}", limited.join(",")),
    )
    .await?;

    let orders = brightpearl::reshape_proof_orders(&details);
    serde_json::to_value(orders)
        .map(Json)
        .map_err(|e| GatewayError::Internal(format!("整形結果のシリアライズに失敗: {e}")))
}
