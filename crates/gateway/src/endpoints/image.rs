//! # GET /image , GET /fetch-image
//!
//! 画像の取得プロキシ2ルート。`/image`は商品コードから画像ストアを引き、
//! `/fetch-image`は任意URLの中継。どちらもボディと content-type を
//! そのまま返すだけで、画像の内容には関知しない。

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use crate::config::AppState;
use crate::error::GatewayError;

#[derive(Debug, Deserialize)]
pub struct ImageQuery {
    pub code: Option<String>,
}

/// GET /image?code= — 商品コードから画像ストアの画像を返す。
pub async fn handle_image(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ImageQuery>,
) -> Result<Response, GatewayError> {
    let code = query
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| {
            GatewayError::BadRequest("クエリパラメータ\"code\"がありません".to_string())
        })?;

    let remote_path = format!("/LOW_RES_JPG/{code}.jpg");
    let bytes = state.image_store.fetch(&remote_path).await?;

    Ok(([(header::CONTENT_TYPE, "image/jpeg")], bytes).into_response())
}

#[derive(Debug, Deserialize)]
pub struct FetchImageQuery {
    pub url: Option<String>,
}

/// GET /fetch-image?url= — 任意URLの画像を中継する。
/// 上流のcontent-typeを透過し、なければimage/jpegとして返す。
pub async fn handle_fetch_image(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FetchImageQuery>,
) -> Result<Response, GatewayError> {
    let url = query
        .url
        .filter(|u| !u.is_empty())
        .ok_or_else(|| {
            GatewayError::BadRequest("クエリパラメータ\"url\"がありません".to_string())
        })?;

    let response = state
        .http_client
        .get(&url)
        .send()
        .await
        .map_err(|e| GatewayError::Image(format!("{url} の取得に失敗: {e}")))?;

    if !response.status().is_success() {
        return Err(GatewayError::Image(format!(
            "{url} の取得に失敗: HTTP {}",
            response.status()
        )));
    }

    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("image/jpeg")
        .to_string();

    let bytes = response
        .bytes()
        .await
        .map_err(|e| GatewayError::Image(format!("{url} の読み取りに失敗: {e}")))?;

    Ok(([(header::CONTENT_TYPE, content_type)], bytes).into_response())
}
