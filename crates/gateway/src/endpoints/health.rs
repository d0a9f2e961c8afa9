//! # GET / , GET /check-limits
//!
//! 稼働確認用の2ルート。

use axum::Json;
use proofsheet_types::CheckLimitsResponse;

/// GET / — 稼働確認の文字列を返す。
pub async fn handle_root() -> &'static str {
    "SFTP Proxy for Mockup Sheets is running"
}

/// GET /check-limits — ボディ上限の設定値を返す。
pub async fn handle_check_limits() -> Json<CheckLimitsResponse> {
    Json(CheckLimitsResponse {
        message: "Server is configured".to_string(),
        limits: "50mb".to_string(),
    })
}
