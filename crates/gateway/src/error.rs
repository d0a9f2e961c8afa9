//! # Gateway エラー型

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use proofsheet_esign::EsignError;

/// Gatewayエラー型。
///
/// 呼び出し側には常に構造化されたエラーボディを返す。転送系ルートは
/// 上流のステータスコードをそのまま映す。
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// 呼び出し側の入力不備
    #[error("{0}")]
    BadRequest(String),
    /// 電子署名プロバイダとのやり取りの失敗
    #[error(transparent)]
    Esign(#[from] EsignError),
    /// 画像の取得に失敗
    #[error("画像の取得に失敗しました: {0}")]
    Image(String),
    /// 上流APIがエラーを返した（ステータスとボディをそのまま返す）
    #[error("上流APIがエラーを返しました: HTTP {status}")]
    Upstream { status: u16, body: String },
    /// ログストア操作に失敗
    #[error("ログストア操作に失敗しました: {0}")]
    Storage(String),
    /// 内部エラー
    #[error("内部エラー: {0}")]
    Internal(String),
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        match self {
            GatewayError::BadRequest(message) => error_json(StatusCode::BAD_REQUEST, message),
            GatewayError::Esign(e) => {
                let status = match &e {
                    EsignError::Validation(_) => StatusCode::BAD_REQUEST,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                error_json(status, e.to_string())
            }
            GatewayError::Upstream { status, body } => {
                let status =
                    StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                (status, Json(serde_json::json!({ "error": body }))).into_response()
            }
            GatewayError::Image(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, message).into_response()
            }
            GatewayError::Storage(message) | GatewayError::Internal(message) => {
                error_json(StatusCode::INTERNAL_SERVER_ERROR, message)
            }
        }
    }
}

/// `{success: false, error}` 形式のJSONエラーレスポンス。
fn error_json(status: StatusCode, message: String) -> Response {
    (
        status,
        Json(serde_json::json!({ "success": false, "error": message })),
    )
        .into_response()
}
