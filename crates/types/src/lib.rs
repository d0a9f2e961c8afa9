//! # Proofsheet 共有型定義
//!
//! ゲートウェイの受信HTTP APIで使用するデータ構造をRust構造体として提供する。
//!
//! ## エンコーディング規則
//! - ワイヤ上のフィールド名はcamelCase（フロントエンドのJSONと一致させる）
//! - バイナリ（PDF）はBase64
//! - タイムスタンプはRFC 3339

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// 署名位置
// ---------------------------------------------------------------------------

/// フロントエンドから送られてくる署名位置。全フィールドが省略可能で、
/// 省略時は`normalize`でデフォルト値が補われる。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionInput {
    /// ページ番号（1始まり）
    pub page: Option<u32>,
    /// X座標
    pub x: Option<f64>,
    /// Y座標
    pub y: Option<f64>,
}

/// 正規化済みの署名位置。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignaturePosition {
    /// ページ番号（1始まり）
    pub page: u32,
    /// X座標
    pub x: f64,
    /// Y座標
    pub y: f64,
}

impl PositionInput {
    /// 欠けている成分にデフォルト値（page=1, x=100, y=100）を補う。
    pub fn normalize(&self) -> SignaturePosition {
        SignaturePosition {
            page: self.page.unwrap_or(1),
            x: self.x.unwrap_or(100.0),
            y: self.y.unwrap_or(100.0),
        }
    }
}

// ---------------------------------------------------------------------------
// 署名送信 リクエスト/レスポンス
// ---------------------------------------------------------------------------

/// POST /send-to-docusign リクエスト。
///
/// 必須フィールドの欠落はデシリアライズ失敗ではなくハンドラ側の
/// バリデーションで検出する（欠けたフィールド名をエラーに含めるため）。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SendRequest {
    /// Base64エンコードされたPDF
    pub pdf_base64: Option<String>,
    /// 署名者のメールアドレス
    pub recipient_email: Option<String>,
    /// 署名者の表示名
    pub recipient_name: Option<String>,
    /// 署名位置の一覧
    pub signature_positions: Option<Vec<PositionInput>>,
    /// 旧フロントエンドが使用していたフィールド名（signaturePositionsへのフォールバック）
    pub logo_positions: Option<Vec<PositionInput>>,
}

/// POST /send-to-docusign 成功レスポンス。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendResponse {
    /// 常にtrue（失敗時はエラーレスポンスが返る）
    pub success: bool,
    /// プロバイダが採番したエンベロープID
    pub envelope_id: String,
    /// エンベロープステータス（"sent"等）
    pub status: String,
}

/// エラーレスポンス共通形。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

// ---------------------------------------------------------------------------
// 送信ログ
// ---------------------------------------------------------------------------

/// 署名送信1件の記録。追記のみで、作成後に変更されることはない。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendLogEntry {
    /// 送信時刻
    pub timestamp: DateTime<Utc>,
    /// プロバイダが採番したエンベロープID
    pub envelope_id: String,
    /// エンベロープステータス
    pub status: String,
    /// 署名者のメールアドレス
    pub recipient_email: String,
    /// 署名者の表示名
    pub recipient_name: String,
    /// 署名フィールド数
    pub signature_count: u32,
    /// PDFのバイト数
    pub pdf_size_bytes: u64,
    /// リクエスト元のUser-Agent
    pub user_agent: String,
    /// リクエスト元のIPアドレス
    pub ip_address: String,
}

/// GET /api/docusign-logs クエリパラメータ。
///
/// 日付はRFC 3339または`YYYY-MM-DD`の文字列として受け取り、
/// ハンドラ側でパースする（不正な日付を400で返すため）。
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LogsQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub limit: Option<usize>,
}

/// GET /api/docusign-logs レスポンス。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogsResponse {
    pub success: bool,
    /// ストア内の総件数（フィルタ適用前）
    pub total: usize,
    /// 今回返却した件数
    pub returned: usize,
    pub logs: Vec<SendLogEntry>,
}

// ---------------------------------------------------------------------------
// 受注管理（Brightpearl）関連
// ---------------------------------------------------------------------------

/// GET /api/brightpearl/proof-required の1件分。
/// 受注APIのレスポンスをフロントエンド向けに整形したもの。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofRequiredOrder {
    pub order_id: i64,
    pub order_reference: Option<String>,
    pub customer_name: String,
    pub placed_on: Option<String>,
    pub delivery_date: Option<String>,
}

// ---------------------------------------------------------------------------
// その他
// ---------------------------------------------------------------------------

/// GET /check-limits レスポンス。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckLimitsResponse {
    pub message: String,
    pub limits: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 省略された成分にデフォルト値が補われることを確認
    #[test]
    fn test_position_defaults() {
        let pos = PositionInput {
            page: None,
            x: None,
            y: None,
        };
        assert_eq!(
            pos.normalize(),
            SignaturePosition {
                page: 1,
                x: 100.0,
                y: 100.0
            }
        );

        let pos = PositionInput {
            page: Some(3),
            x: Some(50.0),
            y: None,
        };
        let normalized = pos.normalize();
        assert_eq!(normalized.page, 3);
        assert_eq!(normalized.x, 50.0);
        assert_eq!(normalized.y, 100.0);
    }

    /// ワイヤ上のフィールド名がcamelCaseであることを確認
    #[test]
    fn test_send_request_wire_names() {
        let json = serde_json::json!({
            "pdfBase64": "JVBERi0=",
            "recipientEmail": "a@b.com",
            "recipientName": "A B",
            "signaturePositions": [{"page": 1, "x": 50, "y": 60}]
        });
        let req: SendRequest = serde_json::from_value(json).unwrap();
        assert_eq!(req.pdf_base64.as_deref(), Some("JVBERi0="));
        assert_eq!(req.recipient_email.as_deref(), Some("a@b.com"));
        assert_eq!(req.signature_positions.unwrap().len(), 1);
    }

    /// 旧フィールド名logoPositionsも受理されることを確認
    #[test]
    fn test_send_request_legacy_positions() {
        let json = serde_json::json!({
            "pdfBase64": "JVBERi0=",
            "recipientEmail": "a@b.com",
            "recipientName": "A B",
            "logoPositions": [{"page": 2, "x": 10, "y": 20}]
        });
        let req: SendRequest = serde_json::from_value(json).unwrap();
        assert!(req.signature_positions.is_none());
        assert_eq!(req.logo_positions.unwrap().len(), 1);
    }
}
