//! # POST /send-to-docusign
//!
//! モックアップシートを電子署名に回す中心フロー。
//! 検証 → トークン取得 → エンベロープ構築 → 送信 → ログ記録 の順に
//! 逐次実行する。検証はネットワークに触れる前に済ませ、送信ログの失敗は
//! 成功済みの送信結果に影響させない。

use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::Json;
use base64::Engine;
use proofsheet_esign::build_envelope;
use proofsheet_types::{PositionInput, SendLogEntry, SendRequest, SendResponse, SignaturePosition};

use crate::config::AppState;
use crate::error::GatewayError;

/// Base64エンジン（Standard）
fn b64() -> base64::engine::GeneralPurpose {
    base64::engine::general_purpose::STANDARD
}

/// POST /send-to-docusign — 署名依頼の送信。
pub async fn handle_send_to_docusign(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<SendRequest>,
) -> Result<Json<SendResponse>, GatewayError> {
    // 必須フィールドの検証（最も安い失敗を最初に）
    let mut missing = Vec::new();
    if body.pdf_base64.as_deref().map_or(true, str::is_empty) {
        missing.push("pdfBase64");
    }
    if body.recipient_email.as_deref().map_or(true, str::is_empty) {
        missing.push("recipientEmail");
    }
    if body.recipient_name.as_deref().map_or(true, str::is_empty) {
        missing.push("recipientName");
    }
    if !missing.is_empty() {
        return Err(GatewayError::BadRequest(format!(
            "必須フィールドがありません: {}",
            missing.join(", ")
        )));
    }

    // signaturePositionsを優先し、旧フィールド名logoPositionsにフォールバック
    let positions_input = body
        .signature_positions
        .as_ref()
        .or(body.logo_positions.as_ref())
        .ok_or_else(|| {
            GatewayError::BadRequest("signaturePositionsは配列である必要があります".to_string())
        })?;

    let pdf_base64 = body.pdf_base64.as_deref().unwrap_or_default();
    let pdf_bytes = b64()
        .decode(pdf_base64)
        .map_err(|e| GatewayError::BadRequest(format!("pdfBase64のデコードに失敗しました: {e}")))?;

    let recipient_email = body.recipient_email.as_deref().unwrap_or_default();
    let recipient_name = body.recipient_name.as_deref().unwrap_or_default();
    let positions: Vec<SignaturePosition> =
        positions_input.iter().map(PositionInput::normalize).collect();

    tracing::info!(
        recipient = %recipient_email,
        position_count = positions.len(),
        pdf_size = pdf_bytes.len(),
        "署名送信リクエストを受理しました"
    );

    // トークンは送信ごとに取り直す。認証に失敗したら送信には進まない。
    let token = state.token_provider.access_token().await?;

    let envelope = build_envelope(
        &pdf_bytes,
        recipient_email,
        recipient_name,
        &positions,
        &state.envelope_options,
    )?;

    let summary = state.submitter.create_envelope(&envelope, &token).await?;

    // 送信ログはベストエフォート。失敗しても呼び出し側には成功を返す。
    let entry = SendLogEntry {
        timestamp: chrono::Utc::now(),
        envelope_id: summary.envelope_id.clone(),
        status: summary.status.clone(),
        recipient_email: recipient_email.to_string(),
        recipient_name: recipient_name.to_string(),
        signature_count: positions.len() as u32,
        pdf_size_bytes: pdf_bytes.len() as u64,
        user_agent: header_value_or_unknown(&headers, header::USER_AGENT),
        ip_address: client_ip(&headers),
    };
    if let Err(e) = state.send_log.append(entry).await {
        tracing::error!("送信ログの記録に失敗しました: {e}");
    }

    Ok(Json(SendResponse {
        success: true,
        envelope_id: summary.envelope_id,
        status: summary.status,
    }))
}

fn header_value_or_unknown(headers: &HeaderMap, name: header::HeaderName) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

/// X-Forwarded-Forの先頭アドレスを呼び出し元IPとして扱う。
fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::testing::{test_state, FailingSendLog, MemorySendLog, TEST_RSA_PEM};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// モックの電子署名プロバイダ（OAuth + エンベロープ作成）を起動する。
    /// 返り値は (ベースURL, OAuthヒット数, エンベロープ作成ヒット数)。
    async fn start_mock_provider() -> (String, Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let oauth_hits = Arc::new(AtomicUsize::new(0));
        let envelope_hits = Arc::new(AtomicUsize::new(0));

        let oauth_counter = oauth_hits.clone();
        let envelope_counter = envelope_hits.clone();

        let app = axum::Router::new()
            .route(
                "/oauth/token",
                axum::routing::post(move || {
                    let counter = oauth_counter.clone();
                    async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                        axum::Json(serde_json::json!({
                            "access_token": "test-token",
                            "token_type": "Bearer",
                            "expires_in": 3600
                        }))
                    }
                }),
            )
            .route(
                "/v2.1/accounts/{account_id}/envelopes",
                axum::routing::post(move |axum::Json(body): axum::Json<serde_json::Value>| {
                    let counter = envelope_counter.clone();
                    async move {
                        counter.fetch_add(1, Ordering::SeqCst);
                        // エンベロープ定義の形を軽く確認
                        assert_eq!(body["status"], "sent");
                        assert!(body["documents"][0]["documentBase64"].is_string());
                        axum::Json(serde_json::json!({
                            "envelopeId": "EV-1",
                            "status": "sent"
                        }))
                    }
                }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        (format!("http://127.0.0.1:{port}"), oauth_hits, envelope_hits)
    }

    fn send_request(pdf: &[u8]) -> SendRequest {
        SendRequest {
            pdf_base64: Some(b64().encode(pdf)),
            recipient_email: Some("a@b.com".to_string()),
            recipient_name: Some("A B".to_string()),
            signature_positions: Some(vec![PositionInput {
                page: Some(1),
                x: Some(50.0),
                y: Some(60.0),
            }]),
            logo_positions: None,
        }
    }

    /// 正常系: 送信が成功し、ログが1件記録されることを確認
    #[tokio::test]
    async fn test_send_success_with_log_entry() {
        let (base, oauth_hits, envelope_hits) = start_mock_provider().await;

        let mut state = test_state(&base, TEST_RSA_PEM);
        let memory_log = MemorySendLog::new();
        let entries = memory_log.handle();
        state.send_log = Box::new(memory_log);
        let state = Arc::new(state);

        let pdf = b"%PDF-1.4 mockup sheet";
        let result = handle_send_to_docusign(
            State(state),
            HeaderMap::new(),
            Json(send_request(pdf)),
        )
        .await
        .unwrap();

        let response = result.0;
        assert!(response.success);
        assert_eq!(response.envelope_id, "EV-1");
        assert_eq!(response.status, "sent");
        assert_eq!(oauth_hits.load(Ordering::SeqCst), 1);
        assert_eq!(envelope_hits.load(Ordering::SeqCst), 1);

        let entries = entries.lock().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].envelope_id, "EV-1");
        assert_eq!(entries[0].signature_count, 1);
        assert_eq!(entries[0].pdf_size_bytes, pdf.len() as u64);
        assert_eq!(entries[0].user_agent, "unknown");
    }

    /// recipientEmail欠落時は認証にすら進まないことを確認
    #[tokio::test]
    async fn test_missing_recipient_email_fails_before_auth() {
        let (base, oauth_hits, envelope_hits) = start_mock_provider().await;
        let state = Arc::new(test_state(&base, TEST_RSA_PEM));

        let mut request = send_request(b"%PDF-1.4");
        request.recipient_email = None;

        let err = handle_send_to_docusign(State(state), HeaderMap::new(), Json(request))
            .await
            .err()
            .unwrap();

        match err {
            GatewayError::BadRequest(message) => {
                assert!(message.contains("recipientEmail"), "{message}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(oauth_hits.load(Ordering::SeqCst), 0);
        assert_eq!(envelope_hits.load(Ordering::SeqCst), 0);
    }

    /// 位置の一覧が無い場合は400になることを確認
    #[tokio::test]
    async fn test_missing_positions_rejected() {
        let (base, oauth_hits, _) = start_mock_provider().await;
        let state = Arc::new(test_state(&base, TEST_RSA_PEM));

        let mut request = send_request(b"%PDF-1.4");
        request.signature_positions = None;

        let err = handle_send_to_docusign(State(state), HeaderMap::new(), Json(request))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, GatewayError::BadRequest(_)), "{err:?}");
        assert_eq!(oauth_hits.load(Ordering::SeqCst), 0);
    }

    /// 旧フィールド名logoPositionsでも送信できることを確認
    #[tokio::test]
    async fn test_legacy_logo_positions_accepted() {
        let (base, _, envelope_hits) = start_mock_provider().await;
        let state = Arc::new(test_state(&base, TEST_RSA_PEM));

        let mut request = send_request(b"%PDF-1.4");
        request.logo_positions = request.signature_positions.take();

        let result =
            handle_send_to_docusign(State(state), HeaderMap::new(), Json(request)).await;
        assert!(result.is_ok(), "{:?}", result.err());
        assert_eq!(envelope_hits.load(Ordering::SeqCst), 1);
    }

    /// 不正な秘密鍵ではエンベロープ作成APIが一度も呼ばれないことを確認
    #[tokio::test]
    async fn test_invalid_key_never_reaches_envelope_endpoint() {
        let (base, oauth_hits, envelope_hits) = start_mock_provider().await;
        let state = Arc::new(test_state(&base, "not a pem"));

        let err = handle_send_to_docusign(
            State(state),
            HeaderMap::new(),
            Json(send_request(b"%PDF-1.4")),
        )
        .await
        .err()
        .unwrap();

        assert!(matches!(err, GatewayError::Esign(_)), "{err:?}");
        assert_eq!(oauth_hits.load(Ordering::SeqCst), 0);
        assert_eq!(
            envelope_hits.load(Ordering::SeqCst),
            0,
            "エンベロープ作成APIが呼ばれてしまった"
        );
    }

    /// ログ記録の失敗が送信の成功に影響しないことを確認
    #[tokio::test]
    async fn test_log_failure_does_not_fail_request() {
        let (base, _, _) = start_mock_provider().await;

        let mut state = test_state(&base, TEST_RSA_PEM);
        state.send_log = Box::new(FailingSendLog);
        let state = Arc::new(state);

        let result = handle_send_to_docusign(
            State(state),
            HeaderMap::new(),
            Json(send_request(b"%PDF-1.4")),
        )
        .await
        .unwrap();
        assert!(result.0.success);
    }

    /// X-Forwarded-ForとUser-Agentがログに反映されることを確認
    #[tokio::test]
    async fn test_requester_metadata_recorded() {
        let (base, _, _) = start_mock_provider().await;

        let mut state = test_state(&base, TEST_RSA_PEM);
        let memory_log = MemorySendLog::new();
        let entries = memory_log.handle();
        state.send_log = Box::new(memory_log);
        let state = Arc::new(state);

        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, "test-agent/1.0".parse().unwrap());
        headers.insert("x-forwarded-for", "203.0.113.9, 10.0.0.1".parse().unwrap());

        handle_send_to_docusign(State(state), headers, Json(send_request(b"%PDF-1.4")))
            .await
            .unwrap();

        let entries = entries.lock().await;
        assert_eq!(entries[0].user_agent, "test-agent/1.0");
        assert_eq!(entries[0].ip_address, "203.0.113.9");
    }
}
