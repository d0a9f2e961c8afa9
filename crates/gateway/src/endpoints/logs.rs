//! # GET /api/docusign-logs
//!
//! 送信ログの取得。日付範囲と件数上限で絞り込める。

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use proofsheet_types::{LogsQuery, LogsResponse};

use crate::config::AppState;
use crate::error::GatewayError;
use crate::storage::SendLogQuery;

/// 絞り込みなしのときの返却件数。
const DEFAULT_LIMIT: usize = 50;

/// GET /api/docusign-logs — 送信ログを新しい順に返す。
pub async fn handle_docusign_logs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LogsQuery>,
) -> Result<Json<LogsResponse>, GatewayError> {
    let start = parse_date_param("startDate", query.start_date.as_deref())?;
    let end = parse_date_param("endDate", query.end_date.as_deref())?;
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);

    let page = state
        .send_log
        .query(&SendLogQuery { start, end, limit })
        .await?;

    Ok(Json(LogsResponse {
        success: true,
        total: page.total,
        returned: page.entries.len(),
        logs: page.entries,
    }))
}

/// RFC 3339または`YYYY-MM-DD`の日付パラメータをパースする。
/// 日付のみの場合はその日の00:00 (UTC)として扱う。
fn parse_date_param(
    name: &str,
    raw: Option<&str>,
) -> Result<Option<DateTime<Utc>>, GatewayError> {
    let Some(raw) = raw else {
        return Ok(None);
    };

    if let Ok(datetime) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(datetime.with_timezone(&Utc)));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        let naive = date.and_time(NaiveTime::MIN);
        return Ok(Some(DateTime::from_naive_utc_and_offset(naive, Utc)));
    }

    Err(GatewayError::BadRequest(format!(
        "日付パラメータ{name}を解釈できません: {raw}"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::testing::{test_state, MemorySendLog, TEST_RSA_PEM};
    use crate::storage::SendLog;
    use chrono::Duration;
    use proofsheet_types::SendLogEntry;

    fn entry(envelope_id: &str, timestamp: DateTime<Utc>) -> SendLogEntry {
        SendLogEntry {
            timestamp,
            envelope_id: envelope_id.to_string(),
            status: "sent".to_string(),
            recipient_email: "a@b.com".to_string(),
            recipient_name: "A B".to_string(),
            signature_count: 1,
            pdf_size_bytes: 1024,
            user_agent: "test".to_string(),
            ip_address: "127.0.0.1".to_string(),
        }
    }

    /// 日付パラメータの両形式が受理され、不正値が拒否されることを確認
    #[test]
    fn test_parse_date_param() {
        let parsed = parse_date_param("startDate", Some("2025-06-01T09:30:00Z"))
            .unwrap()
            .unwrap();
        assert_eq!(parsed.to_rfc3339(), "2025-06-01T09:30:00+00:00");

        let parsed = parse_date_param("startDate", Some("2025-06-01"))
            .unwrap()
            .unwrap();
        assert_eq!(parsed.to_rfc3339(), "2025-06-01T00:00:00+00:00");

        assert!(parse_date_param("startDate", None).unwrap().is_none());
        assert!(parse_date_param("startDate", Some("not-a-date")).is_err());
    }

    /// デフォルトlimitと日付フィルタの動作を確認
    #[tokio::test]
    async fn test_logs_query() {
        let mut state = test_state("http://127.0.0.1:1", TEST_RSA_PEM);
        let memory_log = MemorySendLog::new();

        let now = Utc::now();
        memory_log.append(entry("EV-1", now - Duration::days(2))).await.unwrap();
        memory_log.append(entry("EV-2", now - Duration::days(1))).await.unwrap();
        memory_log.append(entry("EV-3", now)).await.unwrap();
        state.send_log = Box::new(memory_log);
        let state = Arc::new(state);

        // 絞り込みなし
        let response = handle_docusign_logs(State(state.clone()), Query(LogsQuery::default()))
            .await
            .unwrap()
            .0;
        assert!(response.success);
        assert_eq!(response.total, 3);
        assert_eq!(response.returned, 3);
        assert_eq!(response.logs[0].envelope_id, "EV-3");

        // 全件を除外する範囲: totalは変わらず、returnedは0
        let query = LogsQuery {
            start_date: Some((now - Duration::days(30)).to_rfc3339()),
            end_date: Some((now - Duration::days(20)).to_rfc3339()),
            limit: None,
        };
        let response = handle_docusign_logs(State(state.clone()), Query(query))
            .await
            .unwrap()
            .0;
        assert_eq!(response.total, 3);
        assert_eq!(response.returned, 0);
        assert!(response.logs.is_empty());

        // limit指定
        let query = LogsQuery {
            start_date: None,
            end_date: None,
            limit: Some(1),
        };
        let response = handle_docusign_logs(State(state), Query(query))
            .await
            .unwrap()
            .0;
        assert_eq!(response.returned, 1);
    }
}
