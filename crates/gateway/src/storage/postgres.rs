//! # PostgreSQL送信ログ実装
//!
//! 本番用のバックエンド。件数制限はなく、同時書き込みは
//! データベース側のトランザクションで安全になる。

use chrono::{DateTime, Utc};
use proofsheet_types::SendLogEntry;
use tokio_postgres::types::ToSql;

use super::{SendLog, SendLogPage, SendLogQuery};
use crate::error::GatewayError;

/// PostgreSQLによる送信ログ実装。
pub struct PostgresSendLog {
    client: tokio_postgres::Client,
}

impl PostgresSendLog {
    /// 接続文字列から接続し、テーブルとインデックスを初期化する。
    pub async fn connect(database_url: &str) -> Result<Self, GatewayError> {
        let (client, connection) = tokio_postgres::connect(database_url, tokio_postgres::NoTls)
            .await
            .map_err(|e| GatewayError::Storage(format!("データベース接続に失敗: {e}")))?;

        // 接続タスクはバックグラウンドで駆動する
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!("データベース接続が切断されました: {e}");
            }
        });

        let store = Self { client };
        store.initialize_schema().await?;
        tracing::info!("送信ログテーブルを初期化しました");
        Ok(store)
    }

    async fn initialize_schema(&self) -> Result<(), GatewayError> {
        self.client
            .batch_execute(
                "CREATE TABLE IF NOT EXISTS docusign_logs (
                    id SERIAL PRIMARY KEY,
                    timestamp TIMESTAMPTZ NOT NULL,
                    envelope_id VARCHAR(255) NOT NULL,
                    status VARCHAR(50),
                    recipient_email VARCHAR(255),
                    recipient_name VARCHAR(255),
                    signature_count INTEGER,
                    pdf_size_bytes BIGINT,
                    user_agent TEXT,
                    ip_address VARCHAR(100),
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                );
                CREATE INDEX IF NOT EXISTS idx_docusign_logs_timestamp
                    ON docusign_logs(timestamp DESC);
                CREATE INDEX IF NOT EXISTS idx_docusign_logs_envelope_id
                    ON docusign_logs(envelope_id);",
            )
            .await
            .map_err(|e| GatewayError::Storage(format!("スキーマ初期化に失敗: {e}")))
    }
}

#[async_trait::async_trait]
impl SendLog for PostgresSendLog {
    async fn append(&self, entry: SendLogEntry) -> Result<(), GatewayError> {
        self.client
            .execute(
                "INSERT INTO docusign_logs
                 (timestamp, envelope_id, status, recipient_email, recipient_name,
                  signature_count, pdf_size_bytes, user_agent, ip_address)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
                &[
                    &entry.timestamp,
                    &entry.envelope_id,
                    &entry.status,
                    &entry.recipient_email,
                    &entry.recipient_name,
                    &(entry.signature_count as i32),
                    &(entry.pdf_size_bytes as i64),
                    &entry.user_agent,
                    &entry.ip_address,
                ],
            )
            .await
            .map_err(|e| GatewayError::Storage(format!("ログの挿入に失敗: {e}")))?;

        tracing::debug!(envelope_id = %entry.envelope_id, "送信ログをデータベースに記録しました");
        Ok(())
    }

    async fn query(&self, query: &SendLogQuery) -> Result<SendLogPage, GatewayError> {
        let limit = query.limit as i64;

        let mut sql = String::from(
            "SELECT timestamp, envelope_id, status, recipient_email, recipient_name,
                    signature_count, pdf_size_bytes, user_agent, ip_address
             FROM docusign_logs WHERE 1=1",
        );
        let mut params: Vec<&(dyn ToSql + Sync)> = Vec::new();

        if let Some(start) = &query.start {
            params.push(start);
            sql.push_str(&format!(" AND timestamp >= ${}", params.len()));
        }
        if let Some(end) = &query.end {
            params.push(end);
            sql.push_str(&format!(" AND timestamp <= ${}", params.len()));
        }

        sql.push_str(" ORDER BY timestamp DESC");
        params.push(&limit);
        sql.push_str(&format!(" LIMIT ${}", params.len()));

        let rows = self
            .client
            .query(&sql, &params)
            .await
            .map_err(|e| GatewayError::Storage(format!("ログの取得に失敗: {e}")))?;

        let entries = rows
            .iter()
            .map(|row| SendLogEntry {
                timestamp: row.get::<_, DateTime<Utc>>(0),
                envelope_id: row.get(1),
                status: row.get::<_, Option<String>>(2).unwrap_or_default(),
                recipient_email: row.get::<_, Option<String>>(3).unwrap_or_default(),
                recipient_name: row.get::<_, Option<String>>(4).unwrap_or_default(),
                signature_count: row.get::<_, Option<i32>>(5).unwrap_or_default() as u32,
                pdf_size_bytes: row.get::<_, Option<i64>>(6).unwrap_or_default() as u64,
                user_agent: row.get::<_, Option<String>>(7).unwrap_or_default(),
                ip_address: row.get::<_, Option<String>>(8).unwrap_or_default(),
            })
            .collect();

        let count_row = self
            .client
            .query_one("SELECT COUNT(*) FROM docusign_logs", &[])
            .await
            .map_err(|e| GatewayError::Storage(format!("件数の取得に失敗: {e}")))?;
        let total: i64 = count_row.get(0);

        Ok(SendLogPage {
            total: total as usize,
            entries,
        })
    }
}
