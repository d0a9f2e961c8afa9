//! # エンベロープ送信
//!
//! 構築済みのエンベロープ定義をプロバイダのエンベロープ作成APIに送る。
//! 1回のPOSTで完結し、部分的な成功状態は存在しない。失敗してもリトライしない。

use serde::{Deserialize, Serialize};

use crate::auth::AccessToken;
use crate::credentials::EsignCredentials;
use crate::envelope::EnvelopeDefinition;
use crate::error::EsignError;

/// エンベロープ作成APIのレスポンス。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeSummary {
    /// プロバイダが採番したエンベロープID
    pub envelope_id: String,
    /// エンベロープステータス（"sent"等）
    pub status: String,
}

/// エンベロープ作成APIの呼び出し役。
#[derive(Debug, Clone)]
pub struct EnvelopeSubmitter {
    http: reqwest::Client,
    credentials: EsignCredentials,
}

impl EnvelopeSubmitter {
    pub fn new(http: reqwest::Client, credentials: EsignCredentials) -> Self {
        Self { http, credentials }
    }

    /// エンベロープを作成する。
    ///
    /// プロバイダの4xx/5xxは`Submission`としてステータスとメッセージごと
    /// 呼び出し側に伝播する。
    pub async fn create_envelope(
        &self,
        definition: &EnvelopeDefinition,
        token: &AccessToken,
    ) -> Result<EnvelopeSummary, EsignError> {
        let creds = self.credentials.resolved()?;

        let url = format!(
            "{}/v2.1/accounts/{}/envelopes",
            creds.base_path.trim_end_matches('/'),
            creds.account_id
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(&token.value)
            .json(definition)
            .send()
            .await
            .map_err(|e| EsignError::Http(format!("エンベロープ作成APIへの送信失敗: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| EsignError::Http(format!("レスポンスの読み取り失敗: {e}")))?;

        if !status.is_success() {
            return Err(EsignError::Submission {
                status: status.as_u16(),
                message: body,
            });
        }

        let summary: EnvelopeSummary = serde_json::from_str(&body).map_err(|e| {
            EsignError::Submission {
                status: status.as_u16(),
                message: format!("レスポンスのパースに失敗: {e}"),
            }
        })?;

        tracing::info!(
            envelope_id = %summary.envelope_id,
            status = %summary.status,
            "エンベロープを作成しました"
        );

        Ok(summary)
    }
}
