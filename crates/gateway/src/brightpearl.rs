//! # 受注管理API（Brightpearl）クライアント
//!
//! 受注・商品・在庫の参照を上流の受注管理APIに転送する。ベースURLは
//! データセンターリージョンから一箇所で解決し、エラーは上流の
//! ステータスコードとボディをそのまま呼び出し側に映す。

use serde::Deserialize;

use crate::config::AppState;
use crate::error::GatewayError;

// ---------------------------------------------------------------------------
// データセンター / 設定
// ---------------------------------------------------------------------------

/// 受注管理APIのデータセンターリージョン。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Datacenter {
    Use1,
    Euw1,
}

impl Datacenter {
    /// リージョン識別子から解決する。未知の値はUse1にフォールバックする。
    pub fn from_region(region: &str) -> Self {
        match region {
            "euw1" => Datacenter::Euw1,
            _ => Datacenter::Use1,
        }
    }

    /// リージョンのAPIベースURL。
    pub fn base_url(&self) -> &'static str {
        match self {
            Datacenter::Use1 => "https://use1.brightpearlconnect.com",
            Datacenter::Euw1 => "https://euw1.brightpearlconnect.com",
        }
    }
}

/// 受注管理APIの接続設定。
#[derive(Debug, Clone)]
pub struct BrightpearlSettings {
    /// APIベースURL（データセンターから解決済み）
    pub base_url: String,
    /// アカウントID
    pub account_id: Option<String>,
    /// アプリ参照ヘッダの値
    pub app_ref: Option<String>,
    /// アカウントトークン
    pub account_token: Option<String>,
}

impl BrightpearlSettings {
    /// 環境変数から構築する。
    pub fn from_env() -> Self {
        let region =
            std::env::var("BRIGHTPEARL_DATACENTER").unwrap_or_else(|_| "use1".to_string());
        Self {
            base_url: Datacenter::from_region(&region).base_url().to_string(),
            account_id: std::env::var("BRIGHTPEARL_ACCOUNT_ID").ok(),
            app_ref: std::env::var("BRIGHTPEARL_APP_REF").ok(),
            account_token: std::env::var("BRIGHTPEARL_API_TOKEN").ok(),
        }
    }

    /// アカウントIDとトークンの存在を検証する。
    fn resolved(&self) -> Result<(&str, &str), GatewayError> {
        match (self.account_id.as_deref(), self.account_token.as_deref()) {
            (Some(account_id), Some(token)) => Ok((account_id, token)),
            _ => Err(GatewayError::Internal(
                "受注管理APIの認証情報が設定されていません".to_string(),
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// 転送
// ---------------------------------------------------------------------------

/// 受注管理APIの`public-api`配下にGETを転送し、JSONを返す。
///
/// 上流の4xx/5xxは`Upstream`としてステータスとボディごと呼び出し側に
/// 伝播する。リトライはしない。
pub(crate) async fn fetch_json(
    state: &AppState,
    service_path: &str,
) -> Result<serde_json::Value, GatewayError> {
    let (account_id, token) = state.brightpearl.resolved()?;

    let url = format!(
        "{}/public-api/{}/{}",
        state.brightpearl.base_url, account_id, service_path
    );
    tracing::info!(url = %url, "受注管理APIへ転送します");

    let mut request = state
        .http_client
        .get(&url)
        .header("brightpearl-account-token", token)
        .header("Content-Type", "application/json");
    if let Some(app_ref) = state.brightpearl.app_ref.as_deref() {
        request = request.header("brightpearl-app-ref", app_ref);
    }

    let response = request
        .send()
        .await
        .map_err(|e| GatewayError::Internal(format!("受注管理APIへの送信失敗: {e}")))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| GatewayError::Internal(format!("受注管理APIレスポンスの読み取り失敗: {e}")))?;

    if !status.is_success() {
        tracing::error!(status = %status, body = %body, "受注管理APIがエラーを返しました");
        return Err(GatewayError::Upstream {
            status: status.as_u16(),
            body,
        });
    }

    serde_json::from_str(&body)
        .map_err(|e| GatewayError::Internal(format!("受注管理APIレスポンスのパースに失敗: {e}")))
}

// ---------------------------------------------------------------------------
// 受注検索結果のデコード
// ---------------------------------------------------------------------------

/// 受注検索APIの結果エンコーディング。上流の形式が安定していないため、
/// 観測された形をそれぞれ明示的なバリアントとして受ける。
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SearchResults {
    /// 行ごとの配列（先頭列が受注ID）
    Rows(Vec<Vec<serde_json::Value>>),
    /// ID（数値または文字列）のフラット配列
    Flat(Vec<serde_json::Value>),
    /// 想定外の形。文字列化してフォールバック解析する。
    Other(serde_json::Value),
}

/// 受注検索結果から受注IDの一覧を取り出す。
pub(crate) fn extract_order_ids(results: &serde_json::Value) -> Vec<String> {
    let decoded: SearchResults = match serde_json::from_value(results.clone()) {
        Ok(decoded) => decoded,
        Err(_) => return Vec::new(),
    };

    match decoded {
        SearchResults::Rows(rows) => rows
            .iter()
            .filter_map(|row| row.first().and_then(scalar_to_id))
            .collect(),
        SearchResults::Flat(values) => values.iter().filter_map(scalar_to_id).collect(),
        SearchResults::Other(value) => {
            tracing::warn!("受注検索結果が想定外の形式のため、フォールバック解析します");
            // 文字列化してカンマ区切りの中から20要素おきに数値らしき断片を拾う
            let raw = match &value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            raw.split(',')
                .enumerate()
                .filter_map(|(index, part)| {
                    let part = part.trim();
                    let looks_numeric =
                        !part.is_empty() && part.chars().all(|c| c.is_ascii_digit());
                    (index % 20 == 0 && looks_numeric).then(|| part.to_string())
                })
                .collect()
        }
    }
}

/// 数値または文字列のスカラーをID文字列にする。
fn scalar_to_id(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// proof-required 整形
// ---------------------------------------------------------------------------

/// 受注詳細レスポンスをフロントエンド向けの形に整形する。
/// 顧客名は複数の候補フィールドから最初に見つかったものを使う。
pub(crate) fn reshape_proof_orders(
    details: &serde_json::Value,
) -> Vec<proofsheet_types::ProofRequiredOrder> {
    let Some(orders) = details.get("response").and_then(|r| r.as_array()) else {
        return Vec::new();
    };

    orders
        .iter()
        .map(|order| {
            let parties = &order["parties"];
            let customer_name = parties["customer"]["contactName"]
                .as_str()
                .or_else(|| parties["delivery"]["addressFullName"].as_str())
                .or_else(|| parties["customer"]["addressFullName"].as_str())
                .unwrap_or("Unknown")
                .to_string();

            proofsheet_types::ProofRequiredOrder {
                order_id: order["id"].as_i64().unwrap_or_default(),
                order_reference: order["reference"].as_str().map(String::from),
                customer_name,
                placed_on: order["placedOn"].as_str().map(String::from),
                delivery_date: order["delivery"]["deliveryDate"].as_str().map(String::from),
            }
        })
        .collect()
}
