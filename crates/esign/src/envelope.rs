//! # エンベロープ定義の構築
//!
//! PDF・署名者・署名位置の一覧から、プロバイダのエンベロープ作成APIに
//! 送るペイロードを構築する。ネットワークには触れない純粋な変換。
//!
//! ## ワイヤ形式
//! プロバイダのREST APIはcamelCaseのJSONを受け取り、座標やページ番号も
//! 文字列で表現する。整数値の座標は小数点なしで表記する。

use proofsheet_types::SignaturePosition;
use serde::{Deserialize, Serialize};

use crate::b64;
use crate::error::EsignError;
use base64::Engine;

/// エンベロープの件名。固定。
const EMAIL_SUBJECT: &str = "Please approve the mockup sheet";

/// 文書名・拡張子・文書ID。1通につき文書は常に1つ。
const DOCUMENT_NAME: &str = "Mockup Sheet";
const DOCUMENT_EXTENSION: &str = "pdf";
const DOCUMENT_ID: &str = "1";

/// イニシャル欄をサイン欄からX方向にずらす距離。
const INITIAL_X_OFFSET: f64 = 150.0;

// ---------------------------------------------------------------------------
// ワイヤ構造
// ---------------------------------------------------------------------------

/// エンベロープ作成APIのペイロード。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeDefinition {
    pub email_subject: String,
    /// "sent" = 下書きを経ず即時送信
    pub status: String,
    pub documents: Vec<Document>,
    pub recipients: Recipients,
}

/// 添付文書。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub document_base64: String,
    pub name: String,
    pub file_extension: String,
    pub document_id: String,
}

/// 受信者一覧。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipients {
    pub signers: Vec<Signer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carbon_copies: Option<Vec<CarbonCopy>>,
}

/// 署名者。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signer {
    pub email: String,
    pub name: String,
    pub recipient_id: String,
    pub routing_order: String,
    pub tabs: Tabs,
}

/// CC受信者（署名はしない）。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarbonCopy {
    pub email: String,
    pub name: String,
    pub recipient_id: String,
    pub routing_order: String,
}

/// 署名者に配置するフィールド一覧。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tabs {
    pub sign_here_tabs: Vec<Tab>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_here_tabs: Option<Vec<Tab>>,
}

/// ページ上の1フィールド。座標・ページ番号は文字列で送る（プロバイダ仕様）。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tab {
    pub document_id: String,
    pub page_number: String,
    pub x_position: String,
    pub y_position: String,
    pub tab_label: String,
    /// "true" / "false"（文字列）
    pub optional: String,
}

// ---------------------------------------------------------------------------
// 構築オプション
// ---------------------------------------------------------------------------

/// CC受信者の指定。
#[derive(Debug, Clone)]
pub struct CcRecipient {
    pub email: String,
    pub name: String,
}

/// エンベロープ構築の設定。
///
/// イニシャル欄の有無とCC受信者は運用によって異なるため、
/// 暗黙に決めず明示的な設定として外に出してある。
#[derive(Debug, Clone)]
pub struct EnvelopeOptions {
    /// サイン欄ごとに任意入力のイニシャル欄（X+150）を併設するか
    pub include_initial_fields: bool,
    /// CC受信者（署名はしない）
    pub cc_recipient: Option<CcRecipient>,
}

impl Default for EnvelopeOptions {
    fn default() -> Self {
        Self {
            include_initial_fields: true,
            cc_recipient: None,
        }
    }
}

// ---------------------------------------------------------------------------
// 構築
// ---------------------------------------------------------------------------

/// 文書バイト列・署名者・署名位置からエンベロープ定義を構築する。
///
/// フィールドは入力位置と同順で生成され、ラベルは1始まりの連番で
/// エンベロープ内で一意になる。位置が空の場合はフィールドなしの
/// エンベロープになる（警告ログのみ）。
pub fn build_envelope(
    pdf_bytes: &[u8],
    recipient_email: &str,
    recipient_name: &str,
    positions: &[SignaturePosition],
    options: &EnvelopeOptions,
) -> Result<EnvelopeDefinition, EsignError> {
    if pdf_bytes.is_empty() {
        return Err(EsignError::Validation("文書が空です".to_string()));
    }
    if recipient_email.is_empty() {
        return Err(EsignError::Validation(
            "署名者のメールアドレスが空です".to_string(),
        ));
    }
    if recipient_name.is_empty() {
        return Err(EsignError::Validation("署名者の表示名が空です".to_string()));
    }
    if let Some(bad) = positions
        .iter()
        .find(|p| p.page == 0 || p.x < 0.0 || p.y < 0.0)
    {
        return Err(EsignError::Validation(format!(
            "署名位置が不正です: page={}, x={}, y={}",
            bad.page, bad.x, bad.y
        )));
    }
    if positions.is_empty() {
        tracing::warn!("署名位置が空のため、フィールドなしのエンベロープを作成します");
    }

    let document = Document {
        document_base64: b64().encode(pdf_bytes),
        name: DOCUMENT_NAME.to_string(),
        file_extension: DOCUMENT_EXTENSION.to_string(),
        document_id: DOCUMENT_ID.to_string(),
    };

    let sign_here_tabs: Vec<Tab> = positions
        .iter()
        .enumerate()
        .map(|(index, pos)| Tab {
            document_id: DOCUMENT_ID.to_string(),
            page_number: pos.page.to_string(),
            x_position: format_coordinate(pos.x),
            y_position: format_coordinate(pos.y),
            tab_label: format!("Logo_Approval_{}", index + 1),
            optional: "false".to_string(),
        })
        .collect();

    let initial_here_tabs = options.include_initial_fields.then(|| {
        positions
            .iter()
            .enumerate()
            .map(|(index, pos)| Tab {
                document_id: DOCUMENT_ID.to_string(),
                page_number: pos.page.to_string(),
                x_position: format_coordinate(pos.x + INITIAL_X_OFFSET),
                y_position: format_coordinate(pos.y),
                tab_label: format!("Initial_{}", index + 1),
                optional: "true".to_string(),
            })
            .collect::<Vec<Tab>>()
    });

    let signer = Signer {
        email: recipient_email.to_string(),
        name: recipient_name.to_string(),
        recipient_id: "1".to_string(),
        routing_order: "1".to_string(),
        tabs: Tabs {
            sign_here_tabs,
            initial_here_tabs,
        },
    };

    let carbon_copies = options.cc_recipient.as_ref().map(|cc| {
        vec![CarbonCopy {
            email: cc.email.clone(),
            name: cc.name.clone(),
            recipient_id: "2".to_string(),
            routing_order: "2".to_string(),
        }]
    });

    Ok(EnvelopeDefinition {
        email_subject: EMAIL_SUBJECT.to_string(),
        status: "sent".to_string(),
        documents: vec![document],
        recipients: Recipients {
            signers: vec![signer],
            carbon_copies,
        },
    })
}

/// 座標をワイヤ形式の文字列にする。整数値は小数点なし（`50`）、
/// それ以外はそのまま（`50.5`）。
fn format_coordinate(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}
