//! # Proofsheet 電子署名プロバイダクライアント
//!
//! モックアップシートを電子署名プロバイダ（DocuSign）に送信するための
//! クライアント実装。
//!
//! ## 送信フロー
//! 1. [`EsignCredentials`] — 環境変数から認証情報を解決（起動時に一度だけ）
//! 2. [`TokenProvider`] — JWT Bearer Grantでアクセストークンを取得
//! 3. [`build_envelope`] — PDFと署名位置からエンベロープ定義を構築
//! 4. [`EnvelopeSubmitter`] — エンベロープ作成APIに送信
//!
//! トークンは送信ごとに取り直す。キャッシュが必要になった場合は
//! [`TokenProvider::access_token`]の内部に足せる構造にしてある。

mod auth;
mod client;
mod credentials;
mod envelope;
mod error;

pub use auth::{AccessToken, TokenProvider};
pub use client::{EnvelopeSubmitter, EnvelopeSummary};
pub use credentials::EsignCredentials;
pub use envelope::{
    build_envelope, CcRecipient, EnvelopeDefinition, EnvelopeOptions,
};
pub use error::EsignError;

/// Base64エンジン（Standard）
pub(crate) fn b64() -> base64::engine::GeneralPurpose {
    base64::engine::general_purpose::STANDARD
}
