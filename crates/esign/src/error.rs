//! # 電子署名クライアントのエラー型

/// 電子署名プロバイダとのやり取りで発生するエラー。
///
/// 送信フローの失敗は安い順に検出する: `Validation`（ネットワーク前）→
/// `Config` / `Authentication`（トークン交換）→ `Submission`（エンベロープ作成）。
#[derive(Debug, thiserror::Error)]
pub enum EsignError {
    /// 認証情報の不足・不正（起動時ではなく初回利用時に検出する）
    #[error("認証情報が設定されていません: {0}")]
    Config(String),
    /// プロバイダがトークン交換を拒否した、または鍵が不正
    #[error("アクセストークンの取得に失敗しました: {0}")]
    Authentication(String),
    /// リクエスト内容の型・形状違反（ネットワーク呼び出し前に検出）
    #[error("リクエスト内容が不正です: {0}")]
    Validation(String),
    /// プロバイダがエンベロープ作成を拒否した（4xx/5xx）。リトライはしない。
    #[error("エンベロープ送信に失敗しました: HTTP {status} - {message}")]
    Submission { status: u16, message: String },
    /// HTTP通信自体の失敗（接続不能等）
    #[error("HTTP通信に失敗しました: {0}")]
    Http(String),
}
