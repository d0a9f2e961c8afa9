//! # 送信ログストア
//!
//! 署名送信の記録を保持する抽象インターフェース。コアから見えるのは
//! 追記と日付範囲付きの取得だけで、バックエンドは差し替え可能。
//! PostgreSQL実装は `postgres` サブモジュール、JSONファイル実装は
//! `file` サブモジュールを参照。

pub mod file;
#[cfg(feature = "store-postgres")]
pub mod postgres;

pub use file::FileSendLog;
#[cfg(feature = "store-postgres")]
pub use postgres::PostgresSendLog;

use chrono::{DateTime, Utc};
use proofsheet_types::SendLogEntry;

use crate::error::GatewayError;

/// ログ取得の絞り込み条件。
#[derive(Debug, Clone, Default)]
pub struct SendLogQuery {
    /// この時刻以降のエントリに絞る
    pub start: Option<DateTime<Utc>>,
    /// この時刻以前のエントリに絞る
    pub end: Option<DateTime<Utc>>,
    /// 返却件数の上限
    pub limit: usize,
}

/// 取得結果。`total`はフィルタ適用前のストア総件数。
#[derive(Debug, Clone)]
pub struct SendLogPage {
    pub total: usize,
    pub entries: Vec<SendLogEntry>,
}

/// 送信ログストアの抽象インターフェース。
///
/// 追記は呼び出し側にとってベストエフォート: 失敗しても成功済みの
/// 送信を巻き戻すことはなく、エラーはログに残すだけにする。
/// 追記は並行呼び出しに対して安全であること。
#[async_trait::async_trait]
pub trait SendLog: Send + Sync {
    /// 1件追記する。
    async fn append(&self, entry: SendLogEntry) -> Result<(), GatewayError>;

    /// 新しい順に取得する。
    async fn query(&self, query: &SendLogQuery) -> Result<SendLogPage, GatewayError>;
}
