//! # JSONファイル送信ログ実装
//!
//! ローカル開発用のバックエンド。1つのJSONファイルに新しい順で保持し、
//! 直近1000件を超えた分は追記時に切り捨てる。

use std::io::ErrorKind;
use std::path::PathBuf;

use proofsheet_types::SendLogEntry;
use serde::{Deserialize, Serialize};

use super::{SendLog, SendLogPage, SendLogQuery};
use crate::error::GatewayError;

/// 保持する最大件数。
const MAX_ENTRIES: usize = 1000;

/// ログファイルの形。`{"logs": [...]}`
#[derive(Debug, Default, Serialize, Deserialize)]
struct LogFile {
    logs: Vec<SendLogEntry>,
}

/// JSONファイルによる送信ログ実装。
///
/// ファイルへの読み書きはプロセス内ミューテックスで直列化する
/// （プロセスをまたいだ排他は保証しない）。
pub struct FileSendLog {
    path: PathBuf,
    lock: tokio::sync::Mutex<()>,
}

impl FileSendLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: tokio::sync::Mutex::new(()),
        }
    }

    /// ファイルを読み込む。存在しなければ空として扱う。
    async fn read_file(&self) -> Result<LogFile, GatewayError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| GatewayError::Storage(format!("ログファイルのパースに失敗: {e}"))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(LogFile::default()),
            Err(e) => Err(GatewayError::Storage(format!(
                "ログファイルの読み取りに失敗: {e}"
            ))),
        }
    }

    async fn write_file(&self, data: &LogFile) -> Result<(), GatewayError> {
        let bytes = serde_json::to_vec_pretty(data)
            .map_err(|e| GatewayError::Storage(format!("ログのシリアライズに失敗: {e}")))?;
        tokio::fs::write(&self.path, bytes)
            .await
            .map_err(|e| GatewayError::Storage(format!("ログファイルの書き込みに失敗: {e}")))
    }
}

#[async_trait::async_trait]
impl SendLog for FileSendLog {
    async fn append(&self, entry: SendLogEntry) -> Result<(), GatewayError> {
        let _guard = self.lock.lock().await;

        let mut data = self.read_file().await?;
        data.logs.insert(0, entry);
        data.logs.truncate(MAX_ENTRIES);
        self.write_file(&data).await
    }

    async fn query(&self, query: &SendLogQuery) -> Result<SendLogPage, GatewayError> {
        let _guard = self.lock.lock().await;

        let data = self.read_file().await?;
        let total = data.logs.len();

        let entries: Vec<SendLogEntry> = data
            .logs
            .into_iter()
            .filter(|log| query.start.map_or(true, |start| log.timestamp >= start))
            .filter(|log| query.end.map_or(true, |end| log.timestamp <= end))
            .take(query.limit)
            .collect();

        Ok(SendLogPage { total, entries })
    }
}
