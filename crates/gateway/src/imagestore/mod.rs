//! # 画像ストア
//!
//! 商品画像を保持するリモートファイルストアの抽象インターフェース。
//! SFTP実装は `sftp` サブモジュールを参照。

#[cfg(feature = "vendor-sftp")]
pub mod sftp;

#[cfg(feature = "vendor-sftp")]
pub use sftp::SftpImageStore;

use crate::error::GatewayError;

/// 画像ストアの抽象インターフェース。
///
/// ゲートウェイはリモートパスでファイルを取得してそのまま返すだけで、
/// 画像の内容には関知しない。
#[async_trait::async_trait]
pub trait ImageStore: Send + Sync {
    /// リモートパスのファイルを取得する。
    async fn fetch(&self, remote_path: &str) -> Result<Vec<u8>, GatewayError>;
}
