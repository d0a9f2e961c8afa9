//! # SFTP画像ストア実装
//!
//! リモートのSFTPサーバーから商品画像を取得する。SFTPクライアントは
//! ブロッキングI/Oのため、取得ごとにブロッキングタスクへ逃がす。
//! 接続は取得ごとに張り直す（コネクションプールは持たない）。

use std::io::Read;

use super::ImageStore;
use crate::error::GatewayError;

/// SFTPによる画像ストア実装。
pub struct SftpImageStore {
    host: String,
    port: u16,
    username: String,
    password: String,
}

impl SftpImageStore {
    pub fn new(host: String, port: u16, username: String, password: String) -> Self {
        Self {
            host,
            port,
            username,
            password,
        }
    }

    /// 環境変数から構築する。
    pub fn from_env() -> Self {
        let host = std::env::var("SFTP_HOST")
            .unwrap_or_else(|_| "prodinfrargftp.blob.core.windows.net".to_string());
        let port = std::env::var("SFTP_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(22);
        let username = std::env::var("SFTP_USERNAME")
            .unwrap_or_else(|_| "prodinfrargftp.internal.prodimage".to_string());
        let password = std::env::var("SFTP_PASSWORD").unwrap_or_else(|_| {
            tracing::warn!("SFTP_PASSWORDが未設定です。画像取得は失敗します");
            String::new()
        });

        Self::new(host, port, username, password)
    }
}

#[async_trait::async_trait]
impl ImageStore for SftpImageStore {
    async fn fetch(&self, remote_path: &str) -> Result<Vec<u8>, GatewayError> {
        let host = self.host.clone();
        let port = self.port;
        let username = self.username.clone();
        let password = self.password.clone();
        let path = remote_path.to_string();

        tokio::task::spawn_blocking(move || -> Result<Vec<u8>, GatewayError> {
            let tcp = std::net::TcpStream::connect((host.as_str(), port))
                .map_err(|e| GatewayError::Image(format!("SFTPサーバーへの接続失敗: {e}")))?;

            let mut session = ssh2::Session::new()
                .map_err(|e| GatewayError::Image(format!("SFTPセッションの作成失敗: {e}")))?;
            session.set_tcp_stream(tcp);
            session
                .handshake()
                .map_err(|e| GatewayError::Image(format!("SFTPハンドシェイク失敗: {e}")))?;
            session
                .userauth_password(&username, &password)
                .map_err(|e| GatewayError::Image(format!("SFTP認証失敗: {e}")))?;

            let sftp = session
                .sftp()
                .map_err(|e| GatewayError::Image(format!("SFTPチャネルの確立失敗: {e}")))?;
            let mut file = sftp
                .open(std::path::Path::new(&path))
                .map_err(|e| GatewayError::Image(format!("{path} が開けません: {e}")))?;

            let mut buffer = Vec::new();
            file.read_to_end(&mut buffer)
                .map_err(|e| GatewayError::Image(format!("{path} の読み取り失敗: {e}")))?;
            Ok(buffer)
        })
        .await
        .map_err(|e| GatewayError::Internal(format!("ブロッキングタスクの実行失敗: {e}")))?
    }
}
