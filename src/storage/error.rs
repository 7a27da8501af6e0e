//! Session log error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while writing the session log.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The data directory could not be created.
    #[error("データディレクトリの作成に失敗しました: {path}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The log file could not be opened.
    #[error("セッションログを開けませんでした: {path}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing a record failed.
    #[error("セッションログへの書き込みに失敗しました: {0}")]
    Write(#[from] std::io::Error),

    /// No home directory to place the default log in.
    #[error("ホームディレクトリが見つかりません")]
    NoHomeDir,

    /// Generic failure reported by a storage backend.
    #[error("セッションログエラー: {0}")]
    Backend(String),
}
