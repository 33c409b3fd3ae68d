//! Errors - リスナーリストのエラー型
//!
//! 「リスナーが見つからない」「リスナーが既に破棄されている」はエラーではなく
//! 正常な no-op として扱います。ここに並ぶのは構築時の設定エラーと、
//! executor へのジョブ投入失敗だけです。

use thiserror::Error;

/// ListenerError は WeakListenerList と executor の操作エラー
#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("invalid config: {field} {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("config parse: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("executor rejected job: {0}")]
    ExecutorRejected(String),

    #[error("no tokio runtime is running on this thread")]
    NoRuntime,
}
