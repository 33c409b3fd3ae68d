//! Config - WeakListenerList の設定
//!
//! JSON から読む場合も builder から組み立てる場合も、最後は
//! [`ListenerListConfig::validate`] を通します（Fail-fast）。

use serde::{Deserialize, Serialize};

use crate::domain::errors::ListenerError;

/// Async fan-out tuning for a listener list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListenerListConfig {
    /// `fire_async` submits one job per listener while the snapshot holds at
    /// most this many handles.
    pub inline_fanout_limit: usize,

    /// Above the inline limit the snapshot is split until every chunk holds
    /// at most this many handles; one job per chunk.
    pub chunk_size: usize,
}

impl ListenerListConfig {
    pub const DEFAULT_INLINE_FANOUT_LIMIT: usize = 4;
    pub const DEFAULT_CHUNK_SIZE: usize = 16;

    /// Parse and validate a JSON document. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ListenerError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ListenerError> {
        if self.chunk_size == 0 {
            return Err(ListenerError::InvalidConfig {
                field: "chunk_size",
                reason: "must be greater than 0".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for ListenerListConfig {
    fn default() -> Self {
        Self {
            inline_fanout_limit: Self::DEFAULT_INLINE_FANOUT_LIMIT,
            chunk_size: Self::DEFAULT_CHUNK_SIZE,
        }
    }
}
