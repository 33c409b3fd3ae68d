//! ListenerListBuilder - WeakListenerList の構築
//!
//! # Fail-fast 設計
//! - setter で設定を積み上げ、`build()` で一度だけ検証する
//! - 不正な値は `ListenerError::InvalidConfig` として構築時に返す
//!
//! # 使用例
//! ```ignore
//! let list: WeakListenerList<MyListener, MyEvent> = ListenerListBuilder::new()
//!     .inline_fanout_limit(8)
//!     .chunk_size(32)
//!     .build()?;
//! ```

use crate::domain::config::ListenerListConfig;
use crate::domain::errors::ListenerError;
use crate::listeners::list::WeakListenerList;

#[derive(Debug, Clone, Default)]
pub struct ListenerListBuilder {
    config: ListenerListConfig,
}

impl ListenerListBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing config (e.g. one loaded from JSON).
    pub fn config(mut self, config: ListenerListConfig) -> Self {
        self.config = config;
        self
    }

    pub fn inline_fanout_limit(mut self, limit: usize) -> Self {
        self.config.inline_fanout_limit = limit;
        self
    }

    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    pub fn build<L: ?Sized, E: ?Sized>(self) -> Result<WeakListenerList<L, E>, ListenerError> {
        self.config.validate()?;
        Ok(WeakListenerList::from_valid_config(self.config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Noop;

    #[test]
    fn test_build_with_defaults() {
        let list: WeakListenerList<Noop, ()> = ListenerListBuilder::new().build().unwrap();
        assert_eq!(list.config(), &ListenerListConfig::default());
    }

    #[test]
    fn test_build_with_overrides() {
        let list: WeakListenerList<Noop, ()> = ListenerListBuilder::new()
            .inline_fanout_limit(1)
            .chunk_size(64)
            .build()
            .unwrap();
        assert_eq!(list.config().inline_fanout_limit, 1);
        assert_eq!(list.config().chunk_size, 64);
    }

    #[test]
    fn test_build_from_json_config() {
        let config = ListenerListConfig::from_json(r#"{"inline_fanout_limit": 2}"#).unwrap();
        let list: WeakListenerList<Noop, ()> =
            ListenerListBuilder::new().config(config).chunk_size(5).build().unwrap();
        assert_eq!(list.config().inline_fanout_limit, 2);
        assert_eq!(list.config().chunk_size, 5);
    }

    #[test]
    fn test_build_rejects_zero_chunk_size() {
        let result = ListenerListBuilder::new()
            .chunk_size(0)
            .build::<Noop, ()>();
        assert!(matches!(
            result,
            Err(ListenerError::InvalidConfig { field: "chunk_size", .. })
        ));
    }
}
