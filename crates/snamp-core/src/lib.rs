//! snamp-core
//!
//! Weak-reference event listener lists for the SNAMP management framework.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（Listener trait, config, errors）
//! - **ports**: 抽象化レイヤー（Executor）
//! - **impls**: Executor の実装（Inline / Tokio / Thread）
//! - **listeners**: WeakListenerList 本体（handle, list, snapshot, builder）
//! - **observability**: ListenerCounts

pub mod domain;
pub mod impls;
pub mod listeners;
pub mod observability;
pub mod ports;

pub use crate::domain::{Listener, ListenerError, ListenerListConfig};
pub use crate::listeners::{ListenerHandle, ListenerListBuilder, WeakListenerList};
pub use crate::ports::Executor;
