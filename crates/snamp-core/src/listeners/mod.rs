//! Listeners - 弱参照リスナーリスト本体
//!
//! # 構成
//! - **handle**: `ListenerHandle`（弱参照 + 呼び出し戦略）と `Referent`
//! - **list**: `WeakListenerList`（copy-on-write のリスト本体）
//! - **snapshot**: snapshot 上のイテレータと分割可能な区間
//! - **builder**: 設定を検証して `WeakListenerList` を作る

pub mod builder;
pub mod handle;
pub mod list;
pub mod snapshot;

pub use self::builder::ListenerListBuilder;
pub use self::handle::{Invoker, ListenerHandle, Referent};
pub use self::list::WeakListenerList;
pub use self::snapshot::{Iter, Spliterator};
