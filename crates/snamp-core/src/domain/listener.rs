//! Listener trait - イベントを受け取る側の定義
//!
//! `WeakListenerList::add` はこの trait を既定の呼び出し戦略として使います。
//! 任意のクロージャで呼び出したい場合は `add_with` を使ってください。
//!
//! # 使用例
//! ```ignore
//! struct Printer;
//!
//! impl Listener<String> for Printer {
//!     fn on_event(&self, event: &String) {
//!         println!("{event}");
//!     }
//! }
//! ```

/// Listener は 1 種類のイベント `E` を受け取る
///
/// # Thread Safety
/// - `Send + Sync` を要求（非同期 fan-out で別スレッドから呼ばれるため）
pub trait Listener<E: ?Sized>: Send + Sync {
    fn on_event(&self, event: &E);
}
