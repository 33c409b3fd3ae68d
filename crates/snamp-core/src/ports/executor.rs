//! Executor port - 非同期ディスパッチの実行基盤の抽象化
//!
//! リスナーリスト自身はスレッドを持ちません。`parallel_for_each` と
//! `fire_async` は呼び出し側から渡された Executor にジョブを投げるだけです。
//! スレッドプールのサイズ、拒否ポリシー、停止方法は Executor 側の責務です。
//!
//! # 実装
//! - **InlineExecutor**: 呼び出しスレッドでそのまま実行（テスト用）
//! - **TokioExecutor**: tokio の blocking pool に投げる
//! - **ThreadExecutor**: ジョブごとに OS スレッドを起こす

use crate::domain::errors::ListenerError;

/// A unit of work handed to an [`Executor`].
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Executor はジョブを受け取って（いつか）実行する
///
/// # 契約
/// - `Ok(())` は「受け付けた」だけを意味し、完了は保証しない
/// - ジョブ内の panic は Executor の中で閉じ込め、投入したスレッドには届けない
/// - 受け付けられない場合は `ListenerError::ExecutorRejected` を返す
pub trait Executor: Send + Sync {
    fn execute(&self, job: Job) -> Result<(), ListenerError>;
}

impl<X: Executor + ?Sized> Executor for std::sync::Arc<X> {
    fn execute(&self, job: Job) -> Result<(), ListenerError> {
        (**self).execute(job)
    }
}
