//! TokioExecutor - tokio の blocking pool で実行する Executor
//!
//! リスナーのコールバックは同期関数なので `spawn` ではなく
//! `spawn_blocking` を使います（async worker を塞がないため）。

use tokio::runtime::Handle;

use crate::domain::errors::ListenerError;
use crate::impls::run_isolated;
use crate::ports::{Executor, Job};

/// Executor backed by a Tokio runtime handle.
#[derive(Debug, Clone)]
pub struct TokioExecutor {
    handle: Handle,
}

impl TokioExecutor {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Bind to the runtime the calling thread is running in.
    pub fn current() -> Result<Self, ListenerError> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|_| ListenerError::NoRuntime)
    }
}

impl Executor for TokioExecutor {
    fn execute(&self, job: Job) -> Result<(), ListenerError> {
        // JoinHandle は捨てる（完了通知は返さない）
        drop(self.handle.spawn_blocking(move || run_isolated(job)));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::oneshot;

    #[test]
    fn current_fails_outside_runtime() {
        let err = TokioExecutor::current().unwrap_err();
        assert!(matches!(err, ListenerError::NoRuntime));
    }

    #[tokio::test]
    async fn executes_job_on_blocking_pool() {
        let executor = TokioExecutor::current().unwrap();
        let (tx, rx) = oneshot::channel();
        executor
            .execute(Box::new(move || {
                let _ = tx.send(std::thread::current().id());
            }))
            .unwrap();

        let worker = tokio::time::timeout(Duration::from_secs(5), rx)
            .await
            .unwrap()
            .unwrap();
        assert_ne!(worker, std::thread::current().id());
    }

    #[tokio::test]
    async fn panicking_job_does_not_break_executor() {
        let executor = TokioExecutor::current().unwrap();
        executor.execute(Box::new(|| panic!("boom"))).unwrap();

        let (tx, rx) = oneshot::channel();
        executor
            .execute(Box::new(move || {
                let _ = tx.send(());
            }))
            .unwrap();
        tokio::time::timeout(Duration::from_secs(5), rx)
            .await
            .unwrap()
            .unwrap();
    }
}
