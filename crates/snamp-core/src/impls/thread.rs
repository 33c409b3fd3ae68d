//! ThreadExecutor - ジョブごとに OS スレッドを起こす Executor
//!
//! tokio を使わない呼び出し側向け。スレッド生成に失敗した場合は
//! `ExecutorRejected` を返します。

use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;

use tracing::debug;

use crate::domain::errors::ListenerError;
use crate::impls::run_isolated;
use crate::ports::{Executor, Job};

#[derive(Debug)]
pub struct ThreadExecutor {
    name_prefix: String,
    next_id: AtomicU64,
}

impl ThreadExecutor {
    /// Threads are named `{name_prefix}-{n}`.
    pub fn new(name_prefix: impl Into<String>) -> Self {
        Self {
            name_prefix: name_prefix.into(),
            next_id: AtomicU64::new(1),
        }
    }
}

impl Default for ThreadExecutor {
    fn default() -> Self {
        Self::new("snamp-listener")
    }
}

impl Executor for ThreadExecutor {
    fn execute(&self, job: Job) -> Result<(), ListenerError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let name = format!("{}-{}", self.name_prefix, id);
        thread::Builder::new()
            .name(name.clone())
            .spawn(move || {
                run_isolated(job);
            })
            .map(|_| ())
            .map_err(|e| {
                debug!(thread = %name, error = %e, "thread spawn rejected");
                ListenerError::ExecutorRejected(e.to_string())
            })
    }
}
