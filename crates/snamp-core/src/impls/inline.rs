//! InlineExecutor - 呼び出しスレッドでそのまま実行する Executor
//!
//! `fire_async` を決定的にテストしたいときに使います。

use crate::domain::errors::ListenerError;
use crate::impls::run_isolated;
use crate::ports::{Executor, Job};

#[derive(Debug, Clone, Copy, Default)]
pub struct InlineExecutor;

impl InlineExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl Executor for InlineExecutor {
    fn execute(&self, job: Job) -> Result<(), ListenerError> {
        run_isolated(job);
        Ok(())
    }
}
