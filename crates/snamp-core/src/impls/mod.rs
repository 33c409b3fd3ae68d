//! Impls - Executor の実装
//!
//! # 含まれる実装
//! - **InlineExecutor**: 呼び出しスレッドで即実行（テスト・デバッグ用）
//! - **TokioExecutor**: tokio の blocking pool で実行
//! - **ThreadExecutor**: ジョブごとに名前付き OS スレッドで実行
//!
//! どの実装もジョブを [`run_isolated`] 経由で実行し、panic を投入元へ
//! 伝播させません。

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use tracing::warn;

use crate::ports::Job;

pub mod inline;
pub mod thread;
pub mod tokio_executor;

pub use self::inline::InlineExecutor;
pub use self::thread::ThreadExecutor;
pub use self::tokio_executor::TokioExecutor;

/// Run `job`, logging and swallowing a panic instead of unwinding further.
///
/// Returns `false` when the job panicked.
pub(crate) fn run_isolated(job: Job) -> bool {
    match panic::catch_unwind(AssertUnwindSafe(move || job())) {
        Ok(()) => true,
        Err(payload) => {
            warn!(panic = %panic_message(payload.as_ref()), "listener job panicked");
            false
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.as_str()
    } else {
        "<non-string panic payload>"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_isolated_reports_success() {
        assert!(run_isolated(Box::new(|| {})));
    }

    #[test]
    fn run_isolated_swallows_panics() {
        assert!(!run_isolated(Box::new(|| panic!("boom"))));
    }

    #[test]
    fn panic_message_reads_both_string_kinds() {
        let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
        let borrowed: Box<dyn Any + Send> = Box::new("borrowed");
        let other: Box<dyn Any + Send> = Box::new(42_u8);
        assert_eq!(panic_message(owned.as_ref()), "owned");
        assert_eq!(panic_message(borrowed.as_ref()), "borrowed");
        assert_eq!(panic_message(other.as_ref()), "<non-string panic payload>");
    }
}
