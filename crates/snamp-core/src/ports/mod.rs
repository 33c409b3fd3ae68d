//! Ports - 抽象化レイヤー
//!
//! リスナーリストが外部に依存するのは「ジョブを実行する何か」だけです。

pub mod executor;

pub use self::executor::{Executor, Job};
