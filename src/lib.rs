//! 健身房缺勤检查
//!
//! 定时扫描所有会员，为超过阈值天数未到馆的会员写入提醒记录，
//! 由下游消费者负责发送和清理。

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

pub use config::Config;
pub use error::{AppError, Result};
pub use services::{InMemoryStore, Reconciler, ReconcilerOptions, RecordStore, RunReport};
