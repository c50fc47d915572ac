//! # ユースケース層
//!
//! リマインダージョブ 1 回分の実行と、その中で使う通知サービスを提供する。

pub mod notification;
pub mod reminder_job;

pub use reminder_job::{JobPhase, ReminderJob, RunReport};
