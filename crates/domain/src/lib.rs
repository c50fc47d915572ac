//! # Healthcare+ ドメイン層
//!
//! 予約リマインダー送信ジョブのドメインモデルを定義する。
//!
//! ## 設計方針
//!
//! - **I/O を持たない**: DB・SMTP への依存はインフラ層に閉じ込める
//! - **決定的**: 「今日」は [`clock::Clock`] から受け取り、テストで固定できる
//! - **読み取り専用**: 予約データを生成・更新する操作は存在しない
//!
//! ## 依存関係の方向
//!
//! ```text
//! reminder-job → infra → domain
//!        ↘                 ↑
//!          ────────────────
//! ```
//!
//! ## モジュール構成
//!
//! - [`appointment`] - 予約行、リマインダー対象期間、医師ごとのグルーピング
//! - [`clock`] - 日付プロバイダ
//! - [`notification`] - 通知イベントとメールメッセージ
//!
//! ## 使用例
//!
//! ```rust
//! use chrono::NaiveDate;
//! use healthplus_domain::appointment::{DayReference, ReminderWindow};
//!
//! let today = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
//! let window = ReminderWindow::starting(today);
//!
//! assert_eq!(window.day_reference(today), DayReference::Today);
//! assert_eq!(window.day_reference(window.tomorrow()).to_string(), "tomorrow");
//! ```

pub mod appointment;
pub mod clock;
pub mod notification;
