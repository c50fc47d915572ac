//! # Healthcare+ インフラ層
//!
//! 外部システムとの接続・通信を担当するインフラストラクチャ層。
//!
//! ## 責務
//!
//! - **データベース接続**: ジョブ実行ごとの接続確立と解放
//! - **リポジトリ実装**: 予約データの読み取り
//! - **メール送信**: SMTP（STARTTLS + 認証）による通知送信
//!
//! ## 依存関係
//!
//! ```text
//! reminder-job → infra → domain
//! ```
//!
//! ## モジュール構成
//!
//! - [`db`] - データベース接続管理
//! - [`error`] - インフラ層エラー定義
//! - [`notification`] - メール送信
//! - [`repository`] - リポジトリ実装
//!
//! ## 使用例
//!
//! ```rust,ignore
//! use healthplus_infra::repository::{AppointmentConnector, PostgresAppointmentConnector};
//!
//! async fn example(settings: DatabaseSettings, window: ReminderWindow) -> Result<(), InfraError> {
//!     let connector = PostgresAppointmentConnector::new(settings);
//!     let repo = connector.connect().await?;
//!     let reminders = repo.find_patient_reminders(&window).await;
//!     repo.close().await;
//!     println!("{} reminders", reminders?.len());
//!     Ok(())
//! }
//! ```

pub mod db;
pub mod error;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod notification;
pub mod repository;

pub use error::{InfraError, InfraErrorKind};
