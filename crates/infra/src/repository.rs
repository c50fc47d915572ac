//! # リポジトリ実装
//!
//! ジョブが読み取るデータへのアクセスを提供する。
//!
//! ## 設計方針
//!
//! - **データベース抽象化**: sqlx を使用し、PostgreSQL 固有の処理をカプセル化
//! - **テスタビリティ**: トレイト経由でモック可能な設計

pub mod appointment_repository;

pub use appointment_repository::{
    AppointmentConnector,
    AppointmentRepository,
    PostgresAppointmentConnector,
    PostgresAppointmentRepository,
};
