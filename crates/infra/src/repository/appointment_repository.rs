//! # AppointmentRepository
//!
//! リマインダー対象の予約を読み取るリポジトリ。
//!
//! ## 設計方針
//!
//! - **読み取り専用**: 予約・患者・医師・ユーザーのどのテーブルにも書き込まない
//! - **日付はバインド変数**: 「今日」は DB サーバーの時計ではなくジョブの Clock で決め、
//!   `$1`（今日）と `$2`（明日）として渡す。メール本文の today / tomorrow 判定と一致させるため
//! - **接続のスコープ**: [`AppointmentConnector::connect`] で 1 回の実行分の接続を開き、
//!   [`AppointmentRepository::close`] で閉じる

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use healthplus_domain::appointment::{PatientReminder, ProviderAppointment, ReminderWindow};
use sqlx::PgPool;

use crate::{
    db::{self, DatabaseSettings},
    error::InfraError,
};

/// 予約リポジトリトレイト
///
/// 1 回のジョブ実行の間だけ有効な接続を保持する。
#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    /// 患者リマインダーを取得する
    ///
    /// 対象期間内の予約 1 件につき 1 行。日付・時刻の昇順。
    async fn find_patient_reminders(
        &self,
        window: &ReminderWindow,
    ) -> Result<Vec<PatientReminder>, InfraError>;

    /// 医師別予約行を取得する
    ///
    /// 医師 ID・日付・時刻の昇順。この順序がグルーピング後の順序になる。
    async fn find_provider_appointments(
        &self,
        window: &ReminderWindow,
    ) -> Result<Vec<ProviderAppointment>, InfraError>;

    /// 接続を閉じる
    ///
    /// 失敗しても呼び出し側に伝えない（閉じられない接続に対してできることはない）。
    async fn close(&self);
}

/// 予約リポジトリの接続を開くトレイト
#[async_trait]
pub trait AppointmentConnector: Send + Sync {
    /// 接続を開き、その接続を使うリポジトリを返す
    async fn connect(&self) -> Result<Box<dyn AppointmentRepository>, InfraError>;
}

/// PostgreSQL 実装の AppointmentConnector
#[derive(Debug, Clone)]
pub struct PostgresAppointmentConnector {
    settings: DatabaseSettings,
}

impl PostgresAppointmentConnector {
    pub fn new(settings: DatabaseSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl AppointmentConnector for PostgresAppointmentConnector {
    async fn connect(&self) -> Result<Box<dyn AppointmentRepository>, InfraError> {
        let pool = db::connect(&self.settings).await?;
        Ok(Box::new(PostgresAppointmentRepository::new(pool)))
    }
}

/// PostgreSQL 実装の AppointmentRepository
#[derive(Debug, Clone)]
pub struct PostgresAppointmentRepository {
    pool: PgPool,
}

impl PostgresAppointmentRepository {
    /// 新しいリポジトリインスタンスを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct PatientReminderRow {
    email: String,
    name:  String,
    date:  NaiveDate,
    time:  NaiveTime,
}

#[derive(sqlx::FromRow)]
struct ProviderAppointmentRow {
    provider_email: String,
    provider_name:  String,
    date:           NaiveDate,
    time:           NaiveTime,
    patient_name:   String,
}

#[async_trait]
impl AppointmentRepository for PostgresAppointmentRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(today = %window.today()))]
    async fn find_patient_reminders(
        &self,
        window: &ReminderWindow,
    ) -> Result<Vec<PatientReminder>, InfraError> {
        let rows = sqlx::query_as::<_, PatientReminderRow>(
            r#"
            SELECT u.email, u.name, a.date, a.time
            FROM Appointments a
            JOIN Patients p ON a.patient_id = p.id
            JOIN Users u ON p.user_id = u.id
            WHERE a.date IN ($1, $2)
            ORDER BY a.date, a.time
            "#,
        )
        .bind(window.today())
        .bind(window.tomorrow())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| PatientReminder {
                email: row.email,
                name:  row.name,
                date:  row.date,
                time:  row.time,
            })
            .collect())
    }

    #[tracing::instrument(skip_all, level = "debug", fields(today = %window.today()))]
    async fn find_provider_appointments(
        &self,
        window: &ReminderWindow,
    ) -> Result<Vec<ProviderAppointment>, InfraError> {
        let rows = sqlx::query_as::<_, ProviderAppointmentRow>(
            r#"
            SELECT
                u.email AS provider_email,
                u.name AS provider_name,
                a.date,
                a.time,
                pu.name AS patient_name
            FROM Appointments a
            JOIN Providers pr ON a.provider_id = pr.id
            JOIN Patients p ON a.patient_id = p.id
            JOIN Users pu ON p.user_id = pu.id
            JOIN Users u ON pr.user_id = u.id
            WHERE a.date IN ($1, $2)
            ORDER BY pr.id, a.date, a.time
            "#,
        )
        .bind(window.today())
        .bind(window.tomorrow())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| ProviderAppointment {
                provider_email: row.provider_email,
                provider_name:  row.provider_name,
                date:           row.date,
                time:           row.time,
                patient_name:   row.patient_name,
            })
            .collect())
    }

    async fn close(&self) {
        self.pool.close().await;
        tracing::debug!("データベース接続を閉じました");
    }
}
