//! # ReminderJob
//!
//! 1 回分のリマインダー送信を実行する。
//!
//! ## フェーズ
//!
//! ```text
//! Idle → Connecting → QueryingPatients → SendingPatientReminders
//!      → QueryingProviders → SendingProviderSchedules → ClosingConnection → Idle
//! ```
//!
//! 接続・クエリの失敗は実行を中断し（`Failed`）、以降のメールは送らない。
//! 送信の失敗は宛先ごとに分離し、実行レポートに集めて後続の送信を続ける。
//! 患者リマインダーの送信失敗があっても医師別スケジュールのフェーズは実行する。
//! 接続はどの経路で終わっても閉じる。

use std::sync::Arc;

use chrono::NaiveDate;
use healthplus_domain::{
    appointment::{ReminderWindow, group_by_provider},
    clock::Clock,
    notification::ReminderNotification,
};
use healthplus_infra::repository::{AppointmentConnector, AppointmentRepository};
use healthplus_shared::{
    event_log::{error as log_error, event},
    log_business_event,
};
use tracing::Instrument;
use uuid::Uuid;

use super::notification::{DeliveryFailure, NotificationService};
use crate::error::JobError;

/// 実行フェーズ
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum JobPhase {
    Idle,
    Connecting,
    QueryingPatients,
    SendingPatientReminders,
    QueryingProviders,
    SendingProviderSchedules,
    ClosingConnection,
    Failed,
}

/// 1 回分の実行結果
#[derive(Debug)]
pub struct RunReport {
    /// 実行日
    pub today:                   NaiveDate,
    /// 送信できた患者リマインダーの数
    pub patient_reminders_sent:  usize,
    /// 送信できた医師別スケジュールの数
    pub provider_schedules_sent: usize,
    /// 送信できなかったメール（試行順）
    pub failures:                Vec<DeliveryFailure>,
}

impl RunReport {
    fn new(today: NaiveDate) -> Self {
        Self {
            today,
            patient_reminders_sent:  0,
            provider_schedules_sent: 0,
            failures:                Vec::new(),
        }
    }

    /// 全宛先への送信に成功したか
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn sent(&self) -> usize {
        self.patient_reminders_sent + self.provider_schedules_sent
    }
}

/// リマインダージョブ
pub struct ReminderJob {
    connector:     Arc<dyn AppointmentConnector>,
    notifications: NotificationService,
    clock:         Arc<dyn Clock>,
}

impl ReminderJob {
    pub fn new(
        connector: Arc<dyn AppointmentConnector>,
        notifications: NotificationService,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            connector,
            notifications,
            clock,
        }
    }

    /// 1 回分を実行し、開始・結果をログに出力する
    ///
    /// `reminder_run` スパン（`run_id` 付き）の中で実行する。
    /// 実行を中断した場合はエラーログを 1 件だけ出力する。
    pub async fn execute(&self) -> Result<RunReport, JobError> {
        let span = tracing::info_span!("reminder_run", run_id = %Uuid::now_v7());

        async {
            log_business_event!(
                event.category = event::category::REMINDER_RUN,
                event.action = event::action::RUN_STARTED,
                event.result = event::result::SUCCESS,
                "リマインダー送信を開始"
            );

            let result = self.run().await;

            match &result {
                Ok(report) => {
                    let outcome = if report.is_success() {
                        event::result::SUCCESS
                    } else {
                        event::result::PARTIAL_FAILURE
                    };
                    log_business_event!(
                        event.category = event::category::REMINDER_RUN,
                        event.action = event::action::RUN_COMPLETED,
                        event.result = outcome,
                        run.today = %report.today,
                        run.patient_reminders_sent = report.patient_reminders_sent,
                        run.provider_schedules_sent = report.provider_schedules_sent,
                        run.sent = report.sent(),
                        run.failed = report.failures.len(),
                        "リマインダー送信が完了"
                    );
                }
                Err(e) => {
                    tracing::error!(
                        event.category = event::category::REMINDER_RUN,
                        event.action = event::action::RUN_ABORTED,
                        event.result = event::result::FAILURE,
                        error.category = log_error::category::INFRASTRUCTURE,
                        error.kind = e.log_kind(),
                        run.phase = %e.phase(),
                        error = %e,
                        "リマインダー送信を中断"
                    );
                }
            }

            result
        }
        .instrument(span)
        .await
    }

    /// 1 回分を実行する
    ///
    /// 接続に成功した場合、フェーズの成否にかかわらず接続を閉じてから戻る。
    pub async fn run(&self) -> Result<RunReport, JobError> {
        let window = ReminderWindow::starting(self.clock.today());

        enter(JobPhase::Connecting);
        let repository = match self.connector.connect().await {
            Ok(repository) => repository,
            Err(e) => {
                enter(JobPhase::Failed);
                return Err(JobError::database(JobPhase::Connecting, e));
            }
        };

        let result = self.run_phases(repository.as_ref(), &window).await;
        if result.is_err() {
            enter(JobPhase::Failed);
        }

        enter(JobPhase::ClosingConnection);
        repository.close().await;
        enter(JobPhase::Idle);

        result
    }

    async fn run_phases(
        &self,
        repository: &dyn AppointmentRepository,
        window: &ReminderWindow,
    ) -> Result<RunReport, JobError> {
        let mut report = RunReport::new(window.today());

        enter(JobPhase::QueryingPatients);
        let reminders = repository
            .find_patient_reminders(window)
            .await
            .map_err(|e| JobError::database(JobPhase::QueryingPatients, e))?;

        enter(JobPhase::SendingPatientReminders);
        for reminder in reminders {
            let notification = ReminderNotification::patient_reminder(reminder, window);
            match self.notifications.notify(notification).await {
                Ok(()) => report.patient_reminders_sent += 1,
                Err(failure) => report.failures.push(failure),
            }
        }

        enter(JobPhase::QueryingProviders);
        let appointments = repository
            .find_provider_appointments(window)
            .await
            .map_err(|e| JobError::database(JobPhase::QueryingProviders, e))?;

        enter(JobPhase::SendingProviderSchedules);
        for schedule in group_by_provider(appointments) {
            let notification = ReminderNotification::provider_schedule(schedule);
            match self.notifications.notify(notification).await {
                Ok(()) => report.provider_schedules_sent += 1,
                Err(failure) => report.failures.push(failure),
            }
        }

        Ok(report)
    }
}

fn enter(phase: JobPhase) {
    tracing::debug!(run.phase = %phase, "フェーズ遷移");
}
