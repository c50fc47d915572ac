//! # テスト用モック
//!
//! ジョブのテストで使用するインメモリモック。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! healthplus-infra = { workspace = true, features = ["test-utils"] }
//! ```

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use healthplus_domain::{
    appointment::{PatientReminder, ProviderAppointment, ReminderWindow},
    notification::{EmailMessage, NotificationError},
};

use crate::{
    error::InfraError,
    notification::NotificationSender,
    repository::{AppointmentConnector, AppointmentRepository},
};

// ===== MockAppointmentConnector =====

/// 失敗させる操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    Connect,
    PatientQuery,
    ProviderQuery,
}

#[derive(Default)]
struct AppointmentState {
    patients:      Vec<PatientReminder>,
    providers:     Vec<ProviderAppointment>,
    failure:       Option<MockFailure>,
    connect_calls: usize,
    close_calls:   usize,
}

/// インメモリの予約データ
///
/// 期間外の行を登録しておくと、リポジトリが対象期間で絞り込むことを確認できる。
/// 医師別予約行は登録順に返す（ソート済みで登録すること）。
#[derive(Clone, Default)]
pub struct MockAppointmentConnector {
    state: Arc<Mutex<AppointmentState>>,
}

impl MockAppointmentConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_patient_reminder(&self, reminder: PatientReminder) {
        self.state.lock().unwrap().patients.push(reminder);
    }

    pub fn add_provider_appointment(&self, appointment: ProviderAppointment) {
        self.state.lock().unwrap().providers.push(appointment);
    }

    pub fn fail_on(&self, failure: MockFailure) {
        self.state.lock().unwrap().failure = Some(failure);
    }

    pub fn connect_calls(&self) -> usize {
        self.state.lock().unwrap().connect_calls
    }

    pub fn close_calls(&self) -> usize {
        self.state.lock().unwrap().close_calls
    }

    fn fails_on(&self, failure: MockFailure) -> bool {
        self.state.lock().unwrap().failure == Some(failure)
    }
}

#[async_trait]
impl AppointmentConnector for MockAppointmentConnector {
    async fn connect(&self) -> Result<Box<dyn AppointmentRepository>, InfraError> {
        self.state.lock().unwrap().connect_calls += 1;
        if self.fails_on(MockFailure::Connect) {
            return Err(InfraError::connection(sqlx::Error::PoolTimedOut));
        }
        Ok(Box::new(self.clone()))
    }
}

#[async_trait]
impl AppointmentRepository for MockAppointmentConnector {
    async fn find_patient_reminders(
        &self,
        window: &ReminderWindow,
    ) -> Result<Vec<PatientReminder>, InfraError> {
        if self.fails_on(MockFailure::PatientQuery) {
            return Err(sqlx::Error::Protocol("patient query failed".to_string()).into());
        }
        Ok(self
            .state
            .lock()
            .unwrap()
            .patients
            .iter()
            .filter(|r| window.contains(r.date))
            .cloned()
            .collect())
    }

    async fn find_provider_appointments(
        &self,
        window: &ReminderWindow,
    ) -> Result<Vec<ProviderAppointment>, InfraError> {
        if self.fails_on(MockFailure::ProviderQuery) {
            return Err(sqlx::Error::Protocol("provider query failed".to_string()).into());
        }
        Ok(self
            .state
            .lock()
            .unwrap()
            .providers
            .iter()
            .filter(|a| window.contains(a.date))
            .cloned()
            .collect())
    }

    async fn close(&self) {
        self.state.lock().unwrap().close_calls += 1;
    }
}

// ===== MockNotificationSender =====

/// 送信内容を記録するメール送信モック
///
/// `fail_for` で指定した宛先への送信は `SendFailed` を返す（記録はしない）。
#[derive(Clone, Default)]
pub struct MockNotificationSender {
    sent:       Arc<Mutex<Vec<EmailMessage>>>,
    attempts:   Arc<Mutex<Vec<String>>>,
    failing_to: Arc<Mutex<Vec<String>>>,
}

impl MockNotificationSender {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_for(&self, address: impl Into<String>) {
        self.failing_to.lock().unwrap().push(address.into());
    }

    /// 送信に成功したメール
    pub fn sent_emails(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }

    /// 送信を試みた宛先（失敗を含む、試行順）
    pub fn attempted_recipients(&self) -> Vec<String> {
        self.attempts.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSender for MockNotificationSender {
    async fn send_email(&self, email: &EmailMessage) -> Result<(), NotificationError> {
        self.attempts.lock().unwrap().push(email.to.clone());
        if self.failing_to.lock().unwrap().contains(&email.to) {
            return Err(NotificationError::SendFailed(format!(
                "550 mailbox unavailable: {}",
                email.to
            )));
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}
