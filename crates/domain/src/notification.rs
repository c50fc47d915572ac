//! # 通知
//!
//! リマインダーメールに関するドメインモデルを定義する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | 宛先 |
//! |---|------------|------|
//! | [`ReminderNotification::PatientReminder`] | 患者リマインダー | 患者（予約 1 件につき 1 通） |
//! | [`ReminderNotification::ProviderSchedule`] | 医師別スケジュール | 医師（1 名につき 1 通） |
//!
//! ## 設計方針
//!
//! - **enum による通知イベント**: 各バリアントがメール種別に対応
//! - **送信単位の失敗分離**: 1 通の送信失敗は他の宛先への送信に影響しない
//! - **テンプレート分離**: 通知イベントとメール生成は分離（TemplateRenderer は reminder-job）

use chrono::{NaiveDate, NaiveTime};
use strum::IntoStaticStr;
use thiserror::Error;

use crate::appointment::{
    DayReference,
    PatientReminder,
    ProviderSchedule,
    ReminderWindow,
    ScheduleEntry,
};

/// 通知送信エラー
#[derive(Debug, Error)]
pub enum NotificationError {
    /// 宛先・送信元アドレスが不正
    #[error("メールアドレスが不正: {0}")]
    InvalidAddress(String),

    /// メール送信に失敗
    #[error("メール送信に失敗: {0}")]
    SendFailed(String),

    /// テンプレートレンダリングに失敗
    #[error("テンプレートレンダリングに失敗: {0}")]
    TemplateFailed(String),
}

/// 通知イベント種別
///
/// ログの `notification.event_type` フィールドに出力される値。
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr, strum::Display, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum NotificationEventType {
    PatientReminder,
    ProviderSchedule,
}

/// メールメッセージ
///
/// テンプレートレンダリングの出力。NotificationSender に渡される。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    /// 送信先メールアドレス
    pub to:        String,
    /// 件名
    pub subject:   String,
    /// HTML 本文
    pub html_body: String,
    /// プレーンテキスト本文
    pub text_body: String,
}

/// リマインダー通知イベント
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReminderNotification {
    /// 患者リマインダー: 予約 1 件ごとに患者へ送信
    PatientReminder {
        patient_email: String,
        patient_name:  String,
        date:          NaiveDate,
        time:          NaiveTime,
        day:           DayReference,
    },
    /// 医師別スケジュール: 対象期間の予約をまとめて医師へ送信
    ProviderSchedule {
        provider_email: String,
        provider_name:  String,
        entries:        Vec<ScheduleEntry>,
    },
}

impl ReminderNotification {
    /// 患者向けクエリの 1 行から通知を作る
    pub fn patient_reminder(reminder: PatientReminder, window: &ReminderWindow) -> Self {
        let day = window.day_reference(reminder.date);
        Self::PatientReminder {
            patient_email: reminder.email,
            patient_name: reminder.name,
            date: reminder.date,
            time: reminder.time,
            day,
        }
    }

    /// グルーピング済みのスケジュールから通知を作る
    pub fn provider_schedule(schedule: ProviderSchedule) -> Self {
        Self::ProviderSchedule {
            provider_email: schedule.provider.email,
            provider_name:  schedule.provider.name,
            entries:        schedule.entries,
        }
    }

    /// 通知イベント種別を返す
    pub fn event_type(&self) -> NotificationEventType {
        match self {
            Self::PatientReminder { .. } => NotificationEventType::PatientReminder,
            Self::ProviderSchedule { .. } => NotificationEventType::ProviderSchedule,
        }
    }

    /// 受信者のメールアドレスを返す
    pub fn recipient_email(&self) -> &str {
        match self {
            Self::PatientReminder { patient_email, .. } => patient_email,
            Self::ProviderSchedule { provider_email, .. } => provider_email,
        }
    }

    /// 受信者の名前を返す
    pub fn recipient_name(&self) -> &str {
        match self {
            Self::PatientReminder { patient_name, .. } => patient_name,
            Self::ProviderSchedule { provider_name, .. } => provider_name,
        }
    }
}
