//! # テンプレートレンダラー
//!
//! tera テンプレートエンジンでリマインダーメールを HTML/plaintext 両形式で生成する。
//!
//! ## 設計方針
//!
//! - **`include_str!` によるコンパイル時埋め込み**: テンプレートはバイナリに埋め込まれる
//! - **HTML の自動エスケープ**: tera は `.html` で終わるテンプレートを自動エスケープする。
//!   患者名・医師名に `<` や `&` が含まれてもマークアップとして解釈されない
//! - **書式はレンダラーで確定**: 日付は `YYYY-MM-DD`、時刻は `HH:MM` に整形してから渡す
//! - **純粋関数**: 同じ入力からは常に同じバイト列を生成する

use healthplus_domain::{
    appointment::{DATE_FORMAT, ScheduleEntry, TIME_FORMAT},
    notification::{EmailMessage, NotificationError, ReminderNotification},
};
use serde::Serialize;
use tera::{Context, Tera};

/// 患者リマインダーの件名
pub const PATIENT_REMINDER_SUBJECT: &str = "Appointment Reminder";

/// 医師別スケジュールの件名
pub const PROVIDER_SCHEDULE_SUBJECT: &str = "Your Appointment Schedule";

/// テンプレートレンダラー
///
/// tera テンプレートエンジンをラップし、`ReminderNotification` から
/// `EmailMessage` を生成する。
pub struct TemplateRenderer {
    engine: Tera,
}

#[derive(Serialize)]
struct PatientReminderContext<'a> {
    patient_name: &'a str,
    day:          String,
    date:         String,
    time:         String,
}

#[derive(Serialize)]
struct ProviderScheduleContext<'a> {
    provider_name: &'a str,
    entries:       Vec<ScheduleRow<'a>>,
}

#[derive(Serialize)]
struct ScheduleRow<'a> {
    date:         String,
    time:         String,
    patient_name: &'a str,
}

impl<'a> From<&'a ScheduleEntry> for ScheduleRow<'a> {
    fn from(entry: &'a ScheduleEntry) -> Self {
        Self {
            date:         entry.date.format(DATE_FORMAT).to_string(),
            time:         entry.time.format(TIME_FORMAT).to_string(),
            patient_name: &entry.patient_name,
        }
    }
}

impl TemplateRenderer {
    /// 新しいレンダラーインスタンスを作成
    ///
    /// `include_str!` で埋め込んだテンプレートを tera に登録する。
    pub fn new() -> Result<Self, NotificationError> {
        let mut engine = Tera::default();

        engine
            .add_raw_templates(vec![
                (
                    "patient_reminder.html",
                    include_str!("../../../templates/notifications/patient_reminder.html"),
                ),
                (
                    "patient_reminder.txt",
                    include_str!("../../../templates/notifications/patient_reminder.txt"),
                ),
                (
                    "provider_schedule.html",
                    include_str!("../../../templates/notifications/provider_schedule.html"),
                ),
                (
                    "provider_schedule.txt",
                    include_str!("../../../templates/notifications/provider_schedule.txt"),
                ),
            ])
            .map_err(|e| NotificationError::TemplateFailed(e.to_string()))?;

        Ok(Self { engine })
    }

    /// 通知イベントからメールメッセージを生成する
    pub fn render(
        &self,
        notification: &ReminderNotification,
    ) -> Result<EmailMessage, NotificationError> {
        let (template_name, subject, context) = Self::build_template_params(notification)?;

        let html_body = self
            .engine
            .render(&format!("{template_name}.html"), &context)
            .map_err(|e| NotificationError::TemplateFailed(e.to_string()))?;

        let text_body = self
            .engine
            .render(&format!("{template_name}.txt"), &context)
            .map_err(|e| NotificationError::TemplateFailed(e.to_string()))?;

        Ok(EmailMessage {
            to:      notification.recipient_email().to_string(),
            subject: subject.to_string(),
            html_body,
            text_body,
        })
    }

    /// テンプレート名、件名、コンテキストを構築する
    fn build_template_params(
        notification: &ReminderNotification,
    ) -> Result<(&'static str, &'static str, Context), NotificationError> {
        let (template_name, subject, context) = match notification {
            ReminderNotification::PatientReminder {
                patient_name,
                date,
                time,
                day,
                ..
            } => (
                "patient_reminder",
                PATIENT_REMINDER_SUBJECT,
                Context::from_serialize(PatientReminderContext {
                    patient_name,
                    day:  day.to_string(),
                    date: date.format(DATE_FORMAT).to_string(),
                    time: time.format(TIME_FORMAT).to_string(),
                }),
            ),
            ReminderNotification::ProviderSchedule {
                provider_name,
                entries,
                ..
            } => (
                "provider_schedule",
                PROVIDER_SCHEDULE_SUBJECT,
                Context::from_serialize(ProviderScheduleContext {
                    provider_name,
                    entries: entries.iter().map(ScheduleRow::from).collect(),
                }),
            ),
        };

        let context = context.map_err(|e| NotificationError::TemplateFailed(e.to_string()))?;
        Ok((template_name, subject, context))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime};
    use healthplus_domain::appointment::{DayReference, ReminderWindow};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn patient_reminder(name: &str, date: NaiveDate) -> ReminderNotification {
        ReminderNotification::PatientReminder {
            patient_email: "jane@example.com".to_string(),
            patient_name:  name.to_string(),
            date,
            time:          at(9, 0),
            day:           ReminderWindow::starting(today()).day_reference(date),
        }
    }

    fn provider_schedule(entries: Vec<ScheduleEntry>) -> ReminderNotification {
        ReminderNotification::ProviderSchedule {
            provider_email: "house@example.com".to_string(),
            provider_name:  "House".to_string(),
            entries,
        }
    }

    fn entry(date: NaiveDate, time: NaiveTime, patient: &str) -> ScheduleEntry {
        ScheduleEntry {
            date,
            time,
            patient_name: patient.to_string(),
        }
    }

    #[test]
    fn newが正常に初期化される() {
        let renderer = TemplateRenderer::new();
        assert!(renderer.is_ok());
    }

    #[test]
    fn patient_reminderのレンダリングが正しい() {
        let renderer = TemplateRenderer::new().unwrap();

        let email = renderer
            .render(&patient_reminder("Jane Doe", today()))
            .unwrap();

        assert_eq!(email.to, "jane@example.com");
        assert_eq!(email.subject, "Appointment Reminder");
        assert!(email.html_body.contains("Hello Jane Doe,"));
        assert!(email.html_body.contains("<b>today</b> on <b>2026-10-16</b> at <b>09:00</b>"));
        assert!(email.html_body.contains("<b>Healthcare+</b>"));
        assert!(email.text_body.contains("appointment today on 2026-10-16 at 09:00"));
    }

    #[rstest]
    #[case(NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(), "<b>today</b>")]
    #[case(NaiveDate::from_ymd_opt(2026, 10, 17).unwrap(), "<b>tomorrow</b>")]
    #[case(NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(), "<b>2026-10-19</b> on")]
    fn 予約日に応じた表記になる(#[case] date: NaiveDate, #[case] expected: &str) {
        let renderer = TemplateRenderer::new().unwrap();

        let email = renderer.render(&patient_reminder("Jane Doe", date)).unwrap();

        assert!(
            email.html_body.contains(expected),
            "{expected} を含むこと: {}",
            email.html_body
        );
    }

    #[test]
    fn 名前に含まれるマークアップはエスケープされる() {
        let renderer = TemplateRenderer::new().unwrap();

        let email = renderer
            .render(&patient_reminder("<script>alert(1)</script> & Co", today()))
            .unwrap();

        assert!(!email.html_body.contains("<script>"));
        assert!(email.html_body.contains("&lt;script&gt;"));
        assert!(email.html_body.contains("&amp; Co"));
        // プレーンテキストはエスケープしない
        assert!(email.text_body.contains("<script>alert(1)</script> & Co"));
    }

    #[test]
    fn provider_scheduleは入力順に1行ずつ表を作る() {
        let renderer = TemplateRenderer::new().unwrap();
        let tomorrow = today().succ_opt().unwrap();

        let email = renderer
            .render(&provider_schedule(vec![
                entry(today(), at(9, 0), "Jane Doe"),
                entry(tomorrow, at(14, 30), "John Roe"),
            ]))
            .unwrap();

        assert_eq!(email.to, "house@example.com");
        assert_eq!(email.subject, "Your Appointment Schedule");
        assert!(email.html_body.contains("Hello Dr. House,"));
        assert!(email.html_body.contains("<th>Date</th>"));
        // ヘッダー行 + 予約 2 行
        assert_eq!(email.html_body.matches("<tr").count(), 3);

        let first = email.html_body.find("<td>2026-10-16</td>").unwrap();
        let second = email.html_body.find("<td>2026-10-17</td>").unwrap();
        assert!(first < second);
        assert!(email.html_body.contains("<td>14:30</td>"));
        assert!(email.html_body.contains("<td>John Roe</td>"));

        assert!(email.text_body.contains("- 2026-10-16 09:00  Jane Doe"));
        assert!(email.text_body.contains("- 2026-10-17 14:30  John Roe"));
    }

    #[test]
    fn 同じ入力からは同じ出力を生成する() {
        let renderer = TemplateRenderer::new().unwrap();
        let patient = patient_reminder("Jane Doe", today());
        let provider = provider_schedule(vec![entry(today(), at(9, 0), "Jane Doe")]);

        assert_eq!(
            renderer.render(&patient).unwrap(),
            renderer.render(&patient).unwrap()
        );
        assert_eq!(
            renderer.render(&provider).unwrap(),
            renderer.render(&provider).unwrap()
        );
    }

    #[test]
    fn 対象期間外の日付はそのまま表記される() {
        let day = DayReference::On(NaiveDate::from_ymd_opt(2026, 11, 1).unwrap());
        let notification = ReminderNotification::PatientReminder {
            patient_email: "jane@example.com".to_string(),
            patient_name:  "Jane Doe".to_string(),
            date:          NaiveDate::from_ymd_opt(2026, 11, 1).unwrap(),
            time:          at(9, 0),
            day,
        };

        let email = TemplateRenderer::new().unwrap().render(&notification).unwrap();

        assert!(email.text_body.contains("appointment 2026-11-01 on 2026-11-01"));
    }
}
