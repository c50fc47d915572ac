//! AppointmentRepository 統合テスト
//!
//! データベースを使用したテスト。sqlx::test マクロを使用して、
//! テストごとに使い捨てのデータベースを作成する。
//!
//! 実行方法:
//! ```bash
//! DATABASE_URL=postgres://localhost/healthplus cargo test -p healthplus-infra \
//!     --test appointment_repository_test
//! ```

mod common;

use chrono::Days;
use common::{at, insert_appointment, insert_patient, insert_provider, test_today};
use healthplus_domain::appointment::{ProviderAppointment, ReminderWindow};
use healthplus_infra::repository::{AppointmentRepository, PostgresAppointmentRepository};
use pretty_assertions::assert_eq;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../migrations")]
async fn test_患者リマインダーは今日と明日の予約だけを返す(pool: PgPool) {
    let today = test_today();
    let provider = insert_provider(&pool, "House", "house@example.com").await;
    let jane = insert_patient(&pool, "Jane Doe", "jane@example.com").await;

    insert_appointment(&pool, jane, provider, today - Days::new(1), at(9, 0)).await;
    insert_appointment(&pool, jane, provider, today, at(9, 0)).await;
    insert_appointment(&pool, jane, provider, today + Days::new(1), at(14, 30)).await;
    insert_appointment(&pool, jane, provider, today + Days::new(2), at(9, 0)).await;

    let sut = PostgresAppointmentRepository::new(pool.clone());
    let window = ReminderWindow::starting(today);

    let reminders = sut.find_patient_reminders(&window).await.unwrap();

    assert_eq!(reminders.len(), 2);
    assert_eq!(reminders[0].email, "jane@example.com");
    assert_eq!(reminders[0].name, "Jane Doe");
    assert_eq!(reminders[0].date, today);
    assert_eq!(reminders[0].time, at(9, 0));
    assert_eq!(reminders[1].date, today + Days::new(1));
    assert_eq!(reminders[1].time, at(14, 30));
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_医師別予約行は医師_日付_時刻の順に並ぶ(pool: PgPool) {
    let today = test_today();
    let house = insert_provider(&pool, "House", "house@example.com").await;
    let wilson = insert_provider(&pool, "Wilson", "wilson@example.com").await;
    let jane = insert_patient(&pool, "Jane Doe", "jane@example.com").await;
    let john = insert_patient(&pool, "John Roe", "john@example.com").await;

    insert_appointment(&pool, john, wilson, today, at(8, 0)).await;
    insert_appointment(&pool, jane, house, today + Days::new(1), at(9, 0)).await;
    insert_appointment(&pool, john, house, today, at(11, 0)).await;
    insert_appointment(&pool, jane, house, today + Days::new(2), at(9, 0)).await;
    insert_appointment(&pool, jane, wilson, today - Days::new(1), at(9, 0)).await;

    let sut = PostgresAppointmentRepository::new(pool.clone());
    let window = ReminderWindow::starting(today);

    let rows = sut.find_provider_appointments(&window).await.unwrap();

    assert_eq!(
        rows,
        vec![
            ProviderAppointment {
                provider_email: "house@example.com".to_string(),
                provider_name:  "House".to_string(),
                date:           today,
                time:           at(11, 0),
                patient_name:   "John Roe".to_string(),
            },
            ProviderAppointment {
                provider_email: "house@example.com".to_string(),
                provider_name:  "House".to_string(),
                date:           today + Days::new(1),
                time:           at(9, 0),
                patient_name:   "Jane Doe".to_string(),
            },
            ProviderAppointment {
                provider_email: "wilson@example.com".to_string(),
                provider_name:  "Wilson".to_string(),
                date:           today,
                time:           at(8, 0),
                patient_name:   "John Roe".to_string(),
            },
        ]
    );
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_対象期間に予約がなければ空を返す(pool: PgPool) {
    let today = test_today();
    let provider = insert_provider(&pool, "House", "house@example.com").await;
    let jane = insert_patient(&pool, "Jane Doe", "jane@example.com").await;
    insert_appointment(&pool, jane, provider, today + Days::new(7), at(9, 0)).await;

    let sut = PostgresAppointmentRepository::new(pool.clone());
    let window = ReminderWindow::starting(today);

    assert!(sut.find_patient_reminders(&window).await.unwrap().is_empty());
    assert!(sut.find_provider_appointments(&window).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_close後のクエリは接続エラーになる(pool: PgPool) {
    let sut = PostgresAppointmentRepository::new(pool.clone());
    let window = ReminderWindow::starting(test_today());

    sut.close().await;
    let err = sut.find_patient_reminders(&window).await.unwrap_err();

    assert!(err.is_connection());
}
