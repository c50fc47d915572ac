//! テスト共通フィクスチャ
//!
//! DB を使用する統合テストで共通利用するシードデータ作成ヘルパー。

// 各テストファイルが独立したクレートとしてコンパイルされるため、
// 使用しない関数に dead_code 警告が出る。モジュール全体で抑制する。
#![allow(dead_code)]

use chrono::{NaiveDate, NaiveTime};
use sqlx::PgPool;

/// テスト用の固定実行日
pub fn test_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
}

pub fn at(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

/// ユーザーを作成して ID を返す
pub async fn insert_user(pool: &PgPool, name: &str, email: &str) -> i32 {
    sqlx::query_scalar("INSERT INTO Users (name, email) VALUES ($1, $2) RETURNING id")
        .bind(name)
        .bind(email)
        .fetch_one(pool)
        .await
        .expect("ユーザー作成に失敗")
}

/// 患者を作成して患者 ID を返す
pub async fn insert_patient(pool: &PgPool, name: &str, email: &str) -> i32 {
    let user_id = insert_user(pool, name, email).await;
    sqlx::query_scalar("INSERT INTO Patients (user_id) VALUES ($1) RETURNING id")
        .bind(user_id)
        .fetch_one(pool)
        .await
        .expect("患者作成に失敗")
}

/// 医師を作成して医師 ID を返す
pub async fn insert_provider(pool: &PgPool, name: &str, email: &str) -> i32 {
    let user_id = insert_user(pool, name, email).await;
    sqlx::query_scalar("INSERT INTO Providers (user_id) VALUES ($1) RETURNING id")
        .bind(user_id)
        .fetch_one(pool)
        .await
        .expect("医師作成に失敗")
}

/// 予約を作成する
pub async fn insert_appointment(
    pool: &PgPool,
    patient_id: i32,
    provider_id: i32,
    date: NaiveDate,
    time: NaiveTime,
) {
    sqlx::query(
        "INSERT INTO Appointments (patient_id, provider_id, date, time) VALUES ($1, $2, $3, $4)",
    )
    .bind(patient_id)
    .bind(provider_id)
    .bind(date)
    .bind(time)
    .execute(pool)
    .await
    .expect("予約作成に失敗");
}
