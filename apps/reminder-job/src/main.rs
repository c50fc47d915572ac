//! # Reminder Job
//!
//! 今日・明日の予約について、リマインダーメールを送信するジョブ。
//!
//! ## 役割
//!
//! - **患者リマインダー**: 予約 1 件につき患者へ 1 通
//! - **医師別スケジュール**: 医師 1 名につき、対象期間の予約を表にまとめて 1 通
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │   Database   │────→│ Reminder Job │────→│ SMTP Relay   │
//! └──────────────┘     └──────────────┘     └──────────────┘
//!      読み取りのみ       1 実行 1 接続        STARTTLS + AUTH
//! ```
//!
//! ## 環境変数
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `SQL_SERVER` / `SQL_DB` | **Yes** | DB ホスト・データベース名 |
//! | `SQL_USER` / `SQL_PASS` | **Yes** | DB の資格情報 |
//! | `SMTP_USER` / `SMTP_PASS` | **Yes** | メールアカウント（送信元を兼ねる） |
//! | `REMINDER_INTERVAL_SECS` | No | 設定すると N 秒ごとに実行し続ける |
//! | `NOTIFICATION_BACKEND` | No | `smtp`（デフォルト）/ `noop` |
//! | `LOG_FORMAT` | No | `json` / `pretty`（デフォルト） |
//!
//! その他の任意項目は [`config::JobConfig::from_lookup`] を参照。
//!
//! ## 起動方法
//!
//! ```bash
//! # cron などから 1 回実行
//! cargo run -p healthplus-reminder-job --release
//!
//! # 送信せずに対象を確認
//! NOTIFICATION_BACKEND=noop cargo run -p healthplus-reminder-job
//! ```
//!
//! ## 終了コード
//!
//! 1 回実行では、実行を中断した場合と 1 通でも送信に失敗した場合に非 0 で終了する。

mod config;
mod error;
mod trigger;
mod usecase;

use std::{process::ExitCode, sync::Arc};

use anyhow::Context as _;
use config::{JobConfig, NotificationBackend};
use healthplus_domain::clock::SystemClock;
use healthplus_infra::{
    notification::{NoopNotificationSender, NotificationSender, SmtpNotificationSender},
    repository::PostgresAppointmentConnector,
};
use healthplus_shared::observability::{self, TracingConfig};
use trigger::Trigger;
use usecase::{
    ReminderJob,
    notification::{NotificationService, TemplateRenderer},
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    // .env ファイルを読み込む（存在する場合）
    dotenvy::dotenv().ok();

    // トレーシング初期化
    observability::init_tracing(&TracingConfig::from_env("reminder-job"));

    // 設定読み込み
    let config = JobConfig::from_env().context("設定の読み込みに失敗しました")?;
    tracing::debug!(?config, "設定を読み込みました");

    // 送信バックエンド
    let sender: Arc<dyn NotificationSender> = match config.notification.backend {
        NotificationBackend::Smtp => Arc::new(
            SmtpNotificationSender::new(&config.notification.smtp)
                .context("SMTP 送信の初期化に失敗しました")?,
        ),
        NotificationBackend::Noop => Arc::new(NoopNotificationSender),
    };
    tracing::info!(backend = %config.notification.backend, "通知バックエンドを選択しました");

    let renderer = TemplateRenderer::new().context("テンプレートの読み込みに失敗しました")?;
    let job = ReminderJob::new(
        Arc::new(PostgresAppointmentConnector::new(config.database.clone())),
        NotificationService::new(sender, renderer),
        Arc::new(SystemClock),
    );

    match config.trigger {
        Trigger::Once => {
            let succeeded = matches!(job.execute().await, Ok(report) if report.is_success());
            Ok(if succeeded {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Trigger::Every(period) => {
            tracing::info!(?period, "定期実行を開始します");
            let job = &job;
            trigger::run_every(
                period,
                async {
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        tracing::error!(error = %e, "停止シグナルの待機に失敗しました");
                        std::future::pending::<()>().await;
                    }
                },
                move || async move {
                    // 結果は execute 内でログ出力済み。次のティックで再実行する
                    let _ = job.execute().await;
                },
            )
            .await;
            Ok(ExitCode::SUCCESS)
        }
    }
}
