//! # Reminder Job 設定
//!
//! 環境変数からジョブの設定を読み込む。
//!
//! 読み込みは [`JobConfig::from_lookup`] に集約し、テストでは環境変数の代わりに
//! 任意のキー・値を渡せるようにしている。

use std::{env, str::FromStr, time::Duration};

use healthplus_infra::{
    db::{self, DatabaseSettings},
    notification::{SmtpSettings, smtp},
};
use thiserror::Error;

use crate::trigger::Trigger;

/// 設定読み込みエラー
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 必須の環境変数が未設定
    #[error("{0} が設定されていません")]
    Missing(&'static str),

    /// 値を解釈できない
    #[error("{key} の値 {value:?} が不正です: {reason}")]
    Invalid {
        key:    &'static str,
        value:  String,
        reason: String,
    },
}

/// ジョブ全体の設定
#[derive(Debug, Clone)]
pub struct JobConfig {
    /// データベース接続設定
    pub database:     DatabaseSettings,
    /// 通知設定
    pub notification: NotificationConfig,
    /// 起動方法（1 回実行 / 定期実行）
    pub trigger:      Trigger,
}

/// 通知機能の設定
///
/// `NOTIFICATION_BACKEND` 環境変数で送信バックエンドを切り替える:
/// - `smtp`: SMTP サーバー経由で送信（デフォルト）
/// - `noop`: 送信しない（ログ出力のみ）
#[derive(Debug, Clone)]
pub struct NotificationConfig {
    pub backend: NotificationBackend,
    pub smtp:    SmtpSettings,
}

/// 送信バックエンド
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::EnumString, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum NotificationBackend {
    Smtp,
    Noop,
}

impl JobConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// キーから値を引く関数を使って設定を読み込む
    ///
    /// | 変数名 | 必須 | 説明 |
    /// |--------|------|------|
    /// | `SQL_SERVER` | **Yes** | DB サーバーのホスト名 |
    /// | `SQL_DB` | **Yes** | データベース名 |
    /// | `SQL_USER` / `SQL_PASS` | **Yes** | DB の資格情報 |
    /// | `SQL_PORT` | No | DB ポート（デフォルト: 5432） |
    /// | `SQL_CONNECT_TIMEOUT_SECS` | No | DB 接続タイムアウト秒（デフォルト: 30） |
    /// | `SMTP_USER` / `SMTP_PASS` | **Yes** | メールアカウントの資格情報（送信元を兼ねる） |
    /// | `SMTP_HOST` | No | SMTP ホスト（デフォルト: `smtp.gmail.com`） |
    /// | `SMTP_PORT` | No | SMTP ポート（デフォルト: 587） |
    /// | `SMTP_TIMEOUT_SECS` | No | SMTP セッションのタイムアウト秒（デフォルト: 30） |
    /// | `NOTIFICATION_BACKEND` | No | `smtp`（デフォルト）/ `noop` |
    /// | `REMINDER_INTERVAL_SECS` | No | 設定すると N 秒ごとに実行し続ける |
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| lookup(key).ok_or(ConfigError::Missing(key));

        let database = DatabaseSettings {
            host:            required("SQL_SERVER")?,
            port:            parse_or(&lookup, "SQL_PORT", db::DEFAULT_PORT)?,
            database:        required("SQL_DB")?,
            user:            required("SQL_USER")?,
            password:        required("SQL_PASS")?,
            connect_timeout: seconds_or(
                &lookup,
                "SQL_CONNECT_TIMEOUT_SECS",
                db::DEFAULT_CONNECT_TIMEOUT,
            )?,
        };

        let notification = NotificationConfig {
            backend: parse_or(&lookup, "NOTIFICATION_BACKEND", NotificationBackend::Smtp)?,
            smtp:    SmtpSettings {
                host:     lookup("SMTP_HOST").unwrap_or_else(|| smtp::DEFAULT_HOST.to_string()),
                port:     parse_or(&lookup, "SMTP_PORT", smtp::DEFAULT_PORT)?,
                username: required("SMTP_USER")?,
                password: required("SMTP_PASS")?,
                timeout:  seconds_or(&lookup, "SMTP_TIMEOUT_SECS", smtp::DEFAULT_TIMEOUT)?,
            },
        };

        let trigger = match parse::<u64, _>(&lookup, "REMINDER_INTERVAL_SECS")? {
            None => Trigger::Once,
            Some(0) => {
                return Err(ConfigError::Invalid {
                    key:    "REMINDER_INTERVAL_SECS",
                    value:  "0".to_string(),
                    reason: "1 以上を指定してください".to_string(),
                });
            }
            Some(secs) => Trigger::Every(Duration::from_secs(secs)),
        };

        Ok(Self {
            database,
            notification,
            trigger,
        })
    }
}

/// 任意の値をパースする（未設定なら `None`）
fn parse<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| {
            value.parse().map_err(|e: T::Err| ConfigError::Invalid {
                key,
                reason: e.to_string(),
                value,
            })
        })
        .transpose()
}

fn parse_or<T, F>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    Ok(parse(lookup, key)?.unwrap_or(default))
}

fn seconds_or<F>(lookup: &F, key: &'static str, default: Duration) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    Ok(parse::<u64, _>(lookup, key)?
        .map(Duration::from_secs)
        .unwrap_or(default))
}
