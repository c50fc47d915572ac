//! # データベース接続管理
//!
//! ジョブ実行 1 回につき 1 本の接続を確立する。
//!
//! ## 設計方針
//!
//! - **実行ごとに接続**: ジョブの実行間隔は長く、接続を保持し続ける意味がないため
//!   `max_connections(1)` のプールを実行ごとに作り、終了時に閉じる
//! - **タイムアウト必須**: 接続確立が終わらないと次回の実行をブロックするため、
//!   プール作成全体を `tokio::time::timeout` で囲む
//! - **接続情報の分解指定**: URL ではなくホスト・DB 名・資格情報を個別に受け取る
//!   （パスワードに URL 予約文字が含まれても壊れない）
//!
//! ## 使用例
//!
//! ```rust,ignore
//! use healthplus_infra::db::{self, DatabaseSettings};
//!
//! async fn example(settings: &DatabaseSettings) -> Result<(), healthplus_infra::InfraError> {
//!     let pool = db::connect(settings).await?;
//!     // クエリ実行
//!     pool.close().await;
//!     Ok(())
//! }
//! ```

use std::{fmt, time::Duration};

use sqlx::{
    PgPool,
    postgres::{PgConnectOptions, PgPoolOptions},
};

use crate::error::InfraError;

/// データベースのデフォルトポート（PostgreSQL）
pub const DEFAULT_PORT: u16 = 5432;

/// 接続タイムアウトのデフォルト値
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// データベース接続設定
#[derive(Clone)]
pub struct DatabaseSettings {
    /// サーバーのホスト名
    pub host:            String,
    /// ポート番号（デフォルト: [`DEFAULT_PORT`]）
    pub port:            u16,
    /// データベース名
    pub database:        String,
    /// ユーザー名
    pub user:            String,
    /// パスワード
    pub password:        String,
    /// 接続確立のタイムアウト
    pub connect_timeout: Duration,
}

impl DatabaseSettings {
    /// sqlx の接続オプションに変換する
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.database)
            .username(&self.user)
            .password(&self.password)
            .application_name("healthplus-reminder-job")
    }
}

// パスワードをログに出さない
impl fmt::Debug for DatabaseSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"********")
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

/// 接続を 1 本だけ持つプールを作成する
///
/// 呼び出し側は使用後に必ず `PgPool::close()` を呼ぶこと。
///
/// # エラー
///
/// - 接続確立に失敗した場合: `InfraErrorKind::Connection`
/// - `connect_timeout` を超過した場合: `InfraErrorKind::Timeout`
#[tracing::instrument(skip_all, fields(db.host = %settings.host, db.name = %settings.database))]
pub async fn connect(settings: &DatabaseSettings) -> Result<PgPool, InfraError> {
    let connecting = PgPoolOptions::new()
        .max_connections(1)
        .min_connections(0)
        .acquire_timeout(settings.connect_timeout)
        .connect_with(settings.connect_options());

    match tokio::time::timeout(settings.connect_timeout, connecting).await {
        Ok(Ok(pool)) => {
            tracing::debug!("データベースに接続しました");
            Ok(pool)
        }
        Ok(Err(e)) => Err(InfraError::connection(e)),
        Err(_) => Err(InfraError::timeout(
            "database connect",
            settings.connect_timeout,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_settings() -> DatabaseSettings {
        DatabaseSettings {
            host:            "db.example.com".to_string(),
            port:            DEFAULT_PORT,
            database:        "healthplus".to_string(),
            user:            "reminder".to_string(),
            password:        "p@ss/word#1".to_string(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    #[test]
    fn debug出力にパスワードが含まれない() {
        let debug = format!("{:?}", make_settings());

        assert!(!debug.contains("p@ss/word#1"));
        assert!(debug.contains("db.example.com"));
    }

    #[test]
    fn connect_optionsに設定値が反映される() {
        let options = make_settings().connect_options();

        assert_eq!(options.get_host(), "db.example.com");
        assert_eq!(options.get_port(), 5432);
        assert_eq!(options.get_database(), Some("healthplus"));
        assert_eq!(options.get_username(), "reminder");
    }

    #[tokio::test]
    async fn 到達不能なホストへの接続はエラーになる() {
        let settings = DatabaseSettings {
            host: "127.0.0.1".to_string(),
            port: 1,
            connect_timeout: Duration::from_secs(2),
            ..make_settings()
        };

        let result = connect(&settings).await;

        let err = result.expect_err("接続できないこと");
        assert!(err.is_connection());
    }
}
