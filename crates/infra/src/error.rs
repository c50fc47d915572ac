//! # インフラ層エラー定義
//!
//! データベースとの通信で発生するエラーを表現する。
//!
//! ## 設計方針
//!
//! - **接続とクエリの区別**: 同じ `sqlx::Error` でも、到達不能・認証失敗は
//!   [`InfraErrorKind::Connection`]、SQL の失敗は [`InfraErrorKind::Query`] に分類する
//! - **SpanTrace 自動捕捉**: `From` 実装や convenience constructor で
//!   エラー生成時の呼び出し経路を自動記録する
//!
//! ## 構造
//!
//! `std::io::Error` と同じ struct + enum パターンを採用:
//! - [`InfraError`]: エラー種別（[`InfraErrorKind`]）と [`SpanTrace`] を保持するラッパー
//! - [`InfraErrorKind`]: エラーの具体的な種別

use std::{fmt, time::Duration};

use derive_more::Display;
use thiserror::Error;
use tracing_error::SpanTrace;

/// インフラ層で発生するエラー
///
/// エラー種別（[`InfraErrorKind`]）と [`SpanTrace`]（呼び出し経路）を保持する。
#[derive(Display)]
#[display("{kind}")]
pub struct InfraError {
    kind:       InfraErrorKind,
    span_trace: SpanTrace,
}

/// インフラ層エラーの種別
#[derive(Debug, Error)]
pub enum InfraErrorKind {
    /// 接続エラー
    ///
    /// DB サーバーへの到達不能、TLS・認証の失敗、プールの枯渇など。
    #[error("データベース接続エラー: {0}")]
    Connection(#[source] sqlx::Error),

    /// クエリエラー
    ///
    /// SQL の実行失敗、結果行のデコード失敗など。
    #[error("クエリエラー: {0}")]
    Query(#[source] sqlx::Error),

    /// タイムアウト
    #[error("{operation} が {timeout:?} 以内に完了しませんでした")]
    Timeout {
        /// タイムアウトした操作名（例: "database connect"）
        operation: &'static str,
        timeout:   Duration,
    },

    /// 予期しないエラー
    #[error("予期しないエラー: {0}")]
    Unexpected(String),
}

impl InfraError {
    /// エラー種別を取得する
    pub fn kind(&self) -> &InfraErrorKind {
        &self.kind
    }

    /// SpanTrace を取得する
    pub fn span_trace(&self) -> &SpanTrace {
        &self.span_trace
    }

    /// 接続系のエラー（タイムアウトを含む）か
    pub fn is_connection(&self) -> bool {
        matches!(
            self.kind,
            InfraErrorKind::Connection(_) | InfraErrorKind::Timeout { .. }
        )
    }

    // ===== Convenience constructors =====

    /// 接続エラーを生成する
    ///
    /// 接続確立中に発生した `sqlx::Error` は種類によらず接続エラーとして扱う。
    pub fn connection(source: sqlx::Error) -> Self {
        Self {
            kind:       InfraErrorKind::Connection(source),
            span_trace: SpanTrace::capture(),
        }
    }

    /// タイムアウトエラーを生成する
    pub fn timeout(operation: &'static str, timeout: Duration) -> Self {
        Self {
            kind:       InfraErrorKind::Timeout { operation, timeout },
            span_trace: SpanTrace::capture(),
        }
    }

    /// 予期しないエラーを生成する
    pub fn unexpected(msg: impl Into<String>) -> Self {
        Self {
            kind:       InfraErrorKind::Unexpected(msg.into()),
            span_trace: SpanTrace::capture(),
        }
    }
}

/// 接続の喪失を表す `sqlx::Error` か
fn is_connection_error(error: &sqlx::Error) -> bool {
    matches!(
        error,
        sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
            | sqlx::Error::Configuration(_)
    )
}

// ===== トレイト実装 =====

impl fmt::Debug for InfraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InfraError")
            .field("kind", &self.kind)
            .field("span_trace", &self.span_trace)
            .finish()
    }
}

impl std::error::Error for InfraError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.kind.source()
    }
}

// ===== From 実装（SpanTrace 自動キャプチャ） =====

impl From<sqlx::Error> for InfraError {
    fn from(source: sqlx::Error) -> Self {
        let kind = if is_connection_error(&source) {
            InfraErrorKind::Connection(source)
        } else {
            InfraErrorKind::Query(source)
        };
        Self {
            kind,
            span_trace: SpanTrace::capture(),
        }
    }
}
