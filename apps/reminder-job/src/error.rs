//! # ジョブのエラー定義
//!
//! 実行を中断するエラーだけをここで扱う。宛先ごとの送信失敗は
//! [`DeliveryFailure`](crate::usecase::notification::DeliveryFailure) として
//! 実行レポートに集約し、実行は継続する。

use healthplus_infra::{InfraError, InfraErrorKind};
use healthplus_shared::event_log::error as log_error;
use thiserror::Error;

use crate::usecase::JobPhase;

/// 実行を中断するエラー
#[derive(Debug, Error)]
pub enum JobError {
    /// データベースへの接続・クエリに失敗した
    #[error("{phase} でデータベースエラーが発生しました: {source}")]
    Database {
        phase:  JobPhase,
        #[source]
        source: InfraError,
    },
}

impl JobError {
    pub fn database(phase: JobPhase, source: InfraError) -> Self {
        Self::Database { phase, source }
    }

    /// 中断したフェーズ
    pub fn phase(&self) -> JobPhase {
        match self {
            Self::Database { phase, .. } => *phase,
        }
    }

    /// ログの `error.kind` フィールドに出力する値
    pub fn log_kind(&self) -> &'static str {
        match self {
            Self::Database { source, .. } => match source.kind() {
                InfraErrorKind::Connection(_) => log_error::kind::CONNECTION,
                InfraErrorKind::Query(_) => log_error::kind::QUERY,
                InfraErrorKind::Timeout { .. } => log_error::kind::TIMEOUT,
                InfraErrorKind::Unexpected(_) => log_error::kind::UNEXPECTED,
            },
        }
    }
}
