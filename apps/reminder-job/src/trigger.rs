//! # 起動トリガー
//!
//! デフォルトは 1 回実行して終了する（cron などの外部スケジューラから起動）。
//! `REMINDER_INTERVAL_SECS` を設定するとプロセス自身がタイマーとなり、
//! 一定間隔で実行し続ける。

use std::{future::Future, time::Duration};

use tokio::time::{self, MissedTickBehavior};

/// ジョブの起動方法
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// 1 回実行して終了
    Once,
    /// 指定間隔で実行し続ける
    Every(Duration),
}

/// `period` ごとに `run` を呼び出す
///
/// 最初の実行は即座に行う。実行中に過ぎたティックは捨てるため、実行が重なることはない。
/// `shutdown` が完了すると、次の実行を始める前にループを抜ける。
pub async fn run_every<S, F, Fut>(period: Duration, shutdown: S, mut run: F)
where
    S: Future<Output = ()>,
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    let mut interval = time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;
            () = &mut shutdown => {
                tracing::info!("停止シグナルを受信しました");
                break;
            }
            _ = interval.tick() => run().await,
        }
    }
}
