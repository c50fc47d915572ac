//! # Clock（日付プロバイダ）
//!
//! ジョブ内での `Local::now()` 直接呼び出しを置き換え、
//! テストで固定日付を注入可能にするための抽象化。

use chrono::{Local, NaiveDate};

/// 実行日（ローカルタイムゾーンの暦日）を提供するトレイト
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// 実際のシステム日付を返す実装
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// 固定日付を返すテスト用実装
pub struct FixedClock {
    today: NaiveDate,
}

impl FixedClock {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.today
    }
}
