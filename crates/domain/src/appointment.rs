//! # 予約
//!
//! リマインダー送信の対象となる予約データと、その集計ロジックを定義する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | 説明 |
//! |---|------------|------|
//! | [`ReminderWindow`] | リマインダー対象期間 | 実行日（今日）と翌日の 2 日間 |
//! | [`PatientReminder`] | 患者リマインダー | 患者 1 名・予約 1 件分の送信データ |
//! | [`ProviderAppointment`] | 医師別予約行 | 医師向けクエリの 1 行 |
//! | [`ProviderSchedule`] | 医師別スケジュール | 医師 1 名分にまとめた予約一覧 |
//!
//! ## 設計方針
//!
//! - **挿入順の保持**: グルーピングは初出順でキーを並べ、グループ内は入力順を維持する。
//!   クエリの `ORDER BY` がそのままメール内の表の順序になる
//! - **(email, name) をキーにする**: メールアドレスが重複していても名前が異なれば別の宛先

use std::{collections::HashMap, fmt};

use chrono::{Days, NaiveDate, NaiveTime};

/// メール本文に出力する日付の書式
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// メール本文に出力する時刻の書式
pub const TIME_FORMAT: &str = "%H:%M";

/// リマインダー対象期間
///
/// 実行日とその翌日の 2 日間。クエリの絞り込みと、
/// 患者向けメールの「today / tomorrow」表記の判定に使う。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderWindow {
    today:    NaiveDate,
    tomorrow: NaiveDate,
}

impl ReminderWindow {
    /// 実行日から対象期間を作成する
    pub fn starting(today: NaiveDate) -> Self {
        Self {
            today,
            tomorrow: today + Days::new(1),
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn tomorrow(&self) -> NaiveDate {
        self.tomorrow
    }

    /// 日付が対象期間（今日または明日）に含まれるか
    pub fn contains(&self, date: NaiveDate) -> bool {
        date == self.today || date == self.tomorrow
    }

    /// 予約日を「今日 / 明日 / その他」に分類する
    pub fn day_reference(&self, date: NaiveDate) -> DayReference {
        if date == self.today {
            DayReference::Today
        } else if date == self.tomorrow {
            DayReference::Tomorrow
        } else {
            DayReference::On(date)
        }
    }
}

/// 予約日の呼び方
///
/// `Display` はメール本文にそのまま埋め込む文字列を返す。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayReference {
    Today,
    Tomorrow,
    /// 対象期間外の日付（クエリが正しければ発生しない）
    On(NaiveDate),
}

impl fmt::Display for DayReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Today => f.write_str("today"),
            Self::Tomorrow => f.write_str("tomorrow"),
            Self::On(date) => write!(f, "{}", date.format(DATE_FORMAT)),
        }
    }
}

/// 患者リマインダー（患者向けクエリの 1 行）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientReminder {
    pub email: String,
    pub name:  String,
    pub date:  NaiveDate,
    pub time:  NaiveTime,
}

/// 医師別予約行（医師向けクエリの 1 行）
///
/// 医師 ID・日付・時刻の順に並んだ状態で渡される前提。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderAppointment {
    pub provider_email: String,
    pub provider_name:  String,
    pub date:           NaiveDate,
    pub time:           NaiveTime,
    pub patient_name:   String,
}

/// 医師の識別キー
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProviderKey {
    pub email: String,
    pub name:  String,
}

/// スケジュール表の 1 行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleEntry {
    pub date:         NaiveDate,
    pub time:         NaiveTime,
    pub patient_name: String,
}

/// 医師 1 名分のスケジュール
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSchedule {
    pub provider: ProviderKey,
    pub entries:  Vec<ScheduleEntry>,
}

/// 医師別予約行を医師ごとにまとめる
///
/// 戻り値の順序はキーの初出順、各グループ内の順序は入力順。
pub fn group_by_provider<I>(rows: I) -> Vec<ProviderSchedule>
where
    I: IntoIterator<Item = ProviderAppointment>,
{
    let mut schedules: Vec<ProviderSchedule> = Vec::new();
    let mut positions: HashMap<ProviderKey, usize> = HashMap::new();

    for row in rows {
        let key = ProviderKey {
            email: row.provider_email,
            name:  row.provider_name,
        };
        let entry = ScheduleEntry {
            date:         row.date,
            time:         row.time,
            patient_name: row.patient_name,
        };

        match positions.get(&key) {
            Some(&index) => schedules[index].entries.push(entry),
            None => {
                positions.insert(key.clone(), schedules.len());
                schedules.push(ProviderSchedule {
                    provider: key,
                    entries:  vec![entry],
                });
            }
        }
    }

    schedules
}
