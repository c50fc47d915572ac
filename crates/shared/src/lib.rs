//! # Healthcare+ 共有ユーティリティ
//!
//! ワークスペース全体で使用される共通ユーティリティを提供する。
//!
//! ## 設計方針
//!
//! - 他のすべてのクレート（domain を除く）から依存される
//! - ビジネスロジックを含まない純粋なユーティリティのみを配置

pub mod event_log;
pub mod observability;
