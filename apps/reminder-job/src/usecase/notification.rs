//! # 通知ユースケース
//!
//! テンプレートレンダリングとメール送信を組み合わせ、1 通ずつ送信する。

pub mod service;
pub mod template_renderer;

pub use service::{DeliveryFailure, NotificationService};
pub use template_renderer::TemplateRenderer;
