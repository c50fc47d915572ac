//! # 通知サービス
//!
//! テンプレートレンダリング → メール送信 → ログ記録を統合するサービス。
//!
//! ## 設計方針
//!
//! - **宛先ごとのエラー境界**: `notify()` の失敗は [`DeliveryFailure`] として返すだけで、
//!   呼び出し側は次の宛先への送信を続けられる
//! - **ログ記録**: 成功・失敗どちらもビジネスイベントとして出力する
//! - **依存性注入**: `NotificationSender` は trait で抽象化

use std::sync::Arc;

use healthplus_domain::notification::{
    NotificationError,
    NotificationEventType,
    ReminderNotification,
};
use healthplus_infra::notification::NotificationSender;
use healthplus_shared::{
    event_log::{error as log_error, event},
    log_business_event,
};
use thiserror::Error;

use super::TemplateRenderer;

/// 1 通分の送信失敗
#[derive(Debug, Error)]
#[error("{recipient} への {event_type} の送信に失敗: {source}")]
pub struct DeliveryFailure {
    pub recipient:  String,
    pub event_type: NotificationEventType,
    #[source]
    pub source:     NotificationError,
}

/// 通知サービス
///
/// リマインダー通知 1 件をメールにして送信する。
pub struct NotificationService {
    sender:            Arc<dyn NotificationSender>,
    template_renderer: TemplateRenderer,
}

impl NotificationService {
    pub fn new(sender: Arc<dyn NotificationSender>, template_renderer: TemplateRenderer) -> Self {
        Self {
            sender,
            template_renderer,
        }
    }

    /// 通知を 1 通送信する
    ///
    /// レンダリングまたは送信に失敗した場合はログを出力し、[`DeliveryFailure`] を返す。
    pub async fn notify(&self, notification: ReminderNotification) -> Result<(), DeliveryFailure> {
        let event_type = notification.event_type();
        let event_type_str: &'static str = event_type.into();
        let recipient = notification.recipient_email().to_string();

        let failure = |source: NotificationError| {
            let error_kind = match source {
                NotificationError::TemplateFailed(_) => log_error::kind::TEMPLATE,
                NotificationError::InvalidAddress(_) | NotificationError::SendFailed(_) => {
                    log_error::kind::SEND
                }
            };
            let error_category = match source {
                NotificationError::TemplateFailed(_) => log_error::category::INTERNAL,
                _ => log_error::category::EXTERNAL_SERVICE,
            };
            log_business_event!(
                event.category = event::category::NOTIFICATION,
                event.action = event::action::NOTIFICATION_FAILED,
                event.result = event::result::FAILURE,
                notification.event_type = event_type_str,
                notification.recipient = %recipient,
                error.category = error_category,
                error.kind = error_kind,
                error = %source,
                "通知メール送信失敗"
            );
            DeliveryFailure {
                recipient: recipient.clone(),
                event_type,
                source,
            }
        };

        let email = self.template_renderer.render(&notification).map_err(failure)?;
        self.sender.send_email(&email).await.map_err(failure)?;

        log_business_event!(
            event.category = event::category::NOTIFICATION,
            event.action = event::action::NOTIFICATION_SENT,
            event.result = event::result::SUCCESS,
            notification.event_type = event_type_str,
            notification.recipient = %recipient,
            "通知メール送信成功"
        );
        Ok(())
    }
}
