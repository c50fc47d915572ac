//! SMTP 通知送信実装
//!
//! lettre の `AsyncSmtpTransport` を使用してメールを送信する。
//! STARTTLS で暗号化してからパスワード認証を行う（Gmail の 587 番ポートを想定）。
//!
//! lettre の `pool` feature を有効にしていないため、`send` ごとに
//! 接続 → STARTTLS → AUTH → 送信 → QUIT が行われる。
//!
//! lettre の `timeout` はソケット単位の設定で、応答しないリレーとのセッション全体は
//! 打ち切れない。セッション全体を `tokio::time::timeout` で囲み、超過した送信は
//! その宛先の `SendFailed` として扱う。

use std::{fmt, time::Duration};

use async_trait::async_trait;
use healthplus_domain::notification::{EmailMessage, NotificationError};
use lettre::{
    AsyncSmtpTransport,
    AsyncTransport,
    Tokio1Executor,
    message::{Mailbox, Message, MultiPart, SinglePart, header::ContentType},
    transport::smtp::authentication::Credentials,
};

use super::NotificationSender;

/// SMTP サーバーのデフォルトホスト
pub const DEFAULT_HOST: &str = "smtp.gmail.com";

/// SMTP サーバーのデフォルトポート（submission / STARTTLS）
pub const DEFAULT_PORT: u16 = 587;

/// SMTP セッションのタイムアウトのデフォルト値
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// SMTP 接続設定
#[derive(Clone)]
pub struct SmtpSettings {
    /// SMTP サーバーのホスト名
    pub host:     String,
    /// SMTP サーバーのポート番号
    pub port:     u16,
    /// 認証ユーザー名（送信元アドレスを兼ねる）
    pub username: String,
    /// 認証パスワード
    pub password: String,
    /// 1 セッション（接続から QUIT まで）のタイムアウト
    pub timeout:  Duration,
}

// パスワードをログに出さない
impl fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"********")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// SMTP 通知送信
///
/// `lettre::AsyncSmtpTransport<Tokio1Executor>` をラップする。
pub struct SmtpNotificationSender {
    transport:    AsyncSmtpTransport<Tokio1Executor>,
    from_address: Mailbox,
    timeout:      Duration,
}

impl SmtpNotificationSender {
    /// 新しい SMTP 送信インスタンスを作成
    ///
    /// この時点ではサーバーに接続しない。
    ///
    /// # エラー
    ///
    /// - 送信元アドレス（`username`）がメールアドレスとして不正な場合
    /// - TLS 設定の構築に失敗した場合
    pub fn new(settings: &SmtpSettings) -> Result<Self, NotificationError> {
        let from_address: Mailbox = settings.username.parse().map_err(|e| {
            NotificationError::InvalidAddress(format!("送信元アドレス不正: {e}"))
        })?;

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
            .map_err(|e| NotificationError::SendFailed(format!("SMTP トランスポート構築失敗: {e}")))?
            .port(settings.port)
            .credentials(Credentials::new(
                settings.username.clone(),
                settings.password.clone(),
            ))
            .timeout(Some(settings.timeout))
            .build();

        Ok(Self {
            transport,
            from_address,
            timeout: settings.timeout,
        })
    }

    /// `EmailMessage` から MIME メッセージを組み立てる
    ///
    /// HTML とプレーンテキストの multipart/alternative にする。
    fn build_message(&self, email: &EmailMessage) -> Result<Message, NotificationError> {
        let to: Mailbox = email
            .to
            .parse()
            .map_err(|e| NotificationError::InvalidAddress(format!("宛先アドレス不正: {e}")))?;

        Message::builder()
            .from(self.from_address.clone())
            .to(to)
            .subject(&email.subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(email.text_body.clone()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(email.html_body.clone()),
                    ),
            )
            .map_err(|e| NotificationError::SendFailed(format!("メッセージ構築失敗: {e}")))
    }
}

#[async_trait]
impl NotificationSender for SmtpNotificationSender {
    #[tracing::instrument(skip_all, level = "debug", fields(to = %email.to))]
    async fn send_email(&self, email: &EmailMessage) -> Result<(), NotificationError> {
        let message = self.build_message(email)?;

        match tokio::time::timeout(self.timeout, self.transport.send(message)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(NotificationError::SendFailed(format!("SMTP 送信失敗: {e}"))),
            Err(_) => Err(NotificationError::SendFailed(format!(
                "SMTP セッションが {:?} 以内に完了しませんでした",
                self.timeout
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use tokio::{io::AsyncWriteExt, net::TcpListener};

    use super::*;

    fn make_settings() -> SmtpSettings {
        SmtpSettings {
            host:     DEFAULT_HOST.to_string(),
            port:     DEFAULT_PORT,
            username: "clinic@example.com".to_string(),
            password: "app-password".to_string(),
            timeout:  DEFAULT_TIMEOUT,
        }
    }

    fn make_email(to: &str) -> EmailMessage {
        EmailMessage {
            to:        to.to_string(),
            subject:   "Appointment Reminder".to_string(),
            html_body: "<p>Hello Jane Doe,</p>".to_string(),
            text_body: "Hello Jane Doe,".to_string(),
        }
    }

    #[test]
    fn トレイトはsendとsyncを実装している() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SmtpNotificationSender>();
    }

    #[test]
    fn 送信元アドレスが不正ならnewが失敗する() {
        let settings = SmtpSettings {
            username: "not-an-address".to_string(),
            ..make_settings()
        };

        let result = SmtpNotificationSender::new(&settings);

        assert!(matches!(result, Err(NotificationError::InvalidAddress(_))));
    }

    #[test]
    fn debug出力にパスワードが含まれない() {
        let debug = format!("{:?}", make_settings());
        assert!(!debug.contains("app-password"));
    }

    #[test]
    fn multipartメッセージを組み立てられる() {
        let sender = SmtpNotificationSender::new(&make_settings()).unwrap();

        let message = sender.build_message(&make_email("jane@example.com")).unwrap();
        let formatted = String::from_utf8(message.formatted()).unwrap();

        assert!(formatted.contains("To: jane@example.com"));
        assert!(formatted.contains("From: clinic@example.com"));
        assert!(formatted.contains("Subject: Appointment Reminder"));
        assert!(formatted.contains("multipart/alternative"));
    }

    #[tokio::test]
    async fn 宛先アドレスが不正なら接続せずにエラーを返す() {
        let sender = SmtpNotificationSender::new(&make_settings()).unwrap();

        let result = sender.send_email(&make_email("jane at example")).await;

        assert!(matches!(result, Err(NotificationError::InvalidAddress(_))));
    }

    #[tokio::test]
    async fn 応答しないリレーへの送信はタイムアウトで失敗する() {
        // 挨拶だけ返して EHLO に応答しないサーバー
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            socket.write_all(b"220 stall ESMTP\r\n").await.unwrap();
            tokio::time::sleep(Duration::from_secs(60)).await;
            drop(socket);
        });
        let settings = SmtpSettings {
            host:    "127.0.0.1".to_string(),
            port,
            timeout: Duration::from_secs(1),
            ..make_settings()
        };
        let sender = SmtpNotificationSender::new(&settings).unwrap();

        let started = Instant::now();
        let result = tokio::time::timeout(
            Duration::from_secs(10),
            sender.send_email(&make_email("jane@example.com")),
        )
        .await
        .expect("SMTP タイムアウト内に戻ること");

        assert!(matches!(result, Err(NotificationError::SendFailed(_))));
        assert!(started.elapsed() < Duration::from_secs(5));
        server.abort();
    }
}
