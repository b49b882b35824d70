//! SMTP delivery via a STARTTLS relay (port 587, plain auth).

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use secrecy::ExposeSecret;
use tracing::info;

use super::Mailer;
use crate::config::MailConfig;
use crate::types::{WiselyError, WiselyResult};

/// Sends mail from `FROM_MAIL` to `TO_MAIL` through the configured relay.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl SmtpMailer {
    /// Build the transport. Does not connect until the first send.
    pub fn new(config: &MailConfig) -> WiselyResult<Self> {
        let from: Mailbox = format!("{} <{}>", config.smtp.sender_name, config.from)
            .parse()
            .map_err(|e| WiselyError::Mail(format!("invalid FROM_MAIL '{}': {e}", config.from)))?;
        let to: Mailbox = config
            .to
            .parse()
            .map_err(|e| WiselyError::Mail(format!("invalid TO_MAIL '{}': {e}", config.to)))?;

        let credentials = Credentials::new(
            config.from.clone(),
            config.password.expose_secret().clone(),
        );
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp.host)
            .map_err(|e| WiselyError::Mail(format!("SMTP relay {}: {e}", config.smtp.host)))?
            .port(config.smtp.port)
            .credentials(credentials)
            .build();

        Ok(Self { transport, from, to })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_html(&self, subject: &str, html_body: &str) -> WiselyResult<()> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body.to_string())
            .map_err(|e| WiselyError::Mail(format!("failed to build message: {e}")))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| WiselyError::Mail(format!("SMTP send failed: {e}")))?;

        info!(to = %self.to, subject, "Mail sent");
        Ok(())
    }
}
