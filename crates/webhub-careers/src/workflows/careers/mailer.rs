use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncFileTransport, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::warn;

use super::notification::{ApplicationEmail, SENDER_DISPLAY_NAME};
use crate::config::{MailConfig, MailTransportConfig};

/// Confirmation that the careers inbox accepted a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub recipient: String,
    pub attachments: usize,
}

/// Outbound notification hook so the intake service can be exercised without SMTP.
#[async_trait]
pub trait ApplicationMailer: Send + Sync {
    async fn dispatch(&self, email: &ApplicationEmail) -> Result<DeliveryReceipt, MailError>;

    /// Short label reported by the health endpoint.
    fn backend(&self) -> &'static str;
}

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("invalid mailbox '{address}': {reason}")]
    Mailbox { address: String, reason: String },
    #[error("Invalid file type for attachment '{filename}' ({content_type})")]
    InvalidAttachment {
        filename: String,
        content_type: String,
    },
    #[error("failed to build email message: {0}")]
    Build(String),
    #[error("mail transport unavailable: {0}")]
    Transport(String),
}

impl MailError {
    /// Late file-policy failures surface as client errors rather than `500`s.
    pub fn is_policy_violation(&self) -> bool {
        matches!(self, MailError::InvalidAttachment { .. })
    }
}

enum MailTransport {
    Smtp(AsyncSmtpTransport<Tokio1Executor>),
    File(AsyncFileTransport<Tokio1Executor>),
}

/// lettre-backed mailer delivering through an SMTP relay or a local `.eml` outbox.
pub struct LettreMailer {
    transport: MailTransport,
    from: Mailbox,
    to: Mailbox,
}

impl std::fmt::Debug for LettreMailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LettreMailer")
            .field("backend", &self.backend())
            .field("to", &self.to.to_string())
            .finish_non_exhaustive()
    }
}

impl LettreMailer {
    pub fn from_config(config: &MailConfig) -> Result<Self, MailError> {
        let transport = match &config.transport {
            MailTransportConfig::Smtp {
                host,
                port,
                username,
                password,
            } => {
                let relay = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                    .map_err(|err| MailError::Transport(format!("create SMTP relay: {err}")))?
                    .port(*port)
                    .credentials(Credentials::new(
                        username.clone(),
                        password.expose().to_string(),
                    ));
                MailTransport::Smtp(relay.build())
            }
            MailTransportConfig::File { outbox_dir } => {
                std::fs::create_dir_all(outbox_dir).map_err(|err| {
                    MailError::Transport(format!(
                        "create outbox {}: {err}",
                        outbox_dir.display()
                    ))
                })?;
                MailTransport::File(AsyncFileTransport::<Tokio1Executor>::new(outbox_dir))
            }
        };

        let from = parse_mailbox(&format!(
            "\"{SENDER_DISPLAY_NAME}\" <{}>",
            config.from_address
        ))?;
        let to = parse_mailbox(&config.recipient)?;

        Ok(Self {
            transport,
            from,
            to,
        })
    }

    pub(crate) fn build_message(&self, email: &ApplicationEmail) -> Result<Message, MailError> {
        let mut body = MultiPart::mixed().multipart(MultiPart::alternative_plain_html(
            email.text_body.clone(),
            email.html_body.clone(),
        ));

        for attachment in &email.attachments {
            let content_type = ContentType::parse(&attachment.content_type).map_err(|_| {
                MailError::InvalidAttachment {
                    filename: attachment.filename.clone(),
                    content_type: attachment.content_type.clone(),
                }
            })?;
            body = body.singlepart(
                Attachment::new(attachment.filename.clone())
                    .body(attachment.bytes.clone(), content_type),
            );
        }

        Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(email.subject.clone())
            .multipart(body)
            .map_err(|err| MailError::Build(err.to_string()))
    }
}

#[async_trait]
impl ApplicationMailer for LettreMailer {
    async fn dispatch(&self, email: &ApplicationEmail) -> Result<DeliveryReceipt, MailError> {
        let message = self.build_message(email)?;

        match &self.transport {
            MailTransport::Smtp(smtp) => {
                smtp.send(message)
                    .await
                    .map_err(|err| MailError::Transport(format!("send SMTP email: {err}")))?;
            }
            MailTransport::File(file) => {
                file.send(message)
                    .await
                    .map_err(|err| MailError::Transport(format!("write outbox email: {err}")))?;
            }
        }

        Ok(DeliveryReceipt {
            recipient: self.to.email.to_string(),
            attachments: email.attachments.len(),
        })
    }

    fn backend(&self) -> &'static str {
        match self.transport {
            MailTransport::Smtp(_) => "smtp",
            MailTransport::File(_) => "file",
        }
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, MailError> {
    address.parse::<Mailbox>().map_err(|err| {
        warn!(%address, "rejecting mailbox");
        MailError::Mailbox {
            address: address.to_string(),
            reason: err.to_string(),
        }
    })
}
