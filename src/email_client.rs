use async_trait::async_trait;
use lettre::address::AddressError;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::AsyncSmtpTransport;
use lettre::AsyncTransport;
use lettre::Message;
use lettre::Tokio1Executor;
use secrecy::ExposeSecret;

use crate::configuration::ConfigurationError;
use crate::configuration::EmailSettings;
use crate::configuration::SmtpSecurity;

/// A composed message, independent of any particular transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub reply_to: Option<String>,
    pub subject: String,
    pub html_body: String,
}

#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    #[error("Invalid address {address:?}: {source}")]
    Address {
        address: String,
        #[source]
        source: AddressError,
    },
    #[error(transparent)]
    Message(#[from] lettre::error::Error),
    #[error(transparent)]
    Smtp(#[from] lettre::transport::smtp::Error),
    /// For transports that only have a description of what went wrong
    #[error("{0}")]
    Other(String),
}

/// The one capability the contact endpoint needs. Implementations must be
/// shareable between actix workers; requests never coordinate with each other.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(
        &self,
        email: &OutgoingEmail,
    ) -> Result<(), TransportError>;
}

// establishing an SMTP session (TLS + AUTH) is expensive, so a single pooled
// transport is built at startup and shared by every request. `AsyncSmtpTransport`
// is `Clone`; clones share the same pool.

/// SMTP delivery through the outbound mailbox from `EmailSettings`.
#[derive(Clone)]
pub struct SmtpEmailClient {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    sender: Mailbox,
}

impl SmtpEmailClient {
    pub fn new(settings: &EmailSettings) -> Result<Self, anyhow::Error> {
        let owner = settings.site_owner()?;
        let sender = Mailbox::new(
            Some(owner.name.clone()),
            owner
                .address
                .as_ref()
                .parse()
                .map_err(|e: AddressError| ConfigurationError::InvalidMailbox(e.to_string()))?,
        );

        let builder = match settings.security {
            SmtpSecurity::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.smtp_host)?,
            SmtpSecurity::Starttls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.smtp_host)?
            }
            SmtpSecurity::Plain => {
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&settings.smtp_host)
            }
        }
        .port(settings.smtp_port)
        .timeout(Some(settings.timeout()));

        // credentials are never sent over an unencrypted connection
        let mailer = match settings.security {
            SmtpSecurity::Plain => {
                tracing::warn!(
                    smtp_host = %settings.smtp_host,
                    "using unencrypted, unauthenticated SMTP"
                );
                builder.build()
            }
            _ => {
                let (username, password) = settings.credentials()?;
                builder
                    .credentials(Credentials::new(
                        username,
                        password.expose_secret().to_string(),
                    ))
                    .build()
            }
        };

        Ok(Self { mailer, sender })
    }

    fn build_message(
        &self,
        email: &OutgoingEmail,
    ) -> Result<Message, TransportError> {
        let mut builder = Message::builder()
            .from(self.sender.clone())
            .to(parse_mailbox(&email.to)?)
            .subject(email.subject.as_str())
            .header(ContentType::TEXT_HTML);
        if let Some(reply_to) = &email.reply_to {
            builder = builder.reply_to(parse_mailbox(reply_to)?);
        }
        Ok(builder.body(email.html_body.clone())?)
    }

    /// Open a connection, authenticate, and close it again. Does not send
    /// anything.
    pub async fn verify(&self) -> Result<bool, TransportError> {
        Ok(self.mailer.test_connection().await?)
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, TransportError> {
    address.parse().map_err(|source| TransportError::Address {
        address: address.to_string(),
        source,
    })
}

#[async_trait]
impl MailTransport for SmtpEmailClient {
    #[tracing::instrument(
        name = "Sending email over SMTP",
        skip(self, email),
        fields(recipient = %email.to, subject = %email.subject)
    )]
    async fn send(
        &self,
        email: &OutgoingEmail,
    ) -> Result<(), TransportError> {
        let message = self.build_message(email)?;
        let response = self.mailer.send(message).await?;
        tracing::debug!(code = %response.code(), "accepted by SMTP server");
        Ok(())
    }
}

/// Log whether the SMTP server is reachable with the configured credentials.
/// Failure is not fatal: the first contact submission will report it again.
pub async fn verify_transport(client: SmtpEmailClient) {
    match client.verify().await {
        Ok(true) => tracing::info!("email server ready"),
        Ok(false) => tracing::warn!("email server did not accept the connection"),
        Err(e) => tracing::error!(
            error.cause_chain = ?e,
            error.message = %e,
            "email verification failed"
        ),
    }
}
