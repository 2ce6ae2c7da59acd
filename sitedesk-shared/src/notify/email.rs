/// Email egress boundary
///
/// Outbound email goes through the [`EmailProvider`] trait so the concrete
/// vendor stays swappable. The HTTP implementation POSTs JSON to a
/// provider's send endpoint with bearer auth; the no-op implementation is
/// used in development and tests, and whenever no API key is configured.

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

/// Error type for email delivery
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// Provider rejected the send
    #[error("Email provider returned {status}: {body}")]
    Provider { status: u16, body: String },

    /// Transport-level failure
    #[error("Email transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// A rendered email ready to send
#[derive(Debug, Clone, Serialize)]
pub struct OutboundEmail {
    /// Recipient address
    pub to: String,

    /// Subject line
    pub subject: String,

    /// Plain-text body
    pub text: String,
}

/// Abstract email sender
#[async_trait]
pub trait EmailProvider: Send + Sync {
    /// Sends one email
    async fn send(&self, email: &OutboundEmail) -> Result<(), EmailError>;
}

/// HTTP API email provider
///
/// Speaks the common `POST {api_url} {"from", "to", "subject", "text"}`
/// shape with a bearer API key.
pub struct HttpEmailProvider {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    from: String,
}

impl HttpEmailProvider {
    /// Creates a provider for the given endpoint and sender address
    pub fn new(api_url: String, api_key: String, from: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
            api_key,
            from,
        }
    }
}

#[derive(Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

#[async_trait]
impl EmailProvider for HttpEmailProvider {
    async fn send(&self, email: &OutboundEmail) -> Result<(), EmailError> {
        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&SendRequest {
                from: &self.from,
                to: &email.to,
                subject: &email.subject,
                text: &email.text,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(EmailError::Provider { status, body });
        }

        debug!(to = %email.to, subject = %email.subject, "Email accepted by provider");
        Ok(())
    }
}

/// Email provider that logs and discards
///
/// Used when no provider is configured, and in tests.
pub struct NoopEmailProvider;

#[async_trait]
impl EmailProvider for NoopEmailProvider {
    async fn send(&self, email: &OutboundEmail) -> Result<(), EmailError> {
        debug!(to = %email.to, subject = %email.subject, "Email discarded (no provider configured)");
        Ok(())
    }
}
