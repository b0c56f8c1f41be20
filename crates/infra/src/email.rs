//! Outbound email boundary.
//!
//! Delivery itself is an external collaborator; the flows in the API only
//! need "send this message to this address" and must not fail the request
//! when delivery fails (a registration still succeeds if the verification
//! mail bounces).

use async_trait::async_trait;

/// Narrow interface for outbound mail.
#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), EmailError>;
}

#[derive(Debug, thiserror::Error)]
#[error("email delivery failed: {0}")]
pub struct EmailError(String);

impl EmailError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Logs outbound mail instead of delivering it. Used in dev and tests.
#[derive(Debug, Default, Clone)]
pub struct TracingEmailSender;

#[async_trait]
impl EmailSender for TracingEmailSender {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), EmailError> {
        tracing::info!(%to, %subject, body_len = body.len(), "outbound email");
        tracing::debug!(%body, "outbound email body");
        Ok(())
    }
}
