//! `khata-notify` — one-time-code delivery seam.
//!
//! Delivery is a collaborator, not part of the ledger core: a failed send is
//! logged and the caller's primary operation (login) still proceeds. The
//! production transport (SMTP or an email API) implements [`Notifier`]
//! outside this repo; [`TracingNotifier`] is the dev stand-in.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("delivery failed: {0}")]
    Delivery(String),
}

/// Delivers a one-time login code to an email address.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_code(&self, email: &str, code: &str) -> Result<(), NotifyError>;
}

/// Dev transport: logs the code instead of sending it.
///
/// Only for local runs — the code is a credential and lands in the log.
#[derive(Debug, Default)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn send_code(&self, email: &str, code: &str) -> Result<(), NotifyError> {
        tracing::info!(email, code, "login code (dev notifier, not delivered)");
        Ok(())
    }
}
