use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
#[error("failed to deliver credential notification: {0}")]
pub struct NotifyError(pub String);

/// Out-of-band delivery channel for generated credentials.
///
/// Admin accounts get a temporary password that is never returned over the
/// API; an implementation of this trait (an SMS gateway in production)
/// carries it to the new admin's phone number.
#[async_trait]
pub trait CredentialNotifier: Send + Sync {
    async fn send_temporary_credential(&self, contact: &str, secret: &str)
    -> Result<(), NotifyError>;
}

/// Default notifier: records that a credential was issued without exposing
/// it. Stands in wherever no SMS gateway is configured.
pub struct LogCredentialNotifier;

#[async_trait]
impl CredentialNotifier for LogCredentialNotifier {
    async fn send_temporary_credential(
        &self,
        contact: &str,
        _secret: &str,
    ) -> Result<(), NotifyError> {
        info!("temporary credential issued for {}", contact);
        Ok(())
    }
}
