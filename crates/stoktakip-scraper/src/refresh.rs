//! Background credential refresh.
//!
//! The login automation (browser-driven, external to this crate) is reached
//! through the [`CredentialProvider`] seam. The refresher is a detached task
//! on a fixed cadence, deliberately decoupled from the worker pool: scraping
//! tasks come and go, the session heartbeat does not.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::credentials::{CredentialSet, CredentialStore};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Source of fresh authentication artifacts. Implementations normalise the
/// raw cookie handoff into a [`CredentialSet`] exactly once, at this
/// boundary.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn acquire(&self) -> Result<CredentialSet, BoxError>;
}

/// Spawns the refresh loop: acquire immediately, publish to `store`, then
/// re-acquire every `interval`. Acquisition failures are logged and retried
/// at the next tick — the previous set stays published until it either gets
/// replaced or ages out.
///
/// The returned handle can be used to abort the loop at shutdown; dropping
/// it detaches the task instead.
pub fn spawn_refresher(
    store: Arc<CredentialStore>,
    provider: Arc<dyn CredentialProvider>,
    interval: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match provider.acquire().await {
                Ok(set) => {
                    tracing::info!(issued_at = %set.issued_at(), "session credentials refreshed");
                    store.replace(set);
                }
                Err(error) => {
                    tracing::error!(error = %error, "credential refresh failed — retrying next interval");
                }
            }
            tokio::time::sleep(interval).await;
        }
    })
}
