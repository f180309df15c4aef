//! Periodic removal of expired secure-URL tokens.

use std::sync::Arc;
use std::time::Duration;

use tna_core::session_tokens::{EphemeralTokenStore, SWEEP_INTERVAL_SECS};
use tokio_util::sync::CancellationToken;

/// Run the sweep loop until `cancel` is triggered.
pub async fn run(store: Arc<EphemeralTokenStore>, cancel: CancellationToken) {
    let period = Duration::from_secs(SWEEP_INTERVAL_SECS);
    tracing::info!(interval_secs = period.as_secs(), "Secure token sweep started");

    let mut interval = tokio::time::interval(period);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Secure token sweep stopping");
                break;
            }
            _ = interval.tick() => {
                let removed = store.sweep().await;
                if removed > 0 {
                    tracing::debug!(removed, "Secure token sweep: dropped expired tokens");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stops_when_cancelled() {
        let store = Arc::new(EphemeralTokenStore::new());
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run(Arc::clone(&store), cancel.clone()));

        cancel.cancel();
        let joined = tokio::time::timeout(Duration::from_secs(2), handle).await;
        assert!(joined.is_ok());
    }
}
