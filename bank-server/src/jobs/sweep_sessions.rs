use std::time::Duration;

use tokio::{sync::oneshot, task::JoinHandle, time};

use crate::session::SessionStore;

/// Periodically drops expired sessions from the [`SessionStore`].
pub struct SweepSessions {
    sessions: SessionStore,
    interval: Duration,
    shutdown_tx: Option<oneshot::Sender<()>>,
    join_handle: Option<JoinHandle<()>>,
}

impl SweepSessions {
    pub fn with_store(sessions: SessionStore, interval: Duration) -> Self {
        Self {
            sessions,
            interval,
            shutdown_tx: None,
            join_handle: None,
        }
    }

    pub async fn spawn(&mut self) {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();
        let mut sweep_interval = time::interval(self.interval);
        let sessions = self.sessions.clone();

        self.shutdown_tx = Some(shutdown_tx);
        self.join_handle = Some(tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = sweep_interval.tick() => {
                        sweep_sessions(&sessions).await
                    },
                    _msg = &mut shutdown_rx => {
                        break;
                    }
                }
            }
        }));
    }

    pub async fn stop(&mut self) {
        if let Some(handle) = self.join_handle.take() {
            if let Some(tx) = self.shutdown_tx.take() {
                if tx.send(()).is_err() {
                    tracing::error!("failed to send SweepSessions job shutdown signal");
                }
            }
            if let Err(e) = handle.await {
                tracing::error!("failed to wait for SweepSessions job to terminate: {}", e);
            }
        }

        tracing::debug!("finished SweepSessions job");
    }
}

async fn sweep_sessions(sessions: &SessionStore) {
    let removed = sessions.sweep_expired().await;
    if removed > 0 {
        tracing::debug!(removed = removed, "expired sessions removed");
    } else {
        tracing::trace!("no expired sessions");
    }
}
